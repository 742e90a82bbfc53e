//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use jgq_core::AppConfig;
use jgq_graph::GraphClient;

pub mod ask;
pub mod catalog;
pub mod graph;
pub mod serve;

/// How long to wait for Neo4j before giving up.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Java Graph Questions - ask questions about a Java code graph
#[derive(Parser)]
#[command(name = "jgq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./jgq.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question about the code base
    Ask(ask::AskArgs),

    /// Print the graph schema as the models see it
    Schema,

    /// Execute a raw Cypher query
    Query {
        /// Cypher query string
        query: String,
    },

    /// Print the example questions and queries used for generation
    Examples,

    /// List selectable models and the configured defaults
    Models,

    /// Start the web UI
    Serve(serve::ServeArgs),

    /// Check Neo4j and model provider connectivity
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref()).context("Failed to load configuration")?;

        match self.command {
            Commands::Ask(args) => ask::execute(args, config).await,
            Commands::Schema => graph::cmd_schema(&config).await,
            Commands::Query { query } => graph::cmd_query(&config, &query).await,
            Commands::Examples => {
                catalog::cmd_examples();
                Ok(())
            }
            Commands::Models => {
                catalog::cmd_models(&config);
                Ok(())
            }
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Status => graph::cmd_status(&config).await,
        }
    }
}

/// Connect to Neo4j, failing fast when it is unreachable.
pub(crate) async fn connect_graph(config: &AppConfig) -> Result<GraphClient> {
    tokio::time::timeout(CONNECT_TIMEOUT, GraphClient::connect(&config.neo4j))
        .await
        .with_context(|| {
            format!(
                "Timed out connecting to Neo4j at {} after {}s",
                config.neo4j.uri,
                CONNECT_TIMEOUT.as_secs()
            )
        })?
}
