//! Web server command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use jgq_core::AppConfig;
use jgq_graph::introspect_schema;
use jgq_web::AppState;

use super::connect_graph;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "3030")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

pub async fn execute(args: ServeArgs, config: AppConfig) -> Result<()> {
    let client = connect_graph(&config).await?;
    let schema = introspect_schema(&client)
        .await
        .context("Failed to load the graph schema")?;

    println!();
    println!("  {} {}", "JGQ".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}  http://{}:{}", "Web UI".green(), args.host, args.port);
    println!("  {}     http://{}:{}/api", "API".green(), args.host, args.port);
    println!("  {}   {}", "Neo4j".green(), config.neo4j.uri);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let state = AppState::new(config, Arc::new(client), schema);
    jgq_web::run_server(state, &args.host, args.port).await
}
