//! JGQ CLI - Java Graph Questions
//!
//! Ask natural-language questions about a Java code base stored as a
//! code-property graph in Neo4j.

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

use commands::Cli;

/// Initialize tracing on stderr, plus an ANSI-free copy in `log_file`.
///
/// The returned guard flushes the file writer and must be held until exit.
fn init_tracing(log_file: Option<&std::path::Path>, verbose: bool) -> Option<WorkerGuard> {
    let default_filter = if verbose {
        "jgq=debug,jgq_workflow=debug,jgq_web=debug,jgq_graph=debug,jgq_llm=debug"
    } else {
        "jgq=info,jgq_workflow=info,jgq_web=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let _ = std::fs::create_dir_all(dir);
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "jgq.log".into());

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref(), cli.verbose);

    cli.execute().await
}
