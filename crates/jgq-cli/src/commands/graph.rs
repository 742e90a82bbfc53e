//! Graph commands: schema, raw queries and connectivity status.

use anyhow::Result;
use colored::Colorize;

use jgq_core::{AppConfig, ModelSelection, Provider, ResultTable, Role};
use jgq_graph::introspect_schema;
use jgq_llm::{GroqClient, OllamaChatClient};

use super::connect_graph;
use crate::output;

/// Print the schema snapshot.
pub async fn cmd_schema(config: &AppConfig) -> Result<()> {
    let client = connect_graph(config).await?;
    let schema = introspect_schema(&client).await?;

    if schema.is_empty() {
        println!("{}", "The graph is empty.".dimmed());
        return Ok(());
    }
    println!("{}", schema.to_prompt_text());
    Ok(())
}

/// Execute a raw Cypher query and print the rows.
pub async fn cmd_query(config: &AppConfig, cypher: &str) -> Result<()> {
    let client = connect_graph(config).await?;
    let records = client.query_records(cypher).await?;
    output::print_table(&ResultTable::from_records(&records));
    Ok(())
}

/// Show Neo4j and model provider status.
pub async fn cmd_status(config: &AppConfig) -> Result<()> {
    println!("{}", "JGQ Status".bold());
    println!("{}", "─".repeat(50));

    match connect_graph(config).await {
        Ok(client) => {
            let counts = client.get_counts().await?;
            println!(
                "  {} {} ({} nodes, {} relationships)",
                "Neo4j".green(),
                config.neo4j.uri,
                counts.nodes,
                counts.relationships
            );
        }
        Err(e) => {
            println!("  {} {} ({:#})", "Neo4j".red(), config.neo4j.uri, e);
        }
    }

    println!();
    println!("{}", "Models".bold());
    for role in Role::ALL {
        let selection = config.models.get(role);
        let status = model_status(config, selection).await;
        println!("  {:<8} {:<45} {}", role.as_str(), selection.to_string(), status);
    }
    Ok(())
}

async fn model_status(config: &AppConfig, selection: &ModelSelection) -> colored::ColoredString {
    let available = match selection.provider {
        Provider::Groq => match &config.groq_api_key {
            Some(key) => GroqClient::new(&config.groq_api_url, key, selection.clone())
                .health_check()
                .await
                .unwrap_or(false),
            None => return "no GROQ_API_KEY".yellow(),
        },
        Provider::Ollama => OllamaChatClient::new(&config.ollama_url, selection.clone())
            .health_check()
            .await
            .unwrap_or(false),
    };

    if available {
        "available".green()
    } else {
        "unavailable".red()
    }
}
