//! The `ask` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use jgq_core::{AppConfig, ModelSelection, Question};
use jgq_workflow::Workflow;

use super::connect_graph;
use crate::output;

#[derive(Args)]
pub struct AskArgs {
    /// The question, e.g. "What interfaces do not have an implementation?"
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub question: Vec<String>,

    /// Model that writes the Cypher query (provider:model)
    #[arg(long)]
    pub cypher_model: Option<ModelSelection>,

    /// Model that writes the answer (provider:model)
    #[arg(long)]
    pub qa_model: Option<ModelSelection>,

    /// Skip routing and refinement; query the graph with the question as asked
    #[arg(long)]
    pub direct: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// File with extra instructions for query generation
    #[arg(long)]
    pub instructions: Option<PathBuf>,
}

pub async fn execute(args: AskArgs, mut config: AppConfig) -> Result<()> {
    // Blank questions never reach the models or the database.
    let question = Question::new(&args.question.join(" "))?;

    if let Some(path) = args.instructions {
        config.query.instructions_file = Some(path);
        config.load_instructions()?;
    }

    let models = config
        .models
        .with_overrides(args.cypher_model, args.qa_model);
    debug!(?models, "Selected models");

    let clients = jgq_llm::role_clients(&config, &models)?;
    let graph = Arc::new(connect_graph(&config).await?);
    let workflow = Workflow::initialize(clients, graph, config.query.clone())
        .await
        .context("Failed to prepare the workflow")?;

    let spinner = (!args.json).then(|| output::spinner("Thinking..."));
    let result = if args.direct {
        workflow.handle_direct(question.as_str()).await
    } else {
        workflow.handle_query(question.as_str()).await
    };
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let state = result?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        output::print_question_state(&state);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jgq_core::JgqError;

    fn args(question: &str) -> AskArgs {
        AskArgs {
            question: vec![question.to_string()],
            cypher_model: None,
            qa_model: None,
            direct: false,
            json: true,
            instructions: None,
        }
    }

    #[tokio::test]
    async fn test_blank_question_fails_before_connecting() {
        let mut config = AppConfig::default();
        // Nothing listens here; reaching Neo4j would fail with a connection error.
        config.neo4j.uri = "bolt://127.0.0.1:1".to_string();
        config.groq_api_key = Some("gsk_test".to_string());

        let err = execute(args("   "), config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JgqError>(),
            Some(JgqError::EmptyQuestion)
        ));
    }

    #[tokio::test]
    async fn test_blank_question_skips_instructions_file() {
        let mut config = AppConfig::default();
        config.neo4j.uri = "bolt://127.0.0.1:1".to_string();
        let mut ask = args("\t");
        ask.instructions = Some(PathBuf::from("/nonexistent/jgq-instructions.txt"));

        let err = execute(ask, config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JgqError>(),
            Some(JgqError::EmptyQuestion)
        ));
    }
}
