//! Query/answer chain: question -> Cypher -> rows -> answer.

use std::sync::Arc;

use tracing::{debug, info};

use jgq_core::config::DEFAULT_TOP_K;
use jgq_core::cypher;
use jgq_core::example_bank::{render_examples, QUERY_EXAMPLES};
use jgq_core::extract::extract_cypher;
use jgq_core::prompts::{cypher_prompt, qa_prompt};
use jgq_core::{
    ChatModel, GraphSchema, GraphStore, JgqError, JgqResult, OutputFormat, ResultTable, Role,
};

/// Everything one chain run produces.
#[derive(Debug, Clone)]
pub struct ChainOutput {
    pub cypher: String,
    pub table: ResultTable,
    pub answer: String,
}

/// Generates a Cypher query for a question, runs it and summarizes the rows.
pub struct CypherQaChain {
    cypher_model: Arc<dyn ChatModel>,
    qa_model: Arc<dyn ChatModel>,
    graph: Arc<dyn GraphStore>,
    schema: Arc<GraphSchema>,
    schema_text: String,
    examples: String,
    top_k: usize,
    validate: bool,
    instructions: Option<String>,
}

impl CypherQaChain {
    pub fn new(
        cypher_model: Arc<dyn ChatModel>,
        qa_model: Arc<dyn ChatModel>,
        graph: Arc<dyn GraphStore>,
        schema: Arc<GraphSchema>,
    ) -> Self {
        Self {
            cypher_model,
            qa_model,
            graph,
            schema_text: schema.to_prompt_text(),
            schema,
            examples: render_examples(QUERY_EXAMPLES),
            top_k: DEFAULT_TOP_K,
            validate: true,
            instructions: None,
        }
    }

    /// Keep at most `k` rows for the answer.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Check generated queries against the schema before running them.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Extra notes appended to the generation prompt.
    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Ask the Cypher model for a query answering `question`.
    pub async fn generate_cypher(&self, question: &str) -> JgqResult<String> {
        let prompt = cypher_prompt(
            &self.schema_text,
            question,
            &self.examples,
            self.instructions.as_deref(),
        );
        let response = self
            .cypher_model
            .complete(&prompt, OutputFormat::Text)
            .await
            .map_err(|e| JgqError::llm(Role::Cypher, e))?;

        let query = extract_cypher(&response);
        if query.is_empty() {
            return Err(JgqError::InvalidQuery("the model returned no query".to_string()));
        }
        Ok(query)
    }

    /// Run the whole chain for one question.
    pub async fn invoke(&self, question: &str) -> JgqResult<ChainOutput> {
        let query = self.generate_cypher(question).await?;
        info!(cypher = %query, "Generated Cypher");

        if self.validate {
            cypher::check(&self.schema, &query)?;
        }

        let mut records = self
            .graph
            .run_query(&query)
            .await
            .map_err(|e| JgqError::execution(&query, e))?;
        let total = records.len();
        records.truncate(self.top_k);
        let table = ResultTable::from_records(&records);
        debug!(rows = total, kept = table.len(), "Query executed");

        let answer = self
            .qa_model
            .complete(&qa_prompt(question, &table.to_context()), OutputFormat::Text)
            .await
            .map_err(|e| JgqError::llm(Role::Qa, e))?;

        Ok(ChainOutput {
            cypher: query,
            table,
            answer: answer.trim().to_string(),
        })
    }
}
