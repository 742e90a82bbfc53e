//! Workflow controller.
//!
//! Runs the steps of one request as a loop over [`Step`]:
//!
//! ```text
//! Route --structure--> Refine --> GraphSearch --> End
//!       --javadoc----> VectorSearch ------------> End
//!       --none-------------------------------------> End
//! ```

use std::sync::Arc;

use tracing::info;

use jgq_core::{
    AnswerSource, GraphSchema, GraphStore, JgqError, JgqResult, Question, QuestionState,
    QuerySettings, RoleClients, Step,
};

use crate::chain::CypherQaChain;
use crate::refine::refine_question;
use crate::router::route_question;
use crate::vector::vector_search;

/// Answers questions about the code graph. One per session.
pub struct Workflow {
    clients: RoleClients,
    graph: Arc<dyn GraphStore>,
    schema: Arc<GraphSchema>,
    schema_text: String,
    settings: QuerySettings,
}

impl Workflow {
    /// Fetch the schema snapshot and build the workflow.
    pub async fn initialize(
        clients: RoleClients,
        graph: Arc<dyn GraphStore>,
        settings: QuerySettings,
    ) -> JgqResult<Self> {
        let schema = graph.schema().await.map_err(JgqError::schema)?;
        Ok(Self::from_parts(clients, graph, Arc::new(schema), settings))
    }

    /// Build the workflow around an existing schema snapshot.
    pub fn from_parts(
        clients: RoleClients,
        graph: Arc<dyn GraphStore>,
        schema: Arc<GraphSchema>,
        settings: QuerySettings,
    ) -> Self {
        Self {
            clients,
            graph,
            schema_text: schema.to_prompt_text(),
            schema,
            settings,
        }
    }

    pub fn schema(&self) -> &GraphSchema {
        &self.schema
    }

    /// The schema as the prompts see it.
    pub fn schema_text(&self) -> &str {
        &self.schema_text
    }

    fn chain(&self) -> CypherQaChain {
        CypherQaChain::new(
            Arc::clone(&self.clients.cypher),
            Arc::clone(&self.clients.qa),
            Arc::clone(&self.graph),
            Arc::clone(&self.schema),
        )
        .with_top_k(self.settings.top_k)
        .with_validation(self.settings.validate_cypher)
        .with_instructions(self.settings.instructions.clone())
    }

    /// Route, refine and answer `question`.
    ///
    /// An empty question is rejected before any model or database call.
    pub async fn handle_query(&self, question: &str) -> JgqResult<QuestionState> {
        let mut state = QuestionState::new(Question::new(question)?);
        info!(id = %state.id, question = %state.user_question, "Handling question");

        let mut step = Step::Route;
        loop {
            state.trail.push(step);
            step = match step {
                Step::Route => {
                    let route =
                        route_question(self.clients.router.as_ref(), state.user_question.as_str())
                            .await?;
                    info!(id = %state.id, %route, "Routed");
                    state.route = Some(route);
                    Step::after_route(route)
                }
                Step::Refine => {
                    let refined = refine_question(
                        self.clients.refiner.as_ref(),
                        &self.schema_text,
                        state.user_question.as_str(),
                    )
                    .await?;
                    state.refined_question = Some(refined);
                    Step::GraphSearch
                }
                Step::GraphSearch => {
                    self.graph_search(&mut state).await?;
                    Step::End
                }
                Step::VectorSearch => {
                    state.final_answer = Some(vector_search(state.search_question()));
                    state.answered_by = Some(AnswerSource::VectorSearch);
                    Step::End
                }
                Step::End => break,
            };
        }

        info!(id = %state.id, steps = state.trail.len(), "Question handled");
        Ok(state)
    }

    /// Run the query/answer chain on the question as asked, skipping routing
    /// and refinement.
    pub async fn handle_direct(&self, question: &str) -> JgqResult<QuestionState> {
        let mut state = QuestionState::new(Question::new(question)?);
        info!(id = %state.id, question = %state.user_question, "Handling question directly");

        state.trail.push(Step::GraphSearch);
        self.graph_search(&mut state).await?;
        state.trail.push(Step::End);
        Ok(state)
    }

    async fn graph_search(&self, state: &mut QuestionState) -> JgqResult<()> {
        let output = self.chain().invoke(state.search_question()).await?;
        state.cypher_query = Some(output.cypher);
        state.cypher_result = Some(output.table);
        state.final_answer = Some(output.answer);
        state.answered_by = Some(AnswerSource::GraphSearch);
        Ok(())
    }
}
