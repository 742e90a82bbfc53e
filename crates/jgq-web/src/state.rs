//! Application state.

use std::sync::Arc;

use anyhow::Result;

use jgq_core::{AppConfig, GraphSchema, GraphStore, ModelSelection, RoleClients, RoleModels};
use jgq_workflow::Workflow;

/// Builds the chat clients for a set of role models.
pub type ClientFactory = Arc<dyn Fn(&RoleModels) -> Result<RoleClients> + Send + Sync>;

/// Application state shared across handlers.
///
/// The schema snapshot is fetched once at startup. Each request builds its
/// own [`Workflow`] so model choices stay per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub graph: Arc<dyn GraphStore>,
    pub schema: Arc<GraphSchema>,
    clients: ClientFactory,
}

impl AppState {
    /// State whose clients come from the configured providers.
    pub fn new(config: AppConfig, graph: Arc<dyn GraphStore>, schema: GraphSchema) -> Self {
        let config = Arc::new(config);
        let factory_config = Arc::clone(&config);
        let clients: ClientFactory =
            Arc::new(move |models: &RoleModels| jgq_llm::role_clients(&factory_config, models));
        Self::with_client_factory(config, graph, schema, clients)
    }

    pub fn with_client_factory(
        config: Arc<AppConfig>,
        graph: Arc<dyn GraphStore>,
        schema: GraphSchema,
        clients: ClientFactory,
    ) -> Self {
        Self {
            config,
            graph,
            schema: Arc::new(schema),
            clients,
        }
    }

    /// Build a workflow using the configured models with optional overrides.
    pub fn workflow(
        &self,
        cypher_model: Option<ModelSelection>,
        qa_model: Option<ModelSelection>,
    ) -> Result<Workflow> {
        let models = self.config.models.with_overrides(cypher_model, qa_model);
        let clients = (self.clients)(&models)?;
        Ok(Workflow::from_parts(
            clients,
            Arc::clone(&self.graph),
            Arc::clone(&self.schema),
            self.config.query.clone(),
        ))
    }
}
