//! Seams to the external collaborators: chat models and the graph database.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ModelSelection, Role};
use crate::schema::GraphSchema;
use crate::table::Record;

/// Shape requested from a chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    /// A single JSON object.
    Json,
}

/// A remote chat-completion model, called with temperature 0.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one user prompt and return the completion text.
    async fn complete(&self, prompt: &str, format: OutputFormat) -> Result<String>;

    /// The provider and model behind this client.
    fn selection(&self) -> &ModelSelection;
}

/// A graph database that can describe itself and run read queries.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn schema(&self) -> Result<GraphSchema>;

    async fn run_query(&self, cypher: &str) -> Result<Vec<Record>>;
}

/// One chat model per workflow role.
#[derive(Clone)]
pub struct RoleClients {
    pub router: Arc<dyn ChatModel>,
    pub refiner: Arc<dyn ChatModel>,
    pub cypher: Arc<dyn ChatModel>,
    pub qa: Arc<dyn ChatModel>,
}

impl RoleClients {
    pub fn get(&self, role: Role) -> &Arc<dyn ChatModel> {
        match role {
            Role::Router => &self.router,
            Role::Refiner => &self.refiner,
            Role::Cypher => &self.cypher,
            Role::Qa => &self.qa,
        }
    }
}
