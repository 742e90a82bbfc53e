//! JGQ Core Library
//!
//! Domain model, prompt templates and external-service seams for asking
//! natural-language questions about a Java code-property graph.

pub mod config;
pub mod cypher;
pub mod error;
pub mod example_bank;
pub mod extract;
pub mod models;
pub mod prompts;
pub mod question;
pub mod schema;
pub mod table;
pub mod traits;

pub use config::{AppConfig, Neo4jConfig, QuerySettings};
pub use error::{JgqError, JgqResult};
pub use models::{ModelSelection, Provider, Role, RoleModels};
pub use question::{AnswerSource, Question, QuestionState, Route, Step};
pub use schema::GraphSchema;
pub use table::{Record, ResultTable};
pub use traits::{ChatModel, GraphStore, OutputFormat, RoleClients};
