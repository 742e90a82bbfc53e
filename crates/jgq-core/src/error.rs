//! Centralized error types for JGQ.

use thiserror::Error;

use crate::models::Role;

/// Boxed source error carried by remote-call failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for JGQ operations.
#[derive(Error, Debug)]
pub enum JgqError {
    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Malformed {role} response: {message}")]
    MalformedResponse { role: Role, message: String },

    #[error("Invalid Cypher query: {0}")]
    InvalidQuery(String),

    #[error("Cypher query failed to execute: {query}")]
    QueryExecution {
        query: String,
        #[source]
        source: BoxError,
    },

    #[error("{role} model call failed")]
    Llm {
        role: Role,
        #[source]
        source: BoxError,
    },

    #[error("Failed to load the graph schema")]
    Schema(#[source] BoxError),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for JGQ operations.
pub type JgqResult<T> = Result<T, JgqError>;

impl JgqError {
    /// Create a malformed-response error for a model role.
    pub fn malformed(role: Role, msg: impl Into<String>) -> Self {
        Self::MalformedResponse {
            role,
            message: msg.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a failed model call.
    pub fn llm(role: Role, err: anyhow::Error) -> Self {
        Self::Llm {
            role,
            source: err.into(),
        }
    }

    /// Wrap a failed query execution.
    pub fn execution(query: &str, err: anyhow::Error) -> Self {
        Self::QueryExecution {
            query: query.to_string(),
            source: err.into(),
        }
    }

    /// Wrap a failed schema introspection.
    pub fn schema(err: anyhow::Error) -> Self {
        Self::Schema(err.into())
    }
}
