//! Route handlers.

pub mod api;
pub mod pages;

use axum::http::StatusCode;

use jgq_core::JgqError;

/// HTTP status for a failed request.
pub(crate) fn status_for(err: &JgqError) -> StatusCode {
    match err {
        JgqError::EmptyQuestion | JgqError::UnknownProvider(_) | JgqError::Config(_) => {
            StatusCode::BAD_REQUEST
        }
        JgqError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
        JgqError::MalformedResponse { .. }
        | JgqError::Llm { .. }
        | JgqError::QueryExecution { .. } => StatusCode::BAD_GATEWAY,
        JgqError::Schema(_) | JgqError::Io(_) | JgqError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// The error followed by each of its sources.
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
