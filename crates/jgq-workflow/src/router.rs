//! Routing step: classify a question as structure, javadoc or none.

use tracing::debug;

use jgq_core::extract::string_field;
use jgq_core::prompts::router_prompt;
use jgq_core::{ChatModel, JgqError, JgqResult, OutputFormat, Role, Route};

/// JSON key the router must answer with.
pub const ROUTE_KEY: &str = "source";

/// Ask the router model which search should handle `question`.
///
/// A response without the `source` key, or naming an unknown route, is a
/// [`JgqError::MalformedResponse`]. There is no fallback route.
pub async fn route_question(model: &dyn ChatModel, question: &str) -> JgqResult<Route> {
    let response = model
        .complete(&router_prompt(question), OutputFormat::Json)
        .await
        .map_err(|e| JgqError::llm(Role::Router, e))?;

    let source = string_field(Role::Router, &response, ROUTE_KEY)?;
    let route = source
        .parse::<Route>()
        .map_err(|e| JgqError::malformed(Role::Router, e))?;

    debug!(%route, model = %model.selection(), "Question routed");
    Ok(route)
}
