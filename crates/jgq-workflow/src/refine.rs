//! Refinement step: rewrite a question in the schema's vocabulary.

use tracing::debug;

use jgq_core::extract::string_field;
use jgq_core::prompts::refinement_prompt;
use jgq_core::{ChatModel, JgqError, JgqResult, OutputFormat, Role};

/// JSON key the refiner must answer with.
pub const REFINEMENT_KEY: &str = "refinement";

/// Ask the refiner model to restate `question` using schema terms.
///
/// The model is told to return the question unchanged when it cannot improve
/// it, so an empty refinement is treated as malformed.
pub async fn refine_question(
    model: &dyn ChatModel,
    schema_text: &str,
    question: &str,
) -> JgqResult<String> {
    let response = model
        .complete(&refinement_prompt(schema_text, question), OutputFormat::Json)
        .await
        .map_err(|e| JgqError::llm(Role::Refiner, e))?;

    let refined = string_field(Role::Refiner, &response, REFINEMENT_KEY)?;
    if refined.is_empty() {
        return Err(JgqError::malformed(Role::Refiner, "empty refinement"));
    }

    debug!(original = %question, refined = %refined, "Question refined");
    Ok(refined)
}
