// Resume review protocol.
// Two sequential calls: a structured `evaluate_resume` extraction, then a
// narrative improvement pass over its `review_text`.
// All LLM calls go through llm_client — no direct OpenAI calls here.

pub mod narrative;
pub mod prompts;
pub mod record;
pub mod schema;
pub mod structured;

use tracing::info;

use crate::llm_client::{CompletionService, LlmError};
use crate::review::narrative::{compose_review_message, request_improvement};
use crate::review::prompts::{NO_REVIEW_PLACEHOLDER, PROMPT_VERSION};
use crate::review::structured::request_structured_review;

/// Runs the full two-stage review for one resume.
///
/// Returns `Ok(None)` when the structured call produced no valid review
/// record. In that case the narrative call is never issued.
pub async fn review_resume(
    llm: &dyn CompletionService,
    model: &str,
    resume_text: &str,
) -> Result<Option<String>, LlmError> {
    info!("Running resume review (prompt version {PROMPT_VERSION})");

    let Some(record) = request_structured_review(llm, model, resume_text).await? else {
        return Ok(None);
    };

    let review_text = record.review_text().unwrap_or(NO_REVIEW_PLACEHOLDER);
    let suggestions = request_improvement(llm, model, review_text, resume_text).await?;

    Ok(Some(compose_review_message(review_text, &suggestions)))
}
