//! Narrative Improvement Requester — free-form prose built on top of the
//! structured review. No prior conversation is carried into this call.

use crate::llm_client::{CompletionRequest, CompletionService, LlmError};
use crate::models::message::Message;
use crate::review::prompts::{render_template, IMPROVEMENT_PROMPT_TEMPLATE, SUGGESTIONS_HEADING};

pub fn build_improvement_prompt(review_text: &str, resume_text: &str) -> String {
    render_template(
        IMPROVEMENT_PROMPT_TEMPLATE,
        &[("review_text", review_text), ("resume_text", resume_text)],
    )
}

/// Issues the narrative call. Any non-empty text is accepted as-is.
pub async fn request_improvement(
    llm: &dyn CompletionService,
    model: &str,
    review_text: &str,
    resume_text: &str,
) -> Result<String, LlmError> {
    let prompt = build_improvement_prompt(review_text, resume_text);
    let request = CompletionRequest::plain(model, vec![Message::user(prompt)]);
    llm.complete(&request).await?.into_text()
}

/// The assistant message for a completed review turn.
pub fn compose_review_message(review_text: &str, suggestions: &str) -> String {
    format!(
        "{}\n\n{SUGGESTIONS_HEADING}\n{}",
        review_text.trim(),
        suggestions.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fake::{self, ScriptedCompletions};
    use crate::models::message::Role;

    #[test]
    fn test_prompt_contains_review_and_resume_verbatim() {
        let prompt = build_improvement_prompt("X", "Y");
        assert!(prompt.contains("Resume Review: X"));
        assert!(prompt.contains("Resume Text: Y"));
        assert!(prompt.starts_with("You are a professional HR recruiter"));
    }

    #[test]
    fn test_prompt_keeps_multiline_resume_intact() {
        let resume = "Jane Doe\n\nExperience:\n- Shipped {things}\n";
        let prompt = build_improvement_prompt("Solid.", resume);
        assert!(prompt.ends_with(resume));
    }

    #[test]
    fn test_compose_trims_and_adds_heading() {
        let message = compose_review_message("  Solid experience.\n", "\nConsider quantifying impact.  ");
        assert_eq!(
            message,
            "Solid experience.\n\n**Suggestions for Improvement:**\nConsider quantifying impact."
        );
    }

    #[tokio::test]
    async fn test_request_sends_prompt_as_only_message() {
        let llm = ScriptedCompletions::new(vec![fake::text("Add metrics.")]);
        let suggestions = request_improvement(&llm, "gpt-3.5-turbo", "Good.", "Resume body")
            .await
            .unwrap();
        assert_eq!(suggestions, "Add metrics.");

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].functions.is_empty());
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::User);
        assert_eq!(
            requests[0].messages[0].content,
            build_improvement_prompt("Good.", "Resume body")
        );
    }

    #[tokio::test]
    async fn test_empty_answer_is_an_error() {
        let llm = ScriptedCompletions::new(vec![fake::text("")]);
        let err = request_improvement(&llm, "m", "r", "t").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
