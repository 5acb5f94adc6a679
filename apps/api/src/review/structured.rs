//! Structured Review Requester — one `evaluate_resume` function call per resume.

use tracing::{info, warn};

use crate::llm_client::{CompletionRequest, CompletionResult, CompletionService, LlmError};
use crate::models::message::Message;
use crate::review::record::{ExtractionFailure, ReviewRecord};
use crate::review::schema::{evaluate_resume_declaration, EVALUATE_RESUME_FUNCTION};

/// Builds the structured call: the raw resume text as the only user message,
/// plus the `evaluate_resume` declaration with automatic function selection.
pub fn structured_review_request(model: &str, resume_text: &str) -> CompletionRequest {
    CompletionRequest::with_functions(
        model,
        vec![Message::user(resume_text)],
        vec![evaluate_resume_declaration()],
    )
}

/// Turns a structured-call answer into a validated record.
pub fn parse_review(result: CompletionResult) -> Result<ReviewRecord, ExtractionFailure> {
    match result {
        CompletionResult::PlainText(_) => Err(ExtractionFailure::NoFunctionCall),
        CompletionResult::FunctionCall { name, .. } if name != EVALUATE_RESUME_FUNCTION => {
            Err(ExtractionFailure::UnexpectedFunction(name))
        }
        CompletionResult::FunctionCall { arguments, .. } => ReviewRecord::from_arguments(&arguments),
    }
}

/// Issues the structured call and validates its answer.
///
/// Transport and API errors propagate. Schema and parse failures are logged
/// and reported as `Ok(None)`; they are never retried.
pub async fn request_structured_review(
    llm: &dyn CompletionService,
    model: &str,
    resume_text: &str,
) -> Result<Option<ReviewRecord>, LlmError> {
    let request = structured_review_request(model, resume_text);
    let result = llm.complete(&request).await?;

    match parse_review(result) {
        Ok(record) => {
            info!(
                "Structured review extracted: fields={}, overall_score={:?}, review_text={}",
                record.keys().count(),
                record.overall_score(),
                record.review_text().is_some()
            );
            Ok(Some(record))
        }
        Err(failure) => {
            warn!("No structured review available: {failure}");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fake::{self, ScriptedCompletions};
    use crate::models::message::Role;
    use crate::review::record::tests::full_arguments;
    use serde_json::{json, Value};

    #[test]
    fn test_request_carries_resume_as_single_user_message() {
        let request = structured_review_request("gpt-3.5-turbo", "Jane Doe\nRust engineer\n");
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.messages[0].content, "Jane Doe\nRust engineer\n");
        assert_eq!(request.functions.len(), 1);
        assert_eq!(request.functions[0].name, "evaluate_resume");
    }

    #[test]
    fn test_plain_text_answer_is_schema_failure() {
        let err = parse_review(CompletionResult::PlainText("Looks good!".to_string())).unwrap_err();
        assert!(matches!(err, ExtractionFailure::NoFunctionCall));
    }

    #[test]
    fn test_other_function_name_is_schema_failure() {
        let err = parse_review(CompletionResult::FunctionCall {
            name: "something_else".to_string(),
            arguments: Value::Object(full_arguments()).to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ExtractionFailure::UnexpectedFunction(_)));
    }

    #[tokio::test]
    async fn test_valid_call_returns_record_with_review_text_last() {
        let mut fields = serde_json::Map::new();
        fields.insert("review_text".to_string(), json!("Solid experience."));
        fields.extend(full_arguments());
        let llm = ScriptedCompletions::new(vec![fake::function_call(
            &Value::Object(fields).to_string(),
        )]);

        let record = request_structured_review(&llm, "m", "resume")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.keys().last(), Some("review_text"));
        assert_eq!(record.keys().count(), 21);
    }

    #[tokio::test]
    async fn test_missing_function_call_yields_none_even_for_empty_input() {
        let llm = ScriptedCompletions::new(vec![fake::text("I cannot help with that.")]);
        let result = request_structured_review(&llm, "m", "").await.unwrap();
        assert!(result.is_none());
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_arguments_yield_none() {
        let llm = ScriptedCompletions::new(vec![fake::function_call("{not json")]);
        let result = request_structured_review(&llm, "m", "resume").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let llm = ScriptedCompletions::new(vec![fake::api_error(401, "Incorrect API key")]);
        let err = request_structured_review(&llm, "m", "resume").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 401, .. }));
    }
}
