//! LLM Client — the single point of entry for all completion API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
//! Callers depend on the `CompletionService` trait; `OpenAiClient` is the
//! production implementation.
//!
//! Responses are decoded once, here, into a `CompletionResult`. Nothing past
//! this boundary inspects raw response fields.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::message::{Message, Role};

pub mod prompts;

#[cfg(test)]
pub mod fake;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A callable function the model may decide to invoke.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
}

/// One completion call, independent of the wire format.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Empty for narrative and plain chat calls. When non-empty the request
    /// carries `function_call: "auto"`.
    pub functions: Vec<FunctionDeclaration>,
}

impl CompletionRequest {
    pub fn plain(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            functions: Vec::new(),
        }
    }

    pub fn with_functions(
        model: impl Into<String>,
        messages: Vec<Message>,
        functions: Vec<FunctionDeclaration>,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            functions,
        }
    }
}

/// What the service answered with.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResult {
    /// The model chose to invoke a declared function. `arguments` is the
    /// JSON-encoded argument object, still undecoded.
    FunctionCall { name: String, arguments: String },
    PlainText(String),
}

impl CompletionResult {
    /// Returns the non-empty text of a plain answer.
    pub fn into_text(self) -> Result<String, LlmError> {
        match self {
            CompletionResult::PlainText(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LlmError::EmptyContent),
        }
    }
}

/// The completion backend. Carried in `AppState` as `Arc<dyn CompletionService>`.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI Chat Completions wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<&'a [FunctionDeclaration]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    function_call: Option<WireFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            functions: (!request.functions.is_empty()).then_some(request.functions.as_slice()),
            function_call: (!request.functions.is_empty()).then_some("auto"),
        }
    }
}

/// Decodes the first choice of a completion response into a `CompletionResult`.
fn decode_response(response: ChatCompletionResponse) -> Result<CompletionResult, LlmError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyContent)?
        .message;

    Ok(match message.function_call {
        Some(call) => CompletionResult::FunctionCall {
            name: call.name,
            arguments: call.arguments,
        },
        None => CompletionResult::PlainText(message.content.unwrap_or_default()),
    })
}

/// OpenAI Chat Completions client. No retries: every failure is terminal for
/// the turn that issued it. `timeout` bounds each whole request, so a stalled
/// provider cannot hold a session's lock indefinitely.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, LlmError> {
        let body = ChatCompletionRequest::from_request(request);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                request.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        decode_response(completion)
    }
}
