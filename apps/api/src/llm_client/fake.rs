//! Scripted `CompletionService` for tests. Answers are served in order and
//! every request is recorded for inspection.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{CompletionRequest, CompletionResult, CompletionService, LlmError};

#[derive(Default)]
pub struct ScriptedCompletions {
    answers: Mutex<VecDeque<Result<CompletionResult, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletions {
    pub fn new(answers: Vec<Result<CompletionResult, LlmError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

pub fn text(content: &str) -> Result<CompletionResult, LlmError> {
    Ok(CompletionResult::PlainText(content.to_string()))
}

pub fn function_call(arguments: &str) -> Result<CompletionResult, LlmError> {
    Ok(CompletionResult::FunctionCall {
        name: "evaluate_resume".to_string(),
        arguments: arguments.to_string(),
    })
}

pub fn api_error(status: u16, message: &str) -> Result<CompletionResult, LlmError> {
    Err(LlmError::Api {
        status,
        message: message.to_string(),
    })
}

#[async_trait]
impl CompletionService for ScriptedCompletions {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted answer for request #{}", self.call_count()))
    }
}
