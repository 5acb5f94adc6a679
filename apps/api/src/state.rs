use std::sync::Arc;

use crate::llm_client::CompletionService;
use crate::session::store::SessionStore;
use crate::session::ModelSelection;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Completion backend. Production: `OpenAiClient`.
    pub llm: Arc<dyn CompletionService>,
    pub models: ModelSelection,
}
