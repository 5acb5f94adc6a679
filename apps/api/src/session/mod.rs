//! Conversation sessions and the per-turn state machine.
//!
//! A session owns its transcript, the attached resume (if any) and its
//! `TurnPhase`. Every turn runs against `&mut Session`; there is no shared
//! conversational state outside the session itself.

pub mod handlers;
pub mod store;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::document::ResumeDocument;
use crate::llm_client::prompts::CHAT_PERSONA_SYSTEM;
use crate::llm_client::{CompletionRequest, CompletionService, LlmError};
use crate::models::message::Message;
use crate::review::prompts::EXTRACTION_FAILED_MESSAGE;
use crate::review::review_resume;

/// First assistant message of every session.
pub const GREETING: &str = "How can I help you?";

/// Whether the first document-bearing turn has been fully processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingFirstDocumentTurn,
    FollowUp,
}

/// Models used for the two kinds of turn.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    pub review: String,
    pub chat: String,
}

/// Result of one user turn as the user sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// An assistant message was appended to the transcript.
    Reply(String),
    /// The turn failed; nothing was appended after the user message.
    Error(String),
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    transcript: Vec<Message>,
    document: Option<ResumeDocument>,
    phase: TurnPhase,
    /// Monotonic time of the last upload or turn; drives idle eviction.
    last_activity: Instant,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            transcript: vec![Message::assistant(GREETING)],
            document: None,
            phase: TurnPhase::AwaitingFirstDocumentTurn,
            last_activity: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn document(&self) -> Option<&ResumeDocument> {
        self.document.as_ref()
    }

    /// Time since the last upload or turn.
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Replaces the attached resume and notes the attachment in the transcript.
    /// Does not change the phase.
    pub fn attach_document(&mut self, document: ResumeDocument) {
        info!(
            "Session {}: attached '{}' ({} chars)",
            self.id,
            document.filename(),
            document.text().len()
        );
        self.transcript
            .push(Message::system(document.attachment_marker()));
        self.document = Some(document);
        self.touch();
    }

    /// Handles one user message.
    ///
    /// With a document attached and the phase still
    /// `AwaitingFirstDocumentTurn`, runs the two-stage review; otherwise
    /// issues one plain chat call over the whole transcript. Failures are
    /// turned into a visible `TurnOutcome::Error` and never retried.
    pub async fn handle_turn(
        &mut self,
        llm: &dyn CompletionService,
        models: &ModelSelection,
        content: &str,
    ) -> TurnOutcome {
        self.touch();
        let mut user_content = content.to_string();
        if let Some(document) = &self.document {
            user_content.push_str("\n\n");
            user_content.push_str(&document.attachment_marker());
        }
        self.transcript.push(Message::user(user_content));

        let review_pending = self.phase == TurnPhase::AwaitingFirstDocumentTurn;
        let result = match &self.document {
            Some(document) if review_pending => {
                review_resume(llm, &models.review, document.text())
                    .await
                    .map(|review| review.ok_or(EXTRACTION_FAILED_MESSAGE))
            }
            _ => self.chat(llm, &models.chat).await.map(Ok),
        };

        match result {
            Ok(Ok(reply)) => {
                if self.document.is_some() && review_pending {
                    self.phase = TurnPhase::FollowUp;
                    info!("Session {}: review delivered, now in follow-up", self.id);
                }
                self.transcript.push(Message::assistant(reply.clone()));
                TurnOutcome::Reply(reply)
            }
            Ok(Err(message)) => TurnOutcome::Error(message.to_string()),
            Err(e) => {
                error!("Session {}: turn failed: {e}", self.id);
                TurnOutcome::Error(format!("Error generating response: {e}"))
            }
        }
    }

    /// Plain contextual chat: persona instruction followed by the full transcript.
    async fn chat(&self, llm: &dyn CompletionService, model: &str) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(self.transcript.len() + 1);
        messages.push(Message::system(CHAT_PERSONA_SYSTEM));
        messages.extend(self.transcript.iter().cloned());

        let request = CompletionRequest::plain(model, messages);
        llm.complete(&request).await?.into_text()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            created_at: self.created_at,
            phase: self.phase,
            document: self.document.as_ref().map(|d| AttachedDocument {
                filename: d.filename().to_string(),
                characters: d.text().chars().count(),
            }),
            messages: self.transcript.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachedDocument {
    pub filename: String,
    pub characters: usize,
}

/// Serializable snapshot of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub phase: TurnPhase,
    pub document: Option<AttachedDocument>,
    pub messages: Vec<Message>,
}
