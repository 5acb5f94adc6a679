//! Axum route handlers for the Session API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::document::ResumeDocument;
use crate::errors::AppError;
use crate::models::message::Message;
use crate::session::store::{SessionHandle, SessionStore};
use crate::session::{SessionView, TurnOutcome, TurnPhase};
use crate::state::AppState;

/// Multipart field carrying the PDF.
const RESUME_FIELD: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnResponse {
    Reply { message: Message, phase: TurnPhase },
    Error { error: String, phase: TurnPhase },
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let handle = state.sessions.create().await;
    let view = handle.lock().await.view();
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;
    let view = handle.lock().await.view();
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/resume
///
/// Accepts a multipart upload with a single `resume` PDF field, extracts its
/// text and attaches it to the session, replacing any earlier resume.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;

    let mut upload: Option<(String, Option<String>, Bytes)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("resume.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        upload = Some((filename, content_type, data));
    }

    let (filename, content_type, data) = upload
        .ok_or_else(|| AppError::Validation(format!("Missing '{RESUME_FIELD}' file field")))?;

    // pdf-extract is CPU-bound; keep it off the async workers.
    let document = tokio::task::spawn_blocking(move || {
        ResumeDocument::from_pdf(&filename, content_type.as_deref(), &data)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))??;

    let view = attach_to_live_session(&state.sessions, id, &handle, document).await?;
    Ok(Json(view))
}

/// Attaches `document` unless the session was deleted or evicted while the
/// PDF was being extracted.
async fn attach_to_live_session(
    sessions: &SessionStore,
    id: Uuid,
    handle: &SessionHandle,
    document: ResumeDocument,
) -> Result<SessionView, AppError> {
    let mut session = handle.lock().await;
    if !sessions.holds(id, handle).await {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    if let Some(previous) = session.document() {
        info!(
            "Session {}: replacing '{}' with '{}'",
            session.id(),
            previous.filename(),
            document.filename()
        );
    }
    session.attach_document(document);
    Ok(session.view())
}

/// POST /api/v1/sessions/:id/messages
///
/// Runs one user turn. A failed turn is still a 200: the error is part of the
/// conversation, shown to the user in place of an assistant reply.
pub async fn handle_post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;

    let outcome = session
        .handle_turn(state.llm.as_ref(), &state.models, &request.content)
        .await;
    let phase = session.phase();

    let response = match outcome {
        TurnOutcome::Reply(_) => {
            let message = session
                .transcript()
                .last()
                .cloned()
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("reply missing from transcript")))?;
            TurnResponse::Reply { message, phase }
        }
        TurnOutcome::Error(error) => TurnResponse::Error { error, phase },
    };

    Ok(Json(response))
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}
