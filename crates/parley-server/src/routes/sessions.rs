use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use parley_core::access::ensure_selectable;
use parley_core::error::ParleyError;
use parley_core::scenario::find_scenario;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Parse a session id from the path. Malformed ids cannot name a session.
pub(crate) fn session_id(raw: &str) -> Result<Uuid, ParleyError> {
    Uuid::parse_str(raw).map_err(|_| ParleyError::SessionNotFound(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct StartBody {
    pub scenario_id: String,
}

/// POST /api/sessions: select a scenario and open a conversation
pub async fn start_session(
    State(app): State<AppState>,
    Json(body): Json<StartBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let scenario = find_scenario(&body.scenario_id)?;
    ensure_selectable(scenario, app.access())?;
    let session = app.sessions.start(scenario).await;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(session)?)))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/sessions/:id: transcript and state
pub async fn get_session(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = app.sessions.snapshot(session_id(&id)?).await?;
    Ok(Json(serde_json::to_value(session)?))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct MessageBody {
    pub text: String,
}

/// POST /api/sessions/:id/messages: submit the user's response
///
/// Blank text is ignored: `{"accepted": false}` and nothing changes.
pub async fn post_message(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MessageBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    match app.sessions.submit(session_id(&id)?, &body.text).await {
        Ok(session) => Ok(Json(serde_json::json!({
            "accepted": true,
            "session": session,
        }))),
        Err(ParleyError::EmptyInput) => Ok(Json(serde_json::json!({ "accepted": false }))),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// End
// ---------------------------------------------------------------------------

/// DELETE /api/sessions/:id: end the conversation and discard its transcript
pub async fn end_session(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.sessions.end(session_id(&id)?).await?;
    Ok(Json(serde_json::json!({ "ended": true })))
}
