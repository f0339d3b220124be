use axum::{extract::State, Json};
use parley_core::account::{LoginForm, MagicLinkForm, RegisterForm};

use crate::account::{self, AccountOutcome};
use crate::auth::AuthSnapshot;
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(app): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<Json<AccountOutcome>, AppError> {
    Ok(Json(account::register(&*app.identity, &form).await?))
}

/// POST /api/auth/login
pub async fn login(
    State(app): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<AccountOutcome>, AppError> {
    Ok(Json(account::login(&*app.identity, &form).await?))
}

/// POST /api/auth/magic-link
pub async fn magic_link(
    State(app): State<AppState>,
    Json(form): Json<MagicLinkForm>,
) -> Result<Json<AccountOutcome>, AppError> {
    Ok(Json(account::magic_link(&*app.identity, &form).await?))
}

/// POST /api/auth/logout
pub async fn logout(State(app): State<AppState>) -> Result<Json<AccountOutcome>, AppError> {
    Ok(Json(account::logout(&*app.identity).await?))
}

/// POST /api/auth/refresh: rotate the current access token
///
/// Answers with the signed-in user and the new expiry, never the tokens.
pub async fn refresh(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let session = app.identity.refresh_session().await?;
    Ok(Json(serde_json::json!({
        "user": session.user,
        "expires_at": session.expires_at,
    })))
}

/// GET /api/auth/session: who is signed in, with their profile
pub async fn get_session(State(app): State<AppState>) -> Json<AuthSnapshot> {
    Json(app.auth.snapshot().await)
}
