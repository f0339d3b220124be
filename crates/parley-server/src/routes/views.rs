//! HTML shell: navigation views and the form posts behind them.

use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use parley_core::access::{ensure_selectable, UPGRADE_PROMPT};
use parley_core::account::{LoginForm, MagicLinkForm, RegisterForm};
use parley_core::error::ParleyError;
use parley_core::presentation::Notice;
use parley_core::scenario::find_scenario;
use parley_core::view::View;
use serde::Deserialize;
use tracing::debug;

use crate::account::{self, AccountAction, AccountOutcome};
use crate::auth::AuthSnapshot;
use crate::error::AppError;
use crate::html;
use crate::routes::sessions::session_id;
use crate::routes::subscribe::CHECKOUT_MESSAGE;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

async fn render_view(
    app: &AppState,
    view: View,
    path: &str,
    notices: &[Notice],
    status: StatusCode,
) -> Response {
    let auth = app.auth.snapshot().await;
    render_view_as(app, &auth, view, path, notices, status)
}

fn render_view_as(
    app: &AppState,
    auth: &AuthSnapshot,
    view: View,
    path: &str,
    notices: &[Notice],
    status: StatusCode,
) -> Response {
    let body = html::view_body(view, app.access(), path);
    (status, Html(html::layout(view.title(), auth, notices, &body))).into_response()
}

async fn not_found(app: &AppState, path: &str) -> Response {
    render_view(app, View::NotFound, path, &[], StatusCode::NOT_FOUND).await
}

/// Show the view a failed form came from, with the error's own message
/// (the provider's wording for auth failures) as a notice.
async fn form_failure(
    app: &AppState,
    view: View,
    action: AccountAction,
    err: anyhow::Error,
) -> Response {
    let notice = Notice::new(action.failure_title(), err.to_string());
    let status = AppError(err).status();
    debug!(%status, %view, "form rejected");
    render_view(app, view, view.path().unwrap_or("/"), &[notice], status).await
}

// ---------------------------------------------------------------------------
// Navigation views
// ---------------------------------------------------------------------------

/// GET for every fixed view, and the fallback for anything unrouted.
pub async fn page(State(app): State<AppState>, uri: Uri) -> Response {
    let view = View::resolve(uri.path());
    let status = if view == View::NotFound {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    render_view(&app, view, uri.path(), &[], status).await
}

// ---------------------------------------------------------------------------
// Scenario selection and practice
// ---------------------------------------------------------------------------

/// POST /scenarios/:id: open a conversation, or send trial users to upgrade
pub async fn select_scenario(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(scenario) = find_scenario(&id) else {
        return not_found(&app, &format!("/scenarios/{id}")).await;
    };
    if ensure_selectable(scenario, app.access()).is_err() {
        let notice = Notice::new("Premium scenario", UPGRADE_PROMPT);
        return render_view(
            &app,
            View::Subscribe,
            "/subscribe",
            &[notice],
            StatusCode::PAYMENT_REQUIRED,
        )
        .await;
    }
    let session = app.sessions.start(scenario).await;
    Redirect::to(&format!("/sessions/{}", session.id)).into_response()
}

/// GET /sessions/:id: the practice screen
pub async fn session_page(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    let path = format!("/sessions/{id}");
    let snapshot = match session_id(&id) {
        Ok(uuid) => app.sessions.snapshot(uuid).await,
        Err(e) => Err(e),
    };
    match snapshot {
        Ok(session) => {
            let auth = app.auth.snapshot().await;
            let body = html::conversation(&session);
            Html(html::layout("Practice", &auth, &[], &body)).into_response()
        }
        Err(_) => not_found(&app, &path).await,
    }
}

#[derive(Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub text: String,
}

/// POST /sessions/:id/messages: submit, then back to the practice screen
///
/// Blank text and submissions while a reply is pending change nothing.
pub async fn post_message(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Response {
    let path = format!("/sessions/{id}");
    let Ok(uuid) = session_id(&id) else {
        return not_found(&app, &path).await;
    };
    match app.sessions.submit(uuid, &form.text).await {
        Ok(_) | Err(ParleyError::EmptyInput) | Err(ParleyError::InvalidState { .. }) => {
            Redirect::to(&path).into_response()
        }
        Err(_) => not_found(&app, &path).await,
    }
}

/// POST /sessions/:id/end: discard the conversation and return to the catalog
pub async fn end_session(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    if let Ok(uuid) = session_id(&id) {
        // Ending an unknown session still lands on the catalog.
        let _ = app.sessions.end(uuid).await;
    }
    Redirect::to("/").into_response()
}

// ---------------------------------------------------------------------------
// Account forms
// ---------------------------------------------------------------------------

fn home_after(app: &AppState, auth: &AuthSnapshot, outcome: &AccountOutcome) -> Response {
    render_view_as(app, auth, View::Home, "/", &outcome.notices, StatusCode::OK)
}

/// POST /login
///
/// Renders the new user right away; the auth listener fills in their profile.
pub async fn login_submit(State(app): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match account::login(&*app.identity, &form).await {
        Ok(outcome) => {
            let auth = app.auth.snapshot().await.switch_user(outcome.user.clone());
            home_after(&app, &auth, &outcome)
        }
        Err(e) => form_failure(&app, View::Login, AccountAction::Login, e).await,
    }
}

/// POST /register
pub async fn register_submit(
    State(app): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    match account::register(&*app.identity, &form).await {
        Ok(outcome) => home_after(&app, &app.auth.snapshot().await, &outcome),
        Err(e) => form_failure(&app, View::Register, AccountAction::Register, e).await,
    }
}

/// POST /magic-link
pub async fn magic_link_submit(
    State(app): State<AppState>,
    Form(form): Form<MagicLinkForm>,
) -> Response {
    let outcome = match account::magic_link(&*app.identity, &form).await {
        Ok(outcome) => outcome,
        Err(e) => return form_failure(&app, View::MagicLink, AccountAction::MagicLink, e).await,
    };
    let view = View::MagicLink;
    render_view(&app, view, "/magic-link", &outcome.notices, StatusCode::OK).await
}

/// POST /logout
pub async fn logout_submit(State(app): State<AppState>) -> Response {
    match account::logout(&*app.identity).await {
        Ok(outcome) => home_after(&app, &AuthSnapshot::default(), &outcome),
        Err(e) => form_failure(&app, View::Home, AccountAction::Logout, e).await,
    }
}

/// POST /subscribe: checkout placeholder
pub async fn subscribe_submit(State(app): State<AppState>) -> Response {
    let notice = Notice::new("Thanks for your interest", CHECKOUT_MESSAGE);
    render_view(
        &app,
        View::Subscribe,
        "/subscribe",
        &[notice],
        StatusCode::OK,
    )
    .await
}
