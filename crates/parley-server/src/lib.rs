pub mod account;
pub mod auth;
pub mod error;
pub mod html;
pub mod routes;
pub mod sessions;
pub mod state;

use axum::routing::{delete, get, post};
use axum::Router;
use parley_core::config::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum Router with the HTML shell, JSON API and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Catalog
        .route("/api/scenarios", get(routes::scenarios::list_scenarios))
        .route("/api/scenarios/{id}", get(routes::scenarios::get_scenario))
        .route("/api/access", get(routes::scenarios::get_access))
        // Conversations
        .route("/api/sessions", post(routes::sessions::start_session))
        .route("/api/sessions/{id}", get(routes::sessions::get_session))
        .route("/api/sessions/{id}", delete(routes::sessions::end_session))
        .route(
            "/api/sessions/{id}/messages",
            post(routes::sessions::post_message),
        )
        // Accounts
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/magic-link", post(routes::auth::magic_link))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/refresh", post(routes::auth::refresh))
        .route("/api/auth/session", get(routes::auth::get_session))
        // Subscription
        .route("/api/subscribe/checkout", post(routes::subscribe::checkout))
        // HTML shell
        .route("/", get(routes::views::page))
        .route(
            "/subscribe",
            get(routes::views::page).post(routes::views::subscribe_submit),
        )
        .route(
            "/login",
            get(routes::views::page).post(routes::views::login_submit),
        )
        .route(
            "/register",
            get(routes::views::page).post(routes::views::register_submit),
        )
        .route(
            "/magic-link",
            get(routes::views::page).post(routes::views::magic_link_submit),
        )
        .route("/logout", post(routes::views::logout_submit))
        .route("/scenarios/{id}", post(routes::views::select_scenario))
        .route("/sessions/{id}", get(routes::views::session_page))
        .route("/sessions/{id}/messages", post(routes::views::post_message))
        .route("/sessions/{id}/end", post(routes::views::end_session))
        .fallback(routes::views::page)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the Parley web shell on the host and port from `config`.
pub async fn serve(config: Config, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(config, listener, open_browser).await
}

/// Start the Parley web shell on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port). Runs until Ctrl-C, then stops the auth listener.
pub async fn serve_on(
    config: Config,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let identity = state::identity_from_config(&config.identity)?;
    let app_state = AppState::new(config, identity);
    let auth = app_state.auth.clone();
    let app = build_router(app_state);

    tracing::info!("Parley listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    auth.shutdown();
    Ok(())
}
