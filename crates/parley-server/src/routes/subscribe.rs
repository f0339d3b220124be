use axum::{http::StatusCode, Json};

/// Payments are not wired up yet; checkout only acknowledges the request.
pub const CHECKOUT_MESSAGE: &str =
    "Checkout is not available yet. We'll let you know when Premium launches.";

/// POST /api/subscribe/checkout
pub async fn checkout() -> (StatusCode, Json<serde_json::Value>) {
    tracing::info!("checkout requested");
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "status": "pending",
            "message": CHECKOUT_MESSAGE,
        })),
    )
}
