use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley_core::error::ParleyError;
use parley_identity::IdentityError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        if let Some(e) = self.0.downcast_ref::<ParleyError>() {
            return match e {
                ParleyError::ScenarioNotFound(_) | ParleyError::SessionNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                ParleyError::PremiumRequired(_) => StatusCode::PAYMENT_REQUIRED,
                ParleyError::InvalidState { .. } => StatusCode::CONFLICT,
                ParleyError::EmptyInput => StatusCode::UNPROCESSABLE_ENTITY,
                ParleyError::InvalidEmail(_) | ParleyError::NotInitialized => {
                    StatusCode::BAD_REQUEST
                }
                ParleyError::Io(_) | ParleyError::Yaml(_) | ParleyError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
        }
        if let Some(e) = self.0.downcast_ref::<IdentityError>() {
            return match e {
                IdentityError::Auth(_) => StatusCode::UNAUTHORIZED,
                IdentityError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
                IdentityError::ProfileWrite(_)
                | IdentityError::Http(_)
                | IdentityError::Decode { .. } => StatusCode::BAD_GATEWAY,
                IdentityError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            };
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }

        let mut body = serde_json::json!({ "error": self.0.to_string() });
        if matches!(
            self.0.downcast_ref::<ParleyError>(),
            Some(ParleyError::PremiumRequired(_))
        ) {
            body["upgrade"] = serde_json::json!({
                "message": parley_core::access::UPGRADE_PROMPT,
                "href": "/subscribe",
            });
        }
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    fn status_of(err: impl Into<anyhow::Error>) -> StatusCode {
        AppError(err.into()).into_response().status()
    }

    #[test]
    fn scenario_not_found_maps_to_404() {
        assert_eq!(
            status_of(ParleyError::ScenarioNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn session_not_found_maps_to_404() {
        assert_eq!(
            status_of(ParleyError::SessionNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn premium_required_maps_to_402() {
        assert_eq!(
            status_of(ParleyError::PremiumRequired("sales".into())),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn invalid_state_maps_to_409() {
        let err = ParleyError::InvalidState {
            state: "processing_response".into(),
            operation: "submit",
        };
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn empty_input_maps_to_422() {
        assert_eq!(
            status_of(ParleyError::EmptyInput),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn invalid_email_maps_to_400() {
        assert_eq!(
            status_of(ParleyError::InvalidEmail("nope".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_initialized_maps_to_400() {
        assert_eq!(
            status_of(ParleyError::NotInitialized),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn io_error_maps_to_500() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(
            status_of(ParleyError::Io(io)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_error_maps_to_401() {
        assert_eq!(
            status_of(IdentityError::Auth("Invalid login credentials".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn profile_write_maps_to_502() {
        assert_eq!(
            status_of(IdentityError::ProfileWrite("rejected".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn profile_not_found_maps_to_404() {
        assert_eq!(
            status_of(IdentityError::ProfileNotFound("u1".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn not_configured_maps_to_503() {
        assert_eq!(
            status_of(IdentityError::NotConfigured("url".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn unknown_error_maps_to_500() {
        assert_eq!(
            status_of(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn premium_body_carries_upgrade_prompt() {
        let err = ParleyError::PremiumRequired("sales".into());
        let response = AppError(err.into()).into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["error"],
            "scenario 'sales' requires a premium subscription"
        );
        assert_eq!(
            json["upgrade"]["message"],
            parley_core::access::UPGRADE_PROMPT
        );
        assert_eq!(json["upgrade"]["href"], "/subscribe");
    }

    #[tokio::test]
    async fn auth_message_is_passed_through() {
        let err = IdentityError::Auth("User already registered".into());
        let response = AppError(err.into()).into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "User already registered");
    }
}
