use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Rejected by the provider (bad credentials, duplicate account, ...).
    /// The message is the provider's own and is shown to the user as-is.
    #[error("{0}")]
    Auth(String),

    #[error("profile write failed: {0}")]
    ProfileWrite(String),

    #[error("profile not found for user: {0}")]
    ProfileNotFound(String),

    #[error("identity provider not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode provider response: {source}\n  body: {body}")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },
}
