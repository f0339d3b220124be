use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParleyError {
    #[error("not initialized: run 'parley config init'")]
    NotInitialized,

    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("scenario '{0}' requires a premium subscription")]
    PremiumRequired(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("cannot {operation} while conversation is {state}")]
    InvalidState {
        state: String,
        operation: &'static str,
    },

    #[error("message is empty")]
    EmptyInput,

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ParleyError>;
