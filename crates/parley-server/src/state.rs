use std::sync::Arc;

use parley_core::access::AccessState;
use parley_core::config::{Config, IdentityBackend, IdentityConfig};
use parley_core::types::ConversationState;
use parley_identity::{
    IdentityError, IdentityProvider, MemoryIdentityProvider, RestIdentityProvider,
};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::sessions::SessionRegistry;

/// A change pushed to every `/api/events` subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseMessage {
    SessionStarted {
        session_id: Uuid,
        scenario_id: String,
    },
    /// Entries were appended to a transcript.
    TranscriptUpdated {
        session_id: Uuid,
        state: ConversationState,
        entries: usize,
    },
    SessionEnded {
        session_id: Uuid,
    },
    AuthChanged {
        signed_in: bool,
    },
}

impl SseMessage {
    /// SSE `event:` field for this message.
    pub fn event_name(&self) -> &'static str {
        match self {
            SseMessage::SessionStarted { .. } => "session_started",
            SseMessage::TranscriptUpdated { .. } => "transcript_updated",
            SseMessage::SessionEnded { .. } => "session_ended",
            SseMessage::AuthChanged { .. } => "auth_changed",
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: SessionRegistry,
    pub auth: AuthContext,
    pub event_tx: broadcast::Sender<SseMessage>,
}

impl AppState {
    pub fn new(config: Config, identity: Arc<dyn IdentityProvider>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let sessions = SessionRegistry::new(
            config.conversation.reply_delay(),
            config.conversation.idle_ttl(),
            event_tx.clone(),
        );
        let auth = AuthContext::start(identity.clone(), event_tx.clone());
        Self {
            config: Arc::new(config),
            identity,
            sessions,
            auth,
            event_tx,
        }
    }

    /// Entitlement applied to every scenario selection.
    pub fn access(&self) -> AccessState {
        self.config.access.state()
    }
}

const MISSING_URL: &str = "identity.url is required for the rest provider";

/// Build the identity provider named in the `identity` config section.
pub fn identity_from_config(
    config: &IdentityConfig,
) -> Result<Arc<dyn IdentityProvider>, IdentityError> {
    match config.provider {
        IdentityBackend::Memory => Ok(Arc::new(MemoryIdentityProvider::new())),
        IdentityBackend::Rest => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| IdentityError::NotConfigured(MISSING_URL.into()))?;
            let key = config.api_key();
            if key.is_none() {
                tracing::warn!(env = %config.api_key_env, "identity api key not set");
            }
            Ok(Arc::new(RestIdentityProvider::new(url, key)?))
        }
    }
}
