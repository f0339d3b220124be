use std::sync::{Arc, Mutex};

use parley_identity::{AuthSession, IdentityError, IdentityProvider, Profile, User};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::state::SseMessage;

/// Who is signed in, as last reported by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub profile: Option<Profile>,
}

impl AuthSnapshot {
    pub fn signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Snapshot for `user` signing in. The profile carries over only when it
    /// belongs to that same user.
    pub fn switch_user(&self, user: Option<User>) -> Self {
        let profile = match (&user, &self.profile) {
            (Some(u), Some(p)) if p.id == u.id => Some(p.clone()),
            _ => None,
        };
        Self { user, profile }
    }
}

/// Explicit auth state shared by every handler.
///
/// [`AuthContext::start`] subscribes to the provider before reading the
/// initial session, so no change can slip between the two. The listener task
/// replaces the snapshot on every notification and announces it on the SSE
/// channel. [`AuthContext::shutdown`] aborts the task, which drops the
/// receiver and unsubscribes.
#[derive(Clone)]
pub struct AuthContext {
    snapshot: Arc<RwLock<AuthSnapshot>>,
    listener: Arc<Mutex<Option<AbortHandle>>>,
}

impl AuthContext {
    pub fn start(
        identity: Arc<dyn IdentityProvider>,
        event_tx: broadcast::Sender<SseMessage>,
    ) -> Self {
        let ctx = Self {
            snapshot: Arc::new(RwLock::new(AuthSnapshot::default())),
            listener: Arc::new(Mutex::new(None)),
        };

        // Guard: only spawn if inside a Tokio runtime (skipped in sync unit tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            let mut changes = identity.subscribe();
            let snapshot = ctx.snapshot.clone();
            let handle = tokio::spawn(async move {
                let initial = identity.current_session().await;
                apply(&*identity, &snapshot, &event_tx, initial).await;
                loop {
                    match changes.recv().await {
                        Ok(change) => {
                            debug!(event = ?change.event, "session change");
                            apply(&*identity, &snapshot, &event_tx, change.session).await;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "auth listener lagged, re-reading session");
                            let current = identity.current_session().await;
                            apply(&*identity, &snapshot, &event_tx, current).await;
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });
            if let Ok(mut slot) = ctx.listener.lock() {
                *slot = Some(handle.abort_handle());
            }
        }

        ctx
    }

    pub async fn snapshot(&self) -> AuthSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Stop listening for session changes. Idempotent.
    pub fn shutdown(&self) {
        let handle = self.listener.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            handle.abort();
            info!("auth listener stopped");
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

async fn apply(
    identity: &dyn IdentityProvider,
    snapshot: &RwLock<AuthSnapshot>,
    event_tx: &broadcast::Sender<SseMessage>,
    session: Option<AuthSession>,
) {
    let next = resolve(identity, session).await;
    let signed_in = next.signed_in();
    *snapshot.write().await = next;
    let _ = event_tx.send(SseMessage::AuthChanged { signed_in });
}

async fn resolve(identity: &dyn IdentityProvider, session: Option<AuthSession>) -> AuthSnapshot {
    let Some(session) = session else {
        return AuthSnapshot::default();
    };
    let profile = match identity.get_profile(&session.user.id).await {
        Ok(profile) => Some(profile),
        Err(IdentityError::ProfileNotFound(_)) => None,
        Err(e) => {
            warn!(user_id = %session.user.id, error = %e, "profile lookup failed");
            None
        }
    };
    AuthSnapshot {
        user: Some(session.user),
        profile,
    }
}
