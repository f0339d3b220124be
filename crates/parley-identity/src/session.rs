use tokio::sync::{broadcast, RwLock};

use crate::types::{AuthEvent, AuthSession, SessionChange};

// ─── SessionCell ──────────────────────────────────────────────────────────

/// Holds the provider's current session and fans out change notifications.
///
/// Every provider owns one `SessionCell`. Writes go through [`set`] or
/// [`clear`], which swap the stored session and then broadcast a
/// [`SessionChange`] to all live subscribers. Subscribers that fall behind
/// the channel capacity miss intermediate changes but always see the latest
/// one they have not lagged past.
///
/// [`set`]: SessionCell::set
/// [`clear`]: SessionCell::clear
pub struct SessionCell {
    current: RwLock<Option<AuthSession>>,
    changes: broadcast::Sender<SessionChange>,
}

impl SessionCell {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(32);
        SessionCell {
            current: RwLock::new(None),
            changes,
        }
    }

    /// Return a clone of the current session, if signed in.
    pub async fn get(&self) -> Option<AuthSession> {
        self.current.read().await.clone()
    }

    /// Replace the current session and notify subscribers with `event`.
    pub async fn set(&self, session: AuthSession, event: AuthEvent) {
        *self.current.write().await = Some(session.clone());
        self.notify(event, Some(session));
    }

    /// Drop the current session. Notifies only if there was one.
    pub async fn clear(&self) -> Option<AuthSession> {
        let previous = self.current.write().await.take();
        if previous.is_some() {
            self.notify(AuthEvent::SignedOut, None);
        }
        previous
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    fn notify(&self, event: AuthEvent, session: Option<AuthSession>) {
        // No receivers is fine; nobody is listening yet.
        let _ = self.changes.send(SessionChange { event, session });
    }
}

impl Default for SessionCell {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::User;

    fn session(token: &str) -> AuthSession {
        AuthSession {
            access_token: token.into(),
            refresh_token: None,
            expires_at: None,
            user: User {
                id: "u1".into(),
                email: "a@b.io".into(),
                display_name: None,
                phone: None,
                created_at: None,
            },
        }
    }

    #[tokio::test]
    async fn get_returns_none_initially() {
        let cell = SessionCell::new();
        assert_eq!(cell.get().await, None);
    }

    #[tokio::test]
    async fn set_stores_and_notifies() {
        let cell = SessionCell::new();
        let mut rx = cell.subscribe();
        cell.set(session("t1"), AuthEvent::SignedIn).await;

        assert_eq!(cell.get().await.unwrap().access_token, "t1");
        let change = rx.recv().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedIn);
        assert_eq!(change.session.unwrap().access_token, "t1");
    }

    #[tokio::test]
    async fn clear_notifies_signed_out() {
        let cell = SessionCell::new();
        cell.set(session("t1"), AuthEvent::SignedIn).await;
        let mut rx = cell.subscribe();

        assert!(cell.clear().await.is_some());
        let change = rx.recv().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedOut);
        assert!(change.session.is_none());
        assert_eq!(cell.get().await, None);
    }

    #[tokio::test]
    async fn clear_without_session_is_silent() {
        let cell = SessionCell::new();
        let mut rx = cell.subscribe();
        assert!(cell.clear().await.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_without_subscribers_does_not_fail() {
        let cell = SessionCell::new();
        cell.set(session("t1"), AuthEvent::TokenRefreshed).await;
        assert!(cell.get().await.is_some());
    }
}
