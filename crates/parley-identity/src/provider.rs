use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::types::{
    AuthSession, NewProfile, Profile, SessionChange, SignUpAttributes, SignUpOutcome,
};
use crate::Result;

/// The hosted identity service as seen by the rest of the application.
///
/// Implementations keep exactly one "current session", the way a client-side
/// SDK does, and push a [`SessionChange`] to every subscriber when it changes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: SignUpAttributes,
    ) -> Result<SignUpOutcome>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Send a one-time sign-in link to `email`.
    async fn sign_in_with_otp(&self, email: &str) -> Result<()>;

    /// End the current session. Always succeeds locally.
    async fn sign_out(&self) -> Result<()>;

    async fn current_session(&self) -> Option<AuthSession>;

    /// Exchange the current session's refresh token for a new access token.
    /// Subscribers see [`AuthEvent::TokenRefreshed`](crate::types::AuthEvent).
    async fn refresh_session(&self) -> Result<AuthSession>;

    /// Receive session changes from now on. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;

    async fn insert_profile(&self, user_id: &str, profile: NewProfile) -> Result<()>;

    async fn get_profile(&self, user_id: &str) -> Result<Profile>;
}
