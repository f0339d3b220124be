use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::provider::IdentityProvider;
use crate::session::SessionCell;
use crate::types::{
    AuthEvent, AuthSession, NewProfile, Profile, SessionChange, SignUpAttributes, SignUpOutcome,
    User,
};
use crate::{IdentityError, Result};

const MIN_PASSWORD_LEN: usize = 6;

// ─── MemoryIdentityProvider ───────────────────────────────────────────────

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct Store {
    accounts: HashMap<String, Account>,
    profiles: HashMap<String, Profile>,
    magic_links: Vec<String>,
}

/// In-process identity provider for local use and tests.
///
/// Accounts, profiles and the current session disappear when the process
/// exits. Sign-up does not sign the user in, matching a provider that
/// requires address confirmation.
pub struct MemoryIdentityProvider {
    store: Mutex<Store>,
    session: SessionCell,
    fail_profile_writes: bool,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        MemoryIdentityProvider {
            store: Mutex::new(Store::default()),
            session: SessionCell::new(),
            fail_profile_writes: false,
        }
    }

    /// Make every `insert_profile` call fail, to exercise the path where an
    /// account exists but its profile row does not.
    pub fn with_failing_profile_writes(mut self) -> Self {
        self.fail_profile_writes = true;
        self
    }

    /// Addresses that requested a magic link, oldest first.
    pub async fn magic_links_sent(&self) -> Vec<String> {
        self.store.lock().await.magic_links.clone()
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn new_token() -> String {
    format!("mem-{}", uuid::Uuid::new_v4().simple())
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: SignUpAttributes,
    ) -> Result<SignUpOutcome> {
        let email = email.trim().to_lowercase();
        if password.len() < MIN_PASSWORD_LEN {
            return Err(IdentityError::Auth(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let mut store = self.store.lock().await;
        if store.accounts.contains_key(&email) {
            return Err(IdentityError::Auth("User already registered".into()));
        }
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
            display_name: non_empty(attributes.display_name),
            phone: non_empty(attributes.phone),
            created_at: Some(Utc::now()),
        };
        store.accounts.insert(
            email,
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        info!(user_id = %user.id, "memory identity: account created");
        Ok(SignUpOutcome {
            user: Some(user),
            session: None,
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let email = email.trim().to_lowercase();
        let user = {
            let store = self.store.lock().await;
            match store.accounts.get(&email) {
                Some(acct) if acct.password == password => acct.user.clone(),
                _ => return Err(IdentityError::Auth("Invalid login credentials".into())),
            }
        };
        let session = AuthSession {
            access_token: new_token(),
            refresh_token: Some(new_token()),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
            user,
        };
        self.session.set(session.clone(), AuthEvent::SignedIn).await;
        Ok(session)
    }

    async fn sign_in_with_otp(&self, email: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        info!(email = %email, "memory identity: magic link requested");
        self.store.lock().await.magic_links.push(email);
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.session.clear().await;
        Ok(())
    }

    async fn current_session(&self) -> Option<AuthSession> {
        self.session.get().await
    }

    /// Rotates the access token of the current session in place.
    async fn refresh_session(&self) -> Result<AuthSession> {
        let Some(mut session) = self.session.get().await else {
            return Err(IdentityError::Auth("no active session".into()));
        };
        session.access_token = new_token();
        self.session
            .set(session.clone(), AuthEvent::TokenRefreshed)
            .await;
        Ok(session)
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.session.subscribe()
    }

    async fn insert_profile(&self, user_id: &str, profile: NewProfile) -> Result<()> {
        if self.fail_profile_writes {
            return Err(IdentityError::ProfileWrite(
                "profiles table rejected the insert".into(),
            ));
        }
        let mut store = self.store.lock().await;
        if store.profiles.contains_key(user_id) {
            return Err(IdentityError::ProfileWrite(format!(
                "duplicate key value violates unique constraint (id={user_id})"
            )));
        }
        store.profiles.insert(
            user_id.to_string(),
            Profile {
                id: user_id.to_string(),
                is_premium: profile.is_premium,
            },
        );
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        self.store
            .lock()
            .await
            .profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| IdentityError::ProfileNotFound(user_id.to_string()))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
