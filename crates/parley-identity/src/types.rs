use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Users and sessions ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

/// Extra attributes recorded on the account at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpAttributes {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub phone: String,
}

/// Result of a sign-up. `user` is absent when the provider defers account
/// creation (for example until the address is confirmed); `session` is only
/// present when the provider signs the user in straight away.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpOutcome {
    pub user: Option<User>,
    pub session: Option<AuthSession>,
}

// ─── Session change notifications ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Pushed to every subscriber whenever the current session changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionChange {
    pub event: AuthEvent,
    pub session: Option<AuthSession>,
}

// ─── Profiles ─────────────────────────────────────────────────────────────

/// Row of the hosted `profiles` table, keyed by user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(rename = "isPremium", default)]
    pub is_premium: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    #[serde(rename = "isPremium")]
    pub is_premium: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_uses_camel_case_premium_column() {
        let p: Profile = serde_json::from_str(r#"{"id":"u1","isPremium":true}"#).unwrap();
        assert!(p.is_premium);
        let json = serde_json::to_value(NewProfile { is_premium: false }).unwrap();
        assert_eq!(json, serde_json::json!({ "isPremium": false }));
    }

    #[test]
    fn session_change_serializes_event_snake_case() {
        let change = SessionChange {
            event: AuthEvent::TokenRefreshed,
            session: None,
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["event"], "token_refreshed");
        assert!(json["session"].is_null());
    }
}
