//! Account form payloads and their validation.
//!
//! The identity provider has the final say on credentials; this module only
//! rejects input that is obviously malformed before a network call is made.

use crate::error::{ParleyError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

pub fn validate_email(email: &str) -> Result<()> {
    if email.len() > 254 || !email_re().is_match(email) {
        return Err(ParleyError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicLinkForm {
    pub email: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<()> {
        validate_email(self.email.trim())
    }
}

impl RegisterForm {
    pub fn validate(&self) -> Result<()> {
        validate_email(self.email.trim())
    }
}

impl MagicLinkForm {
    pub fn validate(&self) -> Result<()> {
        validate_email(self.email.trim())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
