//! Account flows shared by the HTML forms and the JSON API.

use parley_core::account::{LoginForm, MagicLinkForm, RegisterForm};
use parley_core::presentation::Notice;
use parley_identity::{IdentityError, IdentityProvider, NewProfile, SignUpAttributes, User};
use serde::Serialize;
use tracing::{info, warn};

/// Result of a successful account action.
#[derive(Debug, Clone, Serialize)]
pub struct AccountOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub notices: Vec<Notice>,
}

/// Which form a failure came from; picks the notice title shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    Register,
    Login,
    MagicLink,
    Logout,
}

impl AccountAction {
    pub fn failure_title(self) -> &'static str {
        match self {
            AccountAction::Register => "Registration failed",
            AccountAction::Login => "Login failed",
            AccountAction::MagicLink => "Magic link failed",
            AccountAction::Logout => "Sign out failed",
        }
    }
}

/// Create the account, then its profile row.
///
/// A profile write failure does not undo the sign-up: the account exists at
/// the provider either way, so the user is told both things.
pub async fn register(
    identity: &dyn IdentityProvider,
    form: &RegisterForm,
) -> anyhow::Result<AccountOutcome> {
    form.validate()?;
    let attributes = SignUpAttributes {
        display_name: form.display_name.clone(),
        phone: form.phone.clone(),
    };
    let outcome = identity
        .sign_up(form.email.trim(), &form.password, attributes)
        .await?;

    let mut notices = Vec::new();
    if let Some(user) = &outcome.user {
        if let Err(e) = identity
            .insert_profile(&user.id, NewProfile { is_premium: false })
            .await
        {
            warn!(user_id = %user.id, error = %e, "profile creation failed");
            let detail = match e {
                IdentityError::ProfileWrite(msg) => msg,
                other => other.to_string(),
            };
            notices.push(Notice::new("Profile creation failed", detail));
        }
    }
    notices.push(Notice::new(
        "Account created",
        "Check your email to confirm your account.",
    ));
    info!("account registered");
    Ok(AccountOutcome {
        user: outcome.user,
        notices,
    })
}

pub async fn login(
    identity: &dyn IdentityProvider,
    form: &LoginForm,
) -> anyhow::Result<AccountOutcome> {
    form.validate()?;
    let session = identity
        .sign_in_with_password(form.email.trim(), &form.password)
        .await?;
    info!(user_id = %session.user.id, "signed in");
    Ok(AccountOutcome {
        user: Some(session.user),
        notices: vec![Notice::new("Success", "You are now signed in.")],
    })
}

pub async fn magic_link(
    identity: &dyn IdentityProvider,
    form: &MagicLinkForm,
) -> anyhow::Result<AccountOutcome> {
    form.validate()?;
    identity.sign_in_with_otp(form.email.trim()).await?;
    Ok(AccountOutcome {
        user: None,
        notices: vec![Notice::new(
            "Check your email",
            "We sent you a link to sign in.",
        )],
    })
}

pub async fn logout(identity: &dyn IdentityProvider) -> anyhow::Result<AccountOutcome> {
    identity.sign_out().await?;
    Ok(AccountOutcome {
        user: None,
        notices: vec![Notice::new("Signed out", "You have been signed out.")],
    })
}
