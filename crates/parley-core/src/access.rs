//! Access gate: decides whether a scenario may be started.

use crate::error::{ParleyError, Result};
use crate::scenario::ScenarioDescriptor;
use serde::{Deserialize, Serialize};

/// Message shown instead of starting a session when the gate says no.
pub const UPGRADE_PROMPT: &str =
    "This scenario requires a premium subscription. Upgrade to continue!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessState {
    pub is_trial_user: bool,
}

impl AccessState {
    pub fn trial() -> Self {
        Self {
            is_trial_user: true,
        }
    }

    pub fn premium() -> Self {
        Self {
            is_trial_user: false,
        }
    }
}

impl Default for AccessState {
    fn default() -> Self {
        Self::trial()
    }
}

/// A scenario is selectable unless it is premium and the user is on a trial.
pub fn can_select(scenario: &ScenarioDescriptor, access: AccessState) -> bool {
    !scenario.is_premium || !access.is_trial_user
}

/// Like [`can_select`], but as a `Result` so callers can branch to the
/// upgrade prompt with `?`.
pub fn ensure_selectable(scenario: &ScenarioDescriptor, access: AccessState) -> Result<()> {
    if can_select(scenario, access) {
        Ok(())
    } else {
        Err(ParleyError::PremiumRequired(scenario.id.to_string()))
    }
}
