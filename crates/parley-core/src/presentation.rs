//! View models shared by the web shell and the terminal shell.

use crate::access::{can_select, AccessState};
use crate::scenario::{list_scenarios, ScenarioDescriptor};
use serde::Serialize;
use std::fmt;

pub const PRO_TIP: &str = "Pro tip: Great communicators always acknowledge the other person's \
                           perspective before presenting their own case. This builds trust and \
                           opens dialogue.";

// ---------------------------------------------------------------------------
// RatingBand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl RatingBand {
    pub fn from_rating(rating: u8) -> Self {
        if rating >= 8 {
            RatingBand::Excellent
        } else if rating >= 6 {
            RatingBand::Good
        } else {
            RatingBand::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatingBand::Excellent => "Excellent",
            RatingBand::Good => "Good",
            RatingBand::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for RatingBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `"7/10 - Good"`
pub fn rating_badge(rating: u8) -> String {
    format!("{rating}/10 - {}", RatingBand::from_rating(rating))
}

// ---------------------------------------------------------------------------
// Catalog cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CatalogCard {
    pub scenario: &'static ScenarioDescriptor,
    pub locked: bool,
    pub action_label: &'static str,
}

pub fn catalog_cards(access: AccessState) -> Vec<CatalogCard> {
    list_scenarios()
        .iter()
        .map(|scenario| {
            let locked = !can_select(scenario, access);
            CatalogCard {
                scenario,
                locked,
                action_label: if locked {
                    "Upgrade to Access"
                } else {
                    "Start Scenario"
                },
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Plan banner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanBanner {
    pub badge: &'static str,
    pub caption: String,
    pub show_upgrade: bool,
}

pub fn plan_banner(access: AccessState) -> PlanBanner {
    if access.is_trial_user {
        let free = list_scenarios().iter().filter(|s| !s.is_premium).count();
        PlanBanner {
            badge: "Free Trial",
            caption: format!("{free} free scenarios remaining"),
            show_upgrade: true,
        }
    } else {
        PlanBanner {
            badge: "Premium Access",
            caption: "Unlimited access".to_string(),
            show_upgrade: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// A dismissible message for the user (toast in the web shell, a line in the
/// terminal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bands() {
        assert_eq!(RatingBand::from_rating(10), RatingBand::Excellent);
        assert_eq!(RatingBand::from_rating(8), RatingBand::Excellent);
        assert_eq!(RatingBand::from_rating(7), RatingBand::Good);
        assert_eq!(RatingBand::from_rating(6), RatingBand::Good);
        assert_eq!(RatingBand::from_rating(5), RatingBand::NeedsImprovement);
        assert_eq!(RatingBand::from_rating(0), RatingBand::NeedsImprovement);
    }

    #[test]
    fn badge_text() {
        assert_eq!(rating_badge(7), "7/10 - Good");
        assert_eq!(rating_badge(3), "3/10 - Needs Improvement");
    }

    #[test]
    fn trial_cards_lock_premium_scenarios() {
        let cards = catalog_cards(AccessState::trial());
        assert_eq!(cards.len(), 6);
        for card in &cards {
            assert_eq!(card.locked, card.scenario.is_premium);
            let expected = if card.locked {
                "Upgrade to Access"
            } else {
                "Start Scenario"
            };
            assert_eq!(card.action_label, expected);
        }
    }

    #[test]
    fn premium_cards_are_all_open() {
        assert!(catalog_cards(AccessState::premium())
            .iter()
            .all(|c| !c.locked && c.action_label == "Start Scenario"));
    }

    #[test]
    fn trial_banner_counts_free_scenarios() {
        let banner = plan_banner(AccessState::trial());
        assert_eq!(banner.badge, "Free Trial");
        assert_eq!(banner.caption, "2 free scenarios remaining");
        assert!(banner.show_upgrade);
    }

    #[test]
    fn premium_banner() {
        let banner = plan_banner(AccessState::premium());
        assert_eq!(banner.badge, "Premium Access");
        assert_eq!(banner.caption, "Unlimited access");
        assert!(!banner.show_upgrade);
    }
}
