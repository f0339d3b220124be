//! Scenario catalog: the fixed, ordered list of practice topics.
//!
//! The catalog is compiled into the binary. Adding or changing a scenario is
//! a redeploy, not a runtime operation.

use crate::error::{ParleyError, Result};
use crate::types::{CategoryIcon, ScenarioKey};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioDescriptor {
    pub id: &'static str,
    pub key: ScenarioKey,
    pub title: &'static str,
    pub description: &'static str,
    pub category_icon: CategoryIcon,
    pub color_tag: &'static str,
    pub is_premium: bool,
}

static SCENARIOS: [ScenarioDescriptor; 6] = [
    ScenarioDescriptor {
        id: "negotiation",
        key: ScenarioKey::Negotiation,
        title: "Negotiation Skills",
        description: "Master the art of win-win negotiations",
        category_icon: CategoryIcon::MessageSquare,
        color_tag: "blue",
        is_premium: false,
    },
    ScenarioDescriptor {
        id: "sales",
        key: ScenarioKey::Sales,
        title: "Sales Mastery",
        description: "Close deals and overcome objections",
        category_icon: CategoryIcon::TrendingUp,
        color_tag: "green",
        is_premium: false,
    },
    ScenarioDescriptor {
        id: "project-management",
        key: ScenarioKey::ProjectManagement,
        title: "Project Management",
        description: "Get stakeholder buy-in and manage resources",
        category_icon: CategoryIcon::Briefcase,
        color_tag: "purple",
        is_premium: true,
    },
    ScenarioDescriptor {
        id: "marketing",
        key: ScenarioKey::Marketing,
        title: "Marketing & Advertising",
        description: "Craft compelling campaigns and messaging",
        category_icon: CategoryIcon::Target,
        color_tag: "orange",
        is_premium: true,
    },
    ScenarioDescriptor {
        id: "leadership",
        key: ScenarioKey::Leadership,
        title: "Leadership Communication",
        description: "Inspire teams and drive change",
        category_icon: CategoryIcon::Users,
        color_tag: "indigo",
        is_premium: true,
    },
    ScenarioDescriptor {
        id: "conflict-resolution",
        key: ScenarioKey::ConflictResolution,
        title: "Conflict Resolution",
        description: "Navigate difficult conversations",
        category_icon: CategoryIcon::MessageSquare,
        color_tag: "red",
        is_premium: true,
    },
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// All scenarios in display order.
pub fn list_scenarios() -> &'static [ScenarioDescriptor] {
    &SCENARIOS
}

/// Look up a scenario by its id.
pub fn find_scenario(id: &str) -> Result<&'static ScenarioDescriptor> {
    SCENARIOS
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| ParleyError::ScenarioNotFound(id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_returns_matching_descriptor_for_every_entry() {
        for s in list_scenarios() {
            let found = find_scenario(s.id).unwrap();
            assert_eq!(found.id, s.id);
        }
    }

    #[test]
    fn find_unknown_reports_not_found() {
        let err = find_scenario("unknown-id").unwrap_err();
        assert!(matches!(err, ParleyError::ScenarioNotFound(ref id) if id == "unknown-id"));
    }

    #[test]
    fn catalog_order_is_stable() {
        let ids: Vec<&str> = list_scenarios().iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            [
                "negotiation",
                "sales",
                "project-management",
                "marketing",
                "leadership",
                "conflict-resolution",
            ]
        );
    }

    #[test]
    fn ids_are_unique_and_match_keys() {
        let mut seen = std::collections::HashSet::new();
        for s in list_scenarios() {
            assert!(seen.insert(s.id), "duplicate id {}", s.id);
            assert_eq!(s.key.as_str(), s.id);
        }
    }

    #[test]
    fn only_first_two_are_free() {
        let free: Vec<&str> = list_scenarios()
            .iter()
            .filter(|s| !s.is_premium)
            .map(|s| s.id)
            .collect();
        assert_eq!(free, ["negotiation", "sales"]);
    }
}
