use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ScenarioKey
// ---------------------------------------------------------------------------

/// Typed key for every scenario the catalog and the scripts know about.
///
/// Script tables match on this enum instead of on raw ids, so an id with no
/// table entry resolves to `None` and takes the default arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKey {
    Negotiation,
    Sales,
    ProjectManagement,
    Marketing,
    Leadership,
    ConflictResolution,
}

impl ScenarioKey {
    pub fn all() -> &'static [ScenarioKey] {
        &[
            ScenarioKey::Negotiation,
            ScenarioKey::Sales,
            ScenarioKey::ProjectManagement,
            ScenarioKey::Marketing,
            ScenarioKey::Leadership,
            ScenarioKey::ConflictResolution,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioKey::Negotiation => "negotiation",
            ScenarioKey::Sales => "sales",
            ScenarioKey::ProjectManagement => "project-management",
            ScenarioKey::Marketing => "marketing",
            ScenarioKey::Leadership => "leadership",
            ScenarioKey::ConflictResolution => "conflict-resolution",
        }
    }

    /// Resolve a raw scenario id. Unknown ids yield `None`.
    pub fn from_id(id: &str) -> Option<ScenarioKey> {
        ScenarioKey::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == id)
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CategoryIcon
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryIcon {
    MessageSquare,
    TrendingUp,
    Briefcase,
    Target,
    Users,
}

impl CategoryIcon {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryIcon::MessageSquare => "message-square",
            CategoryIcon::TrendingUp => "trending-up",
            CategoryIcon::Briefcase => "briefcase",
            CategoryIcon::Target => "target",
            CategoryIcon::Users => "users",
        }
    }
}

impl fmt::Display for CategoryIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Counterpart,
    User,
    Feedback,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Counterpart => "counterpart",
            EntryKind::User => "user",
            EntryKind::Feedback => "feedback",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConversationState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Initializing,
    AwaitingUserInput,
    ProcessingResponse,
    Ended,
}

impl ConversationState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversationState::Initializing => "initializing",
            ConversationState::AwaitingUserInput => "awaiting_user_input",
            ConversationState::ProcessingResponse => "processing_response",
            ConversationState::Ended => "ended",
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
