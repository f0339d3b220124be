//! Scripted counterpart: opening prompts, replies and feedback.
//!
//! Every lookup is a `match` on `Option<ScenarioKey>` with a default arm, so
//! ids without a script entry fall through to the generic lines. The user's
//! message is accepted but does not influence the output.

use crate::types::ScenarioKey;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENING: &str = "Let's begin this scenario.";

const DEFAULT_REPLY: &str =
    "That's an interesting perspective. Let me think about how to address your concerns...";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub rating: u8,
    pub improvements: Vec<String>,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedTurn {
    pub reply: String,
    pub feedback: FeedbackRecord,
}

struct TurnScript {
    reply: &'static str,
    rating: u8,
    improvements: [&'static str; 3],
    analysis: &'static str,
}

impl TurnScript {
    fn to_turn(&self) -> ScriptedTurn {
        ScriptedTurn {
            reply: self.reply.to_string(),
            feedback: FeedbackRecord {
                rating: self.rating,
                improvements: self.improvements.iter().map(|s| s.to_string()).collect(),
                analysis: self.analysis.to_string(),
            },
        }
    }
}

const PROJECT_MANAGEMENT_TURN: TurnScript = TurnScript {
    reply: "I see your point, but let me share some data that might change your perspective. \
            Our current team velocity has decreased by 25% over the last sprint, and we're at \
            risk of missing our Q4 deadline. What specific concerns do you have about \
            additional resources?",
    rating: 7,
    improvements: [
        "Good use of data to support your argument",
        "Consider asking more open-ended questions to understand their concerns",
        "You could have acknowledged their perspective more before presenting your case",
    ],
    analysis: "You effectively used data to make your case stronger. The follow-up question \
               shows you're listening, but you could improve by showing more empathy for their \
               budget constraints first.",
};

const DEFAULT_TURN: TurnScript = TurnScript {
    reply: DEFAULT_REPLY,
    rating: 6,
    improvements: [
        "Try to be more specific in your response",
        "Use concrete examples to support your points",
        "Ask clarifying questions to better understand their position",
    ],
    analysis: "Your response shows you're thinking, but could be more decisive and specific.",
};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The counterpart's first line for a scenario.
pub fn opening_prompt(key: Option<ScenarioKey>) -> &'static str {
    match key {
        Some(ScenarioKey::Negotiation) => {
            "You're negotiating a salary increase with your manager. They just said: 'I \
             understand you'd like a raise, but the budget is tight this year. We can revisit \
             this next quarter.'"
        }
        Some(ScenarioKey::Sales) => {
            "You're trying to close a deal with a potential client. They just said: 'Your \
             solution looks good, but your competitor is offering the same thing for 30% less. \
             Why should we choose you?'"
        }
        Some(ScenarioKey::ProjectManagement) => {
            "You're a project manager trying to get additional resources from stakeholders. \
             The stakeholder just said: 'I don't think you need any more resources. You should \
             be able to move forward successfully with what you have.'"
        }
        Some(ScenarioKey::Marketing) => {
            "You're pitching a new marketing campaign to the executive team. The CEO just \
             said: 'This campaign seems too risky and expensive. How do we know it will \
             generate ROI?'"
        }
        Some(ScenarioKey::Leadership) => {
            "You're leading a team meeting about a major organizational change. A team member \
             just said: 'This change seems unnecessary and will just create more work for \
             everyone.'"
        }
        Some(ScenarioKey::ConflictResolution) => {
            "You're mediating a conflict between two team members. One just said: 'They never \
             listen to my ideas and always shoot them down in meetings.'"
        }
        None => DEFAULT_OPENING,
    }
}

/// Produce the counterpart reply and feedback for one user turn.
pub fn scripted_turn(key: Option<ScenarioKey>, _user_text: &str) -> ScriptedTurn {
    match key {
        Some(ScenarioKey::ProjectManagement) => PROJECT_MANAGEMENT_TURN.to_turn(),
        _ => DEFAULT_TURN.to_turn(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
