//! Conversation engine: the transcript state machine for one practice session.
//!
//! ```text
//! start ──► AwaitingUserInput ──submit──► ProcessingResponse
//!                  ▲                              │
//!                  └──────────complete────────────┘
//!
//! end (from any state) ──► Ended
//! ```
//!
//! The engine never sleeps. Whoever drives it decides how long to wait
//! between `submit` and `complete`, and cancels that wait when the session
//! ends.

use crate::error::{ParleyError, Result};
use crate::script::{self, FeedbackRecord};
use crate::types::{ConversationState, EntryKind, ScenarioKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed content of every feedback entry.
pub const FEEDBACK_LABEL: &str = "Analysis of your response:";

// ---------------------------------------------------------------------------
// TranscriptEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: u64,
    pub kind: EntryKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackRecord>,
}

// ---------------------------------------------------------------------------
// ConversationSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ConversationSession {
    pub id: Uuid,
    pub scenario_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_key: Option<ScenarioKey>,
    pub state: ConversationState,
    pub entries: Vec<TranscriptEntry>,
    pub started_at: DateTime<Utc>,
    #[serde(skip)]
    next_entry_id: u64,
}

impl ConversationSession {
    /// Open a session and post the scenario's opening line.
    ///
    /// Ids with no script entry still start; they get the generic opening.
    pub fn start(scenario_id: impl Into<String>) -> Self {
        let scenario_id = scenario_id.into();
        let scenario_key = ScenarioKey::from_id(&scenario_id);
        let mut session = Self {
            id: Uuid::new_v4(),
            scenario_id,
            scenario_key,
            state: ConversationState::Initializing,
            entries: Vec::new(),
            started_at: Utc::now(),
            next_entry_id: 1,
        };
        session.push(
            EntryKind::Counterpart,
            script::opening_prompt(scenario_key).to_string(),
            None,
        );
        session.state = ConversationState::AwaitingUserInput;
        session
    }

    /// Record the user's message and move to `ProcessingResponse`.
    ///
    /// Blank input is rejected with [`ParleyError::EmptyInput`] and leaves
    /// the session untouched.
    pub fn submit(&mut self, user_text: &str) -> Result<&TranscriptEntry> {
        self.expect_state(ConversationState::AwaitingUserInput, "submit")?;
        if user_text.trim().is_empty() {
            return Err(ParleyError::EmptyInput);
        }
        self.state = ConversationState::ProcessingResponse;
        Ok(self.push(EntryKind::User, user_text.to_string(), None))
    }

    /// Append the feedback and counterpart reply for the pending user turn.
    ///
    /// Returns the two new entries, feedback first.
    pub fn complete(&mut self) -> Result<&[TranscriptEntry]> {
        self.expect_state(ConversationState::ProcessingResponse, "complete")?;
        let user_text = self
            .entries
            .iter()
            .rev()
            .find(|e| e.kind == EntryKind::User)
            .map(|e| e.content.clone())
            .unwrap_or_default();
        let turn = script::scripted_turn(self.scenario_key, &user_text);

        let first = self.entries.len();
        self.push(
            EntryKind::Feedback,
            FEEDBACK_LABEL.to_string(),
            Some(turn.feedback),
        );
        self.push(EntryKind::Counterpart, turn.reply, None);
        self.state = ConversationState::AwaitingUserInput;
        Ok(&self.entries[first..])
    }

    /// Discard the transcript. Every later operation fails with `InvalidState`.
    pub fn end(&mut self) {
        self.entries.clear();
        self.state = ConversationState::Ended;
    }

    pub fn is_processing(&self) -> bool {
        self.state == ConversationState::ProcessingResponse
    }

    pub fn is_ended(&self) -> bool {
        self.state == ConversationState::Ended
    }

    /// The feedback record from the most recent completed turn, if any.
    pub fn latest_feedback(&self) -> Option<&FeedbackRecord> {
        self.entries.iter().rev().find_map(|e| e.feedback.as_ref())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn expect_state(&self, expected: ConversationState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ParleyError::InvalidState {
                state: self.state.to_string(),
                operation,
            })
        }
    }

    fn push(
        &mut self,
        kind: EntryKind,
        content: String,
        feedback: Option<FeedbackRecord>,
    ) -> &TranscriptEntry {
        let entry = TranscriptEntry {
            id: self.next_entry_id,
            kind,
            content,
            timestamp: Utc::now(),
            feedback,
        };
        self.next_entry_id += 1;
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::list_scenarios;

    fn kinds(s: &ConversationSession) -> Vec<EntryKind> {
        s.entries.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn start_posts_single_counterpart_entry() {
        for scenario in list_scenarios() {
            let s = ConversationSession::start(scenario.id);
            assert_eq!(s.entries.len(), 1);
            assert_eq!(s.entries[0].kind, EntryKind::Counterpart);
            assert_eq!(s.state, ConversationState::AwaitingUserInput);
            assert_eq!(s.scenario_key, Some(scenario.key));
        }
    }

    #[test]
    fn round_trip_appends_user_feedback_counterpart() {
        let mut s = ConversationSession::start("sales");
        s.submit("Our support is better").unwrap();
        assert_eq!(s.state, ConversationState::ProcessingResponse);
        assert_eq!(s.entries.len(), 2);

        let added = s.complete().unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].kind, EntryKind::Feedback);
        assert_eq!(added[1].kind, EntryKind::Counterpart);

        assert_eq!(s.entries.len(), 4);
        assert_eq!(
            kinds(&s),
            [
                EntryKind::Counterpart,
                EntryKind::User,
                EntryKind::Feedback,
                EntryKind::Counterpart,
            ]
        );
        assert_eq!(s.state, ConversationState::AwaitingUserInput);
    }

    #[test]
    fn entry_ids_are_monotonic() {
        let mut s = ConversationSession::start("negotiation");
        for text in ["first", "second"] {
            s.submit(text).unwrap();
            s.complete().unwrap();
        }
        let ids: Vec<u64> = s.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn feedback_entry_carries_record_and_label() {
        let mut s = ConversationSession::start("negotiation");
        s.submit("Can we talk about a raise now?").unwrap();
        let added = s.complete().unwrap();
        assert_eq!(added[0].content, FEEDBACK_LABEL);
        assert!(added[0].feedback.is_some());
        assert!(added[1].feedback.is_none());
    }

    #[test]
    fn blank_input_is_rejected_without_change() {
        let mut s = ConversationSession::start("sales");
        for blank in ["", "   ", "\n\t "] {
            let err = s.submit(blank).unwrap_err();
            assert!(matches!(err, ParleyError::EmptyInput));
        }
        assert_eq!(s.entries.len(), 1);
        assert_eq!(s.state, ConversationState::AwaitingUserInput);
    }

    #[test]
    fn submit_while_processing_is_invalid() {
        let mut s = ConversationSession::start("sales");
        s.submit("hello").unwrap();
        let err = s.submit("again").unwrap_err();
        assert!(matches!(
            err,
            ParleyError::InvalidState {
                operation: "submit",
                ..
            }
        ));
        assert_eq!(s.entries.len(), 2);
    }

    #[test]
    fn complete_without_pending_turn_is_invalid() {
        let mut s = ConversationSession::start("sales");
        assert!(matches!(
            s.complete().unwrap_err(),
            ParleyError::InvalidState {
                operation: "complete",
                ..
            }
        ));
    }

    #[test]
    fn project_management_scenario() {
        let mut s = ConversationSession::start("project-management");
        assert!(s.entries[0]
            .content
            .contains("The stakeholder just said: 'I don't think you need any more resources."));

        s.submit("We need more headcount").unwrap();
        let added = s.complete().unwrap();
        let feedback = added[0].feedback.as_ref().unwrap();
        assert_eq!(feedback.rating, 7);
        assert_eq!(feedback.improvements.len(), 3);
        assert!(added[1]
            .content
            .starts_with("I see your point, but let me share some data"));
    }

    #[test]
    fn unknown_scenario_falls_back() {
        let mut s = ConversationSession::start("unknown-id");
        assert_eq!(s.scenario_key, None);
        assert_eq!(s.entries[0].content, "Let's begin this scenario.");

        s.submit("Hello there").unwrap();
        s.complete().unwrap();
        assert_eq!(s.latest_feedback().unwrap().rating, 6);
    }

    #[test]
    fn end_discards_and_blocks_further_submits() {
        let mut s = ConversationSession::start("sales");
        s.submit("hi").unwrap();
        s.end();
        assert!(s.entries.is_empty());
        assert!(s.is_ended());
        assert!(matches!(
            s.submit("still there?").unwrap_err(),
            ParleyError::InvalidState { .. }
        ));
        assert!(s.complete().is_err());
    }

    #[test]
    fn user_text_is_kept_verbatim() {
        let mut s = ConversationSession::start("sales");
        s.submit("  padded answer \n").unwrap();
        assert_eq!(s.entries[1].content, "  padded answer \n");
    }

    #[test]
    fn session_serializes_without_internal_counter() {
        let s = ConversationSession::start("sales");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["state"], "awaiting_user_input");
        assert_eq!(json["entries"][0]["kind"], "counterpart");
        assert!(json.get("next_entry_id").is_none());
    }
}
