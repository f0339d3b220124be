use crate::output::print_json;
use anyhow::Context;
use parley_core::access::{ensure_selectable, AccessState, UPGRADE_PROMPT};
use parley_core::config::Config;
use parley_core::conversation::{ConversationSession, TranscriptEntry};
use parley_core::error::ParleyError;
use parley_core::presentation::{rating_badge, PRO_TIP};
use parley_core::scenario::{find_scenario, ScenarioDescriptor};
use parley_core::types::EntryKind;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

const QUIT: &str = "/quit";

pub fn run(
    root: &Path,
    id: &str,
    premium: bool,
    delay_ms: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let access = if premium {
        AccessState::premium()
    } else {
        config.access.state()
    };

    let scenario = find_scenario(id)?;
    if let Err(e) = ensure_selectable(scenario, access) {
        eprintln!("{UPGRADE_PROMPT}");
        return Err(e.into());
    }

    let delay = delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.conversation.reply_delay());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let transcript = practice(scenario, stdin.lock(), &mut stdout.lock(), delay, !json)?;
    if json {
        print_json(&transcript)?;
    }
    Ok(())
}

/// Run one conversation over line-oriented input until `/quit` or EOF.
///
/// Returns the transcript as it stood just before the session was ended.
/// With `echo` off nothing is written to `out`.
fn practice<R: BufRead, W: Write>(
    scenario: &ScenarioDescriptor,
    input: R,
    out: &mut W,
    delay: Duration,
    echo: bool,
) -> anyhow::Result<ConversationSession> {
    let mut session = ConversationSession::start(scenario.id);
    tracing::debug!(session = %session.id, scenario = scenario.id, "terminal practice started");

    if echo {
        writeln!(out, "{}  (type {QUIT} to finish)", scenario.title)?;
        writeln!(out)?;
        for entry in &session.entries {
            write_entry(out, entry)?;
        }
        prompt(out)?;
    }

    for line in input.lines() {
        let line = line?;
        if line.trim() == QUIT {
            break;
        }
        match session.submit(&line) {
            Ok(_) => {}
            Err(ParleyError::EmptyInput) => {
                if echo {
                    prompt(out)?;
                }
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        if echo {
            writeln!(out, "...")?;
            out.flush()?;
        }
        std::thread::sleep(delay);

        let added = session.complete()?;
        if echo {
            for entry in added {
                write_entry(out, entry)?;
            }
            prompt(out)?;
        }
    }

    let transcript = session.clone();
    session.end();
    if echo {
        writeln!(out)?;
        writeln!(out, "Session ended.")?;
    }
    Ok(transcript)
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

fn write_entry<W: Write>(out: &mut W, entry: &TranscriptEntry) -> io::Result<()> {
    match (entry.kind, &entry.feedback) {
        (EntryKind::Feedback, Some(feedback)) => {
            writeln!(out, "{} {}", entry.content, rating_badge(feedback.rating))?;
            writeln!(out, "  {}", feedback.analysis)?;
            writeln!(out, "  Areas for improvement:")?;
            for tip in &feedback.improvements {
                writeln!(out, "  - {tip}")?;
            }
            writeln!(out, "  {PRO_TIP}")?;
        }
        (EntryKind::User, _) => writeln!(out, "You: {}", entry.content)?,
        _ => writeln!(out, "Counterpart: {}", entry.content)?,
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::types::ConversationState;
    use std::io::Cursor;

    fn run_lines(id: &str, input: &str, echo: bool) -> (ConversationSession, String) {
        let scenario = find_scenario(id).unwrap();
        let mut out = Vec::new();
        let transcript = practice(
            scenario,
            Cursor::new(input.as_bytes()),
            &mut out,
            Duration::ZERO,
            echo,
        )
        .unwrap();
        (transcript, String::from_utf8(out).unwrap())
    }

    #[test]
    fn one_turn_then_quit() {
        let (transcript, out) = run_lines("negotiation", "I deserve it\n/quit\nignored\n", true);
        let kinds: Vec<_> = transcript.entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [
                EntryKind::Counterpart,
                EntryKind::User,
                EntryKind::Feedback,
                EntryKind::Counterpart
            ]
        );
        assert_eq!(transcript.state, ConversationState::AwaitingUserInput);
        assert!(out.starts_with("Negotiation Skills"));
        assert!(out.contains("Counterpart: You're negotiating a salary increase"));
        assert!(out.contains("Analysis of your response: 6/10 - Good"));
        assert!(out.contains("Areas for improvement:"));
        assert!(out.trim_end().ends_with("Session ended."));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let (transcript, _) = run_lines("sales", "\n   \n", false);
        assert_eq!(transcript.entries.len(), 1);
    }

    #[test]
    fn eof_ends_session() {
        let (transcript, _) = run_lines("sales", "first\nsecond\n", false);
        assert_eq!(transcript.entries.len(), 7);
    }

    #[test]
    fn project_management_rating_is_seven() {
        let (transcript, out) =
            run_lines("project-management", "We need two more engineers\n", true);
        assert_eq!(transcript.latest_feedback().unwrap().rating, 7);
        assert!(out.contains("7/10 - Good"));
    }

    #[test]
    fn quiet_mode_writes_nothing() {
        let (_, out) = run_lines("negotiation", "hello\n", false);
        assert!(out.is_empty());
    }
}
