//! Server-rendered pages for the web shell.
//!
//! Pages are plain HTML built with `format!`; every piece of user or provider
//! text goes through [`escape`] first.

use std::fmt::Write as _;

use parley_core::access::AccessState;
use parley_core::conversation::{ConversationSession, TranscriptEntry, FEEDBACK_LABEL};
use parley_core::presentation::{catalog_cards, plan_banner, rating_badge, Notice, PRO_TIP};
use parley_core::scenario::find_scenario;
use parley_core::types::EntryKind;
use parley_core::view::View;

use crate::auth::AuthSnapshot;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:60rem;margin:0 auto;padding:1rem}\
nav a{margin-right:1rem}.notice{border:1px solid #ccc;border-radius:.5rem;padding:.5rem 1rem;margin:.5rem 0}\
.cards{display:grid;grid-template-columns:repeat(auto-fill,minmax(16rem,1fr));gap:1rem}\
.card{border:1px solid #ddd;border-radius:.5rem;padding:1rem}.locked{opacity:.7}\
.entry{margin:.5rem 0;padding:.5rem 1rem;border-radius:.5rem}.user{background:#eef;text-align:right}\
.counterpart{background:#f4f4f4}.feedback{background:#fff8e1;border:1px solid #f0d070}";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `body` in the shared layout: navigation, notices, then content.
pub fn layout(title: &str, auth: &AuthSnapshot, notices: &[Notice], body: &str) -> String {
    let account = match &auth.user {
        Some(user) => format!(
            "<span>{}</span> <form method=\"post\" action=\"/logout\" style=\"display:inline\">\
             <button>Sign out</button></form>",
            escape(user.display_name.as_deref().unwrap_or(&user.email))
        ),
        None => "<a href=\"/login\">Sign in</a><a href=\"/register\">Register</a>".to_string(),
    };
    let mut notice_html = String::new();
    for notice in notices {
        let _ = write!(
            notice_html,
            "<div class=\"notice\" role=\"status\"><strong>{}</strong><p>{}</p></div>",
            escape(&notice.title),
            escape(&notice.description)
        );
    }
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
         <title>{title} | Parley</title><style>{STYLE}</style></head><body>\
         <nav><a href=\"/\">Parley</a><a href=\"/subscribe\">Subscribe</a>{account}</nav>\
         {notice_html}<main>{body}</main></body></html>",
        title = escape(title),
    )
}

/// Body for one of the fixed navigation views.
pub fn view_body(view: View, access: AccessState, path: &str) -> String {
    match view {
        View::Home => home(access),
        View::Subscribe => subscribe(),
        View::Login => login(),
        View::Register => register(),
        View::MagicLink => magic_link(),
        View::NotFound => not_found(path),
    }
}

fn home(access: AccessState) -> String {
    let banner = plan_banner(access);
    let upgrade = if banner.show_upgrade {
        "<a href=\"/subscribe\">Upgrade</a>"
    } else {
        ""
    };
    let mut cards = String::new();
    for card in catalog_cards(access) {
        let s = card.scenario;
        let lock = if card.locked { " locked" } else { "" };
        let premium = if s.is_premium { "<span>Premium</span>" } else { "" };
        let _ = write!(
            cards,
            "<article class=\"card{lock}\" data-icon=\"{icon}\" data-color=\"{color}\">\
             <h3>{title}</h3>{premium}<p>{description}</p>\
             <form method=\"post\" action=\"/scenarios/{id}\"><button>{label}</button></form>\
             </article>",
            icon = s.category_icon.as_str(),
            color = s.color_tag,
            title = escape(s.title),
            description = escape(s.description),
            id = s.id,
            label = card.action_label,
        );
    }
    format!(
        "<h1>Practice workplace conversations</h1>\
         <section class=\"banner\"><strong>{badge}</strong> <span>{caption}</span> {upgrade}</section>\
         <section class=\"cards\">{cards}</section>",
        badge = banner.badge,
        caption = escape(&banner.caption),
    )
}

fn subscribe() -> String {
    "<h1>Go Premium</h1><p>Unlock every scenario with unlimited practice.</p>\
     <form method=\"post\" action=\"/subscribe\"><button>Subscribe</button></form>"
        .to_string()
}

fn login() -> String {
    "<h1>Sign in</h1><form method=\"post\" action=\"/login\">\
     <label>Email <input type=\"email\" name=\"email\" required></label>\
     <label>Password <input type=\"password\" name=\"password\" required></label>\
     <button>Sign in</button></form>\
     <p><a href=\"/magic-link\">Email me a sign-in link</a> | <a href=\"/register\">Create an account</a></p>"
        .to_string()
}

fn register() -> String {
    "<h1>Create an account</h1><form method=\"post\" action=\"/register\">\
     <label>Name <input name=\"display_name\"></label>\
     <label>Phone <input type=\"tel\" name=\"phone\"></label>\
     <label>Email <input type=\"email\" name=\"email\" required></label>\
     <label>Password <input type=\"password\" name=\"password\" required></label>\
     <button>Register</button></form>"
        .to_string()
}

fn magic_link() -> String {
    "<h1>Sign in with a link</h1><form method=\"post\" action=\"/magic-link\">\
     <label>Email <input type=\"email\" name=\"email\" required></label>\
     <button>Send link</button></form>"
        .to_string()
}

fn not_found(path: &str) -> String {
    format!(
        "<h1>404</h1><p>Nothing lives at <code>{}</code>.</p><a href=\"/\">Back to scenarios</a>",
        escape(path)
    )
}

/// The practice screen: transcript, feedback panels and the reply form.
pub fn conversation(session: &ConversationSession) -> String {
    let title = find_scenario(&session.scenario_id)
        .map(|s| s.title)
        .unwrap_or("Practice");
    let mut transcript = String::new();
    for entry in &session.entries {
        transcript.push_str(&entry_html(entry));
    }

    let processing = session.is_processing();
    let status = if processing {
        "<meta http-equiv=\"refresh\" content=\"1\"><p class=\"typing\" aria-live=\"polite\">Typing...</p>"
    } else {
        ""
    };
    let disabled = if processing { " disabled" } else { "" };
    format!(
        "<h1>{title}</h1>\
         <form method=\"post\" action=\"/sessions/{id}/end\"><button>End session</button></form>\
         <section class=\"transcript\">{transcript}</section>{status}\
         <form method=\"post\" action=\"/sessions/{id}/messages\">\
         <textarea name=\"text\" rows=\"3\" placeholder=\"Type your response...\"{disabled}></textarea>\
         <button{disabled}>Send</button></form>",
        title = escape(title),
        id = session.id,
    )
}

fn entry_html(entry: &TranscriptEntry) -> String {
    let time = entry.timestamp.format("%H:%M:%S");
    match (entry.kind, &entry.feedback) {
        (EntryKind::Feedback, Some(feedback)) => {
            let mut tips = String::new();
            for tip in &feedback.improvements {
                let _ = write!(tips, "<li>{}</li>", escape(tip));
            }
            format!(
                "<div class=\"entry feedback\"><strong>{FEEDBACK_LABEL}</strong> \
                 <span class=\"badge\">{badge}</span><p>{analysis}</p>\
                 <h4>Areas for improvement</h4><ul>{tips}</ul><p><em>{tip}</em></p>\
                 <time>{time}</time></div>",
                badge = rating_badge(feedback.rating),
                analysis = escape(&feedback.analysis),
                tip = escape(PRO_TIP),
            )
        }
        (kind, _) => format!(
            "<div class=\"entry {kind}\"><p>{}</p><time>{time}</time></div>",
            escape(&entry.content)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_markup() {
        assert_eq!(
            escape("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn home_shows_locked_cards_for_trial() {
        let html = view_body(View::Home, AccessState::trial(), "/");
        assert!(html.contains("Free Trial"));
        assert!(html.contains("Upgrade to Access"));
        assert!(html.contains("Start Scenario"));
    }

    #[test]
    fn home_for_premium_has_no_upgrade_link() {
        let html = view_body(View::Home, AccessState::premium(), "/");
        assert!(html.contains("Premium Access"));
        assert!(!html.contains("Upgrade to Access"));
    }

    #[test]
    fn layout_escapes_notices() {
        let notices = [Notice::new("Login failed", "<script>")];
        let html = layout("Home", &AuthSnapshot::default(), &notices, "");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn conversation_renders_feedback_panel() {
        let mut session = ConversationSession::start("negotiation");
        session.submit("I'd like a raise").unwrap();
        let pending = conversation(&session);
        assert!(pending.contains("Typing..."));
        assert!(pending.contains(" disabled"));

        session.complete().unwrap();
        let html = conversation(&session);
        assert!(html.contains(FEEDBACK_LABEL));
        assert!(html.contains("6/10 - Good"));
        assert!(html.contains("I&#39;d like a raise"));
        assert!(!html.contains("Typing..."));
    }
}
