use crate::document::{ActionDescriptor, ActionKind};
use crate::state::WatchedFolder;
use std::path::Path;

pub const DEFAULT_SOCIAL_PLATFORM: &str = "linkedin";

const TRIAGE_PROMPT: &str = include_str!("assets/needs_action/triage.prompt.md");
const EMAIL_SEND_PROMPT: &str = include_str!("assets/approved/email_send.prompt.md");
const SOCIAL_POST_PROMPT: &str = include_str!("assets/approved/social_post.prompt.md");
const FILE_DELETE_PROMPT: &str = include_str!("assets/approved/file_delete.prompt.md");
const GENERIC_APPROVED_PROMPT: &str = include_str!("assets/approved/generic.prompt.md");

/// What the agent is asked to do with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Classify and summarize new work from `Needs_Action`.
    Triage,
    /// Carry out an action a human approved in `Approved`.
    Execute,
}

impl From<WatchedFolder> for Stage {
    fn from(folder: WatchedFolder) -> Self {
        match folder {
            WatchedFolder::NeedsAction => Stage::Triage,
            WatchedFolder::Approved => Stage::Execute,
        }
    }
}

/// Builds the agent instruction for one document. `document` is the path the
/// agent should open, normally relative to the vault root.
pub fn build_prompt(descriptor: &ActionDescriptor, document: &Path, stage: Stage) -> String {
    let template = match (stage, descriptor.kind) {
        (Stage::Triage, _) => TRIAGE_PROMPT,
        (Stage::Execute, ActionKind::EmailSend) => EMAIL_SEND_PROMPT,
        (Stage::Execute, ActionKind::SocialPost) => SOCIAL_POST_PROMPT,
        (Stage::Execute, ActionKind::FileDelete) => FILE_DELETE_PROMPT,
        (Stage::Execute, ActionKind::Unknown) => GENERIC_APPROVED_PROMPT,
    };
    let document = document.display().to_string();

    render_template(template, |token| match token {
        "document" => Some(document.clone()),
        "target" => Some(descriptor.target().to_string()),
        "action" => Some(descriptor.action_label().to_string()),
        "platform" => Some(platform(descriptor).to_string()),
        "header" => Some(render_header(descriptor)),
        "action_note" => Some(triage_note(descriptor)),
        _ => None,
    })
}

fn platform(descriptor: &ActionDescriptor) -> &str {
    descriptor
        .header
        .get("platform")
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SOCIAL_PLATFORM)
}

fn render_header(descriptor: &ActionDescriptor) -> String {
    if descriptor.header.is_empty() {
        return "   - (no header fields)".to_string();
    }
    descriptor
        .header
        .iter()
        .map(|(key, value)| format!("   - {key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// Proposed side effects never run from triage; they go through approval.
fn triage_note(descriptor: &ActionDescriptor) -> String {
    match descriptor.kind {
        ActionKind::EmailSend => format!(
            "   - This item proposes sending an email to {}. Draft an approval request in /Pending_Approval instead of sending it",
            descriptor.target()
        ),
        ActionKind::SocialPost => format!(
            "   - This item proposes a {} post. Draft an approval request in /Pending_Approval instead of posting it",
            platform(descriptor)
        ),
        ActionKind::FileDelete => format!(
            "   - This item proposes deleting {}. Draft an approval request in /Pending_Approval instead of deleting anything",
            descriptor.target()
        ),
        ActionKind::Unknown => format!(
            "   - Item type: {}",
            descriptor.header.get("type").unwrap_or("unspecified")
        ),
    }
}

/// Replaces `{{token}}` occurrences using `resolve`. Unresolved or unclosed
/// placeholders are copied through untouched; substituted values are not
/// rescanned.
fn render_template<F>(template: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut rendered = String::with_capacity(template.len());
    let mut cursor = template;

    while let Some(start) = cursor.find("{{") {
        rendered.push_str(&cursor[..start]);
        let after_open = &cursor[start + 2..];
        let Some(close_offset) = after_open.find("}}") else {
            rendered.push_str(&cursor[start..]);
            return rendered;
        };
        let raw = &after_open[..close_offset];
        match resolve(raw.trim()) {
            Some(value) => rendered.push_str(&value),
            None => {
                rendered.push_str("{{");
                rendered.push_str(raw);
                rendered.push_str("}}");
            }
        }
        cursor = &after_open[close_offset + 2..];
    }

    rendered.push_str(cursor);
    rendered
}
