use super::{parse_frontmatter, Frontmatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    EmailSend,
    SocialPost,
    FileDelete,
    Unknown,
}

impl ActionKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "email_send" => ActionKind::EmailSend,
            "social_post" => ActionKind::SocialPost,
            "file_delete" => ActionKind::FileDelete,
            _ => ActionKind::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::EmailSend => "email_send",
            ActionKind::SocialPost => "social_post",
            ActionKind::FileDelete => "file_delete",
            ActionKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub kind: ActionKind,
    pub header: Frontmatter,
}

impl ActionDescriptor {
    pub fn from_header(header: Frontmatter) -> Self {
        let kind = header
            .get("action")
            .map(ActionKind::parse)
            .unwrap_or(ActionKind::Unknown);
        Self { kind, header }
    }

    /// Raw `action` value, or `unknown` when absent.
    pub fn action_label(&self) -> &str {
        self.field("action").unwrap_or("unknown")
    }

    pub fn target(&self) -> &str {
        self.field("target").unwrap_or("unknown")
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.header.get(key).filter(|v| !v.is_empty())
    }
}

pub fn classify(content: &str) -> ActionDescriptor {
    ActionDescriptor::from_header(parse_frontmatter(content))
}
