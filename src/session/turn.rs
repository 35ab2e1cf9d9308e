use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;

/// Identifier of a turn, unique and strictly increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnId(u64);

impl TurnId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
    /// Synthetic notices (greeting, language switch). Never answers a user turn.
    System,
}

/// Delivery state of a turn.
///
/// Only the bot turn created for a submission starts as `Pending`; it moves
/// to `Delivered` or `Error` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Pending,
    Delivered,
    Error,
}

impl TurnStatus {
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A citation backing a bot answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub label: String,
    pub score: f64,
    pub page_count: Option<u32>,
}

/// Metadata for a file sent along with a message. Contents are never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub name: String,
    pub byte_size: u64,
    pub mime_type: String,
}

impl AttachmentRef {
    pub fn new(name: impl Into<String>, byte_size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            byte_size,
            mime_type: mime_type.into(),
        }
    }

    /// Builds a reference from a file on disk, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, metadata.len(), guess_mime_type(path)))
    }
}

fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// One entry in a chat transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: TurnId,
    pub role: Role,
    /// Text as shown to the user, in the display language when translation applies.
    pub text: String,
    /// Text as produced before any translation.
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
    pub status: TurnStatus,
    pub sources: Vec<Source>,
    pub attachments: Vec<AttachmentRef>,
}

impl Turn {
    pub(crate) fn user(id: TurnId, text: String, attachments: Vec<AttachmentRef>) -> Self {
        Self {
            id,
            role: Role::User,
            raw_text: text.clone(),
            text,
            created_at: Utc::now(),
            status: TurnStatus::Delivered,
            sources: Vec::new(),
            attachments,
        }
    }

    pub(crate) fn pending_reply(id: TurnId) -> Self {
        Self {
            id,
            role: Role::Bot,
            text: String::new(),
            raw_text: String::new(),
            created_at: Utc::now(),
            status: TurnStatus::Pending,
            sources: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub(crate) fn system(id: TurnId, text: String) -> Self {
        Self {
            id,
            role: Role::System,
            raw_text: text.clone(),
            text,
            created_at: Utc::now(),
            status: TurnStatus::Delivered,
            sources: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self.status, TurnStatus::Pending)
    }
}
