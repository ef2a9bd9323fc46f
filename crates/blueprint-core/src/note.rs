use crate::types::{NoteType, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

/// An entry in a task's history. Notes are append-only: once pushed onto a
/// task they are never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: NoteType,
}

impl Note {
    fn new(text: impl Into<String>, kind: NoteType, now: DateTime<Utc>) -> Self {
        Self {
            id: new_note_id(),
            text: text.into(),
            created_at: now,
            kind,
        }
    }

    pub fn user(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::new(text, NoteType::User, now)
    }

    pub fn status_changed(status: TaskStatus, now: DateTime<Utc>) -> Self {
        Self::new(format!("Status changed to {status}"), NoteType::StatusChange, now)
    }

    pub fn deferred(from_week: u32, to_week: u32, now: DateTime<Utc>) -> Self {
        Self::new(
            format!("Deferred from week {from_week} to week {to_week}"),
            NoteType::StatusChange,
            now,
        )
    }

    pub fn moved(from_week: u32, to_week: u32, now: DateTime<Utc>) -> Self {
        Self::new(
            format!("Moved from Week {from_week} to Week {to_week}"),
            NoteType::Edit,
            now,
        )
    }

    pub fn field_changed(field: &str, old: &str, new: &str, now: DateTime<Utc>) -> Self {
        Self::new(
            format!("{field} changed from {old} to {new}"),
            NoteType::Edit,
            now,
        )
    }
}

pub fn new_note_id() -> String {
    format!("n-{}", uuid::Uuid::new_v4().simple())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
