use crate::note::Note;
use crate::types::{Domain, Priority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub domain: Domain,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    pub due_week: u32,
    #[serde(default)]
    pub deferred_to_week: Option<u32>,
    #[serde(default)]
    pub date_completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Auxiliary references; the engine never looks inside them.
    #[serde(default)]
    pub links: Vec<serde_json::Value>,
    #[serde(default)]
    pub custom: bool,
}

/// Fields a user supplies when creating a task inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub domain: Domain,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Defaults to the first week of the target block.
    #[serde(default)]
    pub due_week: Option<u32>,
}

/// Partial update for a task. `None` leaves the field untouched.
///
/// Status and due week are not patchable: they have dedicated commands
/// (`SetTaskStatus`, `DeferTask`, `MoveTask`) with their own history notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<serde_json::Value>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.domain.is_none()
            && self.priority.is_none()
            && self.links.is_none()
    }
}

impl Task {
    pub fn from_draft(id: impl Into<String>, draft: TaskDraft, default_week: u32) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            description: draft.description,
            domain: draft.domain,
            status: TaskStatus::NotStarted,
            priority: draft.priority.unwrap_or_default(),
            due_week: draft.due_week.unwrap_or(default_week),
            deferred_to_week: None,
            date_completed: None,
            notes: Vec::new(),
            links: Vec::new(),
            custom: true,
        }
    }

    // -----------------------------------------------------------------------
    // Mutations (each appends its own history note)
    // -----------------------------------------------------------------------

    /// `date_completed` is only ever set here; moving away from completed
    /// leaves the previous stamp in place.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == TaskStatus::Completed {
            self.date_completed = Some(now);
        }
        self.notes.push(Note::status_changed(status, now));
    }

    pub fn defer(&mut self, to_week: u32, now: DateTime<Utc>) {
        self.notes.push(Note::deferred(self.due_week, to_week, now));
        self.status = TaskStatus::Deferred;
        self.deferred_to_week = Some(to_week);
    }

    /// Append a user note. Blank text is ignored; returns whether a note was added.
    pub fn add_note(&mut self, text: &str, now: DateTime<Utc>) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.notes.push(Note::user(text, now));
        true
    }

    pub fn move_to_week(&mut self, to_week: u32, now: DateTime<Utc>) {
        self.notes.push(Note::moved(self.due_week, to_week, now));
        self.due_week = to_week;
    }

    /// Apply `patch`, appending one edit note per field whose value actually
    /// changed. Returns the number of changed fields.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> usize {
        let mut changed = 0;

        if let Some(title) = patch.title {
            if title != self.title {
                self.notes
                    .push(Note::field_changed("Title", &quoted(&self.title), &quoted(&title), now));
                self.title = title;
                changed += 1;
            }
        }
        if let Some(description) = patch.description {
            if description != self.description {
                self.notes.push(Note::field_changed(
                    "Description",
                    &quoted(&self.description),
                    &quoted(&description),
                    now,
                ));
                self.description = description;
                changed += 1;
            }
        }
        if let Some(domain) = patch.domain {
            if domain != self.domain {
                self.notes.push(Note::field_changed(
                    "Domain",
                    self.domain.as_str(),
                    domain.as_str(),
                    now,
                ));
                self.domain = domain;
                changed += 1;
            }
        }
        if let Some(priority) = patch.priority {
            if priority != self.priority {
                self.notes.push(Note::field_changed(
                    "Priority",
                    self.priority.as_str(),
                    priority.as_str(),
                    now,
                ));
                self.priority = priority;
                changed += 1;
            }
        }
        if let Some(links) = patch.links {
            if links != self.links {
                self.notes.push(Note::field_changed(
                    "Links",
                    &link_count(self.links.len()),
                    &link_count(links.len()),
                    now,
                ));
                self.links = links;
                changed += 1;
            }
        }

        changed
    }
}

fn quoted(s: &str) -> String {
    format!("\"{s}\"")
}

fn link_count(n: usize) -> String {
    if n == 1 {
        "1 link".to_string()
    } else {
        format!("{n} links")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoteType;

    fn task() -> Task {
        Task::from_draft(
            "t1",
            TaskDraft {
                title: "Ship it".to_string(),
                domain: Domain::Technical,
                description: "desc".to_string(),
                priority: None,
                due_week: None,
            },
            5,
        )
    }

    #[test]
    fn draft_defaults() {
        let t = task();
        assert_eq!(t.status, TaskStatus::NotStarted);
        assert_eq!(t.priority, Priority::Normal);
        assert_eq!(t.due_week, 5);
        assert!(t.notes.is_empty());
        assert!(t.links.is_empty());
        assert!(t.custom);
    }

    #[test]
    fn completing_stamps_date_and_notes() {
        let mut t = task();
        let now = Utc::now();
        t.set_status(TaskStatus::Completed, now);
        assert_eq!(t.date_completed, Some(now));
        let last = t.notes.last().unwrap();
        assert_eq!(last.text, "Status changed to completed");
        assert_eq!(last.kind, NoteType::StatusChange);
    }

    #[test]
    fn leaving_completed_keeps_stale_date() {
        let mut t = task();
        let now = Utc::now();
        t.set_status(TaskStatus::Completed, now);
        t.set_status(TaskStatus::InProgress, now);
        assert_eq!(t.status, TaskStatus::InProgress);
        assert_eq!(t.date_completed, Some(now));
    }

    #[test]
    fn defer_records_weeks() {
        let mut t = task();
        t.defer(9, Utc::now());
        assert_eq!(t.status, TaskStatus::Deferred);
        assert_eq!(t.deferred_to_week, Some(9));
        assert_eq!(t.due_week, 5);
        assert_eq!(t.notes[0].text, "Deferred from week 5 to week 9");
    }

    #[test]
    fn blank_note_ignored() {
        let mut t = task();
        assert!(!t.add_note("   ", Utc::now()));
        assert!(t.add_note("  real note ", Utc::now()));
        assert_eq!(t.notes.len(), 1);
        assert_eq!(t.notes[0].text, "real note");
    }

    #[test]
    fn patch_only_notes_real_changes() {
        let mut t = task();
        let patch = TaskPatch {
            title: Some("Ship it".to_string()),
            priority: Some(Priority::High),
            domain: Some(Domain::Strategy),
            ..Default::default()
        };
        let changed = t.apply_patch(patch, Utc::now());
        assert_eq!(changed, 2);
        assert_eq!(t.notes.len(), 2);
        assert_eq!(t.notes[0].text, "Domain changed from technical to strategy");
        assert_eq!(t.notes[1].text, "Priority changed from normal to high");
        assert!(t.notes.iter().all(|n| n.kind == NoteType::Edit));
    }

    #[test]
    fn patch_quotes_text_fields() {
        let mut t = task();
        t.apply_patch(
            TaskPatch {
                title: Some("Ship v2".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(t.notes[0].text, "Title changed from \"Ship it\" to \"Ship v2\"");
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let json = r#"{"id":"x","title":"T","domain":"portfolio","status":"skipped","due_week":3}"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert!(t.deferred_to_week.is_none());
        assert!(t.notes.is_empty());
        assert!(!t.custom);
        assert_eq!(t.priority, Priority::Normal);
    }
}
