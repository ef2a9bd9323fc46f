use crate::plan::Plan;
use crate::task::{TaskDraft, TaskPatch};
use crate::types::TaskStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A mutation request against the plan. Every command is total: one that
/// names a task, block, quarter or milestone that does not exist leaves the
/// plan unchanged.
///
/// Serialized as `{"type": "SET_TASK_STATUS", "payload": {...}}` so a
/// front end can post commands as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    SetTaskStatus {
        task_id: String,
        status: TaskStatus,
    },
    DeferTask {
        task_id: String,
        to_week: u32,
    },
    AddNote {
        task_id: String,
        text: String,
    },
    UpdateTask {
        task_id: String,
        patch: TaskPatch,
    },
    AddTask {
        block_id: String,
        draft: TaskDraft,
    },
    DeleteTask {
        task_id: String,
    },
    MoveTask {
        task_id: String,
        to_week: u32,
    },
    UpdateSettings(Map<String, Value>),
    UpdateMeta(Map<String, Value>),
    ToggleMilestone {
        quarter_id: String,
        milestone_id: String,
    },
    ImportState(Box<Plan>),
    Reset,
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetTaskStatus { .. } => "set_task_status",
            Command::DeferTask { .. } => "defer_task",
            Command::AddNote { .. } => "add_note",
            Command::UpdateTask { .. } => "update_task",
            Command::AddTask { .. } => "add_task",
            Command::DeleteTask { .. } => "delete_task",
            Command::MoveTask { .. } => "move_task",
            Command::UpdateSettings(_) => "update_settings",
            Command::UpdateMeta(_) => "update_meta",
            Command::ToggleMilestone { .. } => "toggle_milestone",
            Command::ImportState(_) => "import_state",
            Command::Reset => "reset",
        }
    }
}
