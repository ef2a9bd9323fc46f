use crate::command::Command;
use crate::plan::{merge_fields, Plan};
use crate::seed;
use crate::task::{Task, TaskDraft};
use crate::weeks::{self, Clock, SystemClock};
use chrono::{DateTime, Utc};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Applied
// ---------------------------------------------------------------------------

/// Result of dispatching a command.
#[derive(Debug, Clone)]
pub struct Applied {
    /// Snapshot after the command. Pointer-equal to the previous snapshot
    /// when nothing changed.
    pub plan: Arc<Plan>,
    pub changed: bool,
    /// Id generated by `AddTask`.
    pub created_id: Option<String>,
}

// ---------------------------------------------------------------------------
// PlanStore
// ---------------------------------------------------------------------------

/// Sole owner of the plan. Commands never touch an existing snapshot: each
/// one that changes something swaps in a fresh `Arc<Plan>`, so any snapshot
/// handed out earlier stays valid and unchanged.
pub struct PlanStore {
    current: Arc<Plan>,
    seed: Arc<Plan>,
    clock: Arc<dyn Clock>,
}

impl PlanStore {
    pub fn new(plan: Plan) -> Self {
        Self {
            current: Arc::new(plan),
            seed: Arc::new(seed::plan()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the plan that `Reset` restores.
    pub fn with_seed(mut self, seed: Plan) -> Self {
        self.seed = Arc::new(seed);
        self
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn plan(&self) -> &Plan {
        &self.current
    }

    pub fn snapshot(&self) -> Arc<Plan> {
        Arc::clone(&self.current)
    }

    pub fn list_all_tasks(&self) -> Vec<&Task> {
        self.current.list_all_tasks()
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.current.find_task(id)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn current_week(&self) -> u32 {
        weeks::current_week(self.current.settings.start_date, self.clock.now())
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    pub fn dispatch(&mut self, command: Command) -> Applied {
        let name = command.name();
        let now = self.clock.now();
        match reduce(&self.current, command, now, &self.seed) {
            Some(next) => {
                tracing::debug!(command = name, "plan updated");
                self.current = Arc::new(next.plan);
                Applied {
                    plan: self.snapshot(),
                    changed: true,
                    created_id: next.created_id,
                }
            }
            None => {
                tracing::debug!(command = name, "command had no effect");
                Applied {
                    plan: self.snapshot(),
                    changed: false,
                    created_id: None,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

struct Reduced {
    plan: Plan,
    created_id: Option<String>,
}

impl From<Plan> for Reduced {
    fn from(plan: Plan) -> Self {
        Self {
            plan,
            created_id: None,
        }
    }
}

/// Compute the plan that follows `command`, or `None` when the command
/// targets something absent or would change nothing.
fn reduce(plan: &Plan, command: Command, now: DateTime<Utc>, seed: &Plan) -> Option<Reduced> {
    match command {
        Command::SetTaskStatus { task_id, status } => update_task(plan, &task_id, |t| {
            t.set_status(status, now);
            true
        }),
        Command::DeferTask { task_id, to_week } => update_task(plan, &task_id, |t| {
            t.defer(to_week, now);
            true
        }),
        Command::AddNote { task_id, text } => {
            if text.trim().is_empty() {
                return None;
            }
            update_task(plan, &task_id, |t| t.add_note(&text, now))
        }
        Command::UpdateTask { task_id, patch } => {
            if patch.is_empty() {
                return None;
            }
            update_task(plan, &task_id, |t| t.apply_patch(patch, now) > 0)
        }
        Command::AddTask { block_id, draft } => add_task(plan, &block_id, draft),
        Command::DeleteTask { task_id } => {
            let (qi, bi, ti) = plan.locate_task(&task_id)?;
            let mut next = plan.clone();
            next.quarters[qi].blocks[bi].tasks.remove(ti);
            Some(next.into())
        }
        Command::MoveTask { task_id, to_week } => move_task(plan, &task_id, to_week, now),
        Command::UpdateSettings(fields) => {
            let settings = merge_fields(&plan.settings, &fields)
                .map_err(|e| tracing::warn!(error = %e, "ignoring settings update"))
                .ok()?;
            if settings == plan.settings {
                return None;
            }
            let mut next = plan.clone();
            next.settings = settings;
            Some(next.into())
        }
        Command::UpdateMeta(fields) => {
            let meta = merge_fields(&plan.meta, &fields)
                .map_err(|e| tracing::warn!(error = %e, "ignoring meta update"))
                .ok()?;
            if meta == plan.meta {
                return None;
            }
            let mut next = plan.clone();
            next.meta = meta;
            Some(next.into())
        }
        Command::ToggleMilestone {
            quarter_id,
            milestone_id,
        } => {
            let qi = plan.quarters.iter().position(|q| q.id == quarter_id)?;
            let mi = plan.quarters[qi]
                .milestones
                .iter()
                .position(|m| m.id == milestone_id)?;
            let mut next = plan.clone();
            let milestone = &mut next.quarters[qi].milestones[mi];
            milestone.completed = !milestone.completed;
            Some(next.into())
        }
        Command::ImportState(imported) => Some((*imported).into()),
        Command::Reset => Some(seed.clone().into()),
    }
}

fn update_task<F>(plan: &Plan, task_id: &str, f: F) -> Option<Reduced>
where
    F: FnOnce(&mut Task) -> bool,
{
    let (qi, bi, ti) = plan.locate_task(task_id)?;
    let mut next = plan.clone();
    if f(&mut next.quarters[qi].blocks[bi].tasks[ti]) {
        Some(next.into())
    } else {
        None
    }
}

fn add_task(plan: &Plan, block_id: &str, draft: TaskDraft) -> Option<Reduced> {
    let mut next = plan.clone();
    let block = next.find_block_mut(block_id)?;
    let id = new_task_id();
    let task = Task::from_draft(id.clone(), draft, block.week_range.0);
    block.tasks.push(task);
    Some(Reduced {
        plan: next,
        created_id: Some(id),
    })
}

/// Pull the task out of its block, restamp its week, and append it to the
/// block that should hold that week.
fn move_task(plan: &Plan, task_id: &str, to_week: u32, now: DateTime<Utc>) -> Option<Reduced> {
    let (qi, bi, ti) = plan.locate_task(task_id)?;
    let (tq, tb) = plan.block_for_week(to_week)?;
    let mut next = plan.clone();
    let mut task = next.quarters[qi].blocks[bi].tasks.remove(ti);
    task.move_to_week(to_week, now);
    next.quarters[tq].blocks[tb].tasks.push(task);
    Some(next.into())
}

pub fn new_task_id() -> String {
    format!("custom-{}", uuid::Uuid::new_v4().simple())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
