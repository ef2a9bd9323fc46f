use crate::output::{print_json, print_table};
use crate::session::Session;
use anyhow::Context;
use blueprint_core::{
    command::Command,
    stats,
    task::{Task, TaskDraft, TaskPatch},
    types::{Domain, Priority, QuarterId, TaskStatus},
};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// List tasks, optionally filtered
    List {
        /// Only tasks due in this week
        #[arg(long)]
        week: Option<u32>,
        /// Only tasks in this quarter (q1..q4)
        #[arg(long)]
        quarter: Option<QuarterId>,
        /// Only tasks with this status
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Only tasks in this domain
        #[arg(long)]
        domain: Option<Domain>,
        /// Only overdue tasks, most overdue first
        #[arg(long)]
        overdue: bool,
    },
    /// Show full details for a single task, including its notes
    Show { id: String },
    /// Set a task's status (not_started, in_progress, completed, skipped, deferred)
    Status { id: String, status: TaskStatus },
    /// Defer a task to a later week
    Defer { id: String, week: u32 },
    /// Add a note to a task
    Note {
        id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Edit task fields (title, description, domain, priority)
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        domain: Option<Domain>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Add a custom task to a block
    Add {
        block: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        domain: Domain,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        priority: Option<Priority>,
        /// Due week (default: the block's first week)
        #[arg(long)]
        week: Option<u32>,
    },
    /// Delete a task
    Delete { id: String },
    /// Move a task to another week (and the block covering it)
    Move { id: String, week: u32 },
}

pub fn run(home: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::List {
            week,
            quarter,
            status,
            domain,
            overdue,
        } => list(
            home,
            &Filter {
                week,
                quarter,
                status,
                domain,
                overdue,
            },
            json,
        ),
        TaskSubcommand::Show { id } => show(home, &id, json),
        TaskSubcommand::Status { id, status } => set_status(home, &id, status, json),
        TaskSubcommand::Defer { id, week } => defer(home, &id, week, json),
        TaskSubcommand::Note { id, text } => note(home, &id, &text.join(" "), json),
        TaskSubcommand::Edit {
            id,
            title,
            description,
            domain,
            priority,
        } => {
            let patch = TaskPatch {
                title,
                description,
                domain,
                priority,
                links: None,
            };
            edit(home, &id, patch, json)
        }
        TaskSubcommand::Add {
            block,
            title,
            domain,
            description,
            priority,
            week,
        } => {
            let draft = TaskDraft {
                title,
                domain,
                description,
                priority,
                due_week: week,
            };
            add(home, &block, draft, json)
        }
        TaskSubcommand::Delete { id } => delete(home, &id, json),
        TaskSubcommand::Move { id, week } => move_task(home, &id, week, json),
    }
}

struct Filter {
    week: Option<u32>,
    quarter: Option<QuarterId>,
    status: Option<TaskStatus>,
    domain: Option<Domain>,
    overdue: bool,
}

impl Filter {
    fn matches(&self, task: &Task, current_week: u32) -> bool {
        self.week.map_or(true, |w| task.due_week == w)
            && self.quarter.map_or(true, |q| q.contains(task.due_week))
            && self.status.map_or(true, |s| task.status == s)
            && self.domain.map_or(true, |d| task.domain == d)
            && (!self.overdue || stats::is_overdue(task, current_week))
    }
}

fn list(home: &Path, filter: &Filter, json: bool) -> anyhow::Result<()> {
    let session = Session::open(home)?;
    let current_week = session.store.current_week();
    let mut tasks: Vec<&Task> = session
        .store
        .list_all_tasks()
        .into_iter()
        .filter(|t| filter.matches(t, current_week))
        .collect();
    if filter.overdue {
        tasks.sort_by_key(|t| t.due_week);
    }

    if json {
        print_json(&tasks)?;
    } else if tasks.is_empty() {
        println!("No tasks.");
    } else {
        let rows = tasks
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    t.due_week.to_string(),
                    t.status.to_string(),
                    t.domain.label().to_string(),
                    t.priority.to_string(),
                    t.title.clone(),
                ]
            })
            .collect();
        print_table(&["ID", "WEEK", "STATUS", "DOMAIN", "PRIORITY", "TITLE"], rows);
    }
    session.close();
    Ok(())
}

fn show(home: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let session = Session::open(home)?;
    let plan = session.store.plan();
    let task = plan
        .find_task(id)
        .with_context(|| format!("task '{id}' not found"))?;

    if json {
        print_json(task)?;
        return Ok(());
    }

    println!("[{}] {}", task.id, task.title);
    if let Some(block) = plan.block_of(id) {
        println!("Block:    {} ({})", block.title, block.week_label());
    }
    println!("Domain:   {}", task.domain.label());
    println!("Status:   {}", task.status);
    println!("Priority: {}", task.priority);
    println!("Due:      week {}", task.due_week);
    if let Some(week) = task.deferred_to_week {
        println!("Deferred: week {week}");
    }
    if let Some(at) = task.date_completed {
        println!("Completed {}", at.format("%Y-%m-%d %H:%M"));
    }
    if task.custom {
        println!("Custom:   yes");
    }
    if !task.description.is_empty() {
        println!();
        println!("{}", task.description);
    }
    if !task.notes.is_empty() {
        println!();
        println!("Notes:");
        for n in &task.notes {
            println!(
                "  {} [{}] {}",
                n.created_at.format("%Y-%m-%d %H:%M"),
                n.kind,
                n.text
            );
        }
    }
    Ok(())
}

/// Open a session and fail early when `id` names no task.
fn open_with_task(home: &Path, id: &str) -> anyhow::Result<Session> {
    let session = Session::open(home)?;
    if session.store.find_task(id).is_none() {
        anyhow::bail!("task '{id}' not found");
    }
    Ok(session)
}

fn check_week(week: u32) -> anyhow::Result<()> {
    if !blueprint_core::plan::is_plan_week(week) {
        anyhow::bail!("week must be between 1 and 52, got {week}");
    }
    Ok(())
}

fn set_status(home: &Path, id: &str, status: TaskStatus, json: bool) -> anyhow::Result<()> {
    let mut session = open_with_task(home, id)?;
    session.apply(Command::SetTaskStatus {
        task_id: id.to_string(),
        status,
    });
    session.close();

    if json {
        print_json(&serde_json::json!({ "task_id": id, "status": status }))?;
    } else {
        println!("Task [{id}] is now {status}");
    }
    Ok(())
}

fn defer(home: &Path, id: &str, week: u32, json: bool) -> anyhow::Result<()> {
    check_week(week)?;
    let mut session = open_with_task(home, id)?;
    session.apply(Command::DeferTask {
        task_id: id.to_string(),
        to_week: week,
    });
    session.close();

    if json {
        print_json(&serde_json::json!({ "task_id": id, "deferred_to_week": week }))?;
    } else {
        println!("Deferred task [{id}] to week {week}");
    }
    Ok(())
}

fn note(home: &Path, id: &str, text: &str, json: bool) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("note text is empty");
    }
    let mut session = open_with_task(home, id)?;
    session.apply(Command::AddNote {
        task_id: id.to_string(),
        text: text.to_string(),
    });
    session.close();

    if json {
        print_json(&serde_json::json!({ "task_id": id, "note": text.trim() }))?;
    } else {
        println!("Added note to task [{id}]");
    }
    Ok(())
}

fn edit(home: &Path, id: &str, patch: TaskPatch, json: bool) -> anyhow::Result<()> {
    if patch.is_empty() {
        anyhow::bail!("nothing to edit: pass --title, --description, --domain or --priority");
    }
    let mut session = open_with_task(home, id)?;
    let applied = session.apply(Command::UpdateTask {
        task_id: id.to_string(),
        patch,
    });
    let task = applied
        .plan
        .find_task(id)
        .cloned()
        .with_context(|| format!("task '{id}' not found"))?;
    session.close();

    if json {
        print_json(&task)?;
    } else if applied.changed {
        println!("Updated task [{id}]");
    } else {
        println!("Task [{id}] unchanged");
    }
    Ok(())
}

fn add(home: &Path, block: &str, draft: TaskDraft, json: bool) -> anyhow::Result<()> {
    if draft.title.trim().is_empty() {
        anyhow::bail!("task title is empty");
    }
    if let Some(week) = draft.due_week {
        check_week(week)?;
    }
    let mut session = Session::open(home)?;
    if session.store.plan().find_block(block).is_none() {
        anyhow::bail!("block '{block}' not found");
    }
    let title = draft.title.clone();
    let applied = session.apply(Command::AddTask {
        block_id: block.to_string(),
        draft,
    });
    session.close();

    let id = applied.created_id.context("task was not created")?;
    if json {
        print_json(&serde_json::json!({ "block_id": block, "task_id": id, "title": title }))?;
    } else {
        println!("Added task [{id}]: {title}");
    }
    Ok(())
}

fn delete(home: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut session = open_with_task(home, id)?;
    session.apply(Command::DeleteTask {
        task_id: id.to_string(),
    });
    session.close();

    if json {
        print_json(&serde_json::json!({ "task_id": id, "deleted": true }))?;
    } else {
        println!("Deleted task [{id}]");
    }
    Ok(())
}

fn move_task(home: &Path, id: &str, week: u32, json: bool) -> anyhow::Result<()> {
    check_week(week)?;
    let mut session = open_with_task(home, id)?;
    let applied = session.apply(Command::MoveTask {
        task_id: id.to_string(),
        to_week: week,
    });
    let block = applied
        .plan
        .block_of(id)
        .map(|b| b.id.clone())
        .unwrap_or_default();
    session.close();

    if json {
        print_json(&serde_json::json!({
            "task_id": id,
            "due_week": week,
            "block_id": block,
            "moved": applied.changed,
        }))?;
    } else if applied.changed {
        println!("Moved task [{id}] to week {week} ({block})");
    } else {
        println!("Task [{id}] not moved: the plan has no blocks");
    }
    Ok(())
}
