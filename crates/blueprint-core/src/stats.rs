//! Progress figures derived from a flat task list. Nothing here mutates.

use crate::plan::Block;
use crate::task::Task;
use crate::types::{Domain, QuarterId, TaskStatus};
use crate::weeks::round_percent;
use serde::Serialize;
use std::borrow::Borrow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionStats {
    /// Countable tasks: everything except skipped.
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomainStats {
    pub domain: Domain,
    #[serde(flatten)]
    pub stats: CompletionStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockProgress {
    pub completed: usize,
    pub total: usize,
}

fn as_task<T: Borrow<Task>>(t: &T) -> &Task {
    t.borrow()
}

pub fn completion_stats<T: Borrow<Task>>(tasks: &[T]) -> CompletionStats {
    let countable = tasks
        .iter()
        .filter(|t| as_task(*t).status != TaskStatus::Skipped)
        .count();
    let completed = tasks
        .iter()
        .filter(|t| as_task(*t).status == TaskStatus::Completed)
        .count();
    CompletionStats {
        total: countable,
        completed,
        percentage: round_percent(completed, countable),
    }
}

/// Completion over tasks due inside the quarter's fixed week range.
pub fn quarter_stats<T: Borrow<Task>>(tasks: &[T], quarter: QuarterId) -> CompletionStats {
    let in_quarter: Vec<&Task> = tasks
        .iter()
        .map(as_task)
        .filter(|t| quarter.contains(t.due_week))
        .collect();
    completion_stats(&in_quarter)
}

/// Completion per domain, in `Domain::all()` order.
pub fn domain_stats<T: Borrow<Task>>(tasks: &[T]) -> Vec<DomainStats> {
    Domain::all()
        .iter()
        .map(|&domain| {
            let of_domain: Vec<&Task> = tasks
                .iter()
                .map(as_task)
                .filter(|t| t.domain == domain)
                .collect();
            DomainStats {
                domain,
                stats: completion_stats(&of_domain),
            }
        })
        .collect()
}

pub fn is_overdue(task: &Task, current_week: u32) -> bool {
    task.due_week < current_week && !task.status.is_settled()
}

/// Open tasks whose week has passed, earliest first. Equal weeks keep
/// their original order.
pub fn overdue_tasks<T: Borrow<Task>>(tasks: &[T], current_week: u32) -> Vec<&Task> {
    let mut overdue: Vec<&Task> = tasks
        .iter()
        .map(as_task)
        .filter(|t| is_overdue(t, current_week))
        .collect();
    overdue.sort_by_key(|t| t.due_week);
    overdue
}

pub fn this_week_tasks<T: Borrow<Task>>(tasks: &[T], current_week: u32) -> Vec<&Task> {
    tasks
        .iter()
        .map(as_task)
        .filter(|t| t.due_week == current_week)
        .collect()
}

/// Raw completed/total counts for a block header.
pub fn block_progress(block: &Block) -> BlockProgress {
    BlockProgress {
        completed: block
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count(),
        total: block.tasks.len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;

    fn task(id: &str, due_week: u32, status: TaskStatus) -> Task {
        let mut t = Task::from_draft(
            id,
            TaskDraft {
                title: id.to_string(),
                domain: Domain::Technical,
                description: String::new(),
                priority: None,
                due_week: Some(due_week),
            },
            due_week,
        );
        t.status = status;
        t
    }

    #[test]
    fn skipped_tasks_are_not_countable() {
        let tasks = vec![
            task("a", 1, TaskStatus::Completed),
            task("b", 1, TaskStatus::Skipped),
            task("c", 1, TaskStatus::NotStarted),
        ];
        let stats = completion_stats(&tasks);
        assert_eq!(
            stats,
            CompletionStats {
                total: 2,
                completed: 1,
                percentage: 50
            }
        );
    }

    #[test]
    fn empty_list_is_zero_percent() {
        let tasks: Vec<Task> = Vec::new();
        assert_eq!(completion_stats(&tasks).percentage, 0);
        let all_skipped = vec![task("a", 1, TaskStatus::Skipped)];
        assert_eq!(completion_stats(&all_skipped).total, 0);
        assert_eq!(completion_stats(&all_skipped).percentage, 0);
    }

    #[test]
    fn quarter_stats_filters_by_fixed_range() {
        let tasks = vec![
            task("a", 3, TaskStatus::Completed),
            task("b", 15, TaskStatus::NotStarted),
            task("c", 40, TaskStatus::Completed),
        ];
        assert_eq!(
            quarter_stats(&tasks, QuarterId::Q1),
            CompletionStats {
                total: 1,
                completed: 1,
                percentage: 100
            }
        );
        assert_eq!(quarter_stats(&tasks, QuarterId::Q2).percentage, 0);
        assert_eq!(quarter_stats(&tasks, QuarterId::Q3).total, 0);
    }

    #[test]
    fn overdue_excludes_settled_and_future() {
        let tasks = vec![
            task("A", 5, TaskStatus::NotStarted),
            task("B", 5, TaskStatus::Completed),
            task("C", 12, TaskStatus::NotStarted),
        ];
        let ids: Vec<&str> = overdue_tasks(&tasks, 10).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["A"]);
    }

    #[test]
    fn overdue_sorted_stably_by_week() {
        let tasks = vec![
            task("late", 7, TaskStatus::InProgress),
            task("first", 2, TaskStatus::NotStarted),
            task("second", 2, TaskStatus::InProgress),
            task("deferred", 1, TaskStatus::Deferred),
            task("skipped", 1, TaskStatus::Skipped),
        ];
        let ids: Vec<&str> = overdue_tasks(&tasks, 8).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "late"]);
    }

    #[test]
    fn this_week_ignores_status() {
        let tasks = vec![
            task("a", 4, TaskStatus::Completed),
            task("b", 4, TaskStatus::Skipped),
            task("c", 5, TaskStatus::NotStarted),
        ];
        let ids: Vec<&str> = this_week_tasks(&tasks, 4).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn domain_stats_cover_every_domain() {
        let mut strategy = task("s", 2, TaskStatus::Completed);
        strategy.domain = Domain::Strategy;
        let tasks = vec![task("t", 2, TaskStatus::NotStarted), strategy];
        let stats = domain_stats(&tasks);
        assert_eq!(stats.len(), 6);
        assert_eq!(stats[0].domain, Domain::Technical);
        assert_eq!(stats[0].stats.percentage, 0);
        assert_eq!(stats[1].domain, Domain::Strategy);
        assert_eq!(stats[1].stats.percentage, 100);
        assert_eq!(stats[5].stats.total, 0);
    }

    #[test]
    fn block_progress_counts_raw() {
        let block = Block {
            id: "b".to_string(),
            title: "b".to_string(),
            week_range: (1, 2),
            tasks: vec![
                task("a", 1, TaskStatus::Completed),
                task("b", 1, TaskStatus::Skipped),
            ],
        };
        assert_eq!(
            block_progress(&block),
            BlockProgress {
                completed: 1,
                total: 2
            }
        );
    }
}
