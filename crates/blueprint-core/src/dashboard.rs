use crate::plan::Plan;
use crate::stats::{self, CompletionStats, DomainStats};
use crate::task::Task;
use crate::types::QuarterId;
use crate::weeks;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct QuarterSummary {
    pub id: QuarterId,
    pub name: String,
    #[serde(flatten)]
    pub stats: CompletionStats,
}

/// Everything the overview screen shows, computed in one pass over a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub goal: Option<String>,
    pub current_week: u32,
    pub week_starts: Option<NaiveDate>,
    pub year_progress: u32,
    pub overall: CompletionStats,
    pub quarters: Vec<QuarterSummary>,
    pub domains: Vec<DomainStats>,
    pub this_week: Vec<Task>,
    pub overdue: Vec<Task>,
}

impl Dashboard {
    pub fn build(plan: &Plan, now: DateTime<Utc>) -> Self {
        let start = plan.settings.start_date;
        let current_week = weeks::current_week(start, now);
        let tasks = plan.list_all_tasks();

        let quarters = QuarterId::all()
            .iter()
            .map(|&id| QuarterSummary {
                id,
                name: plan
                    .quarters
                    .iter()
                    .find(|q| q.id == id.as_str())
                    .map(|q| q.name.clone())
                    .unwrap_or_else(|| id.as_str().to_uppercase()),
                stats: stats::quarter_stats(&tasks, id),
            })
            .collect();

        Self {
            goal: plan.meta.goal.clone(),
            current_week,
            week_starts: weeks::week_date(start, current_week),
            year_progress: weeks::year_progress(current_week),
            overall: stats::completion_stats(&tasks),
            quarters,
            domains: stats::domain_stats(&tasks),
            this_week: stats::this_week_tasks(&tasks, current_week)
                .into_iter()
                .cloned()
                .collect(),
            overdue: stats::overdue_tasks(&tasks, current_week)
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}
