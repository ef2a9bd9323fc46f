use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Technical,
    Strategy,
    Leadership,
    Credentials,
    Networking,
    Portfolio,
}

impl Domain {
    /// All domains in display order.
    pub fn all() -> &'static [Domain] {
        &[
            Domain::Technical,
            Domain::Strategy,
            Domain::Leadership,
            Domain::Credentials,
            Domain::Networking,
            Domain::Portfolio,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Technical => "technical",
            Domain::Strategy => "strategy",
            Domain::Leadership => "leadership",
            Domain::Credentials => "credentials",
            Domain::Networking => "networking",
            Domain::Portfolio => "portfolio",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Domain::Technical => "Technical",
            Domain::Strategy => "Strategy",
            Domain::Leadership => "Leadership",
            Domain::Credentials => "Credentials",
            Domain::Networking => "Networking",
            Domain::Portfolio => "Portfolio",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::all()
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| PlanError::InvalidDomain(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
    Skipped,
    Deferred,
}

impl TaskStatus {
    pub fn all() -> &'static [TaskStatus] {
        &[
            TaskStatus::NotStarted,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Skipped,
            TaskStatus::Deferred,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Deferred => "deferred",
        }
    }

    /// Statuses that no longer count against the schedule.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Skipped | TaskStatus::Deferred
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" | "not-started" => Ok(TaskStatus::NotStarted),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "skipped" => Ok(TaskStatus::Skipped),
            "deferred" => Ok(TaskStatus::Deferred),
            _ => Err(PlanError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(PlanError::InvalidPriority(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// NoteType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    User,
    StatusChange,
    Edit,
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoteType::User => "user",
            NoteType::StatusChange => "status_change",
            NoteType::Edit => "edit",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// QuarterId
// ---------------------------------------------------------------------------

/// The four fixed calendar quarters of the 52-week year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarterId {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl QuarterId {
    pub fn all() -> &'static [QuarterId] {
        &[QuarterId::Q1, QuarterId::Q2, QuarterId::Q3, QuarterId::Q4]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuarterId::Q1 => "q1",
            QuarterId::Q2 => "q2",
            QuarterId::Q3 => "q3",
            QuarterId::Q4 => "q4",
        }
    }

    /// Inclusive week range covered by the quarter.
    pub fn weeks(self) -> (u32, u32) {
        match self {
            QuarterId::Q1 => (1, 13),
            QuarterId::Q2 => (14, 26),
            QuarterId::Q3 => (27, 39),
            QuarterId::Q4 => (40, 52),
        }
    }

    pub fn contains(self, week: u32) -> bool {
        let (start, end) = self.weeks();
        week >= start && week <= end
    }

    /// Quarter a week falls into. Anything past week 39 lands in Q4.
    pub fn for_week(week: u32) -> QuarterId {
        match week {
            0..=13 => QuarterId::Q1,
            14..=26 => QuarterId::Q2,
            27..=39 => QuarterId::Q3,
            _ => QuarterId::Q4,
        }
    }
}

impl fmt::Display for QuarterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuarterId {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "q1" => Ok(QuarterId::Q1),
            "q2" => Ok(QuarterId::Q2),
            "q3" => Ok(QuarterId::Q3),
            "q4" => Ok(QuarterId::Q4),
            _ => Err(PlanError::InvalidQuarter(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
