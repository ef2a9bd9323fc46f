use crate::error::{PlanError, Result};
use crate::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const WEEKS_IN_PLAN: u32 = 52;
pub const QUARTERS_IN_PLAN: usize = 4;

// ---------------------------------------------------------------------------
// Meta / Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub goal: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Anchor for all week arithmetic. Week 1 begins on this date.
    #[serde(
        rename = "startDate",
        default,
        deserialize_with = "blank_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub theme: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Date inputs clear to an empty string; treat that (and null) as unset.
fn blank_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Text fields accept any scalar, so `version: 2.0` reads as `"2.0"`.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

/// Shallow-merge `patch` into `target` by key, the way a settings form
/// submits only the fields it touched.
pub fn merge_fields<T>(target: &T, patch: &Map<String, Value>) -> Result<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let mut value = serde_json::to_value(target)?;
    if let Value::Object(fields) = &mut value {
        for (key, v) in patch {
            fields.insert(key.clone(), v.clone());
        }
    }
    Ok(serde_json::from_value(value)?)
}

// ---------------------------------------------------------------------------
// Quarter / Block / Milestone
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub title: String,
    pub week_range: (u32, u32),
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Block {
    pub fn contains_week(&self, week: u32) -> bool {
        let (start, end) = self.week_range;
        week >= start && week <= end
    }

    /// Distance from `week` to the nearest edge of the range; 0 when inside.
    pub fn distance_to(&self, week: u32) -> u32 {
        if self.contains_week(week) {
            return 0;
        }
        let (start, end) = self.week_range;
        start.abs_diff(week).min(end.abs_diff(week))
    }

    pub fn week_label(&self) -> String {
        let (start, end) = self.week_range;
        if start == end {
            format!("Week {start}")
        } else {
            format!("Weeks {start}-{end}")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quarter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub weeks: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Position of a task inside the nested tree: (quarter, block, task) indices.
pub type TaskLocation = (usize, usize, usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub settings: Settings,
    pub quarters: Vec<Quarter>,
}

impl Plan {
    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    /// Every task in quarter, then block, then task order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.quarters
            .iter()
            .flat_map(|q| q.blocks.iter())
            .flat_map(|b| b.tasks.iter())
    }

    pub fn list_all_tasks(&self) -> Vec<&Task> {
        self.tasks().collect()
    }

    /// Linear scan; there is no secondary index.
    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks().find(|t| t.id == id)
    }

    pub fn locate_task(&self, id: &str) -> Option<TaskLocation> {
        for (qi, quarter) in self.quarters.iter().enumerate() {
            for (bi, block) in quarter.blocks.iter().enumerate() {
                if let Some(ti) = block.tasks.iter().position(|t| t.id == id) {
                    return Some((qi, bi, ti));
                }
            }
        }
        None
    }

    pub fn find_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        let (qi, bi, ti) = self.locate_task(id)?;
        Some(&mut self.quarters[qi].blocks[bi].tasks[ti])
    }

    pub fn find_block(&self, id: &str) -> Option<&Block> {
        self.quarters
            .iter()
            .flat_map(|q| q.blocks.iter())
            .find(|b| b.id == id)
    }

    pub fn find_block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.quarters
            .iter_mut()
            .flat_map(|q| q.blocks.iter_mut())
            .find(|b| b.id == id)
    }

    /// The block containing `task_id`, if any.
    pub fn block_of(&self, task_id: &str) -> Option<&Block> {
        let (qi, bi, _) = self.locate_task(task_id)?;
        Some(&self.quarters[qi].blocks[bi])
    }

    /// Block that should hold a task due in `week`: the first block whose
    /// range contains it, else the block with the nearest range edge. Ties
    /// go to the block encountered first in quarter/block order.
    pub fn block_for_week(&self, week: u32) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), u32)> = None;
        for (qi, quarter) in self.quarters.iter().enumerate() {
            for (bi, block) in quarter.blocks.iter().enumerate() {
                let distance = block.distance_to(week);
                if distance == 0 {
                    return Some((qi, bi));
                }
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some(((qi, bi), distance));
                }
            }
        }
        best.map(|(pos, _)| pos)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Structural checks applied to documents coming from storage or import.
    /// Task weeks are not range-checked: the store places out-of-range weeks
    /// in the nearest block, and whatever it produces must load again.
    pub fn validate(&self) -> Result<()> {
        if self.quarters.len() != QUARTERS_IN_PLAN {
            return Err(PlanError::InvalidDocument(format!(
                "expected {QUARTERS_IN_PLAN} quarters, found {}",
                self.quarters.len()
            )));
        }

        let mut seen = HashSet::new();
        for quarter in &self.quarters {
            for block in &quarter.blocks {
                let (start, end) = block.week_range;
                if start < 1 || end > WEEKS_IN_PLAN || start > end {
                    return Err(PlanError::InvalidDocument(format!(
                        "block '{}' has invalid week_range [{start}, {end}]",
                        block.id
                    )));
                }
                for task in &block.tasks {
                    if !seen.insert(task.id.as_str()) {
                        return Err(PlanError::InvalidDocument(format!(
                            "duplicate task id '{}'",
                            task.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

pub fn is_plan_week(week: u32) -> bool {
    (1..=WEEKS_IN_PLAN).contains(&week)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use crate::types::Domain;

    fn block(id: &str, start: u32, end: u32, task_ids: &[&str]) -> Block {
        Block {
            id: id.to_string(),
            title: id.to_string(),
            week_range: (start, end),
            tasks: task_ids
                .iter()
                .map(|tid| {
                    Task::from_draft(
                        *tid,
                        TaskDraft {
                            title: tid.to_string(),
                            domain: Domain::Technical,
                            description: String::new(),
                            priority: None,
                            due_week: None,
                        },
                        start,
                    )
                })
                .collect(),
        }
    }

    fn quarter(id: &str, blocks: Vec<Block>) -> Quarter {
        Quarter {
            id: id.to_string(),
            name: id.to_uppercase(),
            weeks: String::new(),
            theme: String::new(),
            color: String::new(),
            blocks,
            milestones: Vec::new(),
        }
    }

    fn plan() -> Plan {
        Plan {
            meta: Meta::default(),
            settings: Settings::default(),
            quarters: vec![
                quarter("q1", vec![block("b1", 1, 4, &["a", "b"]), block("b2", 8, 13, &["c"])]),
                quarter("q2", vec![block("b3", 14, 26, &["d"])]),
                quarter("q3", vec![block("b4", 30, 39, &[])]),
                quarter("q4", vec![block("b5", 40, 52, &["e"])]),
            ],
        }
    }

    #[test]
    fn list_all_tasks_in_tree_order() {
        let p = plan();
        let ids: Vec<&str> = p.list_all_tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn find_and_locate() {
        let p = plan();
        assert_eq!(p.find_task("d").unwrap().id, "d");
        assert_eq!(p.locate_task("c"), Some((0, 1, 0)));
        assert!(p.find_task("zzz").is_none());
        assert_eq!(p.block_of("b").unwrap().id, "b1");
    }

    #[test]
    fn block_for_week_prefers_containing_block() {
        let p = plan();
        assert_eq!(p.block_for_week(2), Some((0, 0)));
        assert_eq!(p.block_for_week(20), Some((1, 0)));
    }

    #[test]
    fn block_for_week_falls_back_to_nearest() {
        let p = plan();
        // gap 5-7: week 5 is 1 from b1's end, 3 from b2's start
        assert_eq!(p.block_for_week(5), Some((0, 0)));
        assert_eq!(p.block_for_week(7), Some((0, 1)));
        // week 6 ties (2 and 2): first encountered wins
        assert_eq!(p.block_for_week(6), Some((0, 0)));
        // gap 27-29 sits nearest q3's block
        assert_eq!(p.block_for_week(29), Some((2, 0)));
        assert_eq!(p.block_for_week(60), Some((3, 0)));
    }

    #[test]
    fn block_for_week_without_blocks() {
        let mut p = plan();
        for q in &mut p.quarters {
            q.blocks.clear();
        }
        assert_eq!(p.block_for_week(3), None);
    }

    #[test]
    fn validate_accepts_well_formed() {
        plan().validate().unwrap();
    }

    #[test]
    fn validate_rejects_wrong_quarter_count() {
        let mut p = plan();
        p.quarters.pop();
        assert!(matches!(p.validate(), Err(PlanError::InvalidDocument(_))));
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut p = plan();
        let dup = p.quarters[0].blocks[0].tasks[0].clone();
        p.quarters[3].blocks[0].tasks.push(dup);
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate task id 'a'"));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut p = plan();
        p.quarters[1].blocks[0].week_range = (20, 14);
        assert!(p.validate().is_err());
    }

    #[test]
    fn validate_accepts_out_of_range_task_weeks() {
        let mut p = plan();
        p.quarters[0].blocks[0].tasks[0].due_week = 60;
        p.quarters[0].blocks[0].tasks[0].deferred_to_week = Some(0);
        p.validate().unwrap();
    }

    #[test]
    fn meta_text_fields_accept_scalars() {
        let m: Meta = serde_json::from_str(r#"{"goal":"Lead","version":2.0,"year":2025}"#).unwrap();
        assert_eq!(m.version.as_deref(), Some("2.0"));
        assert_eq!(m.goal.as_deref(), Some("Lead"));
        assert_eq!(m.extra["year"], 2025);

        let s: Settings = serde_json::from_str(r#"{"theme":true}"#).unwrap();
        assert_eq!(s.theme.as_deref(), Some("true"));

        assert!(serde_json::from_str::<Meta>(r#"{"goal":["a"]}"#).is_err());
    }

    #[test]
    fn settings_blank_start_date_is_unset() {
        let s: Settings = serde_json::from_str(r#"{"startDate":"","theme":"dark"}"#).unwrap();
        assert!(s.start_date.is_none());
        assert_eq!(s.theme.as_deref(), Some("dark"));
    }

    #[test]
    fn settings_keep_unknown_keys() {
        let s: Settings =
            serde_json::from_str(r#"{"startDate":"2025-01-06","density":"compact"}"#).unwrap();
        assert_eq!(s.start_date, NaiveDate::from_ymd_opt(2025, 1, 6));
        assert_eq!(s.extra["density"], "compact");
        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back["startDate"], "2025-01-06");
        assert_eq!(back["density"], "compact");
    }

    #[test]
    fn merge_fields_overrides_only_given_keys() {
        let settings = Settings {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 6),
            theme: Some("dark".to_string()),
            extra: Map::new(),
        };
        let mut patch = Map::new();
        patch.insert("theme".to_string(), Value::from("light"));
        let merged = merge_fields(&settings, &patch).unwrap();
        assert_eq!(merged.theme.as_deref(), Some("light"));
        assert_eq!(merged.start_date, settings.start_date);
    }

    #[test]
    fn week_range_serializes_as_pair() {
        let b = block("b", 3, 4, &[]);
        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["week_range"], serde_json::json!([3, 4]));
        assert_eq!(b.week_label(), "Weeks 3-4");
    }
}
