//! The bundled 52-week plan that a fresh install (or a reset) starts from.

use crate::plan::Plan;
use std::sync::OnceLock;

const SEED_JSON: &str = include_str!("../seed/plan.json");

static SEED: OnceLock<Plan> = OnceLock::new();

/// A fresh deep copy of the seed plan.
pub fn plan() -> Plan {
    SEED.get_or_init(|| serde_json::from_str(SEED_JSON).expect("bundled seed plan is valid JSON"))
        .clone()
}
