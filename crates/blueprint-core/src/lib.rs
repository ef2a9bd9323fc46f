pub mod command;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod note;
pub mod paths;
pub mod persist;
pub mod plan;
pub mod scheduler;
pub mod seed;
pub mod stats;
pub mod store;
pub mod task;
pub mod types;
pub mod weeks;

pub use error::{PlanError, Result};
