use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("malformed plan document: {0}")]
    MalformedDocument(#[source] serde_json::Error),

    #[error("invalid plan document: {0}")]
    InvalidDocument(String),

    #[error("failed to write plan to storage: {0}")]
    StorageWriteFailure(String),

    #[error("invalid status '{0}': expected one of not_started, in_progress, completed, skipped, deferred")]
    InvalidStatus(String),

    #[error("invalid domain '{0}': expected one of technical, strategy, leadership, credentials, networking, portfolio")]
    InvalidDomain(String),

    #[error("invalid priority '{0}': expected one of normal, high, critical")]
    InvalidPriority(String),

    #[error("invalid quarter '{0}': expected q1, q2, q3 or q4")]
    InvalidQuarter(String),

    #[error("home directory not found: set HOME or BLUEPRINT_HOME")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
