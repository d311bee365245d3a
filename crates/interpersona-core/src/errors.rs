use crate::types::ThemeId;

/// Fatal failures of the assignment and report pipelines.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid input for user {user_id}: {reason}")]
    InvalidInput { user_id: String, reason: String },
    #[error("zero-norm {subject} vector in theme {theme}")]
    DegenerateVector { theme: ThemeId, subject: String },
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReportError {
    pub fn config(msg: impl Into<String>) -> Self {
        ReportError::Configuration(msg.into())
    }

    pub fn invalid(user_id: &str, reason: impl Into<String>) -> Self {
        ReportError::InvalidInput {
            user_id: user_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Content lookups that come back empty. Never fatal: callers substitute
/// the configured placeholder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("content not found: {0}")]
    NotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failure: {0}")]
    Io(String),
    #[error("corrupt stored report {0}")]
    Corrupt(String),
}

/// Structured check result for `ipr check --json`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckReport {
    pub file: String,
    pub version: String,
    pub pass: bool,
    pub errors: Vec<CheckIssue>,
    pub warnings: Vec<CheckIssue>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckIssue {
    pub code: String,
    pub check: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl CheckIssue {
    pub fn new(code: &str, check: &str, message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            check: check.to_string(),
            message: message.into(),
            path,
        }
    }
}
