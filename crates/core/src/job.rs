//! Job status as reported by the remote service.
//!
//! A job has no local storage of its own; it only exists in the body of
//! the latest fetch response. [`JobStatus`] is the case-normalized view of
//! that body's `status` field.

use serde::{Deserialize, Serialize};

/// Status string for a job waiting in the remote queue.
pub const STATUS_QUEUED: &str = "QUEUED";
/// Status string for a job currently rendering.
pub const STATUS_IN_PROGRESS: &str = "IN_PROGRESS";
/// Status string for a finished job.
pub const STATUS_DONE: &str = "DONE";
/// Status string for a job the remote gave up on.
pub const STATUS_FAILED: &str = "FAILED";
/// Status string for a job that errored out.
pub const STATUS_ERROR: &str = "ERROR";

/// Upper-cased job status.
///
/// Unrecognised values (including the empty string when no status field
/// was present) are kept verbatim in [`JobStatus::Other`] so they can be
/// echoed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    InProgress,
    Done,
    Failed,
    Error,
    Other(String),
}

impl JobStatus {
    /// Parse a raw status string, normalizing case and surrounding whitespace.
    pub fn from_raw(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        match upper.as_str() {
            STATUS_QUEUED => Self::Queued,
            STATUS_IN_PROGRESS => Self::InProgress,
            STATUS_DONE => Self::Done,
            STATUS_FAILED => Self::Failed,
            STATUS_ERROR => Self::Error,
            _ => Self::Other(upper),
        }
    }

    /// Wire representation (always upper case).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => STATUS_QUEUED,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Done => STATUS_DONE,
            Self::Failed => STATUS_FAILED,
            Self::Error => STATUS_ERROR,
            Self::Other(s) => s,
        }
    }

    /// `DONE`, `FAILED` and `ERROR` end polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Error)
    }

    /// Terminal and unsuccessful.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Error)
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        Self::from_raw(&raw)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_is_case_insensitive() {
        assert_eq!(JobStatus::from_raw("done"), JobStatus::Done);
        assert_eq!(JobStatus::from_raw("In_Progress"), JobStatus::InProgress);
        assert_eq!(JobStatus::from_raw(" queued "), JobStatus::Queued);
    }

    #[test]
    fn unknown_status_is_kept_upper_cased() {
        assert_eq!(
            JobStatus::from_raw("processing"),
            JobStatus::Other("PROCESSING".into())
        );
        assert_eq!(JobStatus::from_raw(""), JobStatus::Other(String::new()));
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(!JobStatus::Other("PROCESSING".into()).is_terminal());
    }

    #[test]
    fn failure_excludes_done() {
        assert!(!JobStatus::Done.is_failure());
        assert!(JobStatus::Failed.is_failure());
        assert!(JobStatus::Error.is_failure());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_value(JobStatus::InProgress).unwrap();
        assert_eq!(json, serde_json::json!("IN_PROGRESS"));

        let parsed: JobStatus = serde_json::from_value(serde_json::json!("failed")).unwrap();
        assert_eq!(parsed, JobStatus::Failed);
    }
}
