//! Events emitted by the completion poller.
//!
//! The command-line front end renders these as progress lines; tests
//! collect them to assert on the sequence of observed states.

use serde::Serialize;

use novagen_core::job::JobStatus;

/// A state change observed while polling one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PollEvent {
    /// A fetch returned; emitted on every tick, terminal or not.
    Progress {
        job_id: String,
        status: JobStatus,
        progress: String,
    },

    /// The job reached `DONE`.
    Completed {
        job_id: String,
        /// Remote image URLs (possibly empty).
        image_urls: Vec<String>,
    },

    /// The job reached `FAILED` or `ERROR`.
    Failed {
        job_id: String,
        status: JobStatus,
        progress: String,
    },
}
