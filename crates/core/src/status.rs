//! Job lifecycle statuses.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a generation job.
///
/// Statuses progress monotonically: `Pending` -> `Processing` ->
/// `Completed` or `Failed`, with a direct `Pending` -> terminal jump
/// allowed. Once terminal, a job never transitions again, which is why
/// the poller only refreshes active jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Queued on the backend, not yet picked up by the worker.
    Pending,
    /// The worker is actively generating.
    Processing,
    /// Finished successfully; the image is available.
    Completed,
    /// Generation failed; an error message is available.
    Failed,
}

impl JobStatus {
    /// Whether this status is terminal (no further transition possible).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether the job still needs status polling.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn active_is_the_complement_of_terminal() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(status.is_active(), !status.is_terminal());
        }
    }

    #[test]
    fn wire_representation_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::from_str::<JobStatus>("\"completed\"").unwrap(),
            JobStatus::Completed
        );
    }
}
