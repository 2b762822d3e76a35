//! The remote generation service seam.

use async_trait::async_trait;

use crate::job::JobSnapshot;
use crate::params::GenerationRequest;

/// Errors surfaced by a [`JobService`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced a response (network, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status code.
    #[error("service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Abstraction over the remote generation backend.
///
/// The synchronization engine only ever talks to the backend through
/// this trait, which keeps it testable against scripted implementations.
/// The production implementation is `zimage_studio::api::StudioClient`.
#[async_trait]
pub trait JobService: Send + Sync {
    /// Submit a new generation job.
    ///
    /// The returned acknowledgment is guaranteed to carry `id`; every
    /// other field is optional.
    async fn submit(&self, request: &GenerationRequest) -> Result<JobSnapshot, ServiceError>;

    /// Fetch the job history, newest first.
    async fn list_jobs(&self, limit: Option<u32>) -> Result<Vec<JobSnapshot>, ServiceError>;

    /// Fetch fresh status for a single job.
    async fn job_status(&self, id: &str) -> Result<JobSnapshot, ServiceError>;

    /// Delete a job on the backend.
    async fn delete_job(&self, id: &str) -> Result<(), ServiceError>;
}
