//! Job entities and their wire-level representation.

use serde::{Deserialize, Serialize};

use crate::status::JobStatus;
use crate::types::{JobId, Timestamp};

/// A generation job as reported by the backend.
///
/// This is the shape shared by the submission acknowledgment, the bulk
/// history listing, and the per-job status endpoint. Only `id` is
/// guaranteed; everything else may be absent depending on how far the
/// job has progressed and how sparse the acknowledgment was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub negative_prompt: Option<String>,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub guidance: Option<f64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Relative URL of the finished image, e.g. `/images/<id>.png`.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Size of the finished image in bytes.
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl JobSnapshot {
    /// A minimal snapshot carrying only an id, as the submission
    /// interface guarantees nothing more.
    pub fn sparse(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            status: None,
            prompt: None,
            negative_prompt: None,
            seed: None,
            steps: None,
            guidance: None,
            width: None,
            height: None,
            image_url: None,
            error_message: None,
            file_size: None,
            created_at: None,
        }
    }
}

/// The locally tracked, full-shape record for one generation job.
///
/// Built from a [`JobSnapshot`] with defaults applied. Records are held
/// as `Arc<JobRecord>` by the store and only ever replaced wholesale by
/// the reconciliation step, so two pointer-equal records mean "nothing
/// changed".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    pub prompt: String,
    pub negative_prompt: String,
    pub seed: Option<i64>,
    pub steps: Option<u32>,
    pub guidance: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Set iff `status` is `Completed`.
    pub image_url: Option<String>,
    /// Set iff `status` is `Failed`.
    pub error_message: Option<String>,
    /// Known once `Completed`.
    pub file_size: Option<u64>,
    pub created_at: Timestamp,
}

impl JobRecord {
    /// Build a full-shape record from a possibly sparse snapshot.
    ///
    /// Missing fields get defaults: `status` falls back to `Pending`,
    /// prompts to the empty string, and `created_at` to `now`.
    pub fn from_snapshot(snapshot: JobSnapshot, now: Timestamp) -> Self {
        Self {
            id: snapshot.id,
            status: snapshot.status.unwrap_or(JobStatus::Pending),
            prompt: snapshot.prompt.unwrap_or_default(),
            negative_prompt: snapshot.negative_prompt.unwrap_or_default(),
            seed: snapshot.seed,
            steps: snapshot.steps,
            guidance: snapshot.guidance,
            width: snapshot.width,
            height: snapshot.height,
            image_url: snapshot.image_url,
            error_message: snapshot.error_message,
            file_size: snapshot.file_size,
            created_at: snapshot.created_at.unwrap_or(now),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
