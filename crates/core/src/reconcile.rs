//! Merge policy for freshly fetched job status data.
//!
//! The poller feeds every fetched [`JobSnapshot`] through [`reconcile`]
//! against the currently stored record. The contract consumers rely on:
//! when none of the progress fields changed, the *same* `Arc` comes
//! back, so `Arc::ptr_eq` doubles as a no-op check and nothing
//! downstream re-renders or re-propagates.

use std::sync::Arc;

use crate::job::{JobRecord, JobSnapshot};

/// Merge a fetched snapshot into the stored record.
///
/// The decision looks at the four fields that move while a job runs:
/// `status`, `image_url`, `file_size`, `error_message`. If none of them
/// differ, the original `Arc` is returned untouched. Otherwise a new
/// record is built by overlaying every field the snapshot reports onto
/// the stored record; a `None` in the snapshot means "not reported" and
/// preserves the stored value.
pub fn reconcile(current: &Arc<JobRecord>, fresh: &JobSnapshot) -> Arc<JobRecord> {
    if !differs(current, fresh) {
        return Arc::clone(current);
    }
    Arc::new(merge(current, fresh))
}

/// Whether any watched field the snapshot reports differs from the
/// stored record.
fn differs(current: &JobRecord, fresh: &JobSnapshot) -> bool {
    fresh.status.is_some_and(|s| s != current.status)
        || fresh
            .image_url
            .as_ref()
            .is_some_and(|u| current.image_url.as_deref() != Some(u.as_str()))
        || fresh.file_size.is_some_and(|s| current.file_size != Some(s))
        || fresh
            .error_message
            .as_ref()
            .is_some_and(|m| current.error_message.as_deref() != Some(m.as_str()))
}

/// Overlay the snapshot's reported fields onto the stored record.
fn merge(current: &JobRecord, fresh: &JobSnapshot) -> JobRecord {
    JobRecord {
        id: current.id.clone(),
        status: fresh.status.unwrap_or(current.status),
        prompt: fresh
            .prompt
            .clone()
            .unwrap_or_else(|| current.prompt.clone()),
        negative_prompt: fresh
            .negative_prompt
            .clone()
            .unwrap_or_else(|| current.negative_prompt.clone()),
        seed: fresh.seed.or(current.seed),
        steps: fresh.steps.or(current.steps),
        guidance: fresh.guidance.or(current.guidance),
        width: fresh.width.or(current.width),
        height: fresh.height.or(current.height),
        image_url: fresh.image_url.clone().or_else(|| current.image_url.clone()),
        error_message: fresh
            .error_message
            .clone()
            .or_else(|| current.error_message.clone()),
        file_size: fresh.file_size.or(current.file_size),
        created_at: fresh.created_at.unwrap_or(current.created_at),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::JobStatus;
    use chrono::Utc;

    fn stored_pending(id: &str) -> Arc<JobRecord> {
        Arc::new(JobRecord::from_snapshot(
            JobSnapshot {
                status: Some(JobStatus::Pending),
                prompt: Some("a red fox".to_string()),
                seed: Some(42),
                ..JobSnapshot::sparse(id)
            },
            Utc::now(),
        ))
    }

    // -- Identity preservation --

    #[test]
    fn unchanged_snapshot_returns_the_same_allocation() {
        let current = stored_pending("a1");
        let fresh = JobSnapshot {
            status: Some(JobStatus::Pending),
            ..JobSnapshot::sparse("a1")
        };

        let merged = reconcile(&current, &fresh);
        assert!(Arc::ptr_eq(&current, &merged));
    }

    #[test]
    fn unwatched_field_drift_does_not_break_identity() {
        // Only status / image_url / file_size / error_message are
        // compared; a differing prompt alone is not a change.
        let current = stored_pending("a1");
        let fresh = JobSnapshot {
            status: Some(JobStatus::Pending),
            prompt: Some("something else entirely".to_string()),
            ..JobSnapshot::sparse("a1")
        };

        let merged = reconcile(&current, &fresh);
        assert!(Arc::ptr_eq(&current, &merged));
    }

    #[test]
    fn unreported_fields_cannot_differ() {
        let current = stored_pending("a1");
        let merged = reconcile(&current, &JobSnapshot::sparse("a1"));
        assert!(Arc::ptr_eq(&current, &merged));
    }

    // -- Change detection per watched field --

    #[test]
    fn status_change_produces_a_new_record() {
        let current = stored_pending("a1");
        let fresh = JobSnapshot {
            status: Some(JobStatus::Processing),
            ..JobSnapshot::sparse("a1")
        };

        let merged = reconcile(&current, &fresh);
        assert!(!Arc::ptr_eq(&current, &merged));
        assert_eq!(merged.status, JobStatus::Processing);
    }

    #[test]
    fn completion_merges_image_and_file_size() {
        let current = stored_pending("a1");
        let fresh = JobSnapshot {
            status: Some(JobStatus::Completed),
            image_url: Some("/images/a1.png".to_string()),
            file_size: Some(2048),
            ..JobSnapshot::sparse("a1")
        };

        let merged = reconcile(&current, &fresh);
        assert_eq!(merged.status, JobStatus::Completed);
        assert_eq!(merged.image_url.as_deref(), Some("/images/a1.png"));
        assert_eq!(merged.file_size, Some(2048));
        // Fields the snapshot did not report survive the merge.
        assert_eq!(merged.prompt, "a red fox");
        assert_eq!(merged.seed, Some(42));
        assert_eq!(merged.created_at, current.created_at);
    }

    #[test]
    fn failure_merges_error_message() {
        let current = stored_pending("a1");
        let fresh = JobSnapshot {
            status: Some(JobStatus::Failed),
            error_message: Some("CUDA out of memory".to_string()),
            ..JobSnapshot::sparse("a1")
        };

        let merged = reconcile(&current, &fresh);
        assert_eq!(merged.status, JobStatus::Failed);
        assert_eq!(merged.error_message.as_deref(), Some("CUDA out of memory"));
        assert_eq!(merged.image_url, None);
    }

    #[test]
    fn file_size_alone_is_a_change() {
        let current = stored_pending("a1");
        let fresh = JobSnapshot {
            file_size: Some(100),
            ..JobSnapshot::sparse("a1")
        };

        let merged = reconcile(&current, &fresh);
        assert!(!Arc::ptr_eq(&current, &merged));
        assert_eq!(merged.file_size, Some(100));
        // Status was not reported, so it is preserved.
        assert_eq!(merged.status, JobStatus::Pending);
    }
}
