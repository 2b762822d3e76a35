//! Ordered, id-keyed collection of tracked jobs.
//!
//! Insertion order is newest-first: optimistic inserts go to the front
//! and in-place updates never reorder. Records are held as
//! `Arc<JobRecord>` so that an unchanged merge keeps the exact
//! allocation a consumer may already hold.

use std::sync::Arc;

use zimage_core::job::{JobRecord, JobSnapshot};
use zimage_core::reconcile::reconcile;
use zimage_core::types::JobId;

/// Outcome of [`JobStore::update`].
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// No record with that id exists; the data was discarded.
    Missing,
    /// A record exists but none of the watched fields differed.
    Unchanged,
    /// The record was replaced with this merged copy.
    Changed(Arc<JobRecord>),
}

/// In-memory collection of job records, newest first.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Vec<Arc<JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection (startup seeding from the bulk fetch).
    pub fn seed(&mut self, records: Vec<JobRecord>) {
        self.jobs = records.into_iter().map(Arc::new).collect();
    }

    /// Prepend a record so the newest job sorts first.
    ///
    /// Returns `false` and leaves the store untouched when a record with
    /// the same id already exists -- ids are unique at all times.
    pub fn insert_front(&mut self, record: Arc<JobRecord>) -> bool {
        if self.jobs.iter().any(|j| j.id == record.id) {
            return false;
        }
        self.jobs.insert(0, record);
        true
    }

    /// Merge a fetched snapshot into the matching record, in place.
    ///
    /// A missing id is reported as [`UpdateOutcome::Missing`] and never
    /// inserted: a late result for a deleted job must not resurrect it.
    pub fn update(&mut self, snapshot: &JobSnapshot) -> UpdateOutcome {
        let Some(pos) = self.jobs.iter().position(|j| j.id == snapshot.id) else {
            return UpdateOutcome::Missing;
        };

        let merged = reconcile(&self.jobs[pos], snapshot);
        if Arc::ptr_eq(&merged, &self.jobs[pos]) {
            return UpdateOutcome::Unchanged;
        }

        self.jobs[pos] = Arc::clone(&merged);
        UpdateOutcome::Changed(merged)
    }

    /// Remove a record. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|j| j.id != id);
        self.jobs.len() != before
    }

    /// The current ordered sequence, newest first.
    pub fn jobs(&self) -> Vec<Arc<JobRecord>> {
        self.jobs.clone()
    }

    /// Look up one record.
    pub fn get(&self, id: &str) -> Option<Arc<JobRecord>> {
        self.jobs.iter().find(|j| j.id == id).cloned()
    }

    /// Ids of all records still awaiting a terminal status.
    pub fn active_ids(&self) -> Vec<JobId> {
        self.jobs
            .iter()
            .filter(|j| j.status.is_active())
            .map(|j| j.id.clone())
            .collect()
    }

    /// Whether any record is still pending or processing.
    pub fn has_active(&self) -> bool {
        self.jobs.iter().any(|j| j.status.is_active())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use zimage_core::status::JobStatus;

    fn record(id: &str, status: JobStatus) -> Arc<JobRecord> {
        Arc::new(JobRecord::from_snapshot(
            JobSnapshot {
                status: Some(status),
                ..JobSnapshot::sparse(id)
            },
            Utc::now(),
        ))
    }

    // -- Ordering --

    #[test]
    fn inserts_prepend_newest_first() {
        let mut store = JobStore::new();
        assert!(store.insert_front(record("a1", JobStatus::Pending)));
        assert!(store.insert_front(record("a2", JobStatus::Pending)));

        let ids: Vec<_> = store.jobs().iter().map(|j| j.id.clone()).collect();
        assert_eq!(ids, ["a2", "a1"]);
    }

    #[test]
    fn update_does_not_reorder() {
        let mut store = JobStore::new();
        store.insert_front(record("a1", JobStatus::Pending));
        store.insert_front(record("a2", JobStatus::Pending));

        let fresh = JobSnapshot {
            status: Some(JobStatus::Completed),
            image_url: Some("/images/a1.png".to_string()),
            ..JobSnapshot::sparse("a1")
        };
        assert!(matches!(store.update(&fresh), UpdateOutcome::Changed(_)));

        let ids: Vec<_> = store.jobs().iter().map(|j| j.id.clone()).collect();
        assert_eq!(ids, ["a2", "a1"]);
    }

    // -- Uniqueness --

    #[test]
    fn duplicate_insert_is_refused() {
        let mut store = JobStore::new();
        assert!(store.insert_front(record("a1", JobStatus::Pending)));
        assert!(!store.insert_front(record("a1", JobStatus::Processing)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a1").unwrap().status, JobStatus::Pending);
    }

    // -- Update outcomes --

    #[test]
    fn update_of_missing_id_is_discarded() {
        let mut store = JobStore::new();
        let outcome = store.update(&JobSnapshot::sparse("ghost"));
        assert!(matches!(outcome, UpdateOutcome::Missing));
        assert!(store.is_empty());
    }

    #[test]
    fn unchanged_update_keeps_the_same_allocation() {
        let mut store = JobStore::new();
        store.insert_front(record("a1", JobStatus::Pending));
        let before = store.get("a1").unwrap();

        let fresh = JobSnapshot {
            status: Some(JobStatus::Pending),
            ..JobSnapshot::sparse("a1")
        };
        assert!(matches!(store.update(&fresh), UpdateOutcome::Unchanged));

        let after = store.get("a1").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn changed_update_replaces_the_record() {
        let mut store = JobStore::new();
        store.insert_front(record("a1", JobStatus::Pending));
        let before = store.get("a1").unwrap();

        let fresh = JobSnapshot {
            status: Some(JobStatus::Processing),
            ..JobSnapshot::sparse("a1")
        };
        let UpdateOutcome::Changed(merged) = store.update(&fresh) else {
            panic!("expected a change");
        };

        assert!(!Arc::ptr_eq(&before, &merged));
        assert_eq!(store.get("a1").unwrap().status, JobStatus::Processing);
    }

    // -- Removal and activity --

    #[test]
    fn remove_reports_whether_anything_went_away() {
        let mut store = JobStore::new();
        store.insert_front(record("a1", JobStatus::Completed));

        assert!(store.remove("a1"));
        assert!(!store.remove("a1"));
        assert!(store.is_empty());
    }

    #[test]
    fn active_ids_skip_terminal_jobs() {
        let mut store = JobStore::new();
        store.insert_front(record("done", JobStatus::Completed));
        store.insert_front(record("failed", JobStatus::Failed));
        store.insert_front(record("waiting", JobStatus::Pending));
        store.insert_front(record("running", JobStatus::Processing));

        let mut active = store.active_ids();
        active.sort();
        assert_eq!(active, ["running", "waiting"]);
        assert!(store.has_active());
    }

    #[test]
    fn seed_replaces_everything() {
        let mut store = JobStore::new();
        store.insert_front(record("old", JobStatus::Pending));

        store.seed(vec![JobRecord::from_snapshot(
            JobSnapshot {
                status: Some(JobStatus::Completed),
                ..JobSnapshot::sparse("new")
            },
            Utc::now(),
        )]);

        assert_eq!(store.len(), 1);
        assert!(store.get("old").is_none());
        assert!(!store.has_active());
    }
}
