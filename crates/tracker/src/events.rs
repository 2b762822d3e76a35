//! Events emitted by the tracker as the store changes.

use serde::Serialize;

use zimage_core::status::JobStatus;
use zimage_core::types::JobId;

/// A store transition worth telling consumers about.
///
/// `JobUpdated` fires only for records that actually changed; poll
/// ticks that merely confirm the status quo stay silent.
#[derive(Debug, Clone, Serialize)]
pub enum TrackerEvent {
    /// The store was seeded from the bulk history fetch.
    HistoryLoaded {
        /// Number of records now in the store.
        count: usize,
    },

    /// An optimistic record was inserted after a successful submission.
    JobInserted { id: JobId },

    /// A poll tick merged fresh data into a record.
    JobUpdated { id: JobId, status: JobStatus },

    /// A record was deleted remotely and locally.
    JobRemoved { id: JobId },
}
