//! The synchronization engine's single owner of job state.
//!
//! [`JobTracker`] funnels every store mutation through one place so each
//! transition is atomic with respect to readers, the busy signal is
//! recomputed after each one, and the poller is started or stopped as
//! the active set empties and refills.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use zimage_core::job::{JobRecord, JobSnapshot};
use zimage_core::params::GenerationRequest;
use zimage_core::service::{JobService, ServiceError};
use zimage_core::types::JobId;

use crate::config::TrackerConfig;
use crate::events::TrackerEvent;
use crate::poller;
use crate::store::{JobStore, UpdateOutcome};

/// Broadcast channel capacity for tracker events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long shutdown waits for the poller task to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors surfaced by tracker operations.
///
/// Per-job poll failures are deliberately absent: they are logged and
/// the job is retried on the next tick without ever reaching a caller.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The generation request failed local validation; nothing was sent.
    #[error("invalid generation request: {0}")]
    InvalidRequest(#[from] validator::ValidationErrors),

    /// The backend rejected the submission; no record was created.
    #[error("submission failed: {0}")]
    Submission(#[source] ServiceError),

    /// The bulk history fetch failed; the store was left untouched.
    #[error("history fetch failed: {0}")]
    HistoryFetch(#[source] ServiceError),

    /// The remote delete failed; the local record was kept.
    #[error("deletion of job {id} failed: {source}")]
    Deletion {
        id: JobId,
        #[source]
        source: ServiceError,
    },
}

/// Handle to the live poller task, present only while at least one
/// tracked job is non-terminal.
struct PollerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Tracks generation jobs against a remote backend.
///
/// Create with [`JobTracker::new`]; the returned `Arc` can be cheaply
/// cloned into whatever surfaces consume it.
pub struct JobTracker {
    service: Arc<dyn JobService>,
    config: TrackerConfig,
    store: Mutex<JobStore>,
    busy_tx: watch::Sender<bool>,
    event_tx: broadcast::Sender<TrackerEvent>,
    poller: Mutex<Option<PollerHandle>>,
    /// Master cancellation token -- cancelled during shutdown.
    cancel: CancellationToken,
    /// Once set, late-settling results are dropped instead of applied.
    shut_down: AtomicBool,
}

impl JobTracker {
    /// Create a tracker that talks to `service`.
    pub fn new(service: Arc<dyn JobService>, config: TrackerConfig) -> Arc<Self> {
        let (busy_tx, _) = watch::channel(false);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Arc::new(Self {
            service,
            config,
            store: Mutex::new(JobStore::new()),
            busy_tx,
            event_tx,
            poller: Mutex::new(None),
            cancel: CancellationToken::new(),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Seed the store from the backend's full history.
    ///
    /// Called once at startup. A failure leaves the store untouched and
    /// the call is safe to repeat as a manual retry.
    pub async fn load_history(self: &Arc<Self>) -> Result<usize, TrackerError> {
        let snapshots = self
            .service
            .list_jobs(None)
            .await
            .map_err(TrackerError::HistoryFetch)?;

        let now = Utc::now();
        let records: Vec<JobRecord> = snapshots
            .into_iter()
            .map(|s| JobRecord::from_snapshot(s, now))
            .collect();
        let count = records.len();

        self.store.lock().await.seed(records);
        self.publish(TrackerEvent::HistoryLoaded { count });
        self.after_transition().await;

        tracing::info!(count, "Job history loaded");
        Ok(count)
    }

    /// Submit a generation request and optimistically track it.
    ///
    /// The acknowledgment may be sparse; a full-shape `Pending` record
    /// is synthesized and prepended so the newest job sorts first, and
    /// the poller picks it up without waiting for any server listing.
    pub async fn submit(
        self: &Arc<Self>,
        request: &GenerationRequest,
    ) -> Result<Arc<JobRecord>, TrackerError> {
        request.validate()?;

        let ack = self
            .service
            .submit(request)
            .await
            .map_err(TrackerError::Submission)?;

        let record = Arc::new(JobRecord::from_snapshot(ack, Utc::now()));
        let id = record.id.clone();

        let inserted = self.store.lock().await.insert_front(Arc::clone(&record));
        if inserted {
            tracing::info!(job_id = %id, "Job submitted and tracked");
            self.publish(TrackerEvent::JobInserted { id });
        } else {
            tracing::warn!(job_id = %id, "Acknowledgment for an already tracked job");
        }
        self.after_transition().await;

        Ok(record)
    }

    /// Delete a job remotely, then locally once the backend confirms.
    ///
    /// A failed remote delete keeps the local record, so the store never
    /// silently diverges from the backend.
    pub async fn remove(self: &Arc<Self>, id: &str) -> Result<(), TrackerError> {
        self.service
            .delete_job(id)
            .await
            .map_err(|source| TrackerError::Deletion {
                id: id.to_string(),
                source,
            })?;

        let removed = self.store.lock().await.remove(id);
        if removed {
            tracing::info!(job_id = %id, "Job deleted");
            self.publish(TrackerEvent::JobRemoved { id: id.to_string() });
        }
        self.after_transition().await;

        Ok(())
    }

    /// The current ordered view of all tracked jobs, newest first.
    pub async fn jobs(&self) -> Vec<Arc<JobRecord>> {
        self.store.lock().await.jobs()
    }

    /// Look up one tracked job.
    pub async fn get(&self, id: &str) -> Option<Arc<JobRecord>> {
        self.store.lock().await.get(id)
    }

    /// Whether any tracked job is still pending or processing.
    pub fn busy(&self) -> bool {
        *self.busy_tx.borrow()
    }

    /// Watch the derived busy signal.
    ///
    /// The value is re-pushed on every store transition, so receivers
    /// observe churn as well as flips; debounce on the consumer side if
    /// only flips matter.
    pub fn busy_signal(&self) -> watch::Receiver<bool> {
        self.busy_tx.subscribe()
    }

    /// Subscribe to store-transition events.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.event_tx.subscribe()
    }

    /// Whether the background poller is currently alive.
    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.task.is_finished())
    }

    /// Stop the poller and retire the engine.
    ///
    /// Any status fetch still in flight settles against the tombstone
    /// flag and is discarded rather than applied to a retired store.
    pub async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        self.cancel.cancel();

        let handle = self.poller.lock().await.take();
        if let Some(handle) = handle {
            handle.cancel.cancel();
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, handle.task)
                .await
                .is_err()
            {
                tracing::warn!("Poller task did not exit within the shutdown timeout");
            }
        }

        tracing::info!("Job tracker shut down");
    }

    // ---- poller internals ----

    /// Fixed interval between reconciliation ticks.
    pub(crate) fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    /// One reconciliation tick: fetch fresh status for every currently
    /// active job concurrently and merge whatever succeeded.
    ///
    /// The active set is re-read from the live store on every tick. An
    /// individual fetch failure is logged and swallowed -- the job stays
    /// eligible for the next tick -- and a result for an id deleted
    /// while the fetch was in flight is discarded.
    pub(crate) async fn poll_active_jobs(self: &Arc<Self>) {
        let ids = self.store.lock().await.active_ids();
        if ids.is_empty() {
            return;
        }

        tracing::debug!(active = ids.len(), "Polling active jobs");

        let fetches = ids.into_iter().map(|id| {
            let service = Arc::clone(&self.service);
            async move {
                let result = service.job_status(&id).await;
                (id, result)
            }
        });

        for (id, result) in futures::future::join_all(fetches).await {
            match result {
                Ok(snapshot) => self.apply_snapshot(snapshot).await,
                Err(e) => {
                    tracing::warn!(job_id = %id, error = %e, "Status fetch failed; will retry next tick");
                }
            }
        }
    }

    // ---- private helpers ----

    fn publish(&self, event: TrackerEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.event_tx.send(event);
    }

    /// Merge one fetched snapshot against the current store.
    async fn apply_snapshot(self: &Arc<Self>, snapshot: JobSnapshot) {
        if self.shut_down.load(Ordering::SeqCst) {
            return;
        }

        let outcome = self.store.lock().await.update(&snapshot);
        match outcome {
            UpdateOutcome::Changed(record) => {
                tracing::info!(job_id = %record.id, status = ?record.status, "Job updated");
                self.publish(TrackerEvent::JobUpdated {
                    id: record.id.clone(),
                    status: record.status,
                });
                self.after_transition().await;
            }
            UpdateOutcome::Unchanged => {}
            UpdateOutcome::Missing => {
                tracing::debug!(job_id = %snapshot.id, "Dropping status for a job no longer tracked");
            }
        }
    }

    /// Recompute the busy signal and resync the poller after a store
    /// transition. Idempotent: a burst of transitions starts at most
    /// one timer and cancels it at most once.
    ///
    /// The store lock is held across the push and the poller resync so
    /// that concurrent transitions cannot publish a stale busy value or
    /// leave an active job without a running poller.
    async fn after_transition(self: &Arc<Self>) {
        if self.shut_down.load(Ordering::SeqCst) {
            return;
        }

        let store = self.store.lock().await;
        let busy = store.has_active();
        // Pushed on every transition, not just on flips.
        self.busy_tx.send_replace(busy);
        self.sync_poller(busy).await;
        drop(store);
    }

    /// Start or stop the poller so that exactly one timer is alive while
    /// any job is active, and none otherwise.
    async fn sync_poller(self: &Arc<Self>, busy: bool) {
        let mut poller = self.poller.lock().await;

        // Reap a task that already exited on its own.
        if poller.as_ref().is_some_and(|h| h.task.is_finished()) {
            *poller = None;
        }

        if busy && poller.is_none() {
            let cancel = self.cancel.child_token();
            let task = self.spawn_poller(cancel.clone());
            *poller = Some(PollerHandle { cancel, task });
        } else if !busy {
            if let Some(handle) = poller.take() {
                handle.cancel.cancel();
            }
        }
    }

    /// Spawn the poller task.
    ///
    /// Kept non-`async` and separate from [`Self::sync_poller`] on
    /// purpose: `run` recurses back here through `sync_poller`, so if the
    /// spawn lived inside that async fn, `run`'s future type would embed
    /// itself and `Send` inference could never terminate. Boxing inside a
    /// synchronous helper erases the future to a concrete `Send` type and
    /// breaks the cycle.
    fn spawn_poller(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let fut: std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> =
            Box::pin(poller::run(Arc::clone(self), cancel));
        tokio::spawn(fut)
    }
}
