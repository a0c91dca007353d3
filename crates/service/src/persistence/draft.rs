use std::sync::Arc;
use std::time::Duration;

use models::{DraftRecord, UserType};
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::errors::StorageError;
use crate::persistence::record_store::RecordStore;
use crate::scheduler::{DeferredTask, Scheduler, TimerHandle};
use crate::storage::KeyValueStorage;

pub const DRAFT_KEY: &str = "caoa_form_draft";
pub const DRAFT_RETENTION: Duration = Duration::from_secs(60 * 60);
pub const DRAFT_DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
struct PendingDraft {
    handle: TimerHandle,
    username: String,
    user_type: UserType,
}

/// Session-scoped draft with debounced writes.
///
/// Each [`DraftStore::save`] replaces the pending value and restarts the
/// debounce timer; only the value pending when the timer fires is written.
pub struct DraftStore {
    record: RecordStore,
    scheduler: Arc<dyn Scheduler>,
    debounce: Duration,
    pending: Option<PendingDraft>,
}

impl DraftStore {
    pub fn new(record: RecordStore, scheduler: Arc<dyn Scheduler>, debounce: Duration) -> Self {
        Self { record, scheduler, debounce, pending: None }
    }

    /// Store with the default key, 1-hour retention and 1-second debounce.
    pub fn with_defaults(
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self::new(RecordStore::new(storage, DRAFT_KEY, DRAFT_RETENTION, clock), scheduler, DRAFT_DEBOUNCE)
    }

    /// Queue a write; supersedes any write still waiting out the debounce.
    pub fn save(&mut self, username: &str, user_type: UserType) -> TimerHandle {
        self.cancel_pending();
        let handle = self.scheduler.after(self.debounce, DeferredTask::FlushDraft);
        trace!(timer = handle.id(), "draft_write_scheduled");
        self.pending = Some(PendingDraft { handle, username: username.to_string(), user_type });
        handle
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Write the pending draft if `handle` is the current debounce timer.
    /// Stale handles are ignored and yield `Ok(None)`.
    pub async fn flush(&mut self, handle: TimerHandle) -> Result<Option<DraftRecord>, StorageError> {
        match &self.pending {
            Some(p) if p.handle == handle => {}
            _ => {
                trace!(timer = handle.id(), "stale draft timer ignored");
                return Ok(None);
            }
        }
        let Some(pending) = self.pending.take() else { return Ok(None) };
        let record = self.record.save(&pending.username, pending.user_type).await?;
        Ok(Some(record))
    }

    pub fn cancel_pending(&mut self) {
        if let Some(p) = self.pending.take() {
            self.scheduler.cancel(p.handle);
        }
    }

    pub async fn load(&self) -> Option<DraftRecord> {
        self.record.load().await
    }

    /// Remove the stored draft and drop any queued write.
    pub async fn clear(&mut self) -> Result<bool, StorageError> {
        self.cancel_pending();
        let existed = self.record.clear().await?;
        if existed {
            debug!("draft_cleared");
        }
        Ok(existed)
    }
}
