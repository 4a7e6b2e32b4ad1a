//! # Interaction Store
//!
//! Local save/dismiss state for one user, kept in sync with the remote
//! listing store.
//!
//! ## Write path
//! 1. Take the listing's async lock (one per listing id)
//! 2. Flip the local flag and mark the record pending
//! 3. Write to the store
//! 4. On success record the value as confirmed; on failure put the previous
//!    value back and return `EngineError::Interaction`
//!
//! Because the lock is taken before the current flag is read, a second
//! toggle on the same listing sees the settled result of the first one.
//! A write whose future is dropped before the store answers is rolled back
//! to the last confirmed value, the same as a failed one.
//!
//! View, click and apply signals are fire-and-forget: they are spawned on
//! the current runtime and their failures are only logged.

use crate::error::{EngineError, Result};
use catalog::{JobListing, ListingId, UserId};
use sources::{InteractionEvent, InteractionKind, InteractionTracker, ListingStore, SourceError};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tracing::{debug, info, instrument, warn};

/// Local and last-confirmed interaction state of one listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionRecord {
    pub listing_id: ListingId,
    pub saved: bool,
    pub dismissed: bool,
    /// A remote write for this listing is in flight
    pub pending: bool,
    /// Last values the remote store confirmed (rollback targets)
    pub remote_saved: bool,
    pub remote_dismissed: bool,
}

impl InteractionRecord {
    fn new(listing_id: &str) -> Self {
        Self {
            listing_id: listing_id.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Saved,
    Dismissed,
}

impl Flag {
    fn get(self, record: &InteractionRecord) -> bool {
        match self {
            Flag::Saved => record.saved,
            Flag::Dismissed => record.dismissed,
        }
    }

    fn remote(self, record: &InteractionRecord) -> bool {
        match self {
            Flag::Saved => record.remote_saved,
            Flag::Dismissed => record.remote_dismissed,
        }
    }

    fn set(self, record: &mut InteractionRecord, value: bool) {
        match self {
            Flag::Saved => record.saved = value,
            Flag::Dismissed => record.dismissed = value,
        }
    }

    fn confirm(self, record: &mut InteractionRecord, value: bool) {
        match self {
            Flag::Saved => record.remote_saved = value,
            Flag::Dismissed => record.remote_dismissed = value,
        }
    }

    fn action(self, value: bool) -> &'static str {
        match (self, value) {
            (Flag::Saved, true) => "save",
            (Flag::Saved, false) => "unsave",
            (Flag::Dismissed, true) => "dismiss",
            (Flag::Dismissed, false) => "undismiss",
        }
    }

    fn event_kind(self, value: bool) -> InteractionKind {
        match (self, value) {
            (Flag::Saved, true) => InteractionKind::Save,
            (Flag::Saved, false) => InteractionKind::Unsave,
            (Flag::Dismissed, true) => InteractionKind::Dismiss,
            (Flag::Dismissed, false) => InteractionKind::Undismiss,
        }
    }
}

/// An optimistic flip awaiting the store. Dropping it unsettled puts the
/// previous value back and clears `pending`.
struct PendingWrite<'a> {
    records: &'a Mutex<HashMap<ListingId, InteractionRecord>>,
    listing_id: &'a str,
    flag: Flag,
    value: bool,
    previous: bool,
    settled: bool,
}

impl PendingWrite<'_> {
    fn settle(mut self, outcome: &std::result::Result<(), SourceError>) {
        self.settled = true;
        let mut records = lock(self.records);
        let record = records
            .entry(self.listing_id.to_string())
            .or_insert_with(|| InteractionRecord::new(self.listing_id));
        record.pending = false;
        match outcome {
            Ok(()) => self.flag.confirm(record, self.value),
            Err(_) => self.flag.set(record, self.previous),
        }
    }
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(
            "Abandoned {} for {}, restoring last confirmed value",
            self.flag.action(self.value),
            self.listing_id
        );
        if let Some(record) = lock(self.records).get_mut(self.listing_id) {
            record.pending = false;
            self.flag.set(record, self.previous);
        }
    }
}

struct StoreInner {
    user_id: UserId,
    store: Arc<dyn ListingStore>,
    tracker: Arc<dyn InteractionTracker>,
    records: Mutex<HashMap<ListingId, InteractionRecord>>,
    locks: Mutex<HashMap<ListingId, Arc<tokio::sync::Mutex<()>>>>,
}

/// Optimistic save/dismiss state for one user. Cheap to clone.
#[derive(Clone)]
pub struct InteractionStore {
    inner: Arc<StoreInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InteractionStore {
    pub fn new(
        user_id: impl Into<UserId>,
        store: Arc<dyn ListingStore>,
        tracker: Arc<dyn InteractionTracker>,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                user_id: user_id.into(),
                store,
                tracker,
                records: Mutex::new(HashMap::new()),
                locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    /// Replace local state with the store's saved and dismissed lists
    #[instrument(skip(self), fields(user_id = %self.inner.user_id))]
    pub async fn rehydrate(&self) -> Result<()> {
        let stored = self
            .inner
            .store
            .load_interactions(&self.inner.user_id)
            .await
            .map_err(|e| EngineError::Rehydrate(e.to_string()))?;

        let mut records: HashMap<ListingId, InteractionRecord> = HashMap::new();
        for id in &stored.saved {
            let record = records
                .entry(id.clone())
                .or_insert_with(|| InteractionRecord::new(id));
            record.saved = true;
            record.remote_saved = true;
        }
        for id in &stored.dismissed {
            let record = records
                .entry(id.clone())
                .or_insert_with(|| InteractionRecord::new(id));
            record.dismissed = true;
            record.remote_dismissed = true;
        }

        info!(
            "Rehydrated {} saved and {} dismissed listings",
            stored.saved.len(),
            stored.dismissed.len()
        );
        *lock(&self.inner.records) = records;
        Ok(())
    }

    pub async fn save(&self, listing_id: &str) -> Result<()> {
        self.set_flag(listing_id, Flag::Saved, true).await
    }

    pub async fn unsave(&self, listing_id: &str) -> Result<()> {
        self.set_flag(listing_id, Flag::Saved, false).await
    }

    pub async fn dismiss(&self, listing_id: &str) -> Result<()> {
        self.set_flag(listing_id, Flag::Dismissed, true).await
    }

    pub async fn undismiss(&self, listing_id: &str) -> Result<()> {
        self.set_flag(listing_id, Flag::Dismissed, false).await
    }

    /// Flip the saved flag; returns the new value once the store confirmed it
    pub async fn toggle_save(&self, listing_id: &str) -> Result<bool> {
        let listing_lock = self.listing_lock(listing_id);
        let _guard = listing_lock.lock().await;

        let target = !self.is_saved(listing_id);
        self.write_locked(listing_id, Flag::Saved, target).await?;
        Ok(target)
    }

    async fn set_flag(&self, listing_id: &str, flag: Flag, value: bool) -> Result<()> {
        let listing_lock = self.listing_lock(listing_id);
        let _guard = listing_lock.lock().await;
        self.write_locked(listing_id, flag, value).await
    }

    /// Optimistic write; the caller holds the listing's lock
    #[instrument(skip(self))]
    async fn write_locked(&self, listing_id: &str, flag: Flag, value: bool) -> Result<()> {
        let pending = {
            let mut records = lock(&self.inner.records);
            let record = records
                .entry(listing_id.to_string())
                .or_insert_with(|| InteractionRecord::new(listing_id));
            if flag.remote(record) == value && flag.get(record) == value {
                debug!("{} already confirmed for {}", flag.action(value), listing_id);
                return Ok(());
            }
            let previous = flag.get(record);
            flag.set(record, value);
            record.pending = true;
            PendingWrite {
                records: &self.inner.records,
                listing_id,
                flag,
                value,
                previous,
                settled: false,
            }
        };

        let user_id = &self.inner.user_id;
        let outcome = match flag {
            Flag::Saved => self.inner.store.set_saved(user_id, listing_id, value).await,
            Flag::Dismissed => self.inner.store.set_dismissed(user_id, listing_id, value).await,
        };
        pending.settle(&outcome);

        match outcome {
            Ok(()) => {
                debug!("Confirmed {} for {}", flag.action(value), listing_id);
                self.emit(InteractionEvent::new(
                    user_id.clone(),
                    listing_id,
                    flag.event_kind(value),
                ));
                Ok(())
            }
            Err(e) => {
                warn!("Rolled back {} for {}: {}", flag.action(value), listing_id, e);
                Err(EngineError::interaction(listing_id, flag.action(value), e))
            }
        }
    }

    fn listing_lock(&self, listing_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        lock(&self.inner.locks)
            .entry(listing_id.to_string())
            .or_default()
            .clone()
    }

    pub fn track_view(&self, listing_id: &str, duration_ms: u64) {
        self.emit(
            InteractionEvent::new(self.inner.user_id.clone(), listing_id, InteractionKind::View)
                .with_duration(duration_ms),
        );
    }

    pub fn track_click(&self, listing_id: &str) {
        self.emit(InteractionEvent::new(
            self.inner.user_id.clone(),
            listing_id,
            InteractionKind::Click,
        ));
    }

    pub fn track_apply(&self, listing_id: &str) {
        self.emit(InteractionEvent::new(
            self.inner.user_id.clone(),
            listing_id,
            InteractionKind::Apply,
        ));
    }

    /// Send an analytics event in the background. Never retried.
    fn emit(&self, event: InteractionEvent) {
        let tracker = self.inner.tracker.clone();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let kind = event.kind;
                    let listing_id = event.listing_id.clone();
                    if let Err(e) = tracker.record(event).await {
                        warn!("Dropped {:?} event for {}: {}", kind, listing_id, e);
                    }
                });
            }
            Err(_) => warn!(
                "No async runtime, dropped {:?} event for {}",
                event.kind, event.listing_id
            ),
        }
    }

    /// Current flags of a listing (all false if never touched)
    pub fn flags(&self, listing_id: &str) -> InteractionRecord {
        lock(&self.inner.records)
            .get(listing_id)
            .cloned()
            .unwrap_or_else(|| InteractionRecord::new(listing_id))
    }

    pub fn is_saved(&self, listing_id: &str) -> bool {
        lock(&self.inner.records)
            .get(listing_id)
            .is_some_and(|r| r.saved)
    }

    pub fn is_dismissed(&self, listing_id: &str) -> bool {
        lock(&self.inner.records)
            .get(listing_id)
            .is_some_and(|r| r.dismissed)
    }

    pub fn is_pending(&self, listing_id: &str) -> bool {
        lock(&self.inner.records)
            .get(listing_id)
            .is_some_and(|r| r.pending)
    }

    pub fn saved_ids(&self) -> BTreeSet<ListingId> {
        lock(&self.inner.records)
            .values()
            .filter(|r| r.saved)
            .map(|r| r.listing_id.clone())
            .collect()
    }

    pub fn dismissed_ids(&self) -> BTreeSet<ListingId> {
        lock(&self.inner.records)
            .values()
            .filter(|r| r.dismissed)
            .map(|r| r.listing_id.clone())
            .collect()
    }

    /// `listings` without the dismissed ones, order kept
    pub fn visible(&self, listings: &[JobListing]) -> Vec<JobListing> {
        let records = lock(&self.inner.records);
        listings
            .iter()
            .filter(|l| !records.get(&l.id).is_some_and(|r| r.dismissed))
            .cloned()
            .collect()
    }
}
