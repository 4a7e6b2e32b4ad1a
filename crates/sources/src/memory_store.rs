//! In-memory document store and analytics sink.
//!
//! Serves the default feed from a `CatalogIndex` and keeps per-user
//! save/dismiss lists and recorded analytics events behind mutexes. Locks
//! are never held across an await point.

use crate::cursor::paginate;
use crate::error::SourceError;
use crate::traits::{InteractionTracker, ListingStore};
use crate::types::{InteractionEvent, SearchPage, UserInteractions};
use async_trait::async_trait;
use catalog::{CatalogIndex, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument};

pub struct MemoryStore {
    catalog: Arc<CatalogIndex>,
    interactions: Mutex<HashMap<UserId, UserInteractions>>,
    events: Mutex<Vec<InteractionEvent>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, SourceError> {
    mutex
        .lock()
        .map_err(|_| SourceError::Unavailable("store lock poisoned".to_string()))
}

impl MemoryStore {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self {
            catalog,
            interactions: Mutex::new(HashMap::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Seed the stored lists for a user
    pub fn with_interactions(self, user_id: impl Into<UserId>, interactions: UserInteractions) -> Self {
        if let Ok(mut map) = self.interactions.lock() {
            map.insert(user_id.into(), interactions);
        }
        self
    }

    /// Snapshot of the analytics events recorded so far
    pub fn recorded_events(&self) -> Vec<InteractionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn ensure_listing(&self, listing_id: &str) -> Result<(), SourceError> {
        if self.catalog.get_listing(listing_id).is_none() {
            return Err(SourceError::ListingNotFound(listing_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    #[instrument(skip(self))]
    async fn fetch_feed(&self, cursor: Option<&str>, page_size: usize) -> Result<SearchPage, SourceError> {
        let page = paginate(self.catalog.listings_by_recency(), cursor, page_size)?;
        debug!("Feed page with {} listings", page.listings.len());
        Ok(page)
    }

    async fn load_interactions(&self, user_id: &str) -> Result<UserInteractions, SourceError> {
        Ok(lock(&self.interactions)?.get(user_id).cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn set_saved(&self, user_id: &str, listing_id: &str, saved: bool) -> Result<(), SourceError> {
        self.ensure_listing(listing_id)?;
        let mut map = lock(&self.interactions)?;
        let entry = map.entry(user_id.to_string()).or_default();
        if saved {
            entry.saved.insert(listing_id.to_string());
        } else {
            entry.saved.remove(listing_id);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_dismissed(&self, user_id: &str, listing_id: &str, dismissed: bool) -> Result<(), SourceError> {
        self.ensure_listing(listing_id)?;
        let mut map = lock(&self.interactions)?;
        let entry = map.entry(user_id.to_string()).or_default();
        if dismissed {
            entry.dismissed.insert(listing_id.to_string());
        } else {
            entry.dismissed.remove(listing_id);
        }
        Ok(())
    }
}

#[async_trait]
impl InteractionTracker for MemoryStore {
    async fn record(&self, event: InteractionEvent) -> Result<(), SourceError> {
        debug!("Recorded {:?} on {}", event.kind, event.listing_id);
        lock(&self.events)?.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InteractionKind;
    use catalog::JobListing;

    fn create_store() -> MemoryStore {
        let listings = (0..5)
            .map(|i| JobListing::new(format!("j{}", i), "Job", "Acme", i as i64))
            .collect();
        MemoryStore::new(Arc::new(CatalogIndex::from_listings(listings).unwrap()))
    }

    #[tokio::test]
    async fn test_feed_is_newest_first() {
        let store = create_store();
        let page = store.fetch_feed(None, 3).await.unwrap();
        let ids: Vec<_> = page.listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["j4", "j3", "j2"]);
        assert!(page.next_cursor.is_some());
    }

    #[tokio::test]
    async fn test_save_and_dismiss_persist() {
        let store = create_store();
        store.set_saved("u1", "j1", true).await.unwrap();
        store.set_dismissed("u1", "j2", true).await.unwrap();
        store.set_saved("u1", "j3", true).await.unwrap();
        store.set_saved("u1", "j3", false).await.unwrap();

        let stored = store.load_interactions("u1").await.unwrap();
        assert_eq!(stored.saved.iter().collect::<Vec<_>>(), vec!["j1"]);
        assert!(stored.dismissed.contains("j2"));

        assert_eq!(store.load_interactions("u2").await.unwrap(), UserInteractions::default());
    }

    #[tokio::test]
    async fn test_unknown_listing_rejected() {
        let store = create_store();
        assert_eq!(
            store.set_saved("u1", "missing", true).await,
            Err(SourceError::ListingNotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_records_events() {
        let store = create_store();
        store
            .record(InteractionEvent::new("u1", "j1", InteractionKind::View).with_duration(1200))
            .await
            .unwrap();
        let events = store.recorded_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].duration_ms, Some(1200));
    }
}
