use std::collections::HashMap;

use tokio::sync::Mutex;

use super::{normalize_domain, CounterStore, StoreError};
use crate::models::DomainEvent;

// ============================================================================
// In-Memory Counter Store
// ============================================================================
//
// Backing implementation for tests and local development. The mutex
// serializes each read-modify-write, so it honors the same atomicity
// contract as the PostgreSQL store.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryCounterStore {
    records: Mutex<HashMap<String, (i64, i64)>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment_or_create(
        &self,
        domain: &str,
        delivered_delta: u32,
        bounced_delta: u32,
    ) -> Result<(), StoreError> {
        let domain = normalize_domain(domain)?;

        let mut records = self.records.lock().await;
        let (delivered, bounced) = records.entry(domain).or_insert((0, 0));
        *delivered += i64::from(delivered_delta);
        *bounced += i64::from(bounced_delta);

        Ok(())
    }

    async fn get(&self, domain: &str) -> Result<DomainEvent, StoreError> {
        let domain = normalize_domain(domain)?;

        let records = self.records.lock().await;
        match records.get(&domain) {
            Some(&(delivered, bounced)) => Ok(DomainEvent {
                domain,
                delivered,
                bounced,
            }),
            None => Err(StoreError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures_util::future::join_all;

    use super::*;

    #[tokio::test]
    async fn test_first_event_creates_record() {
        let store = InMemoryCounterStore::new();
        store.increment_or_create("a.com", 1, 0).await.unwrap();

        let event = store.get("a.com").await.unwrap();
        assert_eq!(event.delivered, 1);
        assert_eq!(event.bounced, 0);
    }

    #[tokio::test]
    async fn test_unseen_domain_is_not_found() {
        let store = InMemoryCounterStore::new();
        assert!(matches!(
            store.get("new.example").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_both_counters_accumulate_independently() {
        let store = InMemoryCounterStore::new();
        store.increment_or_create("a.com", 1, 0).await.unwrap();
        store.increment_or_create("a.com", 1, 0).await.unwrap();
        store.increment_or_create("a.com", 0, 1).await.unwrap();

        let event = store.get("a.com").await.unwrap();
        assert_eq!(event.delivered, 2);
        assert_eq!(event.bounced, 1);
    }

    #[tokio::test]
    async fn test_domain_casing_maps_to_one_record() {
        let store = InMemoryCounterStore::new();
        store.increment_or_create("A.COM", 1, 0).await.unwrap();
        store.increment_or_create("a.com", 1, 0).await.unwrap();

        let event = store.get("A.com").await.unwrap();
        assert_eq!(event.domain, "a.com");
        assert_eq!(event.delivered, 2);
    }

    #[tokio::test]
    async fn test_blank_domain_is_rejected_before_storage() {
        let store = InMemoryCounterStore::new();
        assert!(matches!(
            store.increment_or_create("  ", 1, 0).await,
            Err(StoreError::InvalidDomain)
        ));
        assert!(store.records.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryCounterStore::new());

        let delivered_writers = 100;
        let bounced_writers = 40;

        let mut tasks = Vec::new();
        for _ in 0..delivered_writers {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.increment_or_create("busy.example", 1, 0).await
            }));
        }
        for _ in 0..bounced_writers {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.increment_or_create("busy.example", 0, 1).await
            }));
        }

        for result in join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let event = store.get("busy.example").await.unwrap();
        assert_eq!(event.delivered, i64::from(delivered_writers));
        assert_eq!(event.bounced, i64::from(bounced_writers));
    }
}
