use async_trait::async_trait;

use crate::models::DomainEvent;

mod memory;
mod postgres;

pub use memory::InMemoryCounterStore;
pub use postgres::PgCounterStore;

// ============================================================================
// Counter Store - durable, concurrency-safe per-domain counters
// ============================================================================
//
// The store is the sole mutator of domain counter records. Increments must
// behave as a single atomic read-modify-write per domain: concurrent calls
// for the same domain are all reflected in the final state.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("no record exists for domain")]
    NotFound,

    #[error("domain name must not be empty")]
    InvalidDomain,
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

/// Durable mapping from domain name to (delivered, bounced) counts.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add the given deltas to a domain's counters, creating the
    /// record if it does not exist yet. No partial effect on failure: either
    /// both counters update or neither does.
    async fn increment_or_create(
        &self,
        domain: &str,
        delivered_delta: u32,
        bounced_delta: u32,
    ) -> Result<(), StoreError>;

    /// Current counter snapshot for a domain. Returns `NotFound` for a
    /// domain with no record; callers treat that as a valid zero state.
    async fn get(&self, domain: &str) -> Result<DomainEvent, StoreError>;
}

/// Canonical form of a domain name used as the record key. Domain names are
/// case-insensitive, so lookups and increments must agree on casing.
pub fn normalize_domain(domain: &str) -> Result<String, StoreError> {
    let normalized = domain.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(StoreError::InvalidDomain);
    }
    Ok(normalized)
}
