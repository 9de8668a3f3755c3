use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{normalize_domain, CounterStore, StoreError};
use crate::config::DbConfig;
use crate::models::DomainEvent;

// ============================================================================
// PostgreSQL Counter Store
// ============================================================================
//
// The increment is a single upsert statement; Postgres row-level locking on
// the conflicting row makes concurrent increments for the same domain
// serialize without lost updates. Pool acquire timeout is the deadline
// mechanism and surfaces as `StoreError::Unavailable`.
//
// ============================================================================

pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    /// Connect a pool and make sure the events table exists. Called once at
    /// process start; the store handle is then shared for the process
    /// lifetime.
    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.keepalive)
            .connect(&config.url())
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            pool_size = config.pool_size,
            "Connected to PostgreSQL"
        );

        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS events (
                domain    TEXT PRIMARY KEY,
                delivered BIGINT NOT NULL DEFAULT 0,
                bounced   BIGINT NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Graceful teardown at process shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl CounterStore for PgCounterStore {
    async fn increment_or_create(
        &self,
        domain: &str,
        delivered_delta: u32,
        bounced_delta: u32,
    ) -> Result<(), StoreError> {
        let domain = normalize_domain(domain)?;

        sqlx::query(
            "INSERT INTO events (domain, delivered, bounced) VALUES ($1, $2, $3)
             ON CONFLICT (domain) DO UPDATE
             SET delivered = events.delivered + EXCLUDED.delivered,
                 bounced   = events.bounced + EXCLUDED.bounced",
        )
        .bind(&domain)
        .bind(i64::from(delivered_delta))
        .bind(i64::from(bounced_delta))
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            domain = %domain,
            delivered_delta = delivered_delta,
            bounced_delta = bounced_delta,
            "Applied counter increment"
        );

        Ok(())
    }

    async fn get(&self, domain: &str) -> Result<DomainEvent, StoreError> {
        let domain = normalize_domain(domain)?;

        let row: Option<(String, i64, i64)> =
            sqlx::query_as("SELECT domain, delivered, bounced FROM events WHERE domain = $1")
                .bind(&domain)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((domain, delivered, bounced)) => Ok(DomainEvent {
                domain,
                delivered,
                bounced,
            }),
            None => Err(StoreError::NotFound),
        }
    }
}

// Increment atomicity, upsert-vs-update behavior, and pool timeout mapping
// require a running PostgreSQL instance; they are exercised against the
// in-memory store here and belong in integration tests for the Pg backend.
