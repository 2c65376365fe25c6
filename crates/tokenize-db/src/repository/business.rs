//! # Business Repository
//!
//! Registry of businesses keyed by tax identifier.
//!
//! Registration is an idempotent upsert: first mention inserts the row,
//! later mentions overwrite the display name (never merge). Format
//! validation of the tax id happens in the front ends before the
//! repository is reached.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use tokenize_core::Business;

/// Repository for business registry operations.
#[derive(Debug, Clone)]
pub struct BusinessRepository {
    pool: SqlitePool,
}

impl BusinessRepository {
    /// Creates a new BusinessRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BusinessRepository { pool }
    }

    /// Registers a business or updates its display name.
    ///
    /// ## Behavior
    /// - no row with `tax_id` → insert
    /// - row exists → overwrite `name`
    ///
    /// No error conditions other than storage failures.
    pub async fn register_or_update(&self, tax_id: &str, name: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::register_or_update_on(&mut conn, tax_id, name).await
    }

    /// Upsert against a caller-supplied connection (used inside the
    /// register-and-issue flow's transaction).
    pub(crate) async fn register_or_update_on(
        conn: &mut SqliteConnection,
        tax_id: &str,
        name: &str,
    ) -> DbResult<()> {
        debug!(tax_id = %tax_id, "Registering business");

        sqlx::query(
            r#"
            INSERT INTO businesses (tax_id, name)
            VALUES (?1, ?2)
            ON CONFLICT (tax_id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(tax_id)
        .bind(name)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets a business by tax id.
    pub async fn get(&self, tax_id: &str) -> DbResult<Option<Business>> {
        let business = sqlx::query_as::<_, Business>(
            r#"
            SELECT tax_id, name
            FROM businesses
            WHERE tax_id = ?1
            "#,
        )
        .bind(tax_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
