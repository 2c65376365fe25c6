//! # Issuance Repository
//!
//! Mutations and queries over the outstanding token supply.
//!
//! ## Snapshot Semantics
//! `token_issuances` holds one row per business with the *current*
//! supply; every adjustment overwrites that row in place and refreshes
//! its timestamp. History is not kept here; dividend events carry
//! their own audit trail.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tokenize_core::ledger::{apply_issuance_delta, IssuanceChange};
use tokenize_core::{IssuanceOverview, IssuanceStats, LedgerError, TokenAmount};

/// Repository for token issuance operations.
#[derive(Debug, Clone)]
pub struct IssuanceRepository {
    pool: SqlitePool,
}

impl IssuanceRepository {
    /// Creates a new IssuanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        IssuanceRepository { pool }
    }

    /// Issues (positive delta) or deducts (negative delta) tokens.
    ///
    /// ## Rules (enforced via [`apply_issuance_delta`])
    /// - `delta == 0` → no-op: no storage touch, no timestamp refresh
    /// - no row yet: negative delta fails `InvalidOperation`, positive
    ///   delta creates the row
    /// - existing row: driving the total below zero fails
    ///   `InsufficientSupply { remaining }` and leaves state unchanged
    ///
    /// Runs in its own transaction; the read and the overwrite cannot
    /// interleave with another adjustment.
    pub async fn adjust(&self, tax_id: &str, delta: TokenAmount) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::adjust_on(&mut tx, tax_id, delta).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Adjustment against a caller-supplied connection (used inside the
    /// purchase and register-and-issue transactions).
    pub(crate) async fn adjust_on(
        conn: &mut SqliteConnection,
        tax_id: &str,
        delta: TokenAmount,
    ) -> DbResult<()> {
        let current = Self::current_supply_on(conn, tax_id).await?;

        match apply_issuance_delta(current, delta).map_err(DbError::Ledger)? {
            IssuanceChange::Unchanged => Ok(()),
            IssuanceChange::Create(total) => {
                debug!(tax_id = %tax_id, total = %total, "Creating issuance record");
                let now = Utc::now();
                sqlx::query(
                    r#"
                    INSERT INTO token_issuances (business_tax_id, amount_units, issued_at)
                    VALUES (?1, ?2, ?3)
                    "#,
                )
                .bind(tax_id)
                .bind(total.units())
                .bind(now)
                .execute(conn)
                .await?;
                Ok(())
            }
            IssuanceChange::Update(total) => {
                debug!(tax_id = %tax_id, total = %total, "Updating issuance record");
                let now = Utc::now();
                sqlx::query(
                    r#"
                    UPDATE token_issuances
                    SET amount_units = ?2, issued_at = ?3
                    WHERE business_tax_id = ?1
                    "#,
                )
                .bind(tax_id)
                .bind(total.units())
                .bind(now)
                .execute(conn)
                .await?;
                Ok(())
            }
        }
    }

    /// Current supply for a business, `None` when no row exists.
    pub(crate) async fn current_supply_on(
        conn: &mut SqliteConnection,
        tax_id: &str,
    ) -> DbResult<Option<TokenAmount>> {
        let units: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT amount_units
            FROM token_issuances
            WHERE business_tax_id = ?1
            "#,
        )
        .bind(tax_id)
        .fetch_optional(conn)
        .await?;

        Ok(units.map(TokenAmount::from_units))
    }

    /// Issuance details for one business, joined with its name.
    ///
    /// Fails with `NotFound` when the business has no issuance record.
    pub async fn stats(&self, tax_id: &str) -> DbResult<IssuanceStats> {
        let stats = sqlx::query_as::<_, IssuanceStats>(
            r#"
            SELECT b.tax_id, b.name, t.amount_units, t.issued_at
            FROM token_issuances t
            INNER JOIN businesses b ON t.business_tax_id = b.tax_id
            WHERE t.business_tax_id = ?1
            "#,
        )
        .bind(tax_id)
        .fetch_optional(&self.pool)
        .await?;

        stats.ok_or_else(|| {
            DbError::Ledger(LedgerError::NotFound {
                tax_id: tax_id.to_string(),
            })
        })
    }

    /// Lists every registered business with its issuance state.
    ///
    /// LEFT JOIN: businesses without an issuance row still appear, with
    /// `None` amount and timestamp. Ordered by business insertion order
    /// (`rowid`), which keeps the numbered company menus stable across
    /// calls within a session.
    pub async fn list_all(&self) -> DbResult<Vec<IssuanceOverview>> {
        let overviews = sqlx::query_as::<_, IssuanceOverview>(
            r#"
            SELECT b.tax_id, b.name, t.amount_units, t.issued_at
            FROM businesses b
            LEFT JOIN token_issuances t ON b.tax_id = t.business_tax_id
            ORDER BY b.rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(overviews)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db_with_business(tax_id: &str, name: &str) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.businesses().register_or_update(tax_id, name).await.unwrap();
        db
    }

    #[tokio::test]
    async fn first_positive_delta_creates_the_row() {
        let db = db_with_business("7707083893", "Sberbank").await;
        let repo = db.issuances();

        repo.adjust("7707083893", TokenAmount::from_whole(100))
            .await
            .unwrap();

        let stats = repo.stats("7707083893").await.unwrap();
        assert_eq!(stats.amount(), TokenAmount::from_whole(100));
        assert_eq!(stats.name, "Sberbank");
    }

    #[tokio::test]
    async fn deltas_accumulate_and_zero_is_a_no_op() {
        let db = db_with_business("7707083893", "Sberbank").await;
        let repo = db.issuances();

        repo.adjust("7707083893", TokenAmount::from_whole(100))
            .await
            .unwrap();
        let issued_at_before = repo.stats("7707083893").await.unwrap().issued_at;

        repo.adjust("7707083893", TokenAmount::zero()).await.unwrap();
        let stats = repo.stats("7707083893").await.unwrap();
        // no storage touch: timestamp must not have been refreshed
        assert_eq!(stats.issued_at, issued_at_before);

        repo.adjust("7707083893", TokenAmount::from_whole(-40))
            .await
            .unwrap();
        let stats = repo.stats("7707083893").await.unwrap();
        assert_eq!(stats.amount(), TokenAmount::from_whole(60));
    }

    #[tokio::test]
    async fn deduction_from_unissued_business_fails() {
        let db = db_with_business("7707083893", "Sberbank").await;

        let err = db
            .issuances()
            .adjust("7707083893", TokenAmount::from_whole(-1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Ledger(LedgerError::InvalidOperation(_))
        ));
    }

    #[tokio::test]
    async fn over_deduction_fails_and_leaves_supply_unchanged() {
        let db = db_with_business("7707083893", "Sberbank").await;
        let repo = db.issuances();

        repo.adjust("7707083893", TokenAmount::from_whole(10))
            .await
            .unwrap();

        let err = repo
            .adjust("7707083893", TokenAmount::from_whole(-11))
            .await
            .unwrap_err();
        match err {
            DbError::Ledger(LedgerError::InsufficientSupply { remaining }) => {
                assert_eq!(remaining, TokenAmount::from_whole(10));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let stats = repo.stats("7707083893").await.unwrap();
        assert_eq!(stats.amount(), TokenAmount::from_whole(10));
    }

    #[tokio::test]
    async fn failed_step_preserves_prior_steps() {
        // deltas +100, -30, then a violating -80: the first two persist
        let db = db_with_business("7707083893", "Sberbank").await;
        let repo = db.issuances();

        repo.adjust("7707083893", TokenAmount::from_whole(100))
            .await
            .unwrap();
        repo.adjust("7707083893", TokenAmount::from_whole(-30))
            .await
            .unwrap();
        repo.adjust("7707083893", TokenAmount::from_whole(-80))
            .await
            .unwrap_err();

        let stats = repo.stats("7707083893").await.unwrap();
        assert_eq!(stats.amount(), TokenAmount::from_whole(70));
    }

    #[tokio::test]
    async fn stats_for_unknown_business_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.issuances().stats("0000000000").await.unwrap_err();
        assert!(matches!(err, DbError::Ledger(LedgerError::NotFound { .. })));
    }

    #[tokio::test]
    async fn listing_includes_unissued_businesses_in_stable_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.businesses()
            .register_or_update("7707083893", "Sberbank")
            .await
            .unwrap();
        db.businesses()
            .register_or_update("770708389312", "Gazprom")
            .await
            .unwrap();
        db.issuances()
            .adjust("770708389312", TokenAmount::from_whole(5))
            .await
            .unwrap();

        let first = db.issuances().list_all().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].tax_id, "7707083893");
        assert!(first[0].amount_units.is_none());
        assert_eq!(first[1].tax_id, "770708389312");
        assert_eq!(first[1].available(), TokenAmount::from_whole(5));

        // stable across repeated calls with no intervening writes
        let second = db.issuances().list_all().await.unwrap();
        let order: Vec<_> = second.iter().map(|o| o.tax_id.clone()).collect();
        assert_eq!(order, vec!["7707083893", "770708389312"]);
    }
}
