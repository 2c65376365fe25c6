//! # Holding Repository
//!
//! Per-user token balances, one row per (owner, business) pair.
//!
//! Holdings are credit-only: purchases deduct from the *issuance* side
//! and credit here. Rows are created lazily on first credit.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tokenize_core::ledger::{apply_holding_credit, HoldingChange};
use tokenize_core::{HoldingOverview, TokenAmount};

/// Repository for holding operations.
#[derive(Debug, Clone)]
pub struct HoldingRepository {
    pool: SqlitePool,
}

impl HoldingRepository {
    /// Creates a new HoldingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        HoldingRepository { pool }
    }

    /// Credits tokens to an owner's balance in a business.
    ///
    /// ## Rules (enforced via [`apply_holding_credit`])
    /// - `amount == 0` → no-op
    /// - `amount < 0` → `InvalidOperation` (holdings are never debited)
    /// - otherwise upsert: existing balance grows, missing row is created
    ///
    /// Returns the resulting balance.
    pub async fn credit(
        &self,
        owner: &str,
        tax_id: &str,
        amount: TokenAmount,
    ) -> DbResult<TokenAmount> {
        let mut tx = self.pool.begin().await?;
        let balance = Self::credit_on(&mut tx, owner, tax_id, amount).await?;
        tx.commit().await?;
        Ok(balance)
    }

    /// Credit against a caller-supplied connection (used inside the
    /// purchase transaction).
    pub(crate) async fn credit_on(
        conn: &mut SqliteConnection,
        owner: &str,
        tax_id: &str,
        amount: TokenAmount,
    ) -> DbResult<TokenAmount> {
        let current = Self::balance_on(conn, owner, tax_id).await?;

        match apply_holding_credit(current, amount).map_err(DbError::Ledger)? {
            HoldingChange::Unchanged => Ok(current.unwrap_or(TokenAmount::zero())),
            HoldingChange::Create(balance) => {
                debug!(owner = %owner, tax_id = %tax_id, balance = %balance, "Creating holding");
                sqlx::query(
                    r#"
                    INSERT INTO holdings (owner, business_tax_id, balance_units)
                    VALUES (?1, ?2, ?3)
                    "#,
                )
                .bind(owner)
                .bind(tax_id)
                .bind(balance.units())
                .execute(conn)
                .await?;
                Ok(balance)
            }
            HoldingChange::Update(balance) => {
                debug!(owner = %owner, tax_id = %tax_id, balance = %balance, "Updating holding");
                sqlx::query(
                    r#"
                    UPDATE holdings
                    SET balance_units = ?3
                    WHERE owner = ?1 AND business_tax_id = ?2
                    "#,
                )
                .bind(owner)
                .bind(tax_id)
                .bind(balance.units())
                .execute(conn)
                .await?;
                Ok(balance)
            }
        }
    }

    /// Current balance for one (owner, business) pair, `None` when the
    /// row doesn't exist yet.
    pub(crate) async fn balance_on(
        conn: &mut SqliteConnection,
        owner: &str,
        tax_id: &str,
    ) -> DbResult<Option<TokenAmount>> {
        let units: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT balance_units
            FROM holdings
            WHERE owner = ?1 AND business_tax_id = ?2
            "#,
        )
        .bind(owner)
        .bind(tax_id)
        .fetch_optional(conn)
        .await?;

        Ok(units.map(TokenAmount::from_units))
    }

    /// All of an owner's balances, joined with business names, in
    /// first-credit order.
    pub async fn holdings_of(&self, owner: &str) -> DbResult<Vec<HoldingOverview>> {
        let holdings = sqlx::query_as::<_, HoldingOverview>(
            r#"
            SELECT h.business_tax_id AS tax_id, b.name, h.balance_units
            FROM holdings h
            INNER JOIN businesses b ON h.business_tax_id = b.tax_id
            WHERE h.owner = ?1
            ORDER BY h.rowid
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(holdings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tokenize_core::LedgerError;

    async fn db_with_business(tax_id: &str, name: &str) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.businesses().register_or_update(tax_id, name).await.unwrap();
        db
    }

    #[tokio::test]
    async fn credit_round_trip_and_accumulation() {
        let db = db_with_business("7707083893", "Sberbank").await;
        let repo = db.holdings();

        let balance = repo
            .credit("alice@example.com", "7707083893", TokenAmount::from_whole(3))
            .await
            .unwrap();
        assert_eq!(balance, TokenAmount::from_whole(3));

        let holdings = repo.holdings_of("alice@example.com").await.unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].name, "Sberbank");
        assert_eq!(holdings[0].balance(), TokenAmount::from_whole(3));

        let balance = repo
            .credit("alice@example.com", "7707083893", TokenAmount::from_whole(2))
            .await
            .unwrap();
        assert_eq!(balance, TokenAmount::from_whole(5));

        let holdings = repo.holdings_of("alice@example.com").await.unwrap();
        assert_eq!(holdings[0].balance(), TokenAmount::from_whole(5));
    }

    #[tokio::test]
    async fn zero_credit_is_a_no_op() {
        let db = db_with_business("7707083893", "Sberbank").await;
        let repo = db.holdings();

        let balance = repo
            .credit("alice@example.com", "7707083893", TokenAmount::zero())
            .await
            .unwrap();
        assert_eq!(balance, TokenAmount::zero());
        assert!(repo.holdings_of("alice@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn negative_credit_is_rejected() {
        let db = db_with_business("7707083893", "Sberbank").await;

        let err = db
            .holdings()
            .credit("alice@example.com", "7707083893", TokenAmount::from_whole(-1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Ledger(LedgerError::InvalidOperation(_))
        ));
    }

    #[tokio::test]
    async fn holdings_are_per_owner() {
        let db = db_with_business("7707083893", "Sberbank").await;
        let repo = db.holdings();

        repo.credit("alice@example.com", "7707083893", TokenAmount::from_whole(3))
            .await
            .unwrap();
        repo.credit("bob@example.com", "7707083893", TokenAmount::from_whole(7))
            .await
            .unwrap();

        let alice = repo.holdings_of("alice@example.com").await.unwrap();
        assert_eq!(alice[0].balance(), TokenAmount::from_whole(3));
        let bob = repo.holdings_of("bob@example.com").await.unwrap();
        assert_eq!(bob[0].balance(), TokenAmount::from_whole(7));
    }
}
