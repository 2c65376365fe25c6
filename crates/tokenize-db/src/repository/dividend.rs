//! # Dividend Repository
//!
//! Dividend distribution and history.
//!
//! ## Distribution Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  distribute(tax_id, revenue, rate)          (one transaction)          │
//! │                                                                         │
//! │  1. read current supply ── zero/absent? ──► NoTokensIssued, no row     │
//! │  2. read holders of the business                                       │
//! │  3. plan_distribution (pure math in tokenize-core)                     │
//! │  4. report each holder's payout via tracing  ◄── report only,          │
//! │  5. append ONE dividend_events row               never a wallet credit │
//! │                                                                         │
//! │  The event row is the only persisted effect; per-holder figures are    │
//! │  recomputed on demand from current balances (see recent_for_holder).   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::issuance::IssuanceRepository;
use tokenize_core::ledger::plan_distribution;
use tokenize_core::{
    DividendEvent, DividendRate, Holding, HolderDividend, HolderPayout, Money, TokenAmount,
};

/// Result of one distribution: the persisted event plus the per-holder
/// payout report.
#[derive(Debug, Clone)]
pub struct Distribution {
    pub event: DividendEvent,
    pub payouts: Vec<HolderPayout>,
}

/// Repository for dividend operations.
#[derive(Debug, Clone)]
pub struct DividendRepository {
    pool: SqlitePool,
}

impl DividendRepository {
    /// Creates a new DividendRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DividendRepository { pool }
    }

    /// Distributes dividends for a business.
    ///
    /// ## Preconditions
    /// An issuance row exists with supply > 0; otherwise fails with
    /// `NoTokensIssued` and appends nothing.
    ///
    /// Payouts are computed pro-rata per holder and *reported* (logged);
    /// only the aggregate event is persisted.
    pub async fn distribute(
        &self,
        tax_id: &str,
        revenue: Money,
        rate: DividendRate,
    ) -> DbResult<Distribution> {
        let mut tx = self.pool.begin().await?;

        let supply = IssuanceRepository::current_supply_on(&mut tx, tax_id).await?;

        let holders = sqlx::query_as::<_, Holding>(
            r#"
            SELECT owner, business_tax_id, balance_units
            FROM holdings
            WHERE business_tax_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(tax_id)
        .fetch_all(&mut *tx)
        .await?;

        let plan = plan_distribution(tax_id, supply, revenue, rate, &holders)
            .map_err(DbError::Ledger)?;

        for payout in &plan.payouts {
            info!(
                owner = %payout.owner,
                balance = %payout.balance(),
                payout = %payout.payout(),
                "Dividend payout"
            );
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO dividend_events
                (business_tax_id, distributed_at, total_revenue_cents,
                 dividend_pool_cents, token_price_micros)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(tax_id)
        .bind(now)
        .bind(revenue.cents())
        .bind(plan.pool.cents())
        .bind(plan.price.micros())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(tax_id = %tax_id, pool = %plan.pool, price = %plan.price, "Dividends distributed");

        Ok(Distribution {
            event: DividendEvent {
                id: result.last_insert_rowid(),
                business_tax_id: tax_id.to_string(),
                distributed_at: now,
                total_revenue_cents: revenue.cents(),
                dividend_pool_cents: plan.pool.cents(),
                token_price_micros: plan.price.micros(),
            },
            payouts: plan.payouts,
        })
    }

    /// Recent distributions as seen by one holder, newest first.
    ///
    /// The payout figure is *recomputed at query time* from the holder's
    /// current balance and the business's current supply, not from
    /// values frozen at distribution time; it therefore drifts after any
    /// later balance or supply change. Events where the holder's current
    /// balance (or the supply) is no longer positive are omitted.
    pub async fn recent_for_holder(
        &self,
        owner: &str,
        limit: u32,
    ) -> DbResult<Vec<HolderDividend>> {
        #[derive(sqlx::FromRow)]
        struct EventRow {
            tax_id: String,
            name: String,
            distributed_at: DateTime<Utc>,
            dividend_pool_cents: i64,
            balance_units: i64,
            supply_units: Option<i64>,
        }

        debug!(owner = %owner, limit = limit, "Loading dividend history");

        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT
                d.business_tax_id AS tax_id,
                b.name,
                d.distributed_at,
                d.dividend_pool_cents,
                h.balance_units,
                t.amount_units AS supply_units
            FROM dividend_events d
            INNER JOIN businesses b ON d.business_tax_id = b.tax_id
            INNER JOIN holdings h ON d.business_tax_id = h.business_tax_id
            LEFT JOIN token_issuances t ON d.business_tax_id = t.business_tax_id
            WHERE h.owner = ?1
            ORDER BY d.distributed_at DESC, d.id DESC
            LIMIT ?2
            "#,
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let dividends = rows
            .into_iter()
            .filter_map(|row| {
                let balance = TokenAmount::from_units(row.balance_units);
                let supply = TokenAmount::from_units(row.supply_units.unwrap_or(0));
                if !balance.is_positive() || !supply.is_positive() {
                    return None;
                }
                let pool = Money::from_cents(row.dividend_pool_cents);
                Some(HolderDividend {
                    tax_id: row.tax_id,
                    name: row.name,
                    distributed_at: row.distributed_at,
                    payout_cents: balance.share_of_pool(supply, pool).cents(),
                })
            })
            .collect();

        Ok(dividends)
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

    const SBER: &str = "7707083893";

    async fn db_with_issuance(whole_tokens: i64) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.businesses().register_or_update(SBER, "Sberbank").await.unwrap();
        if whole_tokens > 0 {
            db.issuances()
                .adjust(SBER, TokenAmount::from_whole(whole_tokens))
                .await
                .unwrap();
        }
        db
    }

    async fn event_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM dividend_events")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn distribution_without_issuance_fails_and_appends_nothing() {
        let db = db_with_issuance(0).await;

        let err = db
            .dividends()
            .distribute(SBER, Money::from_dollars(1_000), DividendRate::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Ledger(LedgerError::NoTokensIssued { .. })
        ));
        assert_eq!(event_count(&db).await, 0);
    }

    #[tokio::test]
    async fn distribution_with_zero_supply_fails() {
        let db = db_with_issuance(10).await;
        db.issuances()
            .adjust(SBER, TokenAmount::from_whole(-10))
            .await
            .unwrap();

        let err = db
            .dividends()
            .distribute(SBER, Money::from_dollars(1_000), DividendRate::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Ledger(LedgerError::NoTokensIssued { .. })
        ));
        assert_eq!(event_count(&db).await, 0);
    }

    #[tokio::test]
    async fn canonical_distribution() {
        // supply 100, revenue $1000, rate 10% → pool $100, price $1/token,
        // holder of 25 tokens reported $25.00
        let db = db_with_issuance(100).await;
        db.holdings()
            .credit("alice@example.com", SBER, TokenAmount::from_whole(25))
            .await
            .unwrap();

        let distribution = db
            .dividends()
            .distribute(SBER, Money::from_dollars(1_000), DividendRate::default())
            .await
            .unwrap();

        assert_eq!(distribution.event.dividend_pool().cents(), 10_000);
        assert_eq!(distribution.event.token_price().micros(), 1_000_000);
        assert_eq!(distribution.payouts.len(), 1);
        assert_eq!(distribution.payouts[0].payout_cents, 2_500);
        assert_eq!(event_count(&db).await, 1);
    }

    #[tokio::test]
    async fn history_recomputes_from_current_balances() {
        let db = db_with_issuance(100).await;
        db.holdings()
            .credit("alice@example.com", SBER, TokenAmount::from_whole(25))
            .await
            .unwrap();

        db.dividends()
            .distribute(SBER, Money::from_dollars(1_000), DividendRate::default())
            .await
            .unwrap();

        let history = db
            .dividends()
            .recent_for_holder("alice@example.com", 5)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].payout_cents, 2_500);

        // a later balance change shifts the reported historical figure -
        // preserved recomputation semantics
        db.holdings()
            .credit("alice@example.com", SBER, TokenAmount::from_whole(25))
            .await
            .unwrap();
        let history = db
            .dividends()
            .recent_for_holder("alice@example.com", 5)
            .await
            .unwrap();
        assert_eq!(history[0].payout_cents, 5_000);
    }

    #[tokio::test]
    async fn history_is_scoped_to_the_holder() {
        let db = db_with_issuance(100).await;
        db.holdings()
            .credit("alice@example.com", SBER, TokenAmount::from_whole(25))
            .await
            .unwrap();
        db.dividends()
            .distribute(SBER, Money::from_dollars(1_000), DividendRate::default())
            .await
            .unwrap();

        let history = db
            .dividends()
            .recent_for_holder("bob@example.com", 5)
            .await
            .unwrap();
        assert!(history.is_empty());
    }
}
