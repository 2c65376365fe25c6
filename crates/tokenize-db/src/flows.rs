//! # Multi-Step Ledger Flows
//!
//! The two flows that touch more than one table run inside a single
//! transaction here, so a failure in the second step rolls back the
//! first:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  purchase(owner, tax_id, amount)                                       │
//! │     BEGIN                                                              │
//! │       issuance: supply -= amount   ── InsufficientSupply? ──► ROLLBACK │
//! │       holding:  balance += amount  ── any failure? ────────► ROLLBACK │
//! │     COMMIT                                                             │
//! │                                                                         │
//! │  register_and_issue(tax_id, name, amount)                              │
//! │     BEGIN                                                              │
//! │       business upsert                                                  │
//! │       issuance: supply += amount                                       │
//! │     COMMIT                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This keeps token conservation intact: at no observable point does
//! supply shrink without the matching holding growing, and the sum of
//! balances never exceeds the supply that was ever issued.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use crate::repository::business::BusinessRepository;
use crate::repository::holding::HoldingRepository;
use crate::repository::issuance::IssuanceRepository;
use tokenize_core::TokenAmount;

/// Transactional multi-step operations over the ledger.
#[derive(Debug, Clone)]
pub struct LedgerFlows {
    pool: SqlitePool,
}

impl LedgerFlows {
    /// Creates a new LedgerFlows handle.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerFlows { pool }
    }

    /// Buys `amount` tokens of a business for `owner`.
    ///
    /// Deducts from the business's supply and credits the owner's
    /// holding atomically. Returns the owner's new balance.
    ///
    /// ## Failure kinds
    /// - `InsufficientSupply { remaining }` when the business doesn't
    ///   have `amount` tokens outstanding
    /// - `InvalidOperation` when the business never issued tokens, or
    ///   when `amount` is negative
    ///
    /// On any failure the transaction rolls back; neither table changes.
    pub async fn purchase(
        &self,
        owner: &str,
        tax_id: &str,
        amount: TokenAmount,
    ) -> DbResult<TokenAmount> {
        let mut tx = self.pool.begin().await?;

        IssuanceRepository::adjust_on(&mut tx, tax_id, -amount).await?;
        let balance = HoldingRepository::credit_on(&mut tx, owner, tax_id, amount).await?;

        tx.commit().await?;

        info!(owner = %owner, tax_id = %tax_id, amount = %amount, balance = %balance,
            "Purchase completed");
        Ok(balance)
    }

    /// Registers (or re-registers) a business and issues tokens to it,
    /// atomically.
    ///
    /// The caller is expected to have verified the company against the
    /// registry first; this flow only touches the ledger.
    pub async fn register_and_issue(
        &self,
        tax_id: &str,
        name: &str,
        amount: TokenAmount,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        BusinessRepository::register_or_update_on(&mut tx, tax_id, name).await?;
        IssuanceRepository::adjust_on(&mut tx, tax_id, amount).await?;

        tx.commit().await?;

        info!(tax_id = %tax_id, name = %name, amount = %amount, "Issued tokens");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
