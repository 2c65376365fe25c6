//! # Domain Types
//!
//! Core domain types used throughout TokenizeLocal.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Business     │   │    Issuance     │   │     Holding     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  tax_id (PK)    │◄──│  business (FK)  │   │  owner          │       │
//! │  │  name           │   │  amount_units   │   │  business (FK)  │       │
//! │  └─────────────────┘   │  issued_at      │   │  balance_units  │       │
//! │          ▲             └─────────────────┘   └─────────────────┘       │
//! │          │             ┌─────────────────┐   ┌─────────────────┐       │
//! │          └─────────────│  DividendEvent  │   │   UserAccount   │       │
//! │                        │  (append-only)  │   │  identity (UQ)  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage fields are primitives (`*_units`, `*_cents`, `*_micros`) so the
//! database layer can map rows directly; typed accessors return the
//! fixed-point wrappers from [`crate::amount`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::{Money, TokenAmount, TokenPrice};

// =============================================================================
// Business
// =============================================================================

/// A registered business, keyed by its tax identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Business {
    /// Tax identifier: 10 or 12 ASCII digits, unique.
    pub tax_id: String,

    /// Display name. Overwritten on re-registration.
    pub name: String,
}

// =============================================================================
// Issuance
// =============================================================================

/// The current outstanding token supply for one business.
///
/// One row per business, overwritten in place on every issue/deduct:
/// a snapshot, not an event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Issuance {
    pub business_tax_id: String,

    /// Outstanding supply in token base units, always ≥ 0.
    pub amount_units: i64,

    /// Last mutation time.
    pub issued_at: DateTime<Utc>,
}

impl Issuance {
    /// Outstanding supply as a typed amount.
    #[inline]
    pub fn amount(&self) -> TokenAmount {
        TokenAmount::from_units(self.amount_units)
    }
}

/// Issuance details joined with the business name (single-business query).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct IssuanceStats {
    pub tax_id: String,
    pub name: String,
    pub amount_units: i64,
    pub issued_at: DateTime<Utc>,
}

impl IssuanceStats {
    #[inline]
    pub fn amount(&self) -> TokenAmount {
        TokenAmount::from_units(self.amount_units)
    }
}

/// One line of the all-businesses listing.
///
/// Produced by a LEFT JOIN: a business registered but without issuance
/// appears with `None` amount and timestamp. The listing order is the
/// business insertion order and is stable across calls; the numbered
/// menus in the front ends depend on that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct IssuanceOverview {
    pub tax_id: String,
    pub name: String,
    pub amount_units: Option<i64>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl IssuanceOverview {
    /// Available supply, `zero` when no issuance row exists yet.
    #[inline]
    pub fn available(&self) -> TokenAmount {
        TokenAmount::from_units(self.amount_units.unwrap_or(0))
    }
}

// =============================================================================
// Holding
// =============================================================================

/// One user's token balance in one business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Holding {
    pub owner: String,
    pub business_tax_id: String,

    /// Balance in token base units, always ≥ 0.
    pub balance_units: i64,
}

impl Holding {
    #[inline]
    pub fn balance(&self) -> TokenAmount {
        TokenAmount::from_units(self.balance_units)
    }
}

/// One line of a user's balance listing, joined with the business name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct HoldingOverview {
    pub tax_id: String,
    pub name: String,
    pub balance_units: i64,
}

impl HoldingOverview {
    #[inline]
    pub fn balance(&self) -> TokenAmount {
        TokenAmount::from_units(self.balance_units)
    }
}

// =============================================================================
// Dividends
// =============================================================================

/// An append-only record of one dividend distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DividendEvent {
    pub id: i64,
    pub business_tax_id: String,
    pub distributed_at: DateTime<Utc>,
    pub total_revenue_cents: i64,
    pub dividend_pool_cents: i64,
    pub token_price_micros: i64,
}

impl DividendEvent {
    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }

    #[inline]
    pub fn dividend_pool(&self) -> Money {
        Money::from_cents(self.dividend_pool_cents)
    }

    #[inline]
    pub fn token_price(&self) -> TokenPrice {
        TokenPrice::from_micros(self.token_price_micros)
    }
}

/// One holder's computed share of a distribution.
///
/// A report, not a wallet credit: the engine logs these and persists
/// only the aggregate [`DividendEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderPayout {
    pub owner: String,
    pub balance_units: i64,
    pub payout_cents: i64,
}

impl HolderPayout {
    #[inline]
    pub fn balance(&self) -> TokenAmount {
        TokenAmount::from_units(self.balance_units)
    }

    #[inline]
    pub fn payout(&self) -> Money {
        Money::from_cents(self.payout_cents)
    }
}

/// A past distribution as seen by one holder.
///
/// The payout is recomputed at query time from the holder's *current*
/// balance and the *current* total supply, matching the historical
/// behavior of the system (the figure drifts if balances change after
/// the event).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderDividend {
    pub tax_id: String,
    pub name: String,
    pub distributed_at: DateTime<Utc>,
    pub payout_cents: i64,
}

impl HolderDividend {
    #[inline]
    pub fn payout(&self) -> Money {
        Money::from_cents(self.payout_cents)
    }
}

// =============================================================================
// Users
// =============================================================================

/// An end-user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserAccount {
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Login identity (email-like; must contain '@').
    pub identity: String,

    /// Stored secret. Comparison strategy is pluggable, see
    /// [`crate::auth::CredentialVerifier`].
    pub secret: String,
}
