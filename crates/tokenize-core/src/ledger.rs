//! # Ledger Rules
//!
//! The invariant-preserving rules of the token ledger, as pure functions.
//!
//! The storage layer fetches state, runs these rules, and persists the
//! outcome; nothing in this module performs I/O, so every invariant is
//! testable without a database:
//!
//! - supply never goes negative ([`apply_issuance_delta`])
//! - holdings never go negative and are never debited directly
//!   ([`apply_holding_credit`])
//! - dividend pools split pro-rata over a strictly positive supply
//!   ([`plan_distribution`])

use crate::amount::{DividendRate, Money, TokenAmount, TokenPrice};
use crate::error::{LedgerError, LedgerResult};
use crate::types::{Holding, HolderPayout};

// =============================================================================
// Issuance
// =============================================================================

/// Outcome of applying an issuance delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceChange {
    /// Zero delta: no storage touch, no timestamp refresh.
    Unchanged,
    /// No prior issuance row; create one with this amount.
    Create(TokenAmount),
    /// Overwrite the existing row with this new total.
    Update(TokenAmount),
}

/// Applies an issuance delta to the current supply.
///
/// ## Rules
/// - `delta == 0` → [`IssuanceChange::Unchanged`]
/// - no current row and `delta < 0` → `InvalidOperation`
/// - no current row and `delta > 0` → create with `delta`
/// - `current + delta < 0` → `InsufficientSupply { remaining: current }`
/// - otherwise → update to `current + delta`
///
/// ## Example
/// ```rust
/// use tokenize_core::amount::TokenAmount;
/// use tokenize_core::ledger::{apply_issuance_delta, IssuanceChange};
///
/// let supply = Some(TokenAmount::from_whole(10));
/// let change = apply_issuance_delta(supply, TokenAmount::from_whole(-4)).unwrap();
/// assert_eq!(change, IssuanceChange::Update(TokenAmount::from_whole(6)));
/// ```
pub fn apply_issuance_delta(
    current: Option<TokenAmount>,
    delta: TokenAmount,
) -> LedgerResult<IssuanceChange> {
    if delta.is_zero() {
        return Ok(IssuanceChange::Unchanged);
    }

    match current {
        None => {
            if delta.is_negative() {
                return Err(LedgerError::InvalidOperation(
                    "cannot deduct tokens from a business with no issued tokens".to_string(),
                ));
            }
            Ok(IssuanceChange::Create(delta))
        }
        Some(current) => {
            let new_total = current
                .checked_add(delta)
                .ok_or_else(|| LedgerError::InvalidOperation("supply overflow".to_string()))?;
            if new_total.is_negative() {
                return Err(LedgerError::InsufficientSupply { remaining: current });
            }
            Ok(IssuanceChange::Update(new_total))
        }
    }
}

// =============================================================================
// Holdings
// =============================================================================

/// Outcome of crediting a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingChange {
    /// Zero amount: no storage touch.
    Unchanged,
    /// No prior row; create one with this balance.
    Create(TokenAmount),
    /// Add to the existing row, yielding this new balance.
    Update(TokenAmount),
}

/// Applies a credit to a holding balance.
///
/// Holdings are only ever credited; deductions happen on the issuance
/// side of a purchase. A negative amount is rejected outright, which
/// keeps `balance ≥ 0` without ever checking the stored value.
pub fn apply_holding_credit(
    current: Option<TokenAmount>,
    amount: TokenAmount,
) -> LedgerResult<HoldingChange> {
    if amount.is_zero() {
        return Ok(HoldingChange::Unchanged);
    }
    if amount.is_negative() {
        return Err(LedgerError::InvalidOperation(
            "holdings cannot be debited directly".to_string(),
        ));
    }

    match current {
        None => Ok(HoldingChange::Create(amount)),
        Some(current) => {
            let new_balance = current
                .checked_add(amount)
                .ok_or_else(|| LedgerError::InvalidOperation("balance overflow".to_string()))?;
            Ok(HoldingChange::Update(new_balance))
        }
    }
}

// =============================================================================
// Dividends
// =============================================================================

/// A fully computed dividend distribution, ready to persist and report.
#[derive(Debug, Clone)]
pub struct DistributionPlan {
    /// revenue × rate, half-up to the cent.
    pub pool: Money,
    /// pool / supply, half-up to the micro-dollar.
    pub price: TokenPrice,
    /// Per-holder payout report (holders with zero balance are skipped).
    pub payouts: Vec<HolderPayout>,
}

/// Computes a pro-rata distribution of `revenue × rate` over `holders`.
///
/// ## Preconditions
/// `supply` must come from an existing issuance row and be > 0;
/// `None` or zero fails with `NoTokensIssued`, so division by zero is
/// rejected before any math runs.
///
/// ## Example
/// ```rust
/// use tokenize_core::amount::{DividendRate, Money, TokenAmount};
/// use tokenize_core::ledger::plan_distribution;
/// use tokenize_core::types::Holding;
///
/// let holders = vec![Holding {
///     owner: "alice@example.com".to_string(),
///     business_tax_id: "7707083893".to_string(),
///     balance_units: TokenAmount::from_whole(25).units(),
/// }];
///
/// let plan = plan_distribution(
///     "7707083893",
///     Some(TokenAmount::from_whole(100)),
///     Money::from_dollars(1_000),
///     DividendRate::default(),
///     &holders,
/// )
/// .unwrap();
///
/// assert_eq!(plan.pool.cents(), 10_000);          // $100.00
/// assert_eq!(plan.price.micros(), 1_000_000);     // $1.000000/token
/// assert_eq!(plan.payouts[0].payout_cents, 2_500); // $25.00
/// ```
pub fn plan_distribution(
    tax_id: &str,
    supply: Option<TokenAmount>,
    revenue: Money,
    rate: DividendRate,
    holders: &[Holding],
) -> LedgerResult<DistributionPlan> {
    let supply = match supply {
        Some(supply) if supply.is_positive() => supply,
        _ => {
            return Err(LedgerError::NoTokensIssued {
                tax_id: tax_id.to_string(),
            })
        }
    };

    let pool = revenue.apply_rate(rate);
    let price = pool.per_token(supply);

    let payouts = holders
        .iter()
        .filter(|h| h.balance().is_positive())
        .map(|h| HolderPayout {
            owner: h.owner.clone(),
            balance_units: h.balance_units,
            payout_cents: h.balance().share_of_pool(supply, pool).cents(),
        })
        .collect();

    Ok(DistributionPlan { pool, price, payouts })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(owner: &str, whole_tokens: i64) -> Holding {
        Holding {
            owner: owner.to_string(),
            business_tax_id: "7707083893".to_string(),
            balance_units: TokenAmount::from_whole(whole_tokens).units(),
        }
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let change = apply_issuance_delta(None, TokenAmount::zero()).unwrap();
        assert_eq!(change, IssuanceChange::Unchanged);

        let change =
            apply_issuance_delta(Some(TokenAmount::from_whole(5)), TokenAmount::zero()).unwrap();
        assert_eq!(change, IssuanceChange::Unchanged);
    }

    #[test]
    fn first_issuance_creates_the_row() {
        let change = apply_issuance_delta(None, TokenAmount::from_whole(100)).unwrap();
        assert_eq!(change, IssuanceChange::Create(TokenAmount::from_whole(100)));
    }

    #[test]
    fn deducting_from_unissued_business_is_invalid() {
        let err = apply_issuance_delta(None, TokenAmount::from_whole(-1)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOperation(_)));
    }

    #[test]
    fn over_deduction_reports_remaining_supply() {
        let err = apply_issuance_delta(
            Some(TokenAmount::from_whole(10)),
            TokenAmount::from_whole(-11),
        )
        .unwrap_err();
        match err {
            LedgerError::InsufficientSupply { remaining } => {
                assert_eq!(remaining, TokenAmount::from_whole(10));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn deduction_to_exactly_zero_is_allowed() {
        let change = apply_issuance_delta(
            Some(TokenAmount::from_whole(10)),
            TokenAmount::from_whole(-10),
        )
        .unwrap();
        assert_eq!(change, IssuanceChange::Update(TokenAmount::zero()));
    }

    #[test]
    fn delta_sequences_accumulate() {
        let mut supply: Option<TokenAmount> = None;
        for delta in [100, -30, 50, -120] {
            match apply_issuance_delta(supply, TokenAmount::from_whole(delta)).unwrap() {
                IssuanceChange::Create(total) | IssuanceChange::Update(total) => {
                    supply = Some(total);
                }
                IssuanceChange::Unchanged => {}
            }
        }
        assert_eq!(supply, Some(TokenAmount::from_whole(0)));
    }

    #[test]
    fn holding_credit_accumulates() {
        let change = apply_holding_credit(None, TokenAmount::from_whole(3)).unwrap();
        assert_eq!(change, HoldingChange::Create(TokenAmount::from_whole(3)));

        let change =
            apply_holding_credit(Some(TokenAmount::from_whole(3)), TokenAmount::from_whole(2))
                .unwrap();
        assert_eq!(change, HoldingChange::Update(TokenAmount::from_whole(5)));
    }

    #[test]
    fn holding_debit_is_rejected() {
        let err =
            apply_holding_credit(Some(TokenAmount::from_whole(3)), TokenAmount::from_whole(-1))
                .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOperation(_)));
    }

    #[test]
    fn distribution_requires_positive_supply() {
        for supply in [None, Some(TokenAmount::zero())] {
            let err = plan_distribution(
                "7707083893",
                supply,
                Money::from_dollars(1_000),
                DividendRate::default(),
                &[],
            )
            .unwrap_err();
            assert!(matches!(err, LedgerError::NoTokensIssued { .. }));
        }
    }

    #[test]
    fn canonical_distribution_figures() {
        // revenue $1000, rate 10%, supply 100 → pool $100, price $1/token;
        // a holder of 25 tokens is reported $25.00.
        let holders = vec![holding("alice@example.com", 25), holding("bob@example.com", 0)];
        let plan = plan_distribution(
            "7707083893",
            Some(TokenAmount::from_whole(100)),
            Money::from_dollars(1_000),
            DividendRate::default(),
            &holders,
        )
        .unwrap();

        assert_eq!(plan.pool.cents(), 10_000);
        assert_eq!(plan.price.micros(), 1_000_000);

        // zero-balance holders are skipped from the report
        assert_eq!(plan.payouts.len(), 1);
        assert_eq!(plan.payouts[0].owner, "alice@example.com");
        assert_eq!(plan.payouts[0].payout_cents, 2_500);
    }

    #[test]
    fn fractional_shares_round_half_up() {
        // $1.00 pool over 3 tokens: each 1-token holder is reported 33¢.
        let holders = vec![holding("a@x", 1), holding("b@x", 1), holding("c@x", 1)];
        let plan = plan_distribution(
            "7707083893",
            Some(TokenAmount::from_whole(3)),
            Money::from_dollars(10),
            DividendRate::default(),
            &holders,
        )
        .unwrap();

        assert_eq!(plan.pool.cents(), 100);
        for payout in &plan.payouts {
            assert_eq!(payout.payout_cents, 33);
        }
    }
}
