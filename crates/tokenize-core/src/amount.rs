//! # Amount Module
//!
//! Fixed-point amount types for the ledger.
//!
//! ## Why Integer Amounts?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With f64 balances:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A ledger that compares balances against supply cannot tolerate        │
//! │  drift: "balance <= supply" must be exact, every time.                 │
//! │                                                                         │
//! │  OUR SOLUTION: fixed-point integers                                    │
//! │    tokens  → TokenAmount, 4 decimal places (1 token = 10000 units)     │
//! │    money   → Money, cents                                              │
//! │    price   → TokenPrice, micro-dollars per token                       │
//! │    rates   → DividendRate, basis points                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tokenize_core::amount::{DividendRate, Money, TokenAmount};
//!
//! let supply = TokenAmount::from_whole(100);
//! let revenue = Money::from_cents(100_000); // $1000.00
//!
//! // pool = revenue × 10%
//! let pool = revenue.apply_rate(DividendRate::default());
//! assert_eq!(pool.cents(), 10_000); // $100.00
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Base units per whole token (4 decimal places).
pub const TOKEN_SCALE: i64 = 10_000;

/// Micro-dollars per dollar (token price resolution).
pub const PRICE_SCALE: i64 = 1_000_000;

/// Divides with half-up rounding. `den` must be positive.
///
/// The `(n + d/2) / d` idiom with an i128 intermediate keeps payout and
/// price math exact up to the last retained digit.
fn div_round(num: i128, den: i128) -> i64 {
    debug_assert!(den > 0);
    let half = den / 2;
    let adjusted = if num >= 0 { num + half } else { num - half };
    (adjusted / den) as i64
}

// =============================================================================
// TokenAmount
// =============================================================================

/// A token quantity in base units (1 token = 10_000 units).
///
/// ## Design Decisions
/// - **i64 (signed)**: issuance deltas are negative for deductions
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - Persisted balances and supplies are always ≥ 0; negativity only
///   exists in transit as a delta.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TokenAmount(i64);

impl TokenAmount {
    /// Creates an amount from raw base units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        TokenAmount(units)
    }

    /// Creates an amount from whole tokens.
    ///
    /// ## Example
    /// ```rust
    /// use tokenize_core::amount::TokenAmount;
    ///
    /// assert_eq!(TokenAmount::from_whole(25).units(), 250_000);
    /// ```
    #[inline]
    pub const fn from_whole(tokens: i64) -> Self {
        TokenAmount(tokens * TOKEN_SCALE)
    }

    /// Returns the raw base units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        TokenAmount(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition, `None` on i64 overflow.
    #[inline]
    pub fn checked_add(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(other.0).map(TokenAmount)
    }

    /// This holder's share of a dividend pool:
    /// `payout = (balance / total) × pool`, half-up to the cent.
    ///
    /// ## Example
    /// ```rust
    /// use tokenize_core::amount::{Money, TokenAmount};
    ///
    /// let balance = TokenAmount::from_whole(25);
    /// let total = TokenAmount::from_whole(100);
    /// let pool = Money::from_cents(10_000); // $100.00
    ///
    /// assert_eq!(balance.share_of_pool(total, pool).cents(), 2_500); // $25.00
    /// ```
    pub fn share_of_pool(&self, total: TokenAmount, pool: Money) -> Money {
        let cents = div_round(self.0 as i128 * pool.cents() as i128, total.0 as i128);
        Money::from_cents(cents)
    }
}

/// Display in whole-token form, trailing zeros trimmed: `12`, `12.5`,
/// `0.0001`.
impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / TOKEN_SCALE as u64;
        let frac = abs % TOKEN_SCALE as u64;
        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let digits = format!("{:04}", frac);
            write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
        }
    }
}

impl FromStr for TokenAmount {
    type Err = ValidationError;

    /// Parses `[-]digits[.fraction]` with at most 4 fraction digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, "amount", 4).map(TokenAmount)
    }
}

impl Add for TokenAmount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        TokenAmount(self.0 + other.0)
    }
}

impl AddAssign for TokenAmount {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for TokenAmount {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        TokenAmount(self.0 - other.0)
    }
}

impl SubAssign for TokenAmount {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for TokenAmount {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        TokenAmount(-self.0)
    }
}

// =============================================================================
// Money
// =============================================================================

/// A monetary value in cents.
///
/// Revenue figures, dividend pools, and reported payouts all flow
/// through this type; nothing in the ledger holds a float.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole dollars.
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Applies a basis-point rate, half-up to the cent.
    ///
    /// The dividend pool formula: `$1000.00 × 1000 bps = $100.00`.
    pub fn apply_rate(&self, rate: DividendRate) -> Money {
        let cents = div_round(self.0 as i128 * rate.bps() as i128, 10_000);
        Money::from_cents(cents)
    }

    /// Unit price of one token given a total supply:
    /// `price = pool / supply`, half-up to the micro-dollar.
    pub fn per_token(&self, supply: TokenAmount) -> TokenPrice {
        // pool_cents / 100 dollars over supply_units / TOKEN_SCALE tokens,
        // expressed in micro-dollars: cents * TOKEN_SCALE * PRICE_SCALE / 100.
        let micros = div_round(
            self.0 as i128 * TOKEN_SCALE as i128 * (PRICE_SCALE / 100) as i128,
            supply.units() as i128,
        );
        TokenPrice::from_micros(micros)
    }
}

/// Display as `$X.YY` (debugging; front ends do their own formatting).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    /// Parses `[-]digits[.fraction]` with at most 2 fraction digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, "revenue", 2).map(Money)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// TokenPrice
// =============================================================================

/// Price of one token in micro-dollars (10⁻⁶ $/token).
///
/// Cents are too coarse here: a $1.00 pool over 3 tokens is
/// $0.333333/token, and the dividend history keeps that precision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TokenPrice(i64);

impl TokenPrice {
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        TokenPrice(micros)
    }

    #[inline]
    pub const fn micros(&self) -> i64 {
        self.0
    }
}

/// Display as `$X.YYYYYY` per token.
impl fmt::Display for TokenPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}${}.{:06}",
            sign,
            abs / PRICE_SCALE as u64,
            abs % PRICE_SCALE as u64
        )
    }
}

// =============================================================================
// DividendRate
// =============================================================================

/// Dividend rate in basis points (1 bps = 0.01%).
///
/// The default distribution hands out 10% of revenue (1000 bps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendRate(u32);

/// Default share of revenue paid out as dividends: 10%.
pub const DEFAULT_DIVIDEND_RATE_BPS: u32 = 1_000;

impl DividendRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DividendRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for DividendRate {
    fn default() -> Self {
        DividendRate(DEFAULT_DIVIDEND_RATE_BPS)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a decimal literal into fixed-point units with `frac_digits`
/// decimal places. Rejects empty input, stray characters, and excess
/// precision.
fn parse_fixed(s: &str, field: &str, frac_digits: u32) -> Result<i64, ValidationError> {
    let s = s.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("expected a number with at most {} decimal places", frac_digits),
    };

    if s.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (whole, frac) = match body.split_once('.') {
        Some((w, f)) => (w, f),
        None => (body, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > frac_digits as usize {
        return Err(invalid());
    }

    let scale = 10_i64.pow(frac_digits);
    let whole_part: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac_part: i64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = frac_digits as usize);
        padded.parse().map_err(|_| invalid())?
    };

    let units = whole_part
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_part))
        .ok_or_else(invalid)?;

    Ok(if negative { -units } else { units })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_amount_constructors() {
        assert_eq!(TokenAmount::from_whole(12).units(), 120_000);
        assert_eq!(TokenAmount::from_units(5).units(), 5);
        assert!(TokenAmount::zero().is_zero());
    }

    #[test]
    fn token_amount_display() {
        assert_eq!(TokenAmount::from_whole(12).to_string(), "12");
        assert_eq!(TokenAmount::from_units(125_000).to_string(), "12.5");
        assert_eq!(TokenAmount::from_units(1).to_string(), "0.0001");
        assert_eq!(TokenAmount::from_units(-5_000).to_string(), "-0.5");
    }

    #[test]
    fn token_amount_parsing() {
        assert_eq!("12".parse::<TokenAmount>().unwrap().units(), 120_000);
        assert_eq!("12.5".parse::<TokenAmount>().unwrap().units(), 125_000);
        assert_eq!("0.0001".parse::<TokenAmount>().unwrap().units(), 1);
        assert_eq!("-3".parse::<TokenAmount>().unwrap().units(), -30_000);

        assert!("".parse::<TokenAmount>().is_err());
        assert!("abc".parse::<TokenAmount>().is_err());
        assert!("1.23456".parse::<TokenAmount>().is_err()); // too precise
        assert!("1.2.3".parse::<TokenAmount>().is_err());
    }

    #[test]
    fn money_parsing_and_display() {
        assert_eq!("1000".parse::<Money>().unwrap().cents(), 100_000);
        assert_eq!("10.99".parse::<Money>().unwrap().cents(), 1_099);
        assert!("10.999".parse::<Money>().is_err());

        assert_eq!(Money::from_cents(1_099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
    }

    #[test]
    fn dividend_pool_formula() {
        // $1000.00 at 10% = $100.00
        let revenue = Money::from_dollars(1_000);
        let pool = revenue.apply_rate(DividendRate::default());
        assert_eq!(pool.cents(), 10_000);

        // rounding: $0.05 at 10% = 0.5¢ → 1¢ half-up
        assert_eq!(Money::from_cents(5).apply_rate(DividendRate::default()).cents(), 1);
    }

    #[test]
    fn token_price_formula() {
        // $100.00 pool over 100 tokens = $1.000000/token
        let pool = Money::from_dollars(100);
        let price = pool.per_token(TokenAmount::from_whole(100));
        assert_eq!(price.micros(), 1_000_000);
        assert_eq!(price.to_string(), "$1.000000");

        // $1.00 over 3 tokens = $0.333333/token
        let price = Money::from_dollars(1).per_token(TokenAmount::from_whole(3));
        assert_eq!(price.micros(), 333_333);
    }

    #[test]
    fn payout_share() {
        // holder of 25 out of 100 tokens gets $25.00 of a $100.00 pool
        let payout = TokenAmount::from_whole(25)
            .share_of_pool(TokenAmount::from_whole(100), Money::from_dollars(100));
        assert_eq!(payout.cents(), 2_500);

        // 1 of 3 tokens of a $1.00 pool: 33.33¢ rounds to 33¢
        let payout = TokenAmount::from_whole(1)
            .share_of_pool(TokenAmount::from_whole(3), Money::from_dollars(1));
        assert_eq!(payout.cents(), 33);
    }

    #[test]
    fn arithmetic() {
        let a = TokenAmount::from_whole(10);
        let b = TokenAmount::from_whole(4);
        assert_eq!((a + b).units(), 140_000);
        assert_eq!((a - b).units(), 60_000);
        assert_eq!((-b).units(), -40_000);

        let mut m = Money::from_cents(100);
        m += Money::from_cents(50);
        assert_eq!(m.cents(), 150);
    }

    #[test]
    fn rate_defaults_to_ten_percent() {
        assert_eq!(DividendRate::default().bps(), 1_000);
        assert_eq!(DividendRate::from_bps(250).percentage(), 2.5);
    }
}
