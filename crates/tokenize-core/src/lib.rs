//! # tokenize-core: Pure Ledger Logic for TokenizeLocal
//!
//! This crate is the **heart** of the tokenized-business ledger. It
//! contains every ledger rule as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     TokenizeLocal Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Front ends (console menu, chat router)               │   │
//! │  │     input parsing ──► role gating ──► error rendering           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ tokenize-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  amount   │  │  ledger   │  │   types   │  │ validation│  │   │
//! │  │   │TokenAmount│  │  deltas   │  │ Business  │  │  tax ids  │  │   │
//! │  │   │   Money   │  │ dividends │  │  Holding  │  │ identities│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tokenize-db (Database Layer)                    │   │
//! │  │          SQLite queries, migrations, repositories, flows        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`amount`] - Fixed-point amount types (no floating point!)
//! - [`ledger`] - Issuance, holding, and dividend rules
//! - [`types`] - Domain types (Business, Issuance, Holding, ...)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`auth`] - Pluggable credential verification
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Amounts**: tokens and money are fixed-point i64
//! 4. **Explicit Errors**: closed error kinds, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amount;
pub mod auth;
pub mod error;
pub mod ledger;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tokenize_core::TokenAmount` instead of
// `use tokenize_core::amount::TokenAmount`

pub use amount::{DividendRate, Money, TokenAmount, TokenPrice, DEFAULT_DIVIDEND_RATE_BPS};
pub use auth::{CredentialVerifier, PlaintextVerifier};
pub use error::{LedgerError, LedgerResult, ValidationError};
pub use types::*;
