//! # Repository Module
//!
//! Database repository implementations for the ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Front end                                                              │
//! │       │  db.issuances().adjust("7707083893", delta)                    │
//! │       ▼                                                                 │
//! │  IssuanceRepository                                                    │
//! │  ├── fetches current state                                             │
//! │  ├── runs the pure rule from tokenize-core                             │
//! │  └── persists the outcome in its own transaction                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository also exposes `*_on(conn, ...)` associated functions
//! that run against a caller-supplied connection, so
//! [`crate::flows::LedgerFlows`] can compose several steps inside one
//! transaction.
//!
//! ## Available Repositories
//!
//! - [`business::BusinessRepository`] - registry upserts and lookups
//! - [`issuance::IssuanceRepository`] - token supply mutations
//! - [`holding::HoldingRepository`] - per-user balances
//! - [`dividend::DividendRepository`] - distributions and history
//! - [`user::UserRepository`] - accounts and credential checks

pub mod business;
pub mod dividend;
pub mod holding;
pub mod issuance;
pub mod user;
