//! # tokenize-db: Database Layer for TokenizeLocal
//!
//! SQLite persistence for the tokenized-business ledger, using sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      TokenizeLocal Data Flow                            │
//! │                                                                         │
//! │  Front end command (buy tokens / issue / distribute)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tokenize-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌──────────────┐  ┌────────────┐             │   │
//! │  │   │ Database  │  │ Repositories │  │   Flows    │             │   │
//! │  │   │ (pool.rs) │  │  business    │  │  purchase  │             │   │
//! │  │   │           │◄─│  issuance    │  │  register+ │             │   │
//! │  │   │ SqlitePool│  │  holding     │  │  issue     │             │   │
//! │  │   │ WAL, FKs  │  │  dividend    │  │ (one tx    │             │   │
//! │  │   │ migrations│  │  user        │  │  each)     │             │   │
//! │  │   └───────────┘  └──────────────┘  └────────────┘             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (businesses, token_issuances, holdings,                   │
//! │               dividend_events, users)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types (+ ledger-kind passthrough)
//! - [`repository`] - Repository implementations
//! - [`flows`] - Multi-step transactional flows
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tokenize_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("ledger.db")).await?;
//!
//! db.flows().register_and_issue("7707083893", "Sberbank", amount).await?;
//! let companies = db.issuances().list_all().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod flows;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use flows::LedgerFlows;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::business::BusinessRepository;
pub use repository::dividend::{Distribution, DividendRepository};
pub use repository::holding::HoldingRepository;
pub use repository::issuance::IssuanceRepository;
pub use repository::user::UserRepository;
