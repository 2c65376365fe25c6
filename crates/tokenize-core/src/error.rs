//! # Error Types
//!
//! Domain-specific error types for tokenize-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tokenize-core errors (this file)                                      │
//! │  ├── LedgerError      - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tokenize-db errors (separate crate)                                   │
//! │  └── DbError          - Storage failures + LedgerError passthrough     │
//! │                                                                         │
//! │  tokenize-registry errors (separate crate)                             │
//! │  └── LookupError      - One generic remote-failure kind                │
//! │                                                                         │
//! │  Front ends match on kinds and render messages; they never parse       │
//! │  message strings.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Structured fields (remaining supply, identity) instead of
//!    interpolated free-form strings
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::amount::TokenAmount;

// =============================================================================
// Ledger Error
// =============================================================================

/// Ledger rule violations.
///
/// This is a closed taxonomy: every failure the ledger engine can raise
/// is one of these kinds, so callers discriminate by variant rather than
/// by message content.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An operation that makes no sense in the current state, e.g.
    /// deducting tokens from a business that never issued any, or
    /// debiting a holding directly.
    #[error("invalid ledger operation: {0}")]
    InvalidOperation(String),

    /// A deduction would drive outstanding supply negative.
    /// Carries the current remaining amount for diagnostics.
    #[error("insufficient token supply: {remaining} remaining")]
    InsufficientSupply { remaining: TokenAmount },

    /// Dividend distribution attempted with zero or absent issuance.
    #[error("business {tax_id} has no issued tokens")]
    NoTokensIssued { tax_id: String },

    /// Duplicate identity on user registration.
    #[error("user '{identity}' already exists")]
    AlreadyExists { identity: String },

    /// Malformed identity string (missing the '@' marker).
    #[error("invalid identity: '{identity}'")]
    InvalidIdentity { identity: String },

    /// Query for a business or issuance that does not exist.
    #[error("business {tax_id} not found or has no tokens issued")]
    NotFound { tax_id: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before ledger rules run; front ends use these for early
/// feedback on raw user input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (bad tax id, unparsable amount, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = LedgerError::InsufficientSupply {
            remaining: TokenAmount::from_whole(7),
        };
        assert_eq!(err.to_string(), "insufficient token supply: 7 remaining");

        let err = LedgerError::NoTokensIssued {
            tax_id: "7707083893".to_string(),
        };
        assert_eq!(err.to_string(), "business 7707083893 has no issued tokens");
    }

    #[test]
    fn validation_converts_to_ledger_error() {
        let validation = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let ledger: LedgerError = validation.into();
        assert!(matches!(ledger, LedgerError::Validation(_)));
    }
}
