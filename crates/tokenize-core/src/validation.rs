//! # Validation Module
//!
//! Input validation for raw front-end input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (console menu / chat router)                       │
//! │  ├── THIS MODULE: tax-id and identity format, amount parsing           │
//! │  └── Immediate user feedback before any storage call                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ledger rules (tokenize-core::ledger)                         │
//! │  └── Supply/balance invariants                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── UNIQUE, CHECK ≥ 0, foreign keys                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::amount::TokenAmount;
use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Accepted tax-identifier lengths.
pub const TAX_ID_LENGTHS: [usize; 2] = [10, 12];

/// Validates a business tax identifier.
///
/// ## Rules
/// - exactly 10 or 12 characters
/// - ASCII digits only
///
/// ## Example
/// ```rust
/// use tokenize_core::validation::validate_tax_id;
///
/// assert!(validate_tax_id("7707083893").is_ok());
/// assert!(validate_tax_id("770708389312").is_ok());
/// assert!(validate_tax_id("77070").is_err());
/// assert!(validate_tax_id("77070838AB").is_err());
/// ```
pub fn validate_tax_id(tax_id: &str) -> ValidationResult<()> {
    let tax_id = tax_id.trim();

    if tax_id.is_empty() {
        return Err(ValidationError::Required {
            field: "tax_id".to_string(),
        });
    }

    if !TAX_ID_LENGTHS.contains(&tax_id.len())
        || !tax_id.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidFormat {
            field: "tax_id".to_string(),
            reason: "must be 10 or 12 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a user identity.
///
/// The only structural requirement is the '@' marker; anything
/// stricter is a policy decision left to the credential layer.
pub fn validate_identity(identity: &str) -> ValidationResult<()> {
    let identity = identity.trim();

    if identity.is_empty() {
        return Err(ValidationError::Required {
            field: "identity".to_string(),
        });
    }

    if !identity.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "identity".to_string(),
            reason: "must contain '@'".to_string(),
        });
    }

    Ok(())
}

/// Validates a business display name.
pub fn validate_display_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Requires a strictly positive token amount (issue/buy input).
pub fn validate_positive_amount(amount: TokenAmount) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_id_rules() {
        assert!(validate_tax_id("7707083893").is_ok());
        assert!(validate_tax_id(" 770708389312 ").is_ok()); // trimmed
        assert!(validate_tax_id("").is_err());
        assert!(validate_tax_id("123").is_err());
        assert!(validate_tax_id("77070838931").is_err()); // 11 digits
        assert!(validate_tax_id("77070838ab").is_err());
    }

    #[test]
    fn identity_rules() {
        assert!(validate_identity("user@example.com").is_ok());
        assert!(validate_identity("12345@chat.local").is_ok());
        assert!(validate_identity("not-an-email").is_err());
        assert!(validate_identity("").is_err());
    }

    #[test]
    fn positive_amount_rule() {
        assert!(validate_positive_amount(TokenAmount::from_whole(1)).is_ok());
        assert!(validate_positive_amount(TokenAmount::zero()).is_err());
        assert!(validate_positive_amount(TokenAmount::from_whole(-1)).is_err());
    }
}
