//! # Validation Module
//!
//! Input validation utilities for the ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI (clap)                                                   │
//! │  ├── Type validation (integers, dates parse)                           │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ledger Service (Rust)                                        │
//! │  ├── THIS MODULE: shape validation                                     │
//! │  └── CoreError rules: balances, ordering, linkage                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{
    MAX_CONTACT_LEN, MAX_CUSTOMER_NAME_LEN, MAX_NOTE_LEN, MAX_RATE_BPS, MIN_CUSTOMER_NAME_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Monetary Validators
// =============================================================================

/// Validates a sale or movement amount in cents.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Zero-amount sales and movements carry no information and are rejected
///
/// ## Example
/// ```rust
/// use kiosco_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents(1099).is_ok());
/// assert!(validate_amount_cents(0).is_err());
/// assert!(validate_amount_cents(-100).is_err());
/// ```
pub fn validate_amount_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates an interest rate in basis points.
///
/// ## Rules
/// - Must be between 1 and 10000 (0.01% to 100%)
/// - Zero is rejected: applying no interest is not an operation
pub fn validate_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps == 0 || bps > MAX_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "interest_rate".to_string(),
            min: 1,
            max: MAX_RATE_BPS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer display name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 2 and 120 characters after trimming
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use kiosco_core::validation::validate_customer_name;
///
/// assert_eq!(validate_customer_name("  Doña Rosa ").unwrap(), "Doña Rosa");
/// assert!(validate_customer_name("").is_err());
/// assert!(validate_customer_name("X").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() < MIN_CUSTOMER_NAME_LEN {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: MIN_CUSTOMER_NAME_LEN,
        });
    }

    if name.chars().count() > MAX_CUSTOMER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_CUSTOMER_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates an optional free-text note.
///
/// ## Rules
/// - Can be empty (treated as absent)
/// - Maximum 500 characters
///
/// ## Returns
/// The trimmed note, or None when empty.
pub fn validate_note(note: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(note) = note else {
        return Ok(None);
    };
    let note = note.trim();

    if note.is_empty() {
        return Ok(None);
    }

    if note.chars().count() > MAX_NOTE_LEN {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LEN,
        });
    }

    Ok(Some(note.to_string()))
}

/// Validates an optional contact field (phone, email).
///
/// ## Rules
/// - Can be empty (treated as absent)
/// - Maximum 120 characters
/// - No format checking: small-shop phone books hold things like
///   "whatsapp only" or "ask her sister", and the ledger accepts them
pub fn validate_contact(field: &str, value: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();

    if value.is_empty() {
        return Ok(None);
    }

    if value.chars().count() > MAX_CONTACT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CONTACT_LEN,
        });
    }

    Ok(Some(value.to_string()))
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Rules
/// - Must be a valid UUID format
/// - 36 characters with hyphens: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
///
/// ## Example
/// ```rust
/// use kiosco_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    // Try to parse as UUID
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents(1).is_ok());
        assert!(validate_amount_cents(50_000).is_ok());

        assert!(validate_amount_cents(0).is_err());
        assert!(validate_amount_cents(-500).is_err());
    }

    #[test]
    fn test_validate_rate_bps() {
        assert!(validate_rate_bps(1).is_ok());
        assert!(validate_rate_bps(525).is_ok());
        assert!(validate_rate_bps(10_000).is_ok());

        assert!(validate_rate_bps(0).is_err());
        assert!(validate_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_customer_name() {
        assert_eq!(validate_customer_name("Doña Rosa").unwrap(), "Doña Rosa");
        assert_eq!(validate_customer_name("  Juan  ").unwrap(), "Juan");

        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("   ").is_err());
        assert!(validate_customer_name("J").is_err());
        assert!(validate_customer_name(&"a".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_note() {
        assert_eq!(validate_note(None).unwrap(), None);
        assert_eq!(validate_note(Some("")).unwrap(), None);
        assert_eq!(validate_note(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_note(Some(" 2x milk ")).unwrap(),
            Some("2x milk".to_string())
        );
        assert!(validate_note(Some(&"a".repeat(600))).is_err());
    }

    #[test]
    fn test_validate_contact() {
        assert_eq!(validate_contact("phone", None).unwrap(), None);
        assert_eq!(validate_contact("phone", Some("  ")).unwrap(), None);
        assert_eq!(
            validate_contact("phone", Some(" +54 11 5555-0199 ")).unwrap(),
            Some("+54 11 5555-0199".to_string())
        );

        let err = validate_contact("email", Some(&"a".repeat(200))).unwrap_err();
        assert_eq!(err.to_string(), "email must be at most 120 characters");
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
