//! # Error Types
//!
//! Domain-specific error types for kiosco-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kiosco-core errors (this file)                                        │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kiosco-db errors (separate crate)                                     │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  kiosco-ledger errors (separate crate)                                 │
//! │  └── LedgerError      - What callers of the service see                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → CLI message         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, ids, timestamps)
//! 3. Errors are enum variants, never String
//! 4. A rejected operation leaves the ledger untouched

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
///
/// These errors represent admissibility decisions: the input was well
/// formed, but accepting it would break a ledger invariant.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A credit (fiado) sale arrived without a customer.
    ///
    /// ## When This Occurs
    /// - `register_sale` called with `method == Credit` and no customer id
    #[error("credit sale requires a customer")]
    MissingCustomer,

    /// A non-credit sale tried to link a customer.
    ///
    /// Only fiado sales carry a customer reference; linking one to a
    /// cash/transfer/debit sale would create debt-free noise in the
    /// customer's history.
    #[error("{method:?} sale cannot be linked to a customer")]
    UnexpectedCustomer { method: crate::types::PaymentMethod },

    /// The customer exists but was deactivated.
    #[error("customer {id} is inactive")]
    CustomerInactive { id: String },

    /// A repayment would drive the balance below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Repay $10.00 against balance $6.00
    ///      │
    ///      ▼
    /// ExceedsBalance { requested: $10.00, balance: $6.00 }
    ///      │
    ///      ▼
    /// Operator is told the exact outstanding amount
    /// ```
    /// Overpayment is rejected, never clipped: the till keeps the audit
    /// trail equal to what actually happened.
    #[error("repayment of {requested} exceeds outstanding balance {balance}")]
    ExceedsBalance { requested: Money, balance: Money },

    /// Repayment, interest, or settlement against a zero balance.
    #[error("customer {customer_id} has no outstanding balance")]
    NothingOutstanding { customer_id: String },

    /// Deactivation attempted while debt is outstanding.
    #[error("customer {customer_id} still owes {balance}, settle before deactivating")]
    HasOutstandingBalance {
        customer_id: String,
        balance: Money,
    },

    /// An explicit timestamp predates the latest accepted entry of its
    /// stream. The ledger keeps insertion order and timestamp order
    /// aligned so reports never need re-sorting.
    #[error("timestamp {at} is earlier than the latest recorded entry at {latest}")]
    TimestampOutOfOrder {
        at: DateTime<Utc>,
        latest: DateTime<Utc>,
    },

    /// A report window could not be derived (bad month number, inverted
    /// bounds, calendar overflow).
    #[error("invalid time window: {reason}")]
    InvalidWindow { reason: String },

    /// Snapshot has a schema version this build does not understand.
    #[error("snapshot schema version {found} is not supported (supported: {supported})")]
    UnsupportedSnapshotVersion { found: u32, supported: u32 },

    /// Snapshot contents failed invariant revalidation on import.
    #[error("corrupt snapshot: {reason}")]
    CorruptSnapshot { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet shape requirements.
/// Used for early validation before ledger rules run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate customer name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ExceedsBalance {
            requested: Money::from_cents(1000),
            balance: Money::from_cents(600),
        };
        assert_eq!(
            err.to_string(),
            "repayment of $10.00 exceeds outstanding balance $6.00"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        };
        assert_eq!(err.to_string(), "name must be at least 2 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
