//! # Ledger Error Types
//!
//! The error boundary callers of this crate see.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     How Errors Reach The Caller                         │
//! │                                                                         │
//! │  kiosco-core                kiosco-db                 std / serde       │
//! │  CoreError                  DbError                   io / json         │
//! │  (rule violations)          (storage faults)          (snapshot I/O)    │
//! │       │                         │                         │             │
//! │       │  #[from]                │  #[from]                │  #[from]    │
//! │       ▼                         ▼                         ▼             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        LedgerError                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apps/cli prints the Display message and exits non-zero                │
//! │                                                                         │
//! │  A returned error always means: nothing was written. Rejections       │
//! │  happen before the transaction; storage faults roll it back.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use kiosco_core::CoreError;
use kiosco_db::DbError;

/// Errors surfaced by the ledger service, reports, and snapshot gateway.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A ledger rule or input validation rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The storage engine failed.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    /// Snapshot (de)serialization failed.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File-level I/O failed (snapshot files, backup target directory).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Whether this error is a rejection (the input was refused) rather
    /// than a fault (the system misbehaved). Rejections are ordinary
    /// operator feedback; faults deserve a closer look at the logs.
    pub fn is_rejection(&self) -> bool {
        matches!(self, LedgerError::Core(_))
    }
}

// Shape-validation failures route through CoreError so the service can
// use `?` on validator calls directly.
impl From<kiosco_core::ValidationError> for LedgerError {
    fn from(err: kiosco_core::ValidationError) -> Self {
        LedgerError::Core(CoreError::Validation(err))
    }
}

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================
