//! # kiosco-core: Pure Business Logic for the Kiosco Ledger
//!
//! This crate is the **heart** of the ledger. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Kiosco Ledger Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        apps/cli                                 │   │
//! │  │    sale ──► repay ──► report day/month/year ──► export          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                     kiosco-ledger                               │   │
//! │  │    LedgerService, ReportAggregator, SnapshotGateway             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kiosco-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  window   │  │  report   │  │   │
//! │  │   │   Sale    │  │   Money   │  │ TimeWindow│  │  Report   │  │   │
//! │  │   │ Movement  │  │ RateCalc  │  │ [start,end)│ │  totals   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kiosco-db (Storage Engine)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sale, Customer, CreditMovement, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`window`] - Half-open `[start, end)` calendar windows for reports
//! - [`report`] - Report math as pure functions over ledger records
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Append-Only Ledger**: Balances are projections of movements, never fields
//! 5. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use kiosco_core::money::Money;
//! use kiosco_core::types::InterestRate;
//!
//! // Create money from cents (never from floats!)
//! let balance = Money::from_cents(10_000); // $100.00 outstanding
//!
//! // Accrue interest using integer math with half-up rounding
//! let rate = InterestRate::from_bps(500); // 5.00%
//! let interest = balance.apply_rate(rate);
//!
//! // Interest on $100.00 at 5% = $5.00
//! assert_eq!(interest.cents(), 500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;
pub mod window;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kiosco_core::Money` instead of
// `use kiosco_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use report::{DayActivity, Report, ShiftReport, ShiftTotals};
pub use types::*;
pub use window::TimeWindow;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum length of a customer display name, after trimming.
///
/// ## Business Reason
/// Single-character names are almost always typos at the register
/// and make credit statements ambiguous.
pub const MIN_CUSTOMER_NAME_LEN: usize = 2;

/// Maximum length of a customer display name.
pub const MAX_CUSTOMER_NAME_LEN: usize = 120;

/// Maximum length of a free-text note on a sale or movement.
pub const MAX_NOTE_LEN: usize = 500;

/// Maximum length of a customer contact field (phone, email).
pub const MAX_CONTACT_LEN: usize = 120;

/// Maximum interest rate in basis points (10000 = 100%).
///
/// ## Business Reason
/// Interest past 100% per application is a data-entry error,
/// not a pricing decision.
pub const MAX_RATE_BPS: u32 = 10_000;

/// Hour at which the morning shift starts (inclusive).
///
/// The daily report splits sales into a morning shift of
/// `[06:00, 18:00)` and an evening shift covering the rest of the day.
pub const MORNING_SHIFT_START_HOUR: u32 = 6;

/// Hour at which the morning shift ends (exclusive).
pub const MORNING_SHIFT_END_HOUR: u32 = 18;
