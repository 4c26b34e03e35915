//! # kiosco-ledger: The Write Path and Everything Derived From It
//!
//! This crate is the only way ledger state changes. It validates every
//! operation against the ledger rules, writes through `kiosco-db`, and
//! derives reports, statements, and snapshots from the recorded events.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Kiosco Ledger Layering                            │
//! │                                                                         │
//! │  apps/cli (argument parsing, formatting)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   kiosco-ledger (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌────────────────┐  ┌──────────────────┐ │   │
//! │  │   │ LedgerService │  │ReportAggregator│  │ Snapshot/Backup  │ │   │
//! │  │   │ (service.rs)  │  │  (reports.rs)  │  │ (snapshot.rs,    │ │   │
//! │  │   │               │  │                │  │  backup.rs)      │ │   │
//! │  │   │ sales         │  │ day / month /  │  │ export_all       │ │   │
//! │  │   │ repayments    │  │ year windows,  │  │ import_all       │ │   │
//! │  │   │ interest      │  │ shift split,   │  │ backup_to        │ │   │
//! │  │   │ customers     │  │ day breakdown  │  │                  │ │   │
//! │  │   └───────────────┘  └────────────────┘  └──────────────────┘ │   │
//! │  │           │                  │                    │            │   │
//! │  └───────────┼──────────────────┼────────────────────┼────────────┘   │
//! │              ▼                  ▼                    ▼                │
//! │       kiosco-db (storage)   kiosco-core (pure report math)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Two Rules Everything Here Follows
//!
//! 1. **Balances are projections.** No operation trusts a cached number;
//!    the outstanding balance is recomputed from movements every time a
//!    decision depends on it.
//! 2. **Rejections precede writes.** An operation validates everything
//!    first, then performs its writes in one transaction. A returned
//!    error always means the store is exactly as it was.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod reports;
pub mod service;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use backup::backup_to;
pub use error::{LedgerError, LedgerResult};
pub use reports::{DailyReport, MonthlyReport, ReportAggregator};
pub use service::{
    CreditOverview, CreditOverviewEntry, CustomerStatement, CustomerUpdate, LedgerService,
    NewCustomer, NewSale,
};
pub use snapshot::{ImportSummary, Snapshot, SnapshotGateway, SNAPSHOT_SCHEMA_VERSION};
