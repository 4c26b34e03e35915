//! # kiosco-db: Storage Engine for the Kiosco Ledger
//!
//! This crate provides database access for the ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Kiosco Ledger Data Flow                           │
//! │                                                                         │
//! │  LedgerService (register_sale, register_repayment)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kiosco-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (customer.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ CustomerRepo  │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ SaleRepo      │    │              │  │   │
//! │  │   │ Management    │    │ MovementRepo  │    │              │  │   │
//! │  │   │ VACUUM INTO   │    │ SnapshotRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   one file, WAL mode - copying it IS the backup contract       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Boundaries
//!
//! Multi-record writes (a credit sale plus its charge movement, a
//! settle-all batch, a snapshot import) run inside a single SQLite
//! transaction: both records persist or neither does. Readers under WAL
//! see either the pre-commit or post-commit state, never half a pair.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration, backups
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (customer, sale, movement, snapshot)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiosco_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/kiosco.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let balance = db.movements().balance("customer-uuid").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::movement::{CustomerBalance, MovementRepository};
pub use repository::sale::SaleRepository;
pub use repository::snapshot::SnapshotRepository;
