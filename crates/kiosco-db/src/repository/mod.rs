//! # Repository Module
//!
//! Database repository implementations for the Kiosco Ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  LedgerService                                                         │
//! │       │                                                                 │
//! │       │  db.movements().balance(&customer_id)                          │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  MovementRepository                                                    │
//! │  ├── insert(&self, movement)                                           │
//! │  ├── balance(&self, customer_id)                                       │
//! │  ├── list_for_customer(&self, customer_id)                             │
//! │  └── outstanding_balances(&self)                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test against an in-memory database                          │
//! │  • SQL is isolated in one place                                        │
//! │  • Balance derivation lives in exactly one query                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`] - Customer CRUD with soft deactivation
//! - [`SaleRepository`] - Append-only sale records and window queries
//! - [`MovementRepository`] - The fiado ledger and balance derivation
//! - [`SnapshotRepository`] - Whole-store dumps and atomic replace (import)
//!
//! [`CustomerRepository`]: customer::CustomerRepository
//! [`SaleRepository`]: sale::SaleRepository
//! [`MovementRepository`]: movement::MovementRepository
//! [`SnapshotRepository`]: snapshot::SnapshotRepository

pub mod customer;
pub mod movement;
pub mod sale;
pub mod snapshot;
