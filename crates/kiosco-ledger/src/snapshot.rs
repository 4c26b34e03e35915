//! # Snapshot Gateway
//!
//! Portable export and import of the whole ledger.
//!
//! ## Trust Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              A Snapshot Is Evidence, Not Authority                      │
//! │                                                                         │
//! │  export_all()                     import_all(snapshot)                 │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  dump tables in               1. version tag check                     │
//! │  insertion order              2. revalidate EVERY ledger rule:         │
//! │       │                          • amounts strictly positive          │
//! │       ▼                          • charge ⇔ credit sale, 1:1,         │
//! │  Snapshot {                        same customer, same amount         │
//! │    schema_version,               • movement customers exist           │
//! │    exported_at,                  • timestamps ordered per stream      │
//! │    customers, sales,             • no prefix of any customer's        │
//! │    movements,                      stream dips below zero             │
//! │  }                            3. replace store in ONE transaction     │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  versioned JSON,              any violation → CorruptSnapshot,        │
//! │  human inspectable            existing store untouched                 │
//! │                                                                         │
//! │  Round trip: import_all(export_all()) is observably identical —       │
//! │  same balances, same report for any window.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The file may have been edited, truncated, or produced by a different
//! build. Importing it blindly would let a hand-edited JSON file break
//! invariants the service spent its whole life defending.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LedgerResult;
use kiosco_core::{CoreError, CreditMovement, Customer, MovementKind, PaymentMethod, Sale};
use kiosco_db::Database;

/// Schema version written into every export.
///
/// Bump on any change a previous build could misread. Compatibility is
/// only guaranteed within the same major version.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Snapshot Document
// =============================================================================

/// The portable serialized form of the entire ledger.
///
/// Arrays preserve insertion order, so a round trip keeps
/// same-timestamp records in their original relative order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version tag. See [`SNAPSHOT_SCHEMA_VERSION`].
    pub schema_version: u32,

    /// When this snapshot was taken.
    pub exported_at: DateTime<Utc>,

    /// Every customer, active or not, in insertion order.
    pub customers: Vec<Customer>,

    /// Every sale, in insertion order.
    pub sales: Vec<Sale>,

    /// Every credit movement, in insertion order.
    pub movements: Vec<CreditMovement>,
}

impl Snapshot {
    /// Serializes to pretty-printed JSON (the on-disk format).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes from JSON.
    ///
    /// This only checks that the document parses; ledger rules are
    /// checked by [`SnapshotGateway::import_all`].
    pub fn from_json(json: &str) -> serde_json::Result<Snapshot> {
        serde_json::from_str(json)
    }
}

/// Record counts of a completed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub customers: usize,
    pub sales: usize,
    pub movements: usize,
}

// =============================================================================
// Snapshot Gateway
// =============================================================================

/// Serializes the full ledger state and restores from it.
#[derive(Debug, Clone)]
pub struct SnapshotGateway {
    db: Database,
}

impl SnapshotGateway {
    /// Creates a new gateway over an open database.
    pub fn new(db: Database) -> Self {
        SnapshotGateway { db }
    }

    /// Exports every customer, sale, and movement.
    pub async fn export_all(&self) -> LedgerResult<Snapshot> {
        let customers = self.db.snapshots().dump_customers().await?;
        let sales = self.db.snapshots().dump_sales().await?;
        let movements = self.db.snapshots().dump_movements().await?;

        info!(
            customers = customers.len(),
            sales = sales.len(),
            movements = movements.len(),
            "Ledger exported"
        );

        Ok(Snapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            customers,
            sales,
            movements,
        })
    }

    /// Exports to a JSON file, creating parent directories as needed.
    pub async fn export_to_file(&self, path: &Path) -> LedgerResult<Snapshot> {
        let snapshot = self.export_all().await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, snapshot.to_json()?)?;
        info!(path = %path.display(), "Snapshot written");
        Ok(snapshot)
    }

    /// Replaces the entire store with the snapshot's contents.
    ///
    /// The snapshot is revalidated against every ledger rule before a
    /// single row is touched; the replace itself runs in one
    /// transaction. On any error the existing store is unchanged.
    ///
    /// ## Errors
    /// - `UnsupportedSnapshotVersion` - version tag mismatch
    /// - `CorruptSnapshot` - contents fail invariant revalidation
    /// - `Storage` - the transactional replace failed (rolled back)
    pub async fn import_all(&self, snapshot: &Snapshot) -> LedgerResult<ImportSummary> {
        debug!(
            version = snapshot.schema_version,
            exported_at = %snapshot.exported_at,
            "Validating snapshot for import"
        );

        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(CoreError::UnsupportedSnapshotVersion {
                found: snapshot.schema_version,
                supported: SNAPSHOT_SCHEMA_VERSION,
            }
            .into());
        }
        validate(snapshot)?;

        self.db
            .snapshots()
            .replace_all(&snapshot.customers, &snapshot.sales, &snapshot.movements)
            .await?;

        info!(
            customers = snapshot.customers.len(),
            sales = snapshot.sales.len(),
            movements = snapshot.movements.len(),
            "Ledger imported"
        );

        Ok(ImportSummary {
            customers: snapshot.customers.len(),
            sales: snapshot.sales.len(),
            movements: snapshot.movements.len(),
        })
    }

    /// Imports from a JSON file.
    pub async fn import_from_file(&self, path: &Path) -> LedgerResult<ImportSummary> {
        let json = std::fs::read_to_string(path)?;
        let snapshot = Snapshot::from_json(&json)?;
        self.import_all(&snapshot).await
    }
}

// =============================================================================
// Invariant Revalidation
// =============================================================================

/// Checks every ledger rule over the snapshot contents.
///
/// Pure function: no I/O, no clock. The checks mirror what the service
/// enforces write-by-write, restated over a whole ledger at once.
fn validate(snapshot: &Snapshot) -> Result<(), CoreError> {
    let corrupt = |reason: String| CoreError::CorruptSnapshot { reason };

    // Unique ids per table
    let mut customer_ids = HashSet::new();
    for customer in &snapshot.customers {
        if !customer_ids.insert(customer.id.as_str()) {
            return Err(corrupt(format!("duplicate customer id {}", customer.id)));
        }
        if customer.name.trim().is_empty() {
            return Err(corrupt(format!("customer {} has an empty name", customer.id)));
        }
    }
    let mut active_names = HashSet::new();
    for customer in snapshot.customers.iter().filter(|c| c.is_active) {
        if !active_names.insert(customer.name.as_str()) {
            return Err(corrupt(format!(
                "active customer name '{}' appears twice",
                customer.name
            )));
        }
    }

    // Sales: positive amounts, method/customer pairing, ordered stream
    let mut sale_index: HashMap<&str, &Sale> = HashMap::new();
    let mut latest_sale_at: Option<DateTime<Utc>> = None;
    for sale in &snapshot.sales {
        if sale_index.insert(sale.id.as_str(), sale).is_some() {
            return Err(corrupt(format!("duplicate sale id {}", sale.id)));
        }
        if sale.amount_cents <= 0 {
            return Err(corrupt(format!(
                "sale {} has non-positive amount {}",
                sale.id, sale.amount_cents
            )));
        }
        match (&sale.customer_id, sale.method) {
            (None, PaymentMethod::Credit) => {
                return Err(corrupt(format!("credit sale {} has no customer", sale.id)));
            }
            (Some(_), method) if method != PaymentMethod::Credit => {
                return Err(corrupt(format!(
                    "{method:?} sale {} is linked to a customer",
                    sale.id
                )));
            }
            (Some(customer_id), _) if !customer_ids.contains(customer_id.as_str()) => {
                return Err(corrupt(format!(
                    "sale {} references unknown customer {customer_id}",
                    sale.id
                )));
            }
            _ => {}
        }
        if latest_sale_at.is_some_and(|latest| sale.created_at < latest) {
            return Err(corrupt(format!(
                "sale {} breaks timestamp order at {}",
                sale.id, sale.created_at
            )));
        }
        latest_sale_at = Some(sale.created_at);
    }

    // Movements: positive amounts, kind/sale pairing, charge linkage,
    // per-customer timestamp order, non-negative running balances
    let mut movement_ids = HashSet::new();
    let mut charges_per_sale: HashMap<&str, u32> = HashMap::new();
    let mut latest_at: HashMap<&str, DateTime<Utc>> = HashMap::new();
    let mut running: HashMap<&str, i64> = HashMap::new();
    for movement in &snapshot.movements {
        if !movement_ids.insert(movement.id.as_str()) {
            return Err(corrupt(format!("duplicate movement id {}", movement.id)));
        }
        if movement.amount_cents <= 0 {
            return Err(corrupt(format!(
                "movement {} has non-positive amount {}",
                movement.id, movement.amount_cents
            )));
        }
        if !customer_ids.contains(movement.customer_id.as_str()) {
            return Err(corrupt(format!(
                "movement {} references unknown customer {}",
                movement.id, movement.customer_id
            )));
        }

        match (&movement.sale_id, movement.kind) {
            (None, MovementKind::Charge) => {
                return Err(corrupt(format!("charge {} has no linked sale", movement.id)));
            }
            (Some(sale_id), MovementKind::Charge) => {
                let Some(sale) = sale_index.get(sale_id.as_str()) else {
                    return Err(corrupt(format!(
                        "charge {} references unknown sale {sale_id}",
                        movement.id
                    )));
                };
                if sale.method != PaymentMethod::Credit {
                    return Err(corrupt(format!(
                        "charge {} links {:?} sale {sale_id}, expected a credit sale",
                        movement.id, sale.method
                    )));
                }
                if sale.customer_id.as_deref() != Some(movement.customer_id.as_str()) {
                    return Err(corrupt(format!(
                        "charge {} and sale {sale_id} disagree on the customer",
                        movement.id
                    )));
                }
                if sale.amount_cents != movement.amount_cents {
                    return Err(corrupt(format!(
                        "charge {} amount {} differs from sale {sale_id} amount {}",
                        movement.id, movement.amount_cents, sale.amount_cents
                    )));
                }
                let seen = charges_per_sale.entry(sale_id.as_str()).or_insert(0);
                *seen += 1;
                if *seen > 1 {
                    return Err(corrupt(format!("sale {sale_id} carries multiple charges")));
                }
            }
            (Some(sale_id), kind) => {
                return Err(corrupt(format!(
                    "{kind:?} movement {} must not link a sale (links {sale_id})",
                    movement.id
                )));
            }
            (None, _) => {}
        }

        let customer_id = movement.customer_id.as_str();
        if latest_at
            .get(customer_id)
            .is_some_and(|latest| movement.created_at < *latest)
        {
            return Err(corrupt(format!(
                "movement {} breaks timestamp order for customer {customer_id}",
                movement.id
            )));
        }
        latest_at.insert(customer_id, movement.created_at);

        let balance = running.entry(customer_id).or_insert(0);
        *balance += movement.signed_cents();
        if *balance < 0 {
            return Err(corrupt(format!(
                "customer {customer_id} balance goes negative ({}) at movement {}",
                *balance, movement.id
            )));
        }
    }

    // Every credit sale must have exactly one charge backing it
    for sale in snapshot.sales.iter().filter(|s| s.is_credit()) {
        if !charges_per_sale.contains_key(sale.id.as_str()) {
            return Err(corrupt(format!("credit sale {} has no charge movement", sale.id)));
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
