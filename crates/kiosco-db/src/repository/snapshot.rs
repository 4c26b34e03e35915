//! # Snapshot Repository
//!
//! Whole-store dumps and the atomic replace that backs import.
//!
//! ## Replace Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Import = Replace, Atomically                        │
//! │                                                                         │
//! │  replace_all(customers, sales, movements)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  DELETE in child-first order:                                  │   │
//! │  │    1. DELETE FROM credit_movements                             │   │
//! │  │    2. DELETE FROM sales                                        │   │
//! │  │    3. DELETE FROM customers                                    │   │
//! │  │                                                                 │   │
//! │  │  INSERT in parent-first order:                                 │   │
//! │  │    4. INSERT customers                                         │   │
//! │  │    5. INSERT sales                                             │   │
//! │  │    6. INSERT movements                                         │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← On any failure the old store survives untouched              │
//! │                                                                         │
//! │  Merging two stores is NOT supported: ids and name uniqueness          │
//! │  cannot be reconciled after the fact. Import means "become this        │
//! │  snapshot".                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dumps preserve insertion order (rowid) so a dump/replace round trip
//! keeps same-timestamp rows in their original relative order.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use kiosco_core::{CreditMovement, Customer, Sale};

/// Repository for whole-store snapshot operations.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Dumps every customer in insertion order.
    pub async fn dump_customers(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, notes, is_active, created_at
            FROM customers
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Dumps every sale in insertion order.
    pub async fn dump_sales(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, amount_cents, method, customer_id, note, created_at
            FROM sales
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Dumps every credit movement in insertion order.
    pub async fn dump_movements(&self) -> DbResult<Vec<CreditMovement>> {
        let movements = sqlx::query_as::<_, CreditMovement>(
            r#"
            SELECT id, customer_id, kind, amount_cents, sale_id, note, created_at
            FROM credit_movements
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Replaces the entire store with the given records, atomically.
    ///
    /// The caller is expected to have validated the records against the
    /// domain rules already; this method still enforces the schema
    /// constraints (FKs, CHECKs, unique active names) and rolls back on
    /// the first violation, leaving the previous store intact.
    pub async fn replace_all(
        &self,
        customers: &[Customer],
        sales: &[Sale],
        movements: &[CreditMovement],
    ) -> DbResult<()> {
        info!(
            customers = customers.len(),
            sales = sales.len(),
            movements = movements.len(),
            "Replacing store contents"
        );

        let mut tx = self.pool.begin().await?;

        // Children first so the FKs never dangle mid-transaction
        sqlx::query("DELETE FROM credit_movements")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sales").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM customers")
            .execute(&mut *tx)
            .await?;

        debug!("Old records cleared, inserting snapshot");

        for customer in customers {
            sqlx::query(
                r#"
                INSERT INTO customers (
                    id, name, phone, email, notes, is_active, created_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7
                )
                "#,
            )
            .bind(&customer.id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(&customer.email)
            .bind(&customer.notes)
            .bind(customer.is_active)
            .bind(customer.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for sale in sales {
            sqlx::query(
                r#"
                INSERT INTO sales (
                    id, amount_cents, method, customer_id, note, created_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6
                )
                "#,
            )
            .bind(&sale.id)
            .bind(sale.amount_cents)
            .bind(sale.method)
            .bind(&sale.customer_id)
            .bind(&sale.note)
            .bind(sale.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for movement in movements {
            sqlx::query(
                r#"
                INSERT INTO credit_movements (
                    id, customer_id, kind, amount_cents, sale_id, note, created_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7
                )
                "#,
            )
            .bind(&movement.id)
            .bind(&movement.customer_id)
            .bind(movement.kind)
            .bind(movement.amount_cents)
            .bind(&movement.sale_id)
            .bind(&movement.note)
            .bind(movement.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Store replaced");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{DateTime, TimeZone, Utc};
    use kiosco_core::{MovementKind, PaymentMethod};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    fn customer(name: &str) -> Customer {
        Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: None,
            email: None,
            notes: None,
            is_active: true,
            created_at: at(8),
        }
    }

    fn cash_sale(cents: i64) -> Sale {
        Sale {
            id: Uuid::new_v4().to_string(),
            amount_cents: cents,
            method: PaymentMethod::Cash,
            customer_id: None,
            note: None,
            created_at: at(10),
        }
    }

    #[tokio::test]
    async fn test_replace_then_dump_round_trip() {
        let db = test_db().await;
        let juan = customer("Juan");
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            amount_cents: 1000,
            method: PaymentMethod::Credit,
            customer_id: Some(juan.id.clone()),
            note: Some("fiado".to_string()),
            created_at: at(10),
        };
        let charge = CreditMovement {
            id: Uuid::new_v4().to_string(),
            customer_id: juan.id.clone(),
            kind: MovementKind::Charge,
            amount_cents: 1000,
            sale_id: Some(sale.id.clone()),
            note: None,
            created_at: at(10),
        };

        db.snapshots()
            .replace_all(
                std::slice::from_ref(&juan),
                std::slice::from_ref(&sale),
                std::slice::from_ref(&charge),
            )
            .await
            .unwrap();

        let customers = db.snapshots().dump_customers().await.unwrap();
        let sales = db.snapshots().dump_sales().await.unwrap();
        let movements = db.snapshots().dump_movements().await.unwrap();

        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Juan");
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].note.as_deref(), Some("fiado"));
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].sale_id.as_deref(), Some(sale.id.as_str()));

        assert_eq!(db.movements().balance(&juan.id).await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_replace_discards_previous_contents() {
        let db = test_db().await;

        db.sales().insert(&cash_sale(500)).await.unwrap();
        db.sales().insert(&cash_sale(700)).await.unwrap();
        assert_eq!(db.sales().count().await.unwrap(), 2);

        let replacement = cash_sale(900);
        db.snapshots()
            .replace_all(&[], std::slice::from_ref(&replacement), &[])
            .await
            .unwrap();

        assert_eq!(db.sales().count().await.unwrap(), 1);
        let dumped = db.snapshots().dump_sales().await.unwrap();
        assert_eq!(dumped[0].amount_cents, 900);
    }

    #[tokio::test]
    async fn test_replace_rolls_back_on_bad_record() {
        let db = test_db().await;

        db.sales().insert(&cash_sale(500)).await.unwrap();

        // Movement references a customer absent from the snapshot
        let orphan = CreditMovement {
            id: Uuid::new_v4().to_string(),
            customer_id: "ghost".to_string(),
            kind: MovementKind::Interest,
            amount_cents: 100,
            sale_id: None,
            note: None,
            created_at: at(9),
        };

        let result = db
            .snapshots()
            .replace_all(&[], &[], std::slice::from_ref(&orphan))
            .await;
        assert!(result.is_err());

        // The deletes inside the failed transaction rolled back too
        assert_eq!(db.sales().count().await.unwrap(), 1);
        assert_eq!(db.movements().count().await.unwrap(), 0);
    }
}
