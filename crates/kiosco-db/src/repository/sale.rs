//! # Sale Repository
//!
//! Database operations for the append-only sale record.
//!
//! ## The Credit Sale Pair
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Why Credit Sales Write Two Rows Atomically                 │
//! │                                                                         │
//! │  register_sale(credit, $10.00, customer: Juan)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. INSERT INTO sales (id, amount_cents, method='credit', ...) │   │
//! │  │                                                                 │   │
//! │  │  2. INSERT INTO credit_movements                               │   │
//! │  │     (kind='charge', amount_cents, sale_id, ...)                │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← Both rows persist or neither does                            │
//! │                                                                         │
//! │  A sale without its charge would mean revenue the balance never       │
//! │  saw; a charge without its sale would mean debt with no purchase      │
//! │  behind it. Neither state is ever observable.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kiosco_core::{CreditMovement, Sale, TimeWindow};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a non-credit sale.
    ///
    /// Credit sales must go through
    /// [`insert_with_charge`](Self::insert_with_charge) so the charge
    /// movement lands in the same transaction.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, method = ?sale.method, "Inserting sale");

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
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a credit sale together with its charge movement.
    ///
    /// ## Atomicity
    /// Both rows are written inside one transaction. If either insert
    /// fails (constraint violation, missing customer), the transaction
    /// rolls back and neither row exists.
    pub async fn insert_with_charge(
        &self,
        sale: &Sale,
        charge: &CreditMovement,
    ) -> DbResult<()> {
        debug!(
            sale_id = %sale.id,
            charge_id = %charge.id,
            "Inserting credit sale with charge"
        );

        let mut tx = self.pool.begin().await?;

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

        sqlx::query(
            r#"
            INSERT INTO credit_movements (
                id, customer_id, kind, amount_cents, sale_id, note, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7
            )
            "#,
        )
        .bind(&charge.id)
        .bind(&charge.customer_id)
        .bind(charge.kind)
        .bind(charge.amount_cents)
        .bind(&charge.sale_id)
        .bind(&charge.note)
        .bind(charge.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Gets a sale by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, amount_cents, method, customer_id, note, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists sales inside a time window, oldest first.
    ///
    /// The window is half-open: a sale exactly at the end instant
    /// belongs to the next window, never to two.
    pub async fn list_in_window(&self, window: &TimeWindow) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, amount_cents, method, customer_id, note, created_at
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at, rowid
            "#,
        )
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists sales in a window whose note contains the given term.
    ///
    /// ## Arguments
    /// * `window` - Half-open time window to search in
    /// * `term` - Substring to match against notes, case-insensitive
    ///   in the ASCII range. `None` matches every sale in the window.
    pub async fn search_in_window(
        &self,
        window: &TimeWindow,
        term: Option<&str>,
    ) -> DbResult<Vec<Sale>> {
        let sales = match term {
            Some(term) => {
                debug!(term = %term, "Searching sales by note");
                sqlx::query_as::<_, Sale>(
                    r#"
                    SELECT id, amount_cents, method, customer_id, note, created_at
                    FROM sales
                    WHERE created_at >= ?1 AND created_at < ?2
                    AND note LIKE '%' || ?3 || '%'
                    ORDER BY created_at, rowid
                    "#,
                )
                .bind(window.start())
                .bind(window.end())
                .bind(term)
                .fetch_all(&self.pool)
                .await?
            }
            None => self.list_in_window(window).await?,
        };

        Ok(sales)
    }

    /// Lists credit sales for one customer, oldest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, amount_cents, method, customer_id, note, created_at
            FROM sales
            WHERE customer_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Timestamp of the most recent sale, if any.
    ///
    /// The service layer compares new timestamps against this to keep
    /// the record append-only in time.
    pub async fn latest_timestamp(&self) -> DbResult<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(created_at) FROM sales")
                .fetch_one(&self.pool)
                .await?;

        Ok(latest)
    }

    /// Counts total sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use kiosco_core::{Customer, MovementKind, PaymentMethod};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, min, 0).unwrap()
    }

    fn cash_sale(cents: i64, created_at: DateTime<Utc>) -> Sale {
        Sale {
            id: Uuid::new_v4().to_string(),
            amount_cents: cents,
            method: PaymentMethod::Cash,
            customer_id: None,
            note: None,
            created_at,
        }
    }

    async fn seed_customer(db: &Database, name: &str) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: None,
            email: None,
            notes: None,
            is_active: true,
            created_at: at(8, 0),
        };
        db.customers().insert(&customer).await.unwrap();
        customer
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let sale = cash_sale(500, at(10, 0));

        db.sales().insert(&sale).await.unwrap();

        let found = db.sales().get(&sale.id).await.unwrap().unwrap();
        assert_eq!(found.amount_cents, 500);
        assert_eq!(found.method, PaymentMethod::Cash);
        assert_eq!(found.created_at, sale.created_at);
    }

    #[tokio::test]
    async fn test_insert_with_charge_writes_both_rows() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Juan").await;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            amount_cents: 1000,
            method: PaymentMethod::Credit,
            customer_id: Some(customer.id.clone()),
            note: None,
            created_at: at(11, 0),
        };
        let charge = CreditMovement {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            kind: MovementKind::Charge,
            amount_cents: 1000,
            sale_id: Some(sale.id.clone()),
            note: None,
            created_at: at(11, 0),
        };

        db.sales().insert_with_charge(&sale, &charge).await.unwrap();

        assert!(db.sales().get(&sale.id).await.unwrap().is_some());
        assert_eq!(db.movements().balance(&customer.id).await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_insert_with_charge_rolls_back_on_bad_movement() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Juan").await;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            amount_cents: 1000,
            method: PaymentMethod::Credit,
            customer_id: Some(customer.id.clone()),
            note: None,
            created_at: at(11, 0),
        };
        // Charge points at a customer that doesn't exist: FK violation
        let charge = CreditMovement {
            id: Uuid::new_v4().to_string(),
            customer_id: "no-such-customer".to_string(),
            kind: MovementKind::Charge,
            amount_cents: 1000,
            sale_id: Some(sale.id.clone()),
            note: None,
            created_at: at(11, 0),
        };

        let result = db.sales().insert_with_charge(&sale, &charge).await;
        assert!(result.is_err());

        // The sale insert succeeded inside the transaction but must
        // not survive the rollback
        assert!(db.sales().get(&sale.id).await.unwrap().is_none());
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_window_is_half_open() {
        let db = test_db().await;
        let repo = db.sales();

        repo.insert(&cash_sale(100, at(0, 0))).await.unwrap();
        repo.insert(&cash_sale(200, at(12, 0))).await.unwrap();

        // Sale at exactly the next midnight lands outside the day
        let next_midnight = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
        repo.insert(&cash_sale(400, next_midnight)).await.unwrap();

        let window = TimeWindow::day(chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()).unwrap();
        let sales = repo.list_in_window(&window).await.unwrap();

        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].amount_cents, 100);
        assert_eq!(sales[1].amount_cents, 200);
    }

    #[tokio::test]
    async fn test_search_matches_note_substring() {
        let db = test_db().await;
        let repo = db.sales();

        let mut with_note = cash_sale(300, at(9, 0));
        with_note.note = Some("dos empanadas".to_string());
        repo.insert(&with_note).await.unwrap();
        repo.insert(&cash_sale(700, at(9, 30))).await.unwrap();

        let window = TimeWindow::day(chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()).unwrap();

        let hits = repo.search_in_window(&window, Some("empanada")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].amount_cents, 300);

        let all = repo.search_in_window(&window, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_latest_timestamp() {
        let db = test_db().await;
        let repo = db.sales();

        assert!(repo.latest_timestamp().await.unwrap().is_none());

        repo.insert(&cash_sale(100, at(9, 0))).await.unwrap();
        repo.insert(&cash_sale(200, at(15, 0))).await.unwrap();

        assert_eq!(repo.latest_timestamp().await.unwrap(), Some(at(15, 0)));
    }

    #[tokio::test]
    async fn test_amount_must_be_positive() {
        let db = test_db().await;

        let result = db.sales().insert(&cash_sale(0, at(9, 0))).await;
        assert!(result.is_err());
    }
}
