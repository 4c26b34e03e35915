//! # Credit Movement Repository
//!
//! Database operations for the fiado ledger.
//!
//! ## Balance Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  The Balance Is Never Stored                            │
//! │                                                                         │
//! │  credit_movements for customer Juan:                                   │
//! │                                                                         │
//! │    kind       │ amount_cents │ signed                                  │
//! │    ───────────┼──────────────┼────────                                 │
//! │    charge     │ 1000         │ +1000                                   │
//! │    interest   │ 50           │ +50                                     │
//! │    repayment  │ 400          │ -400                                    │
//! │                                                                         │
//! │  balance(Juan) = SUM(signed) = 650                                     │
//! │                                                                         │
//! │  One query owns this projection:                                       │
//! │                                                                         │
//! │    SELECT COALESCE(SUM(CASE WHEN kind = 'repayment'                    │
//! │                             THEN -amount_cents                         │
//! │                             ELSE amount_cents END), 0)                 │
//! │    FROM credit_movements WHERE customer_id = ?                         │
//! │                                                                         │
//! │  A stored balance column could drift from the movement history.        │
//! │  A derived balance cannot: the history IS the balance.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kiosco_core::{CreditMovement, TimeWindow};

/// A customer id paired with its derived outstanding balance.
///
/// Produced by [`MovementRepository::outstanding_balances`]; only
/// customers with a positive balance appear.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CustomerBalance {
    pub customer_id: String,
    pub balance_cents: i64,
}

/// Repository for credit movement database operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Inserts a single movement (interest or repayment).
    ///
    /// Charge movements are written by
    /// [`SaleRepository::insert_with_charge`] together with their sale;
    /// this method would reject them anyway via the sale_id CHECK.
    ///
    /// [`SaleRepository::insert_with_charge`]: crate::repository::sale::SaleRepository::insert_with_charge
    pub async fn insert(&self, movement: &CreditMovement) -> DbResult<()> {
        debug!(
            id = %movement.id,
            customer_id = %movement.customer_id,
            kind = ?movement.kind,
            "Inserting credit movement"
        );

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
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a batch of movements in one transaction.
    ///
    /// Used by settle-all: every customer's closing repayment persists,
    /// or none does.
    pub async fn insert_many(&self, movements: &[CreditMovement]) -> DbResult<()> {
        if movements.is_empty() {
            return Ok(());
        }

        debug!(count = movements.len(), "Inserting movement batch");

        let mut tx = self.pool.begin().await?;

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

        Ok(())
    }

    /// Gets a movement by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<CreditMovement>> {
        let movement = sqlx::query_as::<_, CreditMovement>(
            r#"
            SELECT id, customer_id, kind, amount_cents, sale_id, note, created_at
            FROM credit_movements
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Lists a customer's movements, oldest first.
    ///
    /// This ordered history is the customer statement.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<CreditMovement>> {
        let movements = sqlx::query_as::<_, CreditMovement>(
            r#"
            SELECT id, customer_id, kind, amount_cents, sale_id, note, created_at
            FROM credit_movements
            WHERE customer_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Lists movements inside a time window, oldest first.
    pub async fn list_in_window(&self, window: &TimeWindow) -> DbResult<Vec<CreditMovement>> {
        let movements = sqlx::query_as::<_, CreditMovement>(
            r#"
            SELECT id, customer_id, kind, amount_cents, sale_id, note, created_at
            FROM credit_movements
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at, rowid
            "#,
        )
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Derives a customer's outstanding balance in cents.
    ///
    /// Charges and interest add, repayments subtract. A customer with
    /// no movements has balance 0, not an error.
    pub async fn balance(&self, customer_id: &str) -> DbResult<i64> {
        let balance: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN kind = 'repayment' THEN -amount_cents ELSE amount_cents END
            ), 0)
            FROM credit_movements
            WHERE customer_id = ?1
            "#,
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Timestamp of a customer's most recent movement, if any.
    pub async fn latest_for_customer(
        &self,
        customer_id: &str,
    ) -> DbResult<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT MAX(created_at) FROM credit_movements WHERE customer_id = ?1",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(latest)
    }

    /// Timestamp of the most recent movement overall, if any.
    pub async fn latest_timestamp(&self) -> DbResult<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(created_at) FROM credit_movements")
                .fetch_one(&self.pool)
                .await?;

        Ok(latest)
    }

    /// Every customer currently owing money, largest balance first.
    ///
    /// Customers at zero are settled and excluded. Negative balances
    /// cannot occur (overpayments are rejected before insert), but the
    /// HAVING clause would exclude them too.
    pub async fn outstanding_balances(&self) -> DbResult<Vec<CustomerBalance>> {
        let balances = sqlx::query_as::<_, CustomerBalance>(
            r#"
            SELECT
                customer_id,
                SUM(CASE WHEN kind = 'repayment' THEN -amount_cents ELSE amount_cents END)
                    AS balance_cents
            FROM credit_movements
            GROUP BY customer_id
            HAVING balance_cents > 0
            ORDER BY balance_cents DESC, customer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(balances)
    }

    /// Counts total movements (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credit_movements")
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
    use kiosco_core::{Customer, MovementKind};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    async fn seed_customer(db: &Database, name: &str) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: None,
            email: None,
            notes: None,
            is_active: true,
            created_at: at(8),
        };
        db.customers().insert(&customer).await.unwrap();
        customer
    }

    fn movement(
        customer_id: &str,
        kind: MovementKind,
        cents: i64,
        created_at: DateTime<Utc>,
    ) -> CreditMovement {
        CreditMovement {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            kind,
            amount_cents: cents,
            sale_id: None,
            note: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_balance_signs_by_kind() {
        let db = test_db().await;
        let repo = db.movements();
        let juan = seed_customer(&db, "Juan").await;

        // No movements yet: zero, not an error
        assert_eq!(repo.balance(&juan.id).await.unwrap(), 0);

        repo.insert(&movement(&juan.id, MovementKind::Interest, 1000, at(9)))
            .await
            .unwrap();
        repo.insert(&movement(&juan.id, MovementKind::Interest, 50, at(10)))
            .await
            .unwrap();
        repo.insert(&movement(&juan.id, MovementKind::Repayment, 400, at(11)))
            .await
            .unwrap();

        assert_eq!(repo.balance(&juan.id).await.unwrap(), 650);
    }

    #[tokio::test]
    async fn test_balance_is_per_customer() {
        let db = test_db().await;
        let repo = db.movements();
        let juan = seed_customer(&db, "Juan").await;
        let maria = seed_customer(&db, "Maria").await;

        repo.insert(&movement(&juan.id, MovementKind::Interest, 300, at(9)))
            .await
            .unwrap();
        repo.insert(&movement(&maria.id, MovementKind::Interest, 700, at(9)))
            .await
            .unwrap();

        assert_eq!(repo.balance(&juan.id).await.unwrap(), 300);
        assert_eq!(repo.balance(&maria.id).await.unwrap(), 700);
    }

    #[tokio::test]
    async fn test_insert_many_is_atomic() {
        let db = test_db().await;
        let repo = db.movements();
        let juan = seed_customer(&db, "Juan").await;

        let batch = vec![
            movement(&juan.id, MovementKind::Interest, 100, at(9)),
            // FK violation in the middle of the batch
            movement("ghost", MovementKind::Interest, 200, at(9)),
            movement(&juan.id, MovementKind::Interest, 300, at(9)),
        ];

        assert!(repo.insert_many(&batch).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.balance(&juan.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_outstanding_balances_excludes_settled() {
        let db = test_db().await;
        let repo = db.movements();
        let juan = seed_customer(&db, "Juan").await;
        let maria = seed_customer(&db, "Maria").await;
        let pedro = seed_customer(&db, "Pedro").await;

        // Juan owes 500, Maria owes 900, Pedro settled back to zero
        repo.insert(&movement(&juan.id, MovementKind::Interest, 500, at(9)))
            .await
            .unwrap();
        repo.insert(&movement(&maria.id, MovementKind::Interest, 900, at(9)))
            .await
            .unwrap();
        repo.insert(&movement(&pedro.id, MovementKind::Interest, 200, at(9)))
            .await
            .unwrap();
        repo.insert(&movement(&pedro.id, MovementKind::Repayment, 200, at(10)))
            .await
            .unwrap();

        let balances = repo.outstanding_balances().await.unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].customer_id, maria.id);
        assert_eq!(balances[0].balance_cents, 900);
        assert_eq!(balances[1].customer_id, juan.id);
        assert_eq!(balances[1].balance_cents, 500);
    }

    #[tokio::test]
    async fn test_statement_is_oldest_first() {
        let db = test_db().await;
        let repo = db.movements();
        let juan = seed_customer(&db, "Juan").await;

        repo.insert(&movement(&juan.id, MovementKind::Repayment, 400, at(12)))
            .await
            .unwrap();
        repo.insert(&movement(&juan.id, MovementKind::Interest, 1000, at(9)))
            .await
            .unwrap();

        let statement = repo.list_for_customer(&juan.id).await.unwrap();

        assert_eq!(statement.len(), 2);
        assert_eq!(statement[0].kind, MovementKind::Interest);
        assert_eq!(statement[1].kind, MovementKind::Repayment);
    }

    #[tokio::test]
    async fn test_charge_requires_sale_link() {
        let db = test_db().await;
        let repo = db.movements();
        let juan = seed_customer(&db, "Juan").await;

        // A charge without a sale_id violates the table CHECK
        let orphan = movement(&juan.id, MovementKind::Charge, 500, at(9));
        assert!(repo.insert(&orphan).await.is_err());
    }
}
