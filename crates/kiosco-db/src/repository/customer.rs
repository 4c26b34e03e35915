//! # Customer Repository
//!
//! Database operations for fiado customers.
//!
//! ## Soft Deactivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Why Customers Are Never Deleted                      │
//! │                                                                         │
//! │  Customer "Juan" has 14 sales and 9 movements on record.               │
//! │                                                                         │
//! │  ❌ DELETE FROM customers WHERE id = ?                                 │
//! │     → orphans every sale and movement that references Juan             │
//! │     → history no longer explains itself                                │
//! │                                                                         │
//! │  ✅ UPDATE customers SET is_active = 0 WHERE id = ?                    │
//! │     → Juan disappears from pickers and name lookups                   │
//! │     → statements and reports still resolve his name                   │
//! │     → a NEW active "Juan" may be registered (partial unique index)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The outstanding-balance guard for deactivation lives in the service
//! layer: this repository only flips the flag.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kiosco_core::Customer;

/// Repository for customer database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CustomerRepository::new(pool);
///
/// // Look up by active name
/// let customer = repo.get_by_name("Juan").await?;
///
/// // List everyone, including deactivated
/// let all = repo.list(false).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Ok(())` - Customer inserted
    /// * `Err(DbError::UniqueViolation)` - An active customer already has this name
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

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
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found (active or not)
    /// * `Ok(None)` - No customer with this ID
    pub async fn get(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, notes, is_active, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets an active customer by exact name.
    ///
    /// Deactivated customers are excluded: among active customers the
    /// name is unique, so this returns at most one row.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, notes, is_active, created_at
            FROM customers
            WHERE name = ?1 AND is_active = 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers sorted by name.
    ///
    /// ## Arguments
    /// * `active_only` - When true, deactivated customers are excluded
    pub async fn list(&self, active_only: bool) -> DbResult<Vec<Customer>> {
        let customers = if active_only {
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT id, name, phone, email, notes, is_active, created_at
                FROM customers
                WHERE is_active = 1
                ORDER BY name
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT id, name, phone, email, notes, is_active, created_at
                FROM customers
                ORDER BY name
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        };

        Ok(customers)
    }

    /// Updates a customer's contact details.
    ///
    /// Only name, phone, email, and notes change. The active flag is
    /// managed by [`set_active`](Self::set_active); id and created_at
    /// never change.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Customer doesn't exist
    /// * `Err(DbError::UniqueViolation)` - New name collides with an active customer
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = ?3,
                email = ?4,
                notes = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Sets the active flag (deactivate / reactivate).
    ///
    /// ## Returns
    /// * `Ok(())` - Flag updated
    /// * `Err(DbError::NotFound)` - Customer doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Reactivation would duplicate an active name
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        debug!(id = %id, active = %active, "Setting customer active flag");

        let result = sqlx::query(
            r#"
            UPDATE customers SET is_active = ?2 WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Counts active customers (for diagnostics).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
