//! # Ledger Service
//!
//! The single write path of the ledger. Every mutation validates first,
//! writes second, and leaves the store untouched on any rejection.
//!
//! ## Write Path Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Every Mutation Follows One Shape                        │
//! │                                                                         │
//! │  1. SHAPE CHECKS (kiosco-core::validation)                             │
//! │     └── amounts positive, names long enough, notes trimmed             │
//! │                                                                         │
//! │  2. RULE CHECKS (against current state, read-only)                     │
//! │     ├── customer exists / is active                                    │
//! │     ├── balance recomputed from movements (never cached)               │
//! │     └── timestamp not earlier than the stream's latest                 │
//! │                                                                         │
//! │  3. WRITE (kiosco-db, one transaction)                                 │
//! │     └── single insert, or sale+charge pair, or settle-all batch        │
//! │                                                                         │
//! │  An error from 1 or 2 means nothing was written.                       │
//! │  An error from 3 means the transaction rolled back.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Fiado Rules In One Place
//!
//! - A credit sale always carries a customer; any other sale never does.
//! - A repayment may reach exactly zero, never below: overpayment is
//!   rejected with the outstanding amount in the error.
//! - Balances are recomputed from the movement log on every decision.
//! - Timestamps are non-decreasing per stream (sales; each customer's
//!   movements), so reports never re-sort.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use kiosco_core::validation::{
    validate_amount_cents, validate_contact, validate_customer_name, validate_note,
    validate_rate_bps,
};
use kiosco_core::{
    CoreError, CreditMovement, Customer, InterestRate, Money, MovementKind, PaymentMethod, Sale,
    ValidationError,
};
use kiosco_db::{Database, DbError};

// =============================================================================
// Input Types
// =============================================================================

/// Input for registering a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    /// Sale amount in cents. Must be positive.
    pub amount_cents: i64,

    /// How the sale was paid.
    pub method: PaymentMethod,

    /// Customer id. Required for `Credit`, forbidden otherwise.
    pub customer_id: Option<String>,

    /// Optional description ("2x milk, bread").
    pub note: Option<String>,

    /// Explicit timestamp. Defaults to now; must not precede the
    /// latest recorded sale.
    pub at: Option<DateTime<Utc>>,
}

/// Input for registering a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    /// Display name, unique among active customers.
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Partial update of a customer's contact details.
///
/// `None` leaves a field unchanged; `Some("")` clears it (empty strings
/// normalize to absent).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Output Types
// =============================================================================

/// A customer's movement history with the derived balance.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerStatement {
    pub customer: Customer,
    /// Movements oldest first.
    pub movements: Vec<CreditMovement>,
    pub balance: Money,
}

/// One debtor line in the credit overview.
#[derive(Debug, Clone, Serialize)]
pub struct CreditOverviewEntry {
    pub customer: Customer,
    pub balance: Money,
}

/// Everyone who currently owes money, with the total outstanding.
#[derive(Debug, Clone, Serialize)]
pub struct CreditOverview {
    /// Debtors, largest balance first.
    pub entries: Vec<CreditOverviewEntry>,
    pub total_outstanding: Money,
    pub debtor_count: usize,
}

// =============================================================================
// Ledger Service
// =============================================================================

/// The ledger's write path and customer-facing read operations.
///
/// Cloning is cheap: clones share the underlying pool.
///
/// ## Usage
/// ```rust,ignore
/// let service = LedgerService::new(db);
///
/// let sale = service
///     .register_sale(NewSale {
///         amount_cents: 1000,
///         method: PaymentMethod::Credit,
///         customer_id: Some(juan.id.clone()),
///         note: None,
///         at: None,
///     })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct LedgerService {
    db: Database,
}

impl LedgerService {
    /// Creates a new service over an open database.
    pub fn new(db: Database) -> Self {
        LedgerService { db }
    }

    /// Returns the underlying database handle.
    ///
    /// Used by the report aggregator and snapshot gateway; command
    /// surfaces should stay on the service methods.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Registers a sale.
    ///
    /// For `method == Credit` the sale and its charge movement are
    /// written in one transaction; the charge amount always equals the
    /// sale amount.
    ///
    /// ## Errors
    /// - `MustBePositive` - non-positive amount
    /// - `MissingCustomer` - credit sale without a customer
    /// - `UnexpectedCustomer` - customer on a non-credit sale
    /// - `CustomerInactive` - credit sale for a deactivated customer
    /// - `TimestampOutOfOrder` - explicit timestamp predates the stream
    pub async fn register_sale(&self, input: NewSale) -> LedgerResult<Sale> {
        debug!(method = ?input.method, amount = input.amount_cents, "register_sale");

        validate_amount_cents(input.amount_cents)?;
        let note = validate_note(input.note.as_deref())?;

        // Method / customer pairing
        let customer_id = if input.method.requires_customer() {
            let id = input.customer_id.ok_or(CoreError::MissingCustomer)?;
            let customer = self.require_customer(&id).await?;
            if !customer.is_active {
                return Err(CoreError::CustomerInactive { id: customer.id }.into());
            }
            Some(id)
        } else {
            if input.customer_id.is_some() {
                return Err(CoreError::UnexpectedCustomer {
                    method: input.method,
                }
                .into());
            }
            None
        };

        let at = input.at.unwrap_or_else(Utc::now);
        check_stream_order(at, self.db.sales().latest_timestamp().await?)?;
        if let Some(id) = &customer_id {
            check_stream_order(at, self.db.movements().latest_for_customer(id).await?)?;
        }

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            amount_cents: input.amount_cents,
            method: input.method,
            customer_id,
            note,
            created_at: at,
        };

        match &sale.customer_id {
            Some(customer_id) => {
                let charge = CreditMovement {
                    id: Uuid::new_v4().to_string(),
                    customer_id: customer_id.clone(),
                    kind: MovementKind::Charge,
                    amount_cents: sale.amount_cents,
                    sale_id: Some(sale.id.clone()),
                    note: None,
                    created_at: at,
                };
                self.db.sales().insert_with_charge(&sale, &charge).await?;
                info!(
                    sale_id = %sale.id,
                    customer_id = %customer_id,
                    amount = sale.amount_cents,
                    "Credit sale registered"
                );
            }
            None => {
                self.db.sales().insert(&sale).await?;
                info!(
                    sale_id = %sale.id,
                    method = ?sale.method,
                    amount = sale.amount_cents,
                    "Sale registered"
                );
            }
        }

        Ok(sale)
    }

    // =========================================================================
    // Credit Movements
    // =========================================================================

    /// Registers a (possibly partial) repayment.
    ///
    /// The balance is recomputed from the movement log; a repayment that
    /// would drive it negative is rejected, never clipped.
    pub async fn register_repayment(
        &self,
        customer_id: &str,
        amount_cents: i64,
        note: Option<&str>,
        at: Option<DateTime<Utc>>,
    ) -> LedgerResult<CreditMovement> {
        debug!(customer_id = %customer_id, amount = amount_cents, "register_repayment");

        validate_amount_cents(amount_cents)?;
        let note = validate_note(note)?;
        self.require_customer(customer_id).await?;

        let balance = self.db.movements().balance(customer_id).await?;
        if balance == 0 {
            return Err(CoreError::NothingOutstanding {
                customer_id: customer_id.to_string(),
            }
            .into());
        }
        if amount_cents > balance {
            return Err(CoreError::ExceedsBalance {
                requested: Money::from_cents(amount_cents),
                balance: Money::from_cents(balance),
            }
            .into());
        }

        let at = at.unwrap_or_else(Utc::now);
        check_stream_order(at, self.db.movements().latest_for_customer(customer_id).await?)?;

        let movement = CreditMovement {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            kind: MovementKind::Repayment,
            amount_cents,
            sale_id: None,
            note,
            created_at: at,
        };
        self.db.movements().insert(&movement).await?;

        info!(
            customer_id = %customer_id,
            amount = amount_cents,
            remaining = balance - amount_cents,
            "Repayment registered"
        );

        Ok(movement)
    }

    /// Applies an interest rate to a customer's outstanding balance.
    ///
    /// The interest amount is `round_half_up(balance × rate)` and is
    /// recorded as its own movement, annotated with the rate used.
    pub async fn apply_interest(
        &self,
        customer_id: &str,
        rate_bps: u32,
        at: Option<DateTime<Utc>>,
    ) -> LedgerResult<CreditMovement> {
        debug!(customer_id = %customer_id, rate_bps, "apply_interest");

        validate_rate_bps(rate_bps)?;
        self.require_customer(customer_id).await?;

        let balance = self.db.movements().balance(customer_id).await?;
        if balance == 0 {
            return Err(CoreError::NothingOutstanding {
                customer_id: customer_id.to_string(),
            }
            .into());
        }

        let rate = InterestRate::from_bps(rate_bps);
        let interest = Money::from_cents(balance).apply_rate(rate);
        if !interest.is_positive() {
            // Tiny balance at a tiny rate rounds to zero cents
            return Err(ValidationError::MustBePositive {
                field: "interest".to_string(),
            }
            .into());
        }

        let at = at.unwrap_or_else(Utc::now);
        check_stream_order(at, self.db.movements().latest_for_customer(customer_id).await?)?;

        let movement = CreditMovement {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            kind: MovementKind::Interest,
            amount_cents: interest.cents(),
            sale_id: None,
            note: Some(format!("interest {}%", rate.percentage())),
            created_at: at,
        };
        self.db.movements().insert(&movement).await?;

        info!(
            customer_id = %customer_id,
            rate_bps,
            interest = interest.cents(),
            new_balance = balance + interest.cents(),
            "Interest applied"
        );

        Ok(movement)
    }

    /// Settles a customer's balance with one exact repayment.
    pub async fn settle_balance(
        &self,
        customer_id: &str,
        note: Option<&str>,
        at: Option<DateTime<Utc>>,
    ) -> LedgerResult<CreditMovement> {
        debug!(customer_id = %customer_id, "settle_balance");

        self.require_customer(customer_id).await?;
        let balance = self.db.movements().balance(customer_id).await?;
        if balance == 0 {
            return Err(CoreError::NothingOutstanding {
                customer_id: customer_id.to_string(),
            }
            .into());
        }

        self.register_repayment(customer_id, balance, note, at).await
    }

    /// Settles every customer with a positive balance, atomically.
    ///
    /// Returns the repayment per settled customer; an empty ledger
    /// settles nobody and returns an empty vec.
    pub async fn settle_all(
        &self,
        note: Option<&str>,
        at: Option<DateTime<Utc>>,
    ) -> LedgerResult<Vec<CreditMovement>> {
        let note = validate_note(note)?;
        let outstanding = self.db.movements().outstanding_balances().await?;
        if outstanding.is_empty() {
            debug!("settle_all: nothing outstanding");
            return Ok(Vec::new());
        }

        let at = at.unwrap_or_else(Utc::now);
        let mut repayments = Vec::with_capacity(outstanding.len());
        let mut total = 0;

        for entry in &outstanding {
            check_stream_order(
                at,
                self.db
                    .movements()
                    .latest_for_customer(&entry.customer_id)
                    .await?,
            )?;
            total += entry.balance_cents;
            repayments.push(CreditMovement {
                id: Uuid::new_v4().to_string(),
                customer_id: entry.customer_id.clone(),
                kind: MovementKind::Repayment,
                amount_cents: entry.balance_cents,
                sale_id: None,
                note: note.clone(),
                created_at: at,
            });
        }

        self.db.movements().insert_many(&repayments).await?;

        info!(
            customers = repayments.len(),
            total_cents = total,
            "Settled all outstanding balances"
        );

        Ok(repayments)
    }

    /// A customer's outstanding balance, recomputed from movements.
    pub async fn customer_balance(&self, customer_id: &str) -> LedgerResult<Money> {
        self.require_customer(customer_id).await?;
        let balance = self.db.movements().balance(customer_id).await?;
        Ok(Money::from_cents(balance))
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Registers a customer.
    ///
    /// ## Errors
    /// - `TooShort` / `TooLong` - name outside 2..=120 characters
    /// - `Duplicate` - an active customer already has this name
    pub async fn create_customer(&self, input: NewCustomer) -> LedgerResult<Customer> {
        let name = validate_customer_name(&input.name)?;
        let phone = validate_contact("phone", input.phone.as_deref())?;
        let email = validate_contact("email", input.email.as_deref())?;
        let notes = validate_note(input.notes.as_deref())?;

        if self.db.customers().get_by_name(&name).await?.is_some() {
            return Err(ValidationError::Duplicate {
                field: "name".to_string(),
                value: name,
            }
            .into());
        }

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name,
            phone,
            email,
            notes,
            is_active: true,
            created_at: Utc::now(),
        };
        self.db.customers().insert(&customer).await?;

        info!(customer_id = %customer.id, name = %customer.name, "Customer created");

        Ok(customer)
    }

    /// Updates a customer's contact details.
    ///
    /// Fields left `None` in the update are unchanged.
    pub async fn update_customer(
        &self,
        customer_id: &str,
        update: CustomerUpdate,
    ) -> LedgerResult<Customer> {
        let mut customer = self.require_customer(customer_id).await?;

        if let Some(name) = update.name {
            let name = validate_customer_name(&name)?;
            if name != customer.name {
                if let Some(other) = self.db.customers().get_by_name(&name).await? {
                    if other.id != customer.id {
                        return Err(ValidationError::Duplicate {
                            field: "name".to_string(),
                            value: name,
                        }
                        .into());
                    }
                }
            }
            customer.name = name;
        }
        if let Some(phone) = update.phone {
            customer.phone = validate_contact("phone", Some(&phone))?;
        }
        if let Some(email) = update.email {
            customer.email = validate_contact("email", Some(&email))?;
        }
        if let Some(notes) = update.notes {
            customer.notes = validate_note(Some(&notes))?;
        }

        self.db.customers().update(&customer).await?;

        info!(customer_id = %customer.id, "Customer updated");

        Ok(customer)
    }

    /// Deactivates a customer (soft delete).
    ///
    /// Rejected while the customer owes money: a debtor must settle
    /// first, otherwise the debt would vanish from the overview.
    pub async fn deactivate_customer(&self, customer_id: &str) -> LedgerResult<()> {
        self.require_customer(customer_id).await?;

        let balance = self.db.movements().balance(customer_id).await?;
        if balance > 0 {
            return Err(CoreError::HasOutstandingBalance {
                customer_id: customer_id.to_string(),
                balance: Money::from_cents(balance),
            }
            .into());
        }

        self.db.customers().set_active(customer_id, false).await?;

        info!(customer_id = %customer_id, "Customer deactivated");

        Ok(())
    }

    /// Reactivates a customer.
    ///
    /// Fails with a unique violation when another active customer took
    /// the name in the meantime.
    pub async fn reactivate_customer(&self, customer_id: &str) -> LedgerResult<()> {
        self.require_customer(customer_id).await?;
        self.db.customers().set_active(customer_id, true).await?;

        info!(customer_id = %customer_id, "Customer reactivated");

        Ok(())
    }

    /// Gets a customer by id.
    pub async fn get_customer(&self, customer_id: &str) -> LedgerResult<Customer> {
        self.require_customer(customer_id).await
    }

    /// Gets an active customer by exact name.
    pub async fn get_customer_by_name(&self, name: &str) -> LedgerResult<Option<Customer>> {
        Ok(self.db.customers().get_by_name(name.trim()).await?)
    }

    /// Lists customers, sorted by name.
    pub async fn list_customers(&self, active_only: bool) -> LedgerResult<Vec<Customer>> {
        Ok(self.db.customers().list(active_only).await?)
    }

    /// A customer's movement history with the derived balance.
    pub async fn customer_statement(&self, customer_id: &str) -> LedgerResult<CustomerStatement> {
        let customer = self.require_customer(customer_id).await?;
        let movements = self.db.movements().list_for_customer(customer_id).await?;
        let balance = kiosco_core::balance_of(&movements);

        Ok(CustomerStatement {
            customer,
            movements,
            balance: Money::from_cents(balance),
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lists sales in a window, optionally filtered by note substring.
    pub async fn search_sales(
        &self,
        window: &kiosco_core::TimeWindow,
        term: Option<&str>,
    ) -> LedgerResult<Vec<Sale>> {
        let term = term.map(str::trim).filter(|t| !t.is_empty());
        Ok(self.db.sales().search_in_window(window, term).await?)
    }

    /// Every debtor with the total outstanding, largest balance first.
    pub async fn credit_overview(&self) -> LedgerResult<CreditOverview> {
        let balances = self.db.movements().outstanding_balances().await?;

        let mut entries = Vec::with_capacity(balances.len());
        let mut total = 0;
        for entry in balances {
            let customer = self.require_customer(&entry.customer_id).await?;
            total += entry.balance_cents;
            entries.push(CreditOverviewEntry {
                customer,
                balance: Money::from_cents(entry.balance_cents),
            });
        }

        Ok(CreditOverview {
            debtor_count: entries.len(),
            total_outstanding: Money::from_cents(total),
            entries,
        })
    }

    // =========================================================================
    // Internal
    // =========================================================================

    async fn require_customer(&self, customer_id: &str) -> LedgerResult<Customer> {
        self.db
            .customers()
            .get(customer_id)
            .await?
            .ok_or_else(|| LedgerError::Storage(DbError::not_found("Customer", customer_id)))
    }
}

/// Rejects a timestamp earlier than the stream's latest accepted one.
/// Equal timestamps are fine; insertion order breaks the tie.
fn check_stream_order(at: DateTime<Utc>, latest: Option<DateTime<Utc>>) -> Result<(), CoreError> {
    match latest {
        Some(latest) if at < latest => Err(CoreError::TimestampOutOfOrder { at, latest }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
