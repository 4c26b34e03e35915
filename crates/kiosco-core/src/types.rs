//! # Domain Types
//!
//! Core domain types for the ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │    Customer     │   │ CreditMovement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  amount_cents   │   │  name (unique)  │   │  customer_id FK │       │
//! │  │  method         │   │  phone/email    │   │  kind           │       │
//! │  │  customer_id?   │   │  is_active      │   │  amount_cents   │       │
//! │  │  created_at     │   │  created_at     │   │  sale_id? FK    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InterestRate   │   │  PaymentMethod  │   │  MovementKind   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Cash           │   │  Charge    (+)  │       │
//! │  │  525 = 5.25%    │   │  Transfer       │   │  Interest  (+)  │       │
//! │  └─────────────────┘   │  Debit          │   │  Repayment (−)  │       │
//! │                        │  Credit         │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Ledger Rule
//! A customer's balance is NEVER a stored field. It is always the signed sum
//! of that customer's movements. `CreditMovement.amount_cents` is kept
//! strictly positive at the field level; the sign lives in [`MovementKind`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Interest Rate
// =============================================================================

/// Interest rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 525 bps = 5.25% (a typical monthly fiado surcharge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRate(u32);

impl InterestRate {
    /// Creates an interest rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        InterestRate(bps)
    }

    /// Creates an interest rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        InterestRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero interest rate.
    #[inline]
    pub const fn zero() -> Self {
        InterestRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for InterestRate {
    fn default() -> Self {
        InterestRate::zero()
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
///
/// `Credit` is the fiado case: the sale creates debt instead of revenue
/// in hand, and must always be linked to a customer.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Debit card.
    Debit,
    /// Store credit (fiado) - paid later, tracked per customer.
    Credit,
}

impl PaymentMethod {
    /// All methods, in report display order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Transfer,
        PaymentMethod::Debit,
        PaymentMethod::Credit,
    ];

    /// Whether a sale with this method must reference a customer.
    #[inline]
    pub const fn requires_customer(&self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// The direction and origin of a credit movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Debt increase backed by a credit sale. Always linked to the sale.
    Charge,
    /// Debt increase from interest applied to an outstanding balance.
    Interest,
    /// Debt decrease from a (possibly partial) repayment.
    Repayment,
}

impl MovementKind {
    /// Sign applied to `amount_cents` when summing balances:
    /// +1 increases debt, -1 decreases it.
    #[inline]
    pub const fn sign(&self) -> i64 {
        match self {
            MovementKind::Charge | MovementKind::Interest => 1,
            MovementKind::Repayment => -1,
        }
    }

    /// Whether this kind must carry a linked sale id.
    #[inline]
    pub const fn requires_sale(&self) -> bool {
        matches!(self, MovementKind::Charge)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Immutable once written: the ledger supports no
/// in-place edits or deletes.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Amount in cents. Non-negative at the field level; a sale never
    /// carries sign.
    pub amount_cents: i64,

    /// How the sale was paid.
    pub method: PaymentMethod,

    /// Customer reference. Present exactly when `method == Credit`.
    pub customer_id: Option<String>,

    /// Optional free-text description ("2x milk, bread").
    pub note: Option<String>,

    /// When the sale was registered.
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Whether this is a fiado sale.
    #[inline]
    pub fn is_credit(&self) -> bool {
        self.method == PaymentMethod::Credit
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with (potential) store credit.
///
/// There is no balance field here. Balances are projections of the
/// movement log, recomputed on read.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique among active customers.
    pub name: String,

    /// Optional contact phone.
    pub phone: Option<String>,

    /// Optional contact email.
    pub email: Option<String>,

    /// Optional free-form notes ("pays on Fridays").
    pub notes: Option<String>,

    /// Whether the customer is active (soft delete).
    /// Hard deletes are forbidden while history exists.
    pub is_active: bool,

    /// When the customer was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Credit Movement
// =============================================================================

/// An append-only ledger entry against a customer's credit balance.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditMovement {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Customer this movement belongs to.
    pub customer_id: String,

    /// Direction and origin of the movement.
    pub kind: MovementKind,

    /// Amount in cents, strictly positive. Sign comes from `kind`.
    pub amount_cents: i64,

    /// Linked sale. Present exactly when `kind == Charge`, and the
    /// linked sale's method is always `Credit`.
    pub sale_id: Option<String>,

    /// Optional free-text annotation.
    pub note: Option<String>,

    /// When the movement was registered.
    pub created_at: DateTime<Utc>,
}

impl CreditMovement {
    /// Returns the unsigned amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Returns the signed balance delta in cents:
    /// positive for Charge/Interest, negative for Repayment.
    #[inline]
    pub fn signed_cents(&self) -> i64 {
        self.kind.sign() * self.amount_cents
    }
}

/// Sums the signed deltas of a movement slice into a balance in cents.
///
/// This is the canonical balance definition. Every balance the system
/// reports must equal this sum over the customer's movements.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use kiosco_core::types::{balance_of, CreditMovement, MovementKind};
///
/// let charge = CreditMovement {
///     id: "m1".into(),
///     customer_id: "c1".into(),
///     kind: MovementKind::Charge,
///     amount_cents: 1000,
///     sale_id: Some("s1".into()),
///     note: None,
///     created_at: Utc::now(),
/// };
/// let repayment = CreditMovement {
///     kind: MovementKind::Repayment,
///     amount_cents: 400,
///     sale_id: None,
///     id: "m2".into(),
///     customer_id: "c1".into(),
///     note: None,
///     created_at: Utc::now(),
/// };
/// assert_eq!(balance_of(&[charge, repayment]), 600);
/// ```
pub fn balance_of(movements: &[CreditMovement]) -> i64 {
    movements.iter().map(CreditMovement::signed_cents).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(kind: MovementKind, amount_cents: i64) -> CreditMovement {
        CreditMovement {
            id: "m".to_string(),
            customer_id: "c".to_string(),
            kind,
            amount_cents,
            sale_id: if kind.requires_sale() {
                Some("s".to_string())
            } else {
                None
            },
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_interest_rate_from_bps() {
        let rate = InterestRate::from_bps(525);
        assert_eq!(rate.bps(), 525);
        assert!((rate.percentage() - 5.25).abs() < 0.001);
    }

    #[test]
    fn test_interest_rate_from_percentage() {
        let rate = InterestRate::from_percentage(5.25);
        assert_eq!(rate.bps(), 525);
    }

    #[test]
    fn test_method_requires_customer() {
        assert!(PaymentMethod::Credit.requires_customer());
        assert!(!PaymentMethod::Cash.requires_customer());
        assert!(!PaymentMethod::Transfer.requires_customer());
        assert!(!PaymentMethod::Debit.requires_customer());
    }

    #[test]
    fn test_movement_signs() {
        assert_eq!(MovementKind::Charge.sign(), 1);
        assert_eq!(MovementKind::Interest.sign(), 1);
        assert_eq!(MovementKind::Repayment.sign(), -1);
    }

    #[test]
    fn test_signed_cents() {
        assert_eq!(movement(MovementKind::Charge, 1000).signed_cents(), 1000);
        assert_eq!(movement(MovementKind::Interest, 50).signed_cents(), 50);
        assert_eq!(movement(MovementKind::Repayment, 400).signed_cents(), -400);
    }

    #[test]
    fn test_balance_of() {
        let movements = vec![
            movement(MovementKind::Charge, 1000),
            movement(MovementKind::Repayment, 400),
            movement(MovementKind::Interest, 30),
            movement(MovementKind::Repayment, 630),
        ];
        assert_eq!(balance_of(&movements), 0);
        assert_eq!(balance_of(&[]), 0);
    }

    #[test]
    fn test_method_serde_names() {
        // Snapshot files store methods in snake_case
        let json = serde_json::to_string(&PaymentMethod::Credit).unwrap();
        assert_eq!(json, "\"credit\"");
        let back: PaymentMethod = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(back, PaymentMethod::Cash);

        let kind = serde_json::to_string(&MovementKind::Repayment).unwrap();
        assert_eq!(kind, "\"repayment\"");
    }
}
