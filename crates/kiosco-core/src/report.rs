//! # Report Module
//!
//! Report math as pure functions over ledger records.
//!
//! ## Determinism Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  aggregate(window) MUST be idempotent                                   │
//! │                                                                         │
//! │  Same window + same records  ──►  bit-identical Report                 │
//! │                                                                         │
//! │  How we guarantee it:                                                  │
//! │  • No clock access (the window is an argument)                         │
//! │  • No I/O (records are arguments)                                      │
//! │  • BTreeMap totals (deterministic iteration order)                     │
//! │  • Integer math only                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The storage layer pre-filters records by window for efficiency, but
//! every function here re-applies the half-open window test itself, so
//! the math never depends on the caller having filtered correctly.

use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreResult;
use crate::types::{CreditMovement, MovementKind, PaymentMethod, Sale};
use crate::window::TimeWindow;
use crate::{MORNING_SHIFT_END_HOUR, MORNING_SHIFT_START_HOUR};

// =============================================================================
// Report
// =============================================================================

/// Aggregate totals for one time window.
///
/// All monetary fields are cents. `totals_by_method` only carries methods
/// that actually occur in the window; absent means zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// The window this report covers.
    pub window: TimeWindow,

    /// Sale totals per payment method.
    pub totals_by_method: BTreeMap<PaymentMethod, i64>,

    /// Sum of all sale amounts, every method.
    pub revenue_cents: i64,

    /// Number of sales in the window.
    pub sale_count: u64,

    /// Debt created by credit sales (Charge movements).
    pub credit_issued_cents: i64,

    /// Debt created by interest application (Interest movements).
    pub interest_accrued_cents: i64,

    /// Debt cleared by repayments (Repayment movements).
    pub credit_repaid_cents: i64,

    /// Net change in outstanding credit:
    /// issued + interest - repaid.
    pub net_outstanding_change_cents: i64,
}

impl Report {
    /// Computes the report for `window` over the given records.
    ///
    /// Pure: no clock, no I/O. Records outside the window are ignored.
    pub fn compute(window: TimeWindow, sales: &[Sale], movements: &[CreditMovement]) -> Report {
        let mut totals_by_method = BTreeMap::new();
        let mut revenue_cents = 0;
        let mut sale_count = 0;

        for sale in sales.iter().filter(|s| window.contains(s.created_at)) {
            *totals_by_method.entry(sale.method).or_insert(0) += sale.amount_cents;
            revenue_cents += sale.amount_cents;
            sale_count += 1;
        }

        let mut credit_issued_cents = 0;
        let mut interest_accrued_cents = 0;
        let mut credit_repaid_cents = 0;

        for movement in movements.iter().filter(|m| window.contains(m.created_at)) {
            match movement.kind {
                MovementKind::Charge => credit_issued_cents += movement.amount_cents,
                MovementKind::Interest => interest_accrued_cents += movement.amount_cents,
                MovementKind::Repayment => credit_repaid_cents += movement.amount_cents,
            }
        }

        Report {
            window,
            totals_by_method,
            revenue_cents,
            sale_count,
            credit_issued_cents,
            interest_accrued_cents,
            credit_repaid_cents,
            net_outstanding_change_cents: credit_issued_cents + interest_accrued_cents
                - credit_repaid_cents,
        }
    }

    /// Total for one method, zero when absent.
    #[inline]
    pub fn method_total(&self, method: PaymentMethod) -> i64 {
        self.totals_by_method.get(&method).copied().unwrap_or(0)
    }
}

// =============================================================================
// Shift Split
// =============================================================================

/// Totals for one shift of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTotals {
    pub totals_by_method: BTreeMap<PaymentMethod, i64>,
    pub revenue_cents: i64,
    pub sale_count: u64,
}

impl ShiftTotals {
    fn compute<'a>(sales: impl Iterator<Item = &'a Sale>) -> ShiftTotals {
        let mut totals_by_method = BTreeMap::new();
        let mut revenue_cents = 0;
        let mut sale_count = 0;

        for sale in sales {
            *totals_by_method.entry(sale.method).or_insert(0) += sale.amount_cents;
            revenue_cents += sale.amount_cents;
            sale_count += 1;
        }

        ShiftTotals {
            totals_by_method,
            revenue_cents,
            sale_count,
        }
    }
}

/// One day split into a morning shift `[06:00, 18:00)` and an evening
/// shift covering the rest of the day (both the small hours and the
/// close, which belong to whoever locks up).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub date: NaiveDate,
    pub morning: ShiftTotals,
    pub evening: ShiftTotals,
}

/// Splits one day's sales into morning and evening shift totals.
///
/// ## Example
/// A sale at 05:59 counts for the evening shift; 06:00 opens the
/// morning shift; 18:00 hands back to the evening shift.
pub fn shift_split(date: NaiveDate, sales: &[Sale]) -> CoreResult<ShiftReport> {
    let day = TimeWindow::day(date)?;

    let in_day = |sale: &&Sale| day.contains(sale.created_at);
    let in_morning = |sale: &&Sale| {
        let hour = sale.created_at.hour();
        (MORNING_SHIFT_START_HOUR..MORNING_SHIFT_END_HOUR).contains(&hour)
    };

    let morning = ShiftTotals::compute(sales.iter().filter(in_day).filter(in_morning));
    let evening = ShiftTotals::compute(sales.iter().filter(in_day).filter(|s| !in_morning(s)));

    Ok(ShiftReport {
        date,
        morning,
        evening,
    })
}

// =============================================================================
// Daily Breakdown
// =============================================================================

/// Revenue and sale count for one day with activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub revenue_cents: i64,
    pub sale_count: u64,
}

/// Per-day activity rows for a window, ascending by date.
/// Days without sales are omitted.
pub fn daily_breakdown(window: TimeWindow, sales: &[Sale]) -> Vec<DayActivity> {
    let mut days: BTreeMap<NaiveDate, (i64, u64)> = BTreeMap::new();

    for sale in sales.iter().filter(|s| window.contains(s.created_at)) {
        let entry = days.entry(sale.created_at.date_naive()).or_insert((0, 0));
        entry.0 += sale.amount_cents;
        entry.1 += 1;
    }

    days.into_iter()
        .map(|(date, (revenue_cents, sale_count))| DayActivity {
            date,
            revenue_cents,
            sale_count,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, d, h, m, 0).unwrap()
    }

    fn sale(amount_cents: i64, method: PaymentMethod, created_at: DateTime<Utc>) -> Sale {
        Sale {
            id: format!("s-{amount_cents}-{created_at}"),
            amount_cents,
            method,
            customer_id: method.requires_customer().then(|| "c1".to_string()),
            note: None,
            created_at,
        }
    }

    fn movement(kind: MovementKind, amount_cents: i64, created_at: DateTime<Utc>) -> CreditMovement {
        CreditMovement {
            id: format!("m-{amount_cents}-{created_at}"),
            customer_id: "c1".to_string(),
            kind,
            amount_cents,
            sale_id: kind.requires_sale().then(|| "s1".to_string()),
            note: None,
            created_at,
        }
    }

    /// The canonical scenario: cash 500, credit 1000, repayment 400.
    #[test]
    fn test_aggregate_mixed_methods_and_credit() {
        let sales = vec![
            sale(500, PaymentMethod::Cash, at(21, 10, 0)),
            sale(1000, PaymentMethod::Credit, at(21, 11, 0)),
        ];
        let movements = vec![
            movement(MovementKind::Charge, 1000, at(21, 11, 0)),
            movement(MovementKind::Repayment, 400, at(21, 12, 0)),
        ];
        let window = TimeWindow::day(NaiveDate::from_ymd_opt(2026, 8, 21).unwrap()).unwrap();

        let report = Report::compute(window, &sales, &movements);

        assert_eq!(report.method_total(PaymentMethod::Cash), 500);
        assert_eq!(report.method_total(PaymentMethod::Credit), 1000);
        assert_eq!(report.method_total(PaymentMethod::Debit), 0);
        assert_eq!(report.revenue_cents, 1500);
        assert_eq!(report.sale_count, 2);
        assert_eq!(report.credit_issued_cents, 1000);
        assert_eq!(report.credit_repaid_cents, 400);
        assert_eq!(report.net_outstanding_change_cents, 600);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let sales = vec![
            sale(750, PaymentMethod::Debit, at(3, 9, 30)),
            sale(250, PaymentMethod::Cash, at(4, 16, 0)),
        ];
        let movements = vec![movement(MovementKind::Interest, 55, at(3, 9, 0))];
        let window = TimeWindow::month(2026, 8).unwrap();

        let first = Report::compute(window, &sales, &movements);
        let second = Report::compute(window, &sales, &movements);
        assert_eq!(first, second);
    }

    #[test]
    fn test_aggregate_respects_half_open_window() {
        let window = TimeWindow::day(NaiveDate::from_ymd_opt(2026, 8, 21).unwrap()).unwrap();
        let sales = vec![
            sale(100, PaymentMethod::Cash, at(21, 0, 0)),  // at start: in
            sale(200, PaymentMethod::Cash, at(22, 0, 0)),  // at end: out
            sale(400, PaymentMethod::Cash, at(20, 23, 59)), // before: out
        ];

        let report = Report::compute(window, &sales, &[]);
        assert_eq!(report.revenue_cents, 100);
        assert_eq!(report.sale_count, 1);
    }

    #[test]
    fn test_additional_sale_moves_totals_by_exactly_its_amount() {
        let window = TimeWindow::month(2026, 8).unwrap();
        let mut sales = vec![sale(900, PaymentMethod::Cash, at(5, 12, 0))];
        let before = Report::compute(window, &sales, &[]);

        sales.push(sale(350, PaymentMethod::Cash, at(6, 12, 0)));
        let after = Report::compute(window, &sales, &[]);

        assert_eq!(after.sale_count, before.sale_count + 1);
        assert_eq!(
            after.method_total(PaymentMethod::Cash),
            before.method_total(PaymentMethod::Cash) + 350
        );
    }

    #[test]
    fn test_shift_split_boundaries() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 21).unwrap();
        let sales = vec![
            sale(100, PaymentMethod::Cash, at(21, 5, 59)),  // evening (early)
            sale(200, PaymentMethod::Cash, at(21, 6, 0)),   // morning opens
            sale(400, PaymentMethod::Cash, at(21, 17, 59)), // still morning
            sale(800, PaymentMethod::Cash, at(21, 18, 0)),  // evening again
            sale(1600, PaymentMethod::Cash, at(22, 12, 0)), // other day: ignored
        ];

        let shifts = shift_split(date, &sales).unwrap();

        assert_eq!(shifts.morning.revenue_cents, 600);
        assert_eq!(shifts.morning.sale_count, 2);
        assert_eq!(shifts.evening.revenue_cents, 900);
        assert_eq!(shifts.evening.sale_count, 2);
    }

    #[test]
    fn test_daily_breakdown_sums_to_window_totals() {
        let window = TimeWindow::month(2026, 8).unwrap();
        let sales = vec![
            sale(100, PaymentMethod::Cash, at(2, 9, 0)),
            sale(300, PaymentMethod::Debit, at(2, 15, 0)),
            sale(500, PaymentMethod::Cash, at(9, 10, 0)),
        ];

        let days = daily_breakdown(window, &sales);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 8, 2).unwrap());
        assert_eq!(days[0].revenue_cents, 400);
        assert_eq!(days[0].sale_count, 2);
        assert_eq!(days[1].revenue_cents, 500);

        let report = Report::compute(window, &sales, &[]);
        let breakdown_total: i64 = days.iter().map(|d| d.revenue_cents).sum();
        assert_eq!(breakdown_total, report.revenue_cents);
    }

    #[test]
    fn test_empty_window_yields_zero_report() {
        let window = TimeWindow::year(2020).unwrap();
        let report = Report::compute(window, &[], &[]);

        assert!(report.totals_by_method.is_empty());
        assert_eq!(report.revenue_cents, 0);
        assert_eq!(report.sale_count, 0);
        assert_eq!(report.net_outstanding_change_cents, 0);
    }
}
