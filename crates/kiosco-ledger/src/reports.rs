//! # Report Aggregator
//!
//! Bridges storage and the pure report math in `kiosco-core::report`.
//!
//! ## Division Of Labor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Computes What                                    │
//! │                                                                         │
//! │  ReportAggregator (this file)          kiosco-core::report             │
//! │  ─────────────────────────────         ───────────────────             │
//! │  • derives the [start, end) window     • Report::compute               │
//! │  • loads records from storage          • shift_split                   │
//! │  • owns NO arithmetic                  • daily_breakdown               │
//! │                                         • owns ALL arithmetic          │
//! │                                                                         │
//! │  Same window + same records → bit-identical report, every time.        │
//! │  Re-running a report after new sales can only grow its totals.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::LedgerResult;
use kiosco_core::report::{daily_breakdown, shift_split};
use kiosco_core::{DayActivity, Report, ShiftReport, TimeWindow};
use kiosco_db::Database;

// =============================================================================
// Report Types
// =============================================================================

/// One day's aggregate plus its morning/evening shift split.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub report: Report,
    pub shifts: ShiftReport,
}

/// One month's aggregate plus its per-day activity rows.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub report: Report,
    /// Days with at least one sale, ascending. Quiet days are omitted.
    pub days: Vec<DayActivity>,
}

// =============================================================================
// Report Aggregator
// =============================================================================

/// Computes time-windowed reports over the recorded ledger.
///
/// Read-only: the aggregator never writes.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    db: Database,
}

impl ReportAggregator {
    /// Creates a new aggregator over an open database.
    pub fn new(db: Database) -> Self {
        ReportAggregator { db }
    }

    /// Aggregate totals for an arbitrary window.
    ///
    /// Deterministic and idempotent: the result depends only on the
    /// window and the records inside it.
    pub async fn aggregate(&self, window: TimeWindow) -> LedgerResult<Report> {
        debug!(window = %window, "Aggregating report");

        let sales = self.db.sales().list_in_window(&window).await?;
        let movements = self.db.movements().list_in_window(&window).await?;

        Ok(Report::compute(window, &sales, &movements))
    }

    /// One calendar day, with the morning/evening shift split.
    pub async fn daily_report(&self, date: NaiveDate) -> LedgerResult<DailyReport> {
        let window = TimeWindow::day(date)?;

        let sales = self.db.sales().list_in_window(&window).await?;
        let movements = self.db.movements().list_in_window(&window).await?;

        let report = Report::compute(window, &sales, &movements);
        let shifts = shift_split(date, &sales)?;

        Ok(DailyReport { report, shifts })
    }

    /// One calendar month, with per-day activity rows.
    pub async fn monthly_report(&self, year: i32, month: u32) -> LedgerResult<MonthlyReport> {
        let window = TimeWindow::month(year, month)?;

        let sales = self.db.sales().list_in_window(&window).await?;
        let movements = self.db.movements().list_in_window(&window).await?;

        let report = Report::compute(window, &sales, &movements);
        let days = daily_breakdown(window, &sales);

        Ok(MonthlyReport { report, days })
    }

    /// One calendar year.
    pub async fn annual_report(&self, year: i32) -> LedgerResult<Report> {
        let window = TimeWindow::year(year)?;
        self.aggregate(window).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{LedgerService, NewCustomer, NewSale};
    use chrono::{DateTime, TimeZone, Utc};
    use kiosco_core::{Money, PaymentMethod};
    use kiosco_db::DbConfig;

    async fn test_setup() -> (LedgerService, ReportAggregator) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (
            LedgerService::new(db.clone()),
            ReportAggregator::new(db),
        )
    }

    fn march(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, min, 0).unwrap()
    }

    async fn sale_at(
        service: &LedgerService,
        cents: i64,
        method: PaymentMethod,
        customer_id: Option<&str>,
        at: DateTime<Utc>,
    ) {
        service
            .register_sale(NewSale {
                amount_cents: cents,
                method,
                customer_id: customer_id.map(str::to_string),
                note: None,
                at: Some(at),
            })
            .await
            .unwrap();
    }

    async fn juan(service: &LedgerService) -> String {
        service
            .create_customer(NewCustomer {
                name: "Juan".to_string(),
                phone: None,
                email: None,
                notes: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_daily_report_mixed_day() {
        let (service, reports) = test_setup().await;
        let juan = juan(&service).await;

        sale_at(&service, 500, PaymentMethod::Cash, None, march(14, 9, 0)).await;
        sale_at(
            &service,
            1000,
            PaymentMethod::Credit,
            Some(&juan),
            march(14, 10, 0),
        )
        .await;
        service
            .register_repayment(&juan, 400, None, Some(march(14, 11, 0)))
            .await
            .unwrap();

        let daily = reports
            .daily_report(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
            .await
            .unwrap();

        let report = &daily.report;
        assert_eq!(report.method_total(PaymentMethod::Cash), 500);
        assert_eq!(report.method_total(PaymentMethod::Credit), 1000);
        assert_eq!(report.method_total(PaymentMethod::Debit), 0);
        assert_eq!(report.revenue_cents, 1500);
        assert_eq!(report.sale_count, 2);
        assert_eq!(report.credit_issued_cents, 1000);
        assert_eq!(report.credit_repaid_cents, 400);
        assert_eq!(report.net_outstanding_change_cents, 600);

        // Balance agrees with the report's net change
        assert_eq!(
            service.customer_balance(&juan).await.unwrap(),
            Money::from_cents(600)
        );
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent() {
        let (service, reports) = test_setup().await;

        sale_at(&service, 500, PaymentMethod::Cash, None, march(14, 9, 0)).await;
        sale_at(&service, 700, PaymentMethod::Debit, None, march(14, 10, 0)).await;

        let window = TimeWindow::day(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()).unwrap();
        let first = reports.aggregate(window).await.unwrap();
        let second = reports.aggregate(window).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_new_sale_only_grows_totals() {
        let (service, reports) = test_setup().await;
        let window = TimeWindow::day(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()).unwrap();

        sale_at(&service, 500, PaymentMethod::Cash, None, march(14, 9, 0)).await;
        let before = reports.aggregate(window).await.unwrap();

        sale_at(&service, 300, PaymentMethod::Cash, None, march(14, 10, 0)).await;
        let after = reports.aggregate(window).await.unwrap();

        assert_eq!(after.revenue_cents, before.revenue_cents + 300);
        assert_eq!(after.sale_count, before.sale_count + 1);
    }

    #[tokio::test]
    async fn test_shift_split_boundaries() {
        let (service, reports) = test_setup().await;

        // 05:59 belongs to the evening shift, 06:00 opens the morning
        sale_at(&service, 100, PaymentMethod::Cash, None, march(14, 5, 59)).await;
        sale_at(&service, 200, PaymentMethod::Cash, None, march(14, 6, 0)).await;
        sale_at(&service, 400, PaymentMethod::Cash, None, march(14, 17, 59)).await;
        sale_at(&service, 800, PaymentMethod::Cash, None, march(14, 18, 0)).await;

        let daily = reports
            .daily_report(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
            .await
            .unwrap();

        assert_eq!(daily.shifts.morning.revenue_cents, 600);
        assert_eq!(daily.shifts.morning.sale_count, 2);
        assert_eq!(daily.shifts.evening.revenue_cents, 900);
        assert_eq!(daily.shifts.evening.sale_count, 2);

        // Shifts partition the day
        assert_eq!(
            daily.shifts.morning.revenue_cents + daily.shifts.evening.revenue_cents,
            daily.report.revenue_cents
        );
    }

    #[tokio::test]
    async fn test_monthly_breakdown_sums_to_month() {
        let (service, reports) = test_setup().await;

        sale_at(&service, 500, PaymentMethod::Cash, None, march(3, 9, 0)).await;
        sale_at(&service, 700, PaymentMethod::Cash, None, march(3, 15, 0)).await;
        sale_at(&service, 900, PaymentMethod::Debit, None, march(20, 12, 0)).await;

        let monthly = reports.monthly_report(2026, 3).await.unwrap();

        assert_eq!(monthly.days.len(), 2);
        assert_eq!(
            monthly.days[0].date,
            NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
        );
        assert_eq!(monthly.days[0].revenue_cents, 1200);
        assert_eq!(monthly.days[0].sale_count, 2);
        assert_eq!(monthly.days[1].revenue_cents, 900);

        let day_sum: i64 = monthly.days.iter().map(|d| d.revenue_cents).sum();
        assert_eq!(day_sum, monthly.report.revenue_cents);
    }

    #[tokio::test]
    async fn test_annual_report_respects_year_boundary() {
        let (service, reports) = test_setup().await;

        sale_at(
            &service,
            500,
            PaymentMethod::Cash,
            None,
            Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap(),
        )
        .await;
        sale_at(
            &service,
            700,
            PaymentMethod::Cash,
            None,
            Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap(),
        )
        .await;

        let y2026 = reports.annual_report(2026).await.unwrap();
        let y2027 = reports.annual_report(2027).await.unwrap();

        assert_eq!(y2026.revenue_cents, 500);
        assert_eq!(y2027.revenue_cents, 700);
    }

    #[tokio::test]
    async fn test_invalid_month_rejected() {
        let (_, reports) = test_setup().await;
        assert!(reports.monthly_report(2026, 13).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_window_is_all_zeros() {
        let (_, reports) = test_setup().await;

        let report = reports
            .daily_report(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
            .await
            .unwrap();

        assert_eq!(report.report.revenue_cents, 0);
        assert_eq!(report.report.sale_count, 0);
        assert!(report.report.totals_by_method.is_empty());
        assert_eq!(report.shifts.morning.sale_count, 0);
        assert_eq!(report.shifts.evening.sale_count, 0);
    }
}
