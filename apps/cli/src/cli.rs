//! # CLI Definition
//!
//! The clap derive tree for the `kiosco` binary. Every subcommand maps
//! 1:1 to one ledger service, report aggregator, or snapshot gateway
//! call; the only logic here is turning arguments into those calls.
//!
//! Amounts are entered in cents (`--cents 1050` is $10.50) so the CLI
//! never parses decimal money.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use kiosco_core::PaymentMethod;

/// Point-of-sale ledger for a small retail outlet.
///
/// Records cash/transfer/debit/credit sales, tracks store-credit
/// (fiado) balances per customer, and produces daily, monthly, and
/// annual reports. All state lives in one local SQLite file.
#[derive(Parser, Debug)]
#[command(name = "kiosco", about = "Kiosco point-of-sale ledger", version)]
pub struct KioscoCli {
    /// Path to the SQLite store file.
    ///
    /// Defaults to the per-platform data directory. Point this at a
    /// backup copy to inspect or restore it.
    #[arg(long, env = "KIOSCO_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a sale.
    Sale(SaleArgs),
    /// Register a (possibly partial) fiado repayment.
    Repay(RepayArgs),
    /// Apply an interest rate to a customer's outstanding balance.
    Interest(InterestArgs),
    /// Settle one customer's balance, or everyone's, to exactly zero.
    Settle(SettleArgs),
    /// Manage customers.
    #[command(subcommand)]
    Customer(CustomerCommand),
    /// Show a customer's outstanding balance.
    Balance(CustomerRef),
    /// Time-windowed reports.
    #[command(subcommand)]
    Report(ReportCommand),
    /// Every debtor with their balance, largest first.
    CreditOverview,
    /// List a day's sales, optionally filtered by note text.
    SalesSearch(SalesSearchArgs),
    /// Export the whole ledger to a JSON snapshot.
    Export(ExportArgs),
    /// Replace the whole ledger with a JSON snapshot.
    Import(ImportArgs),
    /// Copy the store to a new single backup file.
    Backup(BackupArgs),
}

/// Payment method argument. Mirrors `kiosco_core::PaymentMethod`,
/// which stays free of CLI dependencies.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum MethodArg {
    Cash,
    Transfer,
    Debit,
    Credit,
}

impl From<MethodArg> for PaymentMethod {
    fn from(method: MethodArg) -> PaymentMethod {
        match method {
            MethodArg::Cash => PaymentMethod::Cash,
            MethodArg::Transfer => PaymentMethod::Transfer,
            MethodArg::Debit => PaymentMethod::Debit,
            MethodArg::Credit => PaymentMethod::Credit,
        }
    }
}

/// Arguments for `sale`.
#[derive(Args, Debug)]
pub struct SaleArgs {
    /// Sale amount in cents (1050 is $10.50).
    #[arg(long)]
    pub cents: i64,

    /// How the sale was paid.
    #[arg(long, value_enum)]
    pub method: MethodArg,

    /// Customer name or id. Required for credit sales, forbidden
    /// otherwise.
    #[arg(long)]
    pub customer: Option<String>,

    /// Free-text description ("2x milk, bread").
    #[arg(long)]
    pub note: Option<String>,

    /// Explicit RFC 3339 timestamp. Defaults to now.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Arguments for `repay`.
#[derive(Args, Debug)]
pub struct RepayArgs {
    /// Customer name or id.
    #[arg(long)]
    pub customer: String,

    /// Repayment amount in cents. Must not exceed the outstanding
    /// balance.
    #[arg(long)]
    pub cents: i64,

    /// Free-text annotation.
    #[arg(long)]
    pub note: Option<String>,

    /// Explicit RFC 3339 timestamp. Defaults to now.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Arguments for `interest`.
#[derive(Args, Debug)]
pub struct InterestArgs {
    /// Customer name or id.
    #[arg(long)]
    pub customer: String,

    /// Interest rate in basis points (500 is 5%).
    #[arg(long)]
    pub rate_bps: u32,
}

/// Arguments for `settle`.
#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Customer name or id. Omit to settle every debtor at once.
    #[arg(long)]
    pub customer: Option<String>,

    /// Free-text annotation ("end of month").
    #[arg(long)]
    pub note: Option<String>,
}

/// A single `--customer` reference, shared by several subcommands.
#[derive(Args, Debug)]
pub struct CustomerRef {
    /// Customer name or id.
    #[arg(long)]
    pub customer: String,
}

/// Customer management subcommands.
#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// Register a new customer.
    Add {
        /// Display name, unique among active customers.
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List customers, sorted by name.
    List {
        /// Include deactivated customers.
        #[arg(long)]
        all: bool,
    },
    /// Show a customer's full movement history and balance.
    Show(CustomerRef),
    /// Deactivate a customer (soft delete; requires a zero balance).
    Deactivate(CustomerRef),
    /// Reactivate a previously deactivated customer.
    Reactivate(CustomerRef),
}

/// Report subcommands. Each derives one `[start, end)` calendar window.
#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// One calendar day, with the morning/evening shift split.
    Day {
        /// Date as YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// One calendar month, with a per-day breakdown.
    Month {
        /// Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
        /// 1-12. Defaults to the current month.
        #[arg(long)]
        month: Option<u32>,
    },
    /// One calendar year.
    Year {
        /// Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
    },
}

/// Arguments for `sales-search`.
#[derive(Args, Debug)]
pub struct SalesSearchArgs {
    /// Date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Note substring to filter by. Blank means no filter.
    #[arg(long)]
    pub term: Option<String>,
}

/// Arguments for `export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Snapshot file to write. Omit to print the JSON to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for `import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Snapshot file to import. Replaces the entire store.
    pub path: PathBuf,
}

/// Arguments for `backup`.
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Target file for the copy. Must not already exist.
    pub target: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        KioscoCli::command().debug_assert();
    }

    #[test]
    fn test_credit_sale_parses() {
        let cli = KioscoCli::parse_from([
            "kiosco", "sale", "--cents", "1000", "--method", "credit", "--customer", "Juan",
        ]);
        let Commands::Sale(args) = cli.command else {
            panic!("expected sale");
        };
        assert_eq!(args.cents, 1000);
        assert!(matches!(args.method, MethodArg::Credit));
        assert_eq!(args.customer.as_deref(), Some("Juan"));
    }

    #[test]
    fn test_report_day_parses_date() {
        let cli = KioscoCli::parse_from(["kiosco", "report", "day", "--date", "2026-03-14"]);
        let Commands::Report(ReportCommand::Day { date }) = cli.command else {
            panic!("expected report day");
        };
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 14));
    }
}
