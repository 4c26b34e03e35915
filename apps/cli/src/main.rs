//! # kiosco: Command-Line Entry Point
//!
//! Wires arguments to the ledger and renders the results.
//!
//! ## Invocation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Command, One Call                              │
//! │                                                                         │
//! │  kiosco sale --cents 1000 --method credit --customer Juan              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. init tracing (stderr; RUST_LOG overrides the default filter)       │
//! │  2. resolve the store path (--db-path / KIOSCO_DB_PATH / platform)     │
//! │  3. open the database (migrations bootstrap on first use)              │
//! │  4. one service / aggregator / gateway call                            │
//! │  5. render to stdout; errors to stderr, exit code 1                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod config;

use std::process::ExitCode;

use chrono::{Datelike, Utc};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{
    BackupArgs, Commands, CustomerCommand, ExportArgs, ImportArgs, InterestArgs, KioscoCli,
    RepayArgs, ReportCommand, SaleArgs, SalesSearchArgs, SettleArgs,
};
use kiosco_core::{Customer, Money, PaymentMethod, Report};
use kiosco_db::{Database, DbConfig, DbError};
use kiosco_ledger::{
    LedgerError, LedgerResult, LedgerService, NewCustomer, NewSale, ReportAggregator,
    SnapshotGateway,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kiosco=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = KioscoCli::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: KioscoCli) -> LedgerResult<()> {
    let db_path = config::resolve_db_path(args.db_path)?;
    let db = Database::new(DbConfig::new(db_path)).await?;
    let service = LedgerService::new(db.clone());

    let result = dispatch(args.command, &service, &db).await;
    db.close().await;
    result
}

async fn dispatch(command: Commands, service: &LedgerService, db: &Database) -> LedgerResult<()> {
    match command {
        Commands::Sale(args) => sale(service, args).await,
        Commands::Repay(args) => repay(service, args).await,
        Commands::Interest(args) => interest(service, args).await,
        Commands::Settle(args) => settle(service, args).await,
        Commands::Customer(command) => customer(service, command).await,
        Commands::Balance(reference) => {
            let customer = resolve_customer(service, &reference.customer).await?;
            let balance = service.customer_balance(&customer.id).await?;
            println!("{} owes {balance}", customer.name);
            Ok(())
        }
        Commands::Report(command) => report(db, command).await,
        Commands::CreditOverview => credit_overview(service).await,
        Commands::SalesSearch(args) => sales_search(service, args).await,
        Commands::Export(args) => export(db, args).await,
        Commands::Import(args) => import(db, args).await,
        Commands::Backup(args) => backup(db, args).await,
    }
}

// =============================================================================
// Mutations
// =============================================================================

async fn sale(service: &LedgerService, args: SaleArgs) -> LedgerResult<()> {
    // Credit sales name the customer on the command line; resolve the
    // name to an id before the service sees it
    let customer_id = match args.customer {
        Some(reference) => Some(resolve_customer(service, &reference).await?.id),
        None => None,
    };

    let sale = service
        .register_sale(NewSale {
            amount_cents: args.cents,
            method: args.method.into(),
            customer_id,
            note: args.note,
            at: args.at,
        })
        .await?;

    println!(
        "sale {}: {} by {}",
        sale.id,
        sale.amount(),
        method_name(sale.method)
    );
    Ok(())
}

async fn repay(service: &LedgerService, args: RepayArgs) -> LedgerResult<()> {
    let customer = resolve_customer(service, &args.customer).await?;
    let movement = service
        .register_repayment(&customer.id, args.cents, args.note.as_deref(), args.at)
        .await?;
    let remaining = service.customer_balance(&customer.id).await?;

    println!(
        "repayment {}: {} from {}, {remaining} outstanding",
        movement.id,
        movement.amount(),
        customer.name
    );
    Ok(())
}

async fn interest(service: &LedgerService, args: InterestArgs) -> LedgerResult<()> {
    let customer = resolve_customer(service, &args.customer).await?;
    let movement = service
        .apply_interest(&customer.id, args.rate_bps, None)
        .await?;
    let balance = service.customer_balance(&customer.id).await?;

    println!(
        "interest {}: {} added for {}, now owes {balance}",
        movement.id,
        movement.amount(),
        customer.name
    );
    Ok(())
}

async fn settle(service: &LedgerService, args: SettleArgs) -> LedgerResult<()> {
    match args.customer {
        Some(reference) => {
            let customer = resolve_customer(service, &reference).await?;
            let movement = service
                .settle_balance(&customer.id, args.note.as_deref(), None)
                .await?;
            println!("{} settled {}", customer.name, movement.amount());
        }
        None => {
            let repayments = service.settle_all(args.note.as_deref(), None).await?;
            let total: i64 = repayments.iter().map(|m| m.amount_cents).sum();
            println!(
                "settled {} customer(s), {} collected",
                repayments.len(),
                Money::from_cents(total)
            );
        }
    }
    Ok(())
}

async fn customer(service: &LedgerService, command: CustomerCommand) -> LedgerResult<()> {
    match command {
        CustomerCommand::Add {
            name,
            phone,
            email,
            notes,
        } => {
            let customer = service
                .create_customer(NewCustomer {
                    name,
                    phone,
                    email,
                    notes,
                })
                .await?;
            println!("customer {}: {}", customer.id, customer.name);
        }
        CustomerCommand::List { all } => {
            for customer in service.list_customers(!all).await? {
                let marker = if customer.is_active { "" } else { " (inactive)" };
                println!("{}  {}{marker}", customer.id, customer.name);
            }
        }
        CustomerCommand::Show(reference) => {
            let customer = resolve_customer(service, &reference.customer).await?;
            let statement = service.customer_statement(&customer.id).await?;
            println!("{} ({})", statement.customer.name, statement.customer.id);
            for movement in &statement.movements {
                println!(
                    "  {}  {:<9}  {:>10}  {}",
                    movement.created_at.format("%Y-%m-%d %H:%M"),
                    format!("{:?}", movement.kind).to_lowercase(),
                    movement.amount().to_string(),
                    movement.note.as_deref().unwrap_or("")
                );
            }
            println!("outstanding: {}", statement.balance);
        }
        CustomerCommand::Deactivate(reference) => {
            let customer = resolve_customer(service, &reference.customer).await?;
            service.deactivate_customer(&customer.id).await?;
            println!("{} deactivated", customer.name);
        }
        CustomerCommand::Reactivate(reference) => {
            let customer = resolve_customer(service, &reference.customer).await?;
            service.reactivate_customer(&customer.id).await?;
            println!("{} reactivated", customer.name);
        }
    }
    Ok(())
}

// =============================================================================
// Reads
// =============================================================================

async fn report(db: &Database, command: ReportCommand) -> LedgerResult<()> {
    let aggregator = ReportAggregator::new(db.clone());
    let today = Utc::now().date_naive();

    match command {
        ReportCommand::Day { date } => {
            let daily = aggregator.daily_report(date.unwrap_or(today)).await?;
            print_report(&daily.report);
            println!(
                "morning  [06-18): {} over {} sale(s)",
                Money::from_cents(daily.shifts.morning.revenue_cents),
                daily.shifts.morning.sale_count
            );
            println!(
                "evening (rest)  : {} over {} sale(s)",
                Money::from_cents(daily.shifts.evening.revenue_cents),
                daily.shifts.evening.sale_count
            );
        }
        ReportCommand::Month { year, month } => {
            let monthly = aggregator
                .monthly_report(year.unwrap_or(today.year()), month.unwrap_or(today.month()))
                .await?;
            print_report(&monthly.report);
            for day in &monthly.days {
                println!(
                    "  {}: {} over {} sale(s)",
                    day.date,
                    Money::from_cents(day.revenue_cents),
                    day.sale_count
                );
            }
        }
        ReportCommand::Year { year } => {
            let report = aggregator.annual_report(year.unwrap_or(today.year())).await?;
            print_report(&report);
        }
    }
    Ok(())
}

async fn credit_overview(service: &LedgerService) -> LedgerResult<()> {
    let overview = service.credit_overview().await?;
    for entry in &overview.entries {
        println!("{:>10}  {}", entry.balance.to_string(), entry.customer.name);
    }
    println!(
        "total outstanding: {} across {} debtor(s)",
        overview.total_outstanding, overview.debtor_count
    );
    Ok(())
}

async fn sales_search(service: &LedgerService, args: SalesSearchArgs) -> LedgerResult<()> {
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let window = kiosco_core::TimeWindow::day(date)?;
    let sales = service.search_sales(&window, args.term.as_deref()).await?;

    for sale in &sales {
        println!(
            "{}  {:<8}  {:>10}  {}",
            sale.created_at.format("%H:%M"),
            method_name(sale.method),
            sale.amount().to_string(),
            sale.note.as_deref().unwrap_or("")
        );
    }
    println!("{} sale(s) on {date}", sales.len());
    Ok(())
}

// =============================================================================
// Snapshots & Backup
// =============================================================================

async fn export(db: &Database, args: ExportArgs) -> LedgerResult<()> {
    let gateway = SnapshotGateway::new(db.clone());
    match args.out {
        Some(path) => {
            let snapshot = gateway.export_to_file(&path).await?;
            println!(
                "exported {} customer(s), {} sale(s), {} movement(s) to {}",
                snapshot.customers.len(),
                snapshot.sales.len(),
                snapshot.movements.len(),
                path.display()
            );
        }
        None => {
            let snapshot = gateway.export_all().await?;
            println!("{}", snapshot.to_json()?);
        }
    }
    Ok(())
}

async fn import(db: &Database, args: ImportArgs) -> LedgerResult<()> {
    let summary = SnapshotGateway::new(db.clone())
        .import_from_file(&args.path)
        .await?;
    println!(
        "imported {} customer(s), {} sale(s), {} movement(s)",
        summary.customers, summary.sales, summary.movements
    );
    Ok(())
}

async fn backup(db: &Database, args: BackupArgs) -> LedgerResult<()> {
    kiosco_ledger::backup_to(db, &args.target).await?;
    println!("backup written to {}", args.target.display());
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Looks a customer up by id first, then by active name.
async fn resolve_customer(service: &LedgerService, reference: &str) -> LedgerResult<Customer> {
    if let Ok(customer) = service.get_customer(reference).await {
        return Ok(customer);
    }
    service
        .get_customer_by_name(reference)
        .await?
        .ok_or_else(|| LedgerError::Storage(DbError::not_found("Customer", reference)))
}

fn method_name(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "cash",
        PaymentMethod::Transfer => "transfer",
        PaymentMethod::Debit => "debit",
        PaymentMethod::Credit => "credit",
    }
}

fn print_report(report: &Report) {
    println!("window {}", report.window);
    for (method, cents) in &report.totals_by_method {
        println!("  {:<8}  {}", method_name(*method), Money::from_cents(*cents));
    }
    println!(
        "revenue {} over {} sale(s)",
        Money::from_cents(report.revenue_cents),
        report.sale_count
    );
    println!(
        "credit: issued {}, interest {}, repaid {}, net change {}",
        Money::from_cents(report.credit_issued_cents),
        Money::from_cents(report.interest_accrued_cents),
        Money::from_cents(report.credit_repaid_cents),
        Money::from_cents(report.net_outstanding_change_cents)
    );
}
