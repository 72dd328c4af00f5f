use clap::Parser;
use khata::application::engine::LedgerEngine;
use khata::application::reporting;
use khata::domain::catalog::CatalogBox;
use khata::domain::ports::LedgerFilter;
use khata::error::{LedgerError, Result};
use khata::infrastructure::in_memory::{InMemoryCatalog, InMemoryLedgerStore, InMemorySaleLog};
use khata::interfaces::csv::balance_writer::BalanceWriter;
use khata::interfaces::csv::catalog::{load_customers, load_products};
use khata::interfaces::csv::event_reader::{EventKind, EventReader, LedgerEvent};
use miette::IntoDiagnostic;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input ledger events CSV file (sales and payments)
    events: PathBuf,

    /// Product catalog CSV (id,name,price)
    #[arg(long)]
    products: PathBuf,

    /// Customer master CSV (id,name,contact,address)
    #[arg(long)]
    customers: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,
}

async fn apply_event(engine: &LedgerEngine, event: &LedgerEvent) -> Result<()> {
    match event.r#type {
        EventKind::Sale => {
            engine
                .post_sale(&event.customer, &event.sale_lines()?)
                .await?;
        }
        EventKind::Pay => {
            let entry = engine
                .open_entry(&event.customer)
                .await?
                .ok_or_else(|| LedgerError::not_found("open ledger entry", &event.customer))?;
            engine.mark_paid(entry.id).await?;
        }
        EventKind::Partial => {
            let amount = event.amount.ok_or_else(|| {
                LedgerError::Validation("partial payment event requires an amount".to_string())
            })?;
            let entry = engine
                .open_entry(&event.customer)
                .await?
                .ok_or_else(|| LedgerError::not_found("open ledger entry", &event.customer))?;
            engine.apply_partial_payment(entry.id, amount).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let products = load_products(File::open(&cli.products).into_diagnostic()?).into_diagnostic()?;
    let customers =
        load_customers(File::open(&cli.customers).into_diagnostic()?).into_diagnostic()?;
    let catalog: CatalogBox = Box::new(InMemoryCatalog::with_data(products, customers));

    #[cfg(feature = "storage-rocksdb")]
    let engine = if let Some(db_path) = &cli.db_path {
        let store = khata::infrastructure::rocksdb::RocksDBStore::open(db_path).into_diagnostic()?;
        LedgerEngine::new(catalog, Box::new(store.clone()), Box::new(store))
    } else {
        LedgerEngine::new(
            catalog,
            Box::new(InMemoryLedgerStore::new()),
            Box::new(InMemorySaleLog::new()),
        )
    };
    #[cfg(not(feature = "storage-rocksdb"))]
    let engine = LedgerEngine::new(
        catalog,
        Box::new(InMemoryLedgerStore::new()),
        Box::new(InMemorySaleLog::new()),
    );

    // Process events
    let file = File::open(&cli.events).into_diagnostic()?;
    let reader = EventReader::new(file);
    for event_result in reader.events() {
        match event_result {
            Ok(event) => {
                if let Err(e) = apply_event(&engine, &event).await {
                    eprintln!("Error processing event: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    // Output the open-balance view
    let entries = engine
        .list_open_balances(&LedgerFilter::default())
        .await
        .into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_entries(&entries).into_diagnostic()?;
    drop(writer);

    // Sale reports
    let sales = engine.recorded_sales().await.into_diagnostic()?;
    println!();
    println!("# daily sales");
    for row in reporting::daily_totals(&sales) {
        println!("{},{}", row.period, row.total);
    }
    println!("# monthly sales");
    for row in reporting::monthly_totals(&sales) {
        println!("{},{}", row.period, row.total);
    }

    Ok(())
}
