use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use agency_ledger::configure::load_config;
use agency_ledger::directory::{ClientDirectory, HttpClientDirectory, NullDirectory};
use agency_ledger::logger::setup_logger;
use agency_ledger::models::{IdentityHint, NewClientLedger, TransactionEntry, TxnKind};
use agency_ledger::projection::{project, BalanceStatus};
use agency_ledger::service::LedgerService;
use agency_ledger::store::LedgerStore;

#[derive(Parser)]
#[command(name = "agency-ledger", about = "Back-office client ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a client ledger, optionally with an opening balance
    AddClient {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        initial_amount: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Append a charge or payment to a client's ledger
    AddTxn {
        #[arg(long)]
        client: String,
        /// "total" (charge) or "received" (payment)
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        description: String,
        /// Business date, YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Look a ledger up by phone, creating it if missing
    Resolve {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Show a client's transaction history with running balances
    Ledger {
        #[arg(long)]
        client: String,
    },
    /// Search ledgers by name or phone
    Search { term: String },
    /// List all client ledgers
    List,
}

fn business_date(date: Option<NaiveDate>) -> DateTime<Utc> {
    match date.and_then(|d| d.and_hms_opt(0, 0, 0)) {
        Some(naive) => naive.and_utc(),
        None => Utc::now(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    setup_logger(&config).map_err(|e| anyhow::anyhow!("logger setup failed: {}", e))?;

    let store = Arc::new(LedgerStore::open(Path::new(&config.data_dir))?);
    let directory: Arc<dyn ClientDirectory> = if config.directory_base_url.is_empty() {
        Arc::new(NullDirectory)
    } else {
        Arc::new(HttpClientDirectory::new(&config.directory_base_url))
    };
    let service = LedgerService::new(store, directory);

    match Cli::parse().command {
        Command::AddClient { name, phone, initial_amount, description, notes } => {
            let id = service
                .create_ledger(NewClientLedger {
                    name,
                    phone,
                    notes,
                    initial_amount,
                    initial_description: description,
                })
                .await?;
            println!("Created ledger {}", id);
        }
        Command::AddTxn { client, kind, amount, description, date } => {
            let Some(kind) = TxnKind::from_str(&kind) else {
                bail!("type must be \"total\" or \"received\", got {:?}", kind);
            };
            let entry = TransactionEntry::new(kind, amount, &description, business_date(date));
            service.append_transaction(&client, entry).await?;
            let ledger = service.get_by_id(&client).await?;
            println!(
                "Recorded. Total {}, received {}, balance {}",
                ledger.total_amount, ledger.received_amount, ledger.balance
            );
        }
        Command::Resolve { phone, name } => {
            let mut hint = IdentityHint::from_phone(&phone);
            hint.name = name;
            let ledger = service.resolve_or_create(hint).await?;
            println!("{}  {}  balance {}", ledger.id, ledger.name, ledger.balance);
        }
        Command::Ledger { client } => {
            let ledger = service.get_by_id(&client).await?;
            println!("{} ({})  balance {}", ledger.name, ledger.phone, ledger.balance);
            let txns = service.list_transactions(&client).await?;
            for p in project(txns) {
                println!(
                    "{}  {:<10} {:>12}  {:>12} {}",
                    p.txn.date.format("%Y-%m-%d"),
                    p.txn.kind.as_str(),
                    p.txn.amount,
                    p.running_balance.abs(),
                    BalanceStatus::classify(p.running_balance).as_str()
                );
            }
        }
        Command::Search { term } => {
            for ledger in service.find_by_free_text(&term).await? {
                println!("{}  {}  {}  balance {}", ledger.id, ledger.name, ledger.phone, ledger.balance);
            }
        }
        Command::List => {
            for ledger in service.list_all().await? {
                println!(
                    "{}  {}  total {}  received {}  balance {}",
                    ledger.id, ledger.name, ledger.total_amount, ledger.received_amount, ledger.balance
                );
            }
        }
    }

    Ok(())
}
