use std::collections::BTreeSet;
use std::io::IsTerminal as _;
use std::path::Path;

use color_eyre::eyre::OptionExt as _;
use csv::ReaderBuilder;
use csv::Trim;
use ledgerbook::account::LedgerAccount;
use ledgerbook::analytics;
use ledgerbook::config::LedgerConfig;
use ledgerbook::config::LoggingConfig;
use ledgerbook::engine::LedgerEngine;
use ledgerbook::operation::AccountRow;
use ledgerbook::operation::Operation;
use ledgerbook::store::MemoryStore;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

mod report;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = LedgerConfig::load()?;
    init_tracing(&config.logging)?;

    let mut args = std::env::args().skip(1);
    let accounts_path = args.next().ok_or_eyre("no accounts CSV supplied")?;
    let operations_path = args.next().ok_or_eyre("no operations CSV supplied")?;

    let mut store = MemoryStore::new();
    let engine = LedgerEngine::new(config.engine.reference_policy);
    info!(reference_policy = %engine.reference_policy(), "ledger engine ready");

    let mut failed_rows = open_accounts(&mut store, Path::new(&accounts_path))?;
    failed_rows += run_operations(&engine, &mut store, Path::new(&operations_path))?;

    let report_errors = report::write_to_stdout(store.accounts());
    for error in &report_errors {
        error!(%error, "failed to write report");
    }

    let owners: BTreeSet<_> = store.accounts().map(LedgerAccount::owner_id).collect();
    for owner_id in owners {
        match analytics::net_worth(store.accounts_of(owner_id)) {
            Ok(net_worth) => info!(%owner_id, %net_worth, "net worth"),
            Err(error) => error!(%owner_id, %error, "failed to compute net worth"),
        }
    }

    if failed_rows > 0 || !report_errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

/// `RUST_LOG` takes precedence over the configured filter.
fn init_tracing(config: &LoggingConfig) -> color_eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.filter))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .try_init()?;
    Ok(())
}

/// Returns the number of rows that could not be opened as accounts.
fn open_accounts(store: &mut MemoryStore, path: &Path) -> color_eyre::Result<usize> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let mut failed_rows = 0;

    for row_res in reader.deserialize::<AccountRow>() {
        let row = match row_res {
            Ok(row) => row,
            Err(error) => {
                error!(%error, "failed to deserialize account");
                failed_rows += 1;
                continue;
            }
        };

        let account = LedgerAccount::from(row);
        if let Err(error) = store.open_account(account) {
            error!(%error, "failed to open account");
            failed_rows += 1;
        }
    }

    Ok(failed_rows)
}

/// Returns the number of operations that failed to deserialize or execute.
fn run_operations(engine: &LedgerEngine, store: &mut MemoryStore, path: &Path) -> color_eyre::Result<usize> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let mut failed_rows = 0;

    for op_res in reader.deserialize::<Operation>() {
        let op = match op_res {
            Ok(op) => op,
            Err(error) => {
                error!(%error, "failed to deserialize operation");
                failed_rows += 1;
                continue;
            }
        };

        let owner_id = op.owner_id();
        if let Err(error) = op.execute(engine, store) {
            error!(%owner_id, %error, "failed to execute operation");
            failed_rows += 1;
        }
    }

    Ok(failed_rows)
}
