use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use transfer_engine::{Account, EngineConfig, InMemoryAccountStore, LogNotifier, Transfer, TransferEngine};

/// A cli interface to the transfer engine
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the accounts CSV file (`id,balance`)
    accounts: std::path::PathBuf,
    /// The path to the transfers CSV file (`from,to,amount`)
    transfers: std::path::PathBuf,
    /// The number of threads submitting transfers concurrently
    #[clap(long, default_value_t = 1)]
    threads: usize,
    /// Give up on a transfer if the engine lock isn't acquired within this many milliseconds
    #[clap(long)]
    lock_timeout_ms: Option<u64>,
    /// The log filter used when `RUST_LOG` is not set
    #[clap(long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout is reserved for the resulting accounts
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn reader(path: &std::path::Path) -> anyhow::Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let store = InMemoryAccountStore::new();
    for account in reader(&args.accounts)?.deserialize::<Account>() {
        store.create_account(account?)?;
    }

    let transfers = reader(&args.transfers)?
        .deserialize::<Transfer>()
        .collect::<Result<Vec<_>, _>>()?;

    let mut config = EngineConfig::default();
    if let Some(timeout) = args.lock_timeout_ms {
        config = config.with_lock_timeout(Duration::from_millis(timeout));
    }
    let engine = TransferEngine::with_config(store, LogNotifier, config);

    let threads = args.threads.max(1);
    tracing::info!(transfers = transfers.len(), threads, "processing transfers");
    std::thread::scope(|scope| {
        for worker in 0..threads {
            let engine = &engine;
            let transfers = &transfers;
            scope.spawn(move || {
                for transfer in transfers.iter().skip(worker).step_by(threads) {
                    // failed transfers are logged and otherwise ignored
                    if let Err(error) = engine.execute(transfer) {
                        tracing::warn!(
                            from = %transfer.source(),
                            to = %transfer.destination(),
                            amount = %transfer.amount(),
                            %error,
                            "transfer failed"
                        );
                    }
                }
            });
        }
    });

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(std::io::stdout());

    for account in engine.store().accounts() {
        writer.serialize(account)?;
    }
    writer.flush()?;

    Ok(())
}
