use std::sync::Arc;

use clap::Parser;
use tracing::{debug, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use vigia::{
    actors::{bus::BusHandle, monitor::MonitorHandle},
    config::{StoreConfig, read_config_file},
    store::ReadingsStore,
};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("vigia", LevelFilter::TRACE),
        ("monitor", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    let store = open_store(config.store.clone().unwrap_or_default()).await?;

    let bus = BusHandle::spawn(&config.broker)?;
    let _monitor = MonitorHandle::spawn(store, bus, &config.monitor);

    debug!(
        "monitoring every {}s over a {}s window",
        config.monitor.interval_secs, config.monitor.window_secs
    );

    // Process-lifetime-bound: the monitor runs until the process is killed.
    std::future::pending::<()>().await;

    Ok(())
}

async fn open_store(config: StoreConfig) -> anyhow::Result<Arc<dyn ReadingsStore>> {
    match config {
        StoreConfig::Memory => {
            debug!("using in-memory readings store");
            Ok(Arc::new(vigia::store::memory::MemoryStore::new()))
        }

        #[cfg(feature = "store-sqlite")]
        StoreConfig::Sqlite { path } => {
            let store = vigia::store::sqlite::SqliteStore::new(&path).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-sqlite"))]
        StoreConfig::Sqlite { .. } => {
            anyhow::bail!("sqlite store requested but the store-sqlite feature is disabled")
        }
    }
}
