pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod in_flight;
pub mod store;
pub mod study;

use std::sync::Arc;

use review_core::Scheduler;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::clock::{spawn_ticker, Clock, ManualClock, SystemClock};
pub use crate::config::{Config, ConfigError};
pub use crate::error::{Result, StudyError};
pub use crate::filter::ItemFilter;
pub use crate::in_flight::{InFlight, InFlightGuard};
pub use crate::store::{ItemStore, JsonFileStore, MemoryStore, Snapshot, StoreError};
pub use crate::study::StudyDriver;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let scheduler = Scheduler::new(config.settings.clone())?;

    let store = JsonFileStore::open(&config.data_path).await?;
    tracing::info!("Opened collection at {}", store.path().display());
    let store: Arc<dyn ItemStore> = Arc::new(store);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (ticks, ticker) = spawn_ticker(Arc::clone(&clock), config.settings.refresh_interval());

    let mut driver = StudyDriver::new(store, scheduler, clock, ticks).with_filter(config.filter);
    cli::run_session(&mut driver, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    ticker.abort();
    tracing::info!(
        session = %driver.id(),
        reviews = driver.session().applied(),
        "Study session ended"
    );
    Ok(())
}
