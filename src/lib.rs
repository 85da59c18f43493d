pub mod config;
pub mod holdings;
pub mod log;
pub mod providers;
pub mod quote;
pub mod refresh;
pub mod spot;
pub mod summary;
pub mod ui;
pub mod valuation;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::providers::YahooChartSource;
use crate::spot::{PriceSnapshot, SpotPriceCache};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    Summary,
    Metals,
    Coins,
    Goldbacks,
    Prices { refresh: bool },
    Watch,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let source = Arc::new(YahooChartSource::new(config.base_url()));
    let cache = Arc::new(SpotPriceCache::new(config.metals.clone(), source));

    match command {
        AppCommand::Prices { refresh } => {
            if refresh {
                refresh_with_spinner(&cache).await;
            }
            let snapshot = cache.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            return Ok(());
        }
        AppCommand::Watch => return watch(cache, &config).await,
        _ => {}
    }

    // View commands run one fetch cycle up front, so every valuation below
    // is served from a cache that has at least been attempted once.
    let snapshot = refresh_with_spinner(&cache).await;
    let holdings = &config.holdings;

    match command {
        AppCommand::Summary => {
            let summary = summary::summarize(holdings, &snapshot);
            println!("{}", summary::render_dashboard(&summary, &snapshot));
        }
        AppCommand::Metals => println!("{}", summary::metals_table(&holdings.metals)),
        AppCommand::Coins => println!("{}", summary::coins_table(&holdings.coins)),
        AppCommand::Goldbacks => {
            println!("{}", summary::goldbacks_table(&holdings.goldbacks, &snapshot));
        }
        AppCommand::Prices { .. } | AppCommand::Watch => {
            unreachable!("handled before the fetch cycle")
        }
    }

    Ok(())
}

async fn refresh_with_spinner(cache: &SpotPriceCache) -> PriceSnapshot {
    let spinner = ui::new_spinner("Fetching spot prices...");
    let snapshot = cache.fetch_all().await;
    spinner.finish_and_clear();
    snapshot
}

async fn watch(cache: Arc<SpotPriceCache>, config: &AppConfig) -> Result<()> {
    let refresher = refresh::Refresher::spawn(Arc::clone(&cache), config.refresh_interval());
    let mut snapshots = refresher.snapshots();
    info!(
        "Refreshing every {} minutes, Ctrl-C to exit",
        config.refresh_interval_minutes
    );

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let summary = summary::summarize(&config.holdings, &snapshot);
                println!("{}", summary::render_dashboard(&summary, &snapshot));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    refresher.shutdown().await;
    Ok(())
}
