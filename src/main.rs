use cauldron_watchdog::alerts::AlertManager;
use cauldron_watchdog::config::AppConfig;
use cauldron_watchdog::listener::{connect, watch_blocks, watch_logs};
use cauldron_watchdog::state::AppState;
use cauldron_watchdog::CollateralMonitor;

use dotenv::dotenv;
use eyre::{Result, WrapErr};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // File Logging Setup (the terminal belongs to the TUI)
    let file_appender = tracing_appender::rolling::daily("logs", "watchdog.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    info!("Starting Cauldron Collateral Watchdog");

    // 1. Load Config
    let mut config = AppConfig::new().wrap_err("Failed to load config")?;
    config.apply_env();

    let registry = Arc::new(
        config
            .registry()
            .wrap_err("Invalid cauldron registry")?,
    );
    let kinds = config.event_kinds().wrap_err("Invalid monitor.events")?;

    info!("Configuration Loaded:");
    info!("  RPC URL: [HIDDEN]");
    info!("  Chain ID: {}", config.chain.chain_id);
    for cauldron in registry.iter() {
        info!("  Cauldron: {} ({})", cauldron.name, cauldron.address);
    }
    info!("  Events: {:?}", kinds);

    // 2. Setup Components
    let provider = Arc::new(connect(&config.chain.rpc_url).await?);
    let alert_manager = AlertManager::new(config.alerts.clone());
    info!("  Delivery: {}", if alert_manager.is_enabled() { "Enabled" } else { "Disabled" });
    let state = Arc::new(AppState::new());
    let monitor = CollateralMonitor::with_events(registry.clone(), kinds.clone());

    // 3. Spawn Tasks with Backpressure
    let (tx, mut rx) = mpsc::channel(100);

    // Task A: Block Listener
    let provider_clone = provider.clone();
    let state_clone = state.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_blocks(provider_clone, state_clone).await {
            error!("Block listener failed: {}", e);
        }
    });

    // Task B: Log Listener (Producer)
    let provider_clone = provider.clone();
    let registry_clone = registry.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_logs(provider_clone, &registry_clone, &kinds, tx).await {
            error!("Log listener failed: {}", e);
        }
    });

    // Task C: Alert Consumer
    let state_consumer = state.clone();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            info!("Processing transaction {} (block {})", event.hash, event.block_number);

            for (cauldron, alert) in monitor.handle_tagged(&event) {
                info!("{}: {}", alert.alert_id, alert.description);
                state_consumer.add_alert(&cauldron, &alert);
                alert_manager.send_alert(&alert).await;
            }
        }
    });

    // Task D: TUI (Main Thread)
    cauldron_watchdog::tui::run_tui(state)
}
