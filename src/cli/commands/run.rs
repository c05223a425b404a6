//! Long-running service command.

use anyhow::{Context, Result};
use finalert_config::AppConfig;
use finalert_engine::{AlertEvaluator, NotificationScheduler, PeriodicTask};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::cli::{services, RunArgs};

pub async fn run(args: RunArgs, config: &AppConfig) -> Result<()> {
    services::ensure_valid(config)?;

    let market = services::market_data(config)?;
    let store = services::store(config).await?;
    let messenger = services::messenger(config, args.dry_run)?;

    let snapshot_timeout = config.market_data.snapshot_timeout();
    let evaluator = AlertEvaluator::new(market.clone(), store.clone(), messenger.clone())
        .with_snapshot_timeout(snapshot_timeout);
    let scheduler = NotificationScheduler::new(market, store, messenger)
        .with_snapshot_timeout(snapshot_timeout);

    let alerts = config.alerts.poll();
    let reports = config.notifications.poll();
    let alert_task = PeriodicTask::new(Arc::new(evaluator), alerts.interval())
        .with_cycle_timeout(alerts.cycle_timeout());
    let report_task = PeriodicTask::new(Arc::new(scheduler), reports.interval())
        .with_cycle_timeout(reports.cycle_timeout());

    println!("finalert");
    println!("═══════════════════════════════════════════════════════════");
    println!("  Alerts:        every {}s", alerts.interval_secs);
    println!("  Reports:       every {}s", reports.interval_secs);
    println!("  Store:         {}", config.storage.path);
    println!("  Delivery:      {}", if args.dry_run { "log (dry run)" } else { "telegram" });
    println!();
    println!("Press Ctrl-C to stop.");

    let (shutdown, rx) = watch::channel(false);
    let alert_handle = tokio::spawn(alert_task.run(rx.clone()));
    let report_handle = tokio::spawn(report_task.run(rx));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutdown requested, waiting for running cycles");
    shutdown.send_replace(true);

    let alert_cycles = alert_handle.await.context("Alert task panicked")?;
    let report_cycles = report_handle.await.context("Report task panicked")?;
    info!(alert_cycles, report_cycles, "Stopped");

    Ok(())
}
