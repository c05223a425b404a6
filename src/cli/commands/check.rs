//! One-shot cycle command.

use anyhow::{Context, Result};
use finalert_config::AppConfig;
use finalert_engine::{AlertEvaluator, CycleStats, NotificationScheduler};

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

    let alerts = evaluator
        .run_cycle()
        .await
        .context("Alert cycle did not run")?;
    let reports = scheduler
        .run_cycle()
        .await
        .context("Report cycle did not run")?;

    println!("Cycle Results");
    println!("═══════════════════════════════════════════════════════════");
    print_stats("Alerts", &alerts, "triggered");
    print_stats("Reports", &reports, "sent");

    Ok(())
}

fn print_stats(title: &str, stats: &CycleStats, fired: &str) {
    println!();
    println!("  {}", title);
    println!("  ───────────────────────────────────────────────────────");
    println!("  Considered:    {}", stats.considered);
    println!("  {:<15}{}", format!("{}:", capitalize(fired)), stats.fired);
    println!("  Delivered:     {}", stats.delivered);
    println!("  Skipped:       {}", stats.skipped);
    println!("  Failed:        {}", stats.failed);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
