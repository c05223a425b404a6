//! Snapshot command.

use anyhow::Result;
use finalert_config::AppConfig;
use finalert_core::format_price;
use finalert_engine::format_timestamp;
use finalert_engine::report::display_name;

use crate::cli::{services, SnapshotArgs};

pub async fn run(args: SnapshotArgs, config: &AppConfig) -> Result<()> {
    services::ensure_valid(config)?;
    let market = services::market_data(config)?;
    let snapshot = market.get(args.asset_class).await;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{} Snapshot", args.asset_class.title());
        println!("═══════════════════════════════════════════════════════════");
        println!("  Source:  {}", snapshot.provenance);
        println!("  Fetched: {}", format_timestamp(snapshot.fetched_at));
        println!();

        for quote in snapshot.ordered_quotes() {
            let name = display_name(quote.asset_class, &quote.symbol);
            let bid = quote.bid.map(format_price).unwrap_or_else(|| "-".to_string());
            let change = quote
                .change_percent
                .map(|c| format!("{}%", c))
                .unwrap_or_default();
            println!(
                "  {:<24} {:>14} {:>14} {:>8}",
                name,
                bid,
                format_price(quote.ask),
                change
            );
        }
    }

    snapshot.ensure_populated()?;
    Ok(())
}
