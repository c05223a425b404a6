//! Alert management commands.

use anyhow::Result;
use finalert_config::AppConfig;
use finalert_core::{format_price, AlertState};
use finalert_engine::{format_timestamp, SubscriptionService};

use crate::cli::{services, AlertCommand};

pub async fn run(command: AlertCommand, config: &AppConfig) -> Result<()> {
    let service = SubscriptionService::new(services::store(config).await?);

    match command {
        AlertCommand::Add(args) => {
            let alert = service
                .create_alert(
                    args.chat_id,
                    args.asset_class,
                    &args.symbol,
                    args.target,
                    args.condition,
                )
                .await?;
            println!("Alert created: {}", alert.id);
            println!(
                "  {} {} {} {}",
                alert.asset_class,
                alert.symbol,
                alert.condition,
                format_price(alert.target_price)
            );
        }
        AlertCommand::List(args) => {
            let alerts = service.list_alerts(args.chat_id).await?;
            println!("Alerts for chat {}", args.chat_id);
            println!("═══════════════════════════════════════════════════════════");
            if alerts.is_empty() {
                println!("  No alerts.");
            }
            for alert in alerts {
                let state = match (alert.state(), alert.triggered_at) {
                    (AlertState::Triggered, Some(at)) => format!("triggered {}", format_timestamp(at)),
                    (AlertState::Active, _) => "active".to_string(),
                    _ => "deleted".to_string(),
                };
                println!(
                    "  {}  {:<8} {:<10} {:<5} {:>12}  {}",
                    alert.id,
                    alert.asset_class.to_string(),
                    alert.symbol,
                    alert.condition.to_string(),
                    format_price(alert.target_price),
                    state
                );
            }
        }
        AlertCommand::Delete(args) => {
            if service.delete_alert(args.chat_id, args.id).await? {
                println!("Alert {} deleted.", args.id);
            } else {
                anyhow::bail!("No active alert {} for chat {}", args.id, args.chat_id);
            }
        }
    }

    Ok(())
}
