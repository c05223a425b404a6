//! Recurring report management commands.

use anyhow::Result;
use finalert_config::AppConfig;
use finalert_engine::{format_timestamp, SubscriptionService};

use crate::cli::{services, NotifyCommand};

pub async fn run(command: NotifyCommand, config: &AppConfig) -> Result<()> {
    let service = SubscriptionService::new(services::store(config).await?);

    match command {
        NotifyCommand::Add(args) => {
            let notification = service
                .create_notification(
                    args.chat_id,
                    args.interval,
                    args.asset_classes.into_iter().collect(),
                )
                .await?;
            println!("Subscription created: {}", notification.id);
            println!(
                "  {} report of {}",
                notification.interval,
                join_classes(&notification.asset_classes)
            );
        }
        NotifyCommand::List(args) => {
            let notifications = service.list_notifications(args.chat_id).await?;
            println!("Subscriptions for chat {}", args.chat_id);
            println!("═══════════════════════════════════════════════════════════");
            if notifications.is_empty() {
                println!("  No subscriptions.");
            }
            for n in notifications {
                let last = n
                    .last_sent_at
                    .map(format_timestamp)
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "  {}  {:<9} {:<24} last sent {}{}",
                    n.id,
                    n.interval.to_string(),
                    join_classes(&n.asset_classes),
                    last,
                    if n.is_active { "" } else { " (deleted)" }
                );
            }
        }
        NotifyCommand::Delete(args) => {
            if service.delete_notification(args.chat_id, args.id).await? {
                println!("Subscription {} deleted.", args.id);
            } else {
                anyhow::bail!("No active subscription {} for chat {}", args.id, args.chat_id);
            }
        }
    }

    Ok(())
}

fn join_classes<'a>(classes: impl IntoIterator<Item = &'a finalert_core::AssetClass>) -> String {
    classes
        .into_iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
