//! CLI definitions.

pub mod commands;
pub mod services;

use clap::{Parser, Subcommand, ValueEnum};
use finalert_core::{AlertCondition, AssetClass, IntervalKind};
use rust_decimal::Decimal;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "finalert")]
#[command(author, version, about = "Price alerts and market reports for currencies, gold, and equities")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/finalert.toml")]
    pub config: PathBuf,

    /// Log level (overrides logging.level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run alert evaluation and recurring reports until Ctrl-C
    Run(RunArgs),
    /// Run one alert cycle and one report cycle, then exit
    Check(RunArgs),
    /// Fetch and print one snapshot
    Snapshot(SnapshotArgs),
    /// List configured source chains
    Sources,
    /// Manage price alerts
    #[command(subcommand)]
    Alert(AlertCommand),
    /// Manage recurring reports
    #[command(subcommand)]
    Notify(NotifyCommand),
    /// Validate configuration
    ValidateConfig,
    /// Print the default configuration
    ConfigTemplate,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Log messages instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct SnapshotArgs {
    /// Asset class (currency, metal, equity)
    pub asset_class: AssetClass,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,
}

#[derive(Subcommand)]
pub enum AlertCommand {
    /// Create an alert
    Add(AlertAddArgs),
    /// List a chat's alerts
    List(ChatArgs),
    /// Delete an alert
    Delete(DeleteArgs),
}

#[derive(clap::Args)]
pub struct AlertAddArgs {
    /// Chat identity of the owner
    #[arg(long)]
    pub chat_id: i64,

    /// Asset class (currency, metal, equity)
    #[arg(short = 'a', long = "class")]
    pub asset_class: AssetClass,

    /// Symbol, e.g. USD, gram, THYAO
    #[arg(short, long)]
    pub symbol: String,

    /// Target price
    #[arg(short, long)]
    pub target: Decimal,

    /// Condition (above, below)
    #[arg(long, default_value = "above")]
    pub condition: AlertCondition,
}

#[derive(Subcommand)]
pub enum NotifyCommand {
    /// Subscribe a chat to recurring reports
    Add(NotifyAddArgs),
    /// List a chat's subscriptions
    List(ChatArgs),
    /// Delete a subscription
    Delete(DeleteArgs),
}

#[derive(clap::Args)]
pub struct NotifyAddArgs {
    /// Chat identity of the owner
    #[arg(long)]
    pub chat_id: i64,

    /// Interval (hourly, every_4h, every_8h, daily)
    #[arg(short, long)]
    pub interval: IntervalKind,

    /// Asset classes to include (comma-separated)
    #[arg(short = 'a', long = "classes", value_delimiter = ',', required = true)]
    pub asset_classes: Vec<AssetClass>,
}

#[derive(clap::Args)]
pub struct ChatArgs {
    /// Chat identity of the owner
    #[arg(long)]
    pub chat_id: i64,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// Chat identity of the owner
    #[arg(long)]
    pub chat_id: i64,

    /// Identifier to delete
    pub id: Uuid,
}
