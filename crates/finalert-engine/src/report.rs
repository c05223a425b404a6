//! Alert messages and market reports.
//!
//! Messages go to Turkish-speaking chats, so labels are Turkish and prices
//! use Turkish number formatting.

use chrono::{DateTime, FixedOffset, Utc};
use finalert_core::{
    format_percent, format_price, Alert, AlertCondition, AssetClass, AssetQuote, Provenance,
    Snapshot,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Istanbul has been on UTC+3 all year since 2016.
const ISTANBUL_OFFSET_SECS: i32 = 3 * 3600;

/// Equities listed per report.
const MAX_EQUITIES: usize = 5;

/// Format a timestamp in Istanbul time as `17.10.2026 14:05`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(ISTANBUL_OFFSET_SECS) {
        Some(offset) => at.with_timezone(&offset).format("%d.%m.%Y %H:%M").to_string(),
        None => at.format("%d.%m.%Y %H:%M UTC").to_string(),
    }
}

/// Human-readable name of a tracked symbol.
pub fn display_name(asset_class: AssetClass, symbol: &str) -> String {
    let name = match (asset_class, symbol) {
        (AssetClass::Currency, "USD") => "Amerikan Doları",
        (AssetClass::Currency, "EUR") => "Euro",
        (AssetClass::Currency, "GBP") => "İngiliz Sterlini",
        (AssetClass::Metal, "gram") => "Gram Altın",
        (AssetClass::Metal, "ceyrek") => "Çeyrek Altın",
        (AssetClass::Metal, "yarim") => "Yarım Altın",
        (AssetClass::Metal, "tam") => "Tam Altın",
        (AssetClass::Metal, "cumhuriyet") => "Cumhuriyet Altını",
        (AssetClass::Metal, "ons") => "Ons Altın",
        (AssetClass::Equity, "XU100") => "BIST 100",
        _ => return symbol.to_string(),
    };
    match asset_class {
        AssetClass::Currency => format!("{} ({})", symbol, name),
        _ => name.to_string(),
    }
}

fn icon(asset_class: AssetClass) -> &'static str {
    match asset_class {
        AssetClass::Currency => "💱",
        AssetClass::Metal => "🥇",
        AssetClass::Equity => "📈",
    }
}

fn section_title(asset_class: AssetClass) -> &'static str {
    match asset_class {
        AssetClass::Currency => "Döviz Kurları",
        AssetClass::Metal => "Altın Fiyatları",
        AssetClass::Equity => "Borsa İstanbul",
    }
}

fn source_label(asset_class: AssetClass) -> &'static str {
    match asset_class {
        AssetClass::Currency => "Döviz",
        AssetClass::Metal => "Altın",
        AssetClass::Equity => "Borsa",
    }
}

fn crossed(condition: AlertCondition) -> &'static str {
    match condition {
        AlertCondition::Above => "üstüne çıktı",
        AlertCondition::Below => "altına düştü",
    }
}

fn provenance_text(provenance: &Provenance) -> String {
    match provenance {
        Provenance::Live(source) => source.clone(),
        Provenance::LastResort(source) => format!("{} (yedek kaynak)", source),
        Provenance::Unavailable(source) => format!("{} (veri yok)", source),
    }
}

/// Message sent to the owner of a triggered alert.
pub fn format_alert_message(
    alert: &Alert,
    quote: &AssetQuote,
    provenance: &Provenance,
    at: DateTime<Utc>,
) -> String {
    format!(
        "🔔 FİYAT ALARMI\n\n\
         {name} {target} seviyesinin {crossed}\n\
         Güncel fiyat: {current}\n\
         Hedef fiyat: {target}\n\n\
         Kaynak: {provenance}\n\
         {time}",
        name = display_name(alert.asset_class, &alert.symbol),
        target = format_price(alert.target_price),
        crossed = crossed(alert.condition),
        current = format_price(quote.price()),
        provenance = provenance_text(provenance),
        time = format_timestamp(at),
    )
}

fn quote_line(quote: &AssetQuote) -> String {
    let name = display_name(quote.asset_class, &quote.symbol);
    match (quote.asset_class, quote.bid, quote.change_percent) {
        (AssetClass::Equity, _, change) => {
            let change = change.unwrap_or_default();
            let marker = if change >= Decimal::ZERO { "🟢" } else { "🔴" };
            let sign = if change > Decimal::ZERO { "+" } else { "" };
            format!(
                "  {} {}: {} ({}{}%)",
                marker,
                name,
                format_price(quote.price()),
                sign,
                format_percent(change)
            )
        }
        (_, Some(bid), _) => format!(
            "  {}: {} / {}",
            name,
            format_price(bid),
            format_price(quote.ask)
        ),
        (_, None, _) => format!("  {}: {}", name, format_price(quote.ask)),
    }
}

fn section(snapshot: &Snapshot) -> String {
    let mut s = format!("{} {}\n", icon(snapshot.asset_class), section_title(snapshot.asset_class));
    let quotes = snapshot.ordered_quotes();
    if quotes.is_empty() {
        s.push_str("  Veri yok\n");
        return s;
    }

    let limit = match snapshot.asset_class {
        AssetClass::Equity => MAX_EQUITIES,
        _ => quotes.len(),
    };
    for quote in quotes.into_iter().take(limit) {
        s.push_str(&quote_line(quote));
        s.push('\n');
    }
    s
}

/// Market report covering the given snapshots, in asset class order.
///
/// Symbols missing from a snapshot are left out; an empty snapshot shows a
/// "no data" line instead of zero prices.
pub fn format_report(snapshots: &BTreeMap<AssetClass, Snapshot>, at: DateTime<Utc>) -> String {
    let mut s = String::new();
    s.push_str("📊 PİYASA RAPORU\n");
    s.push_str(&format_timestamp(at));
    s.push_str("\n\n");

    for snapshot in snapshots.values() {
        s.push_str(&section(snapshot));
        s.push('\n');
    }

    let sources: Vec<String> = snapshots
        .values()
        .map(|snapshot| {
            format!(
                "{}: {}",
                source_label(snapshot.asset_class),
                provenance_text(&snapshot.provenance)
            )
        })
        .collect();
    s.push_str("Kaynaklar: ");
    s.push_str(&sources.join(", "));
    s
}
