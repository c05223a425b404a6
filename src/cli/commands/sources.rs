//! List sources command.

use anyhow::Result;
use finalert_config::AppConfig;
use finalert_data::builtin_source;

pub async fn run(config: &AppConfig) -> Result<()> {
    println!("Source Chains");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for (asset_class, chain) in config.sources.chains() {
        println!("  {}", asset_class.title());
        println!("  ───────────────────────────────────────────────────────");
        let labels = chain.order.iter().chain(std::iter::once(&chain.fallback));
        for (i, label) in labels.enumerate() {
            let enabled = chain.overrides.get(label).map_or(true, |t| t.enabled);
            let marker = if *label == chain.fallback {
                "last resort".to_string()
            } else if !enabled {
                "disabled".to_string()
            } else {
                format!("{}", i + 1)
            };
            let description = builtin_source(asset_class, label)
                .map(|info| info.description)
                .unwrap_or("unknown source");
            println!("  {:<12} {:<18} {}", marker, label, description);
        }
        println!();
    }

    println!("Order and fallback are set under [sources.<class>] in the config file.");
    Ok(())
}
