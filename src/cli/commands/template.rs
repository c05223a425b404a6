//! Print the default configuration.

use anyhow::{Context, Result};
use finalert_config::config_template;

pub async fn run() -> Result<()> {
    let template = config_template().context("Failed to render configuration template")?;
    print!("{}", template);
    Ok(())
}
