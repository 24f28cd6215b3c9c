use anyhow::{Context, Result};
use festival_ledger::{Market, MarketSnapshot};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn load_market<P: AsRef<Path>>(path: P) -> Result<Market> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .with_context(|| {
            format!(
                "failed to read market state '{}', run `festival deploy` first",
                path.display()
            )
        })?;
    let snapshot: MarketSnapshot = serde_json::from_str(&s)
        .with_context(|| format!("failed to parse market state '{}'", path.display()))?;
    Ok(Market::restore(snapshot))
}

/// Writes through a temporary file so an interrupted save never truncates the state.
pub fn save_market<P: AsRef<Path>>(path: P, market: &Market) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create state directory '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&market.snapshot())
        .context("failed to serialize market state")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("failed to write '{}'", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to replace '{}'", path.display()))?;
    info!("Saved market state at ledger end {} to {}", market.ledger_end(), path.display());
    Ok(())
}
