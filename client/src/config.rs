use anyhow::{Context, Result};
use festival_ledger::{MarketConfig, RegistryConfig};
use festival_types::percent::Percent;
use festival_types::primitives::{AccountId, Amount};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub market: MarketSection,
    #[serde(default)]
    pub currency: CurrencySection,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct MarketSection {
    pub organizer: String,
    /// Account the registry spends buyer allowances as
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(default = "default_ticket_name")]
    pub name: String,
    #[serde(default = "default_ticket_symbol")]
    pub symbol: String,
    #[serde(default = "default_primary_price")]
    pub primary_price: u64,
    #[serde(default = "default_max_supply")]
    pub max_supply: u64,
    #[serde(default = "default_percent")]
    pub markup_percent: u8,
    #[serde(default = "default_percent")]
    pub royalty_percent: u8,
}

fn default_registry() -> String {
    "FestivalTicket".to_string()
}

fn default_ticket_name() -> String {
    "FestivalTicket".to_string()
}

fn default_ticket_symbol() -> String {
    "FTIX".to_string()
}

fn default_primary_price() -> u64 {
    100
}

fn default_max_supply() -> u64 {
    festival_ledger::registry::DEFAULT_MAX_SUPPLY
}

fn default_percent() -> u8 {
    10
}

#[derive(Debug, Deserialize)]
pub struct CurrencySection {
    #[serde(default = "default_currency_name")]
    pub name: String,
    #[serde(default = "default_currency_symbol")]
    pub symbol: String,
}

impl Default for CurrencySection {
    fn default() -> Self {
        CurrencySection {
            name: default_currency_name(),
            symbol: default_currency_symbol(),
        }
    }
}

fn default_currency_name() -> String {
    "FestivalCurrency".to_string()
}

fn default_currency_symbol() -> String {
    "FEST".to_string()
}

#[derive(Debug, Deserialize)]
pub struct StateConfig {
    /// Snapshot file the CLI loads before and saves after every command
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        StateConfig { path: default_state_path() }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("state").join("festival.json")
}

#[derive(Debug, Default, Deserialize)]
pub struct DeployConfig {
    /// Currency minted to the organizer when the market is deployed
    #[serde(default)]
    pub initial_supply: u64,
}

impl Config {
    pub fn market_config(&self) -> Result<MarketConfig> {
        let mut registry = RegistryConfig::new(
            AccountId::new(&self.market.registry),
            AccountId::new(&self.market.organizer),
            Amount::from(self.market.primary_price),
        );
        registry.name = self.market.name.clone();
        registry.symbol = self.market.symbol.clone();
        registry.max_supply = self.market.max_supply;
        registry.markup =
            Percent::new(self.market.markup_percent).context("invalid market.markup_percent")?;
        registry.royalty =
            Percent::new(self.market.royalty_percent).context("invalid market.royalty_percent")?;
        Ok(MarketConfig {
            currency_name: self.currency.name.clone(),
            currency_symbol: self.currency.symbol.clone(),
            registry,
        })
    }
}

pub fn read_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let s = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file '{}'", path.as_ref().display()))?;
    let cfg: Config = toml::from_str(&s).context("failed to parse TOML config")?;
    Ok(cfg)
}

pub fn read_config_from_toml() -> Result<Config> {
    // Lookup order:
    // 1. ./config/config.toml
    // 2. CARGO_MANIFEST_DIR/config/config.toml (for cargo run)

    let cwd_config = PathBuf::from("config").join("config.toml");
    if cwd_config.exists() {
        return read_config(&cwd_config);
    }

    if let Ok(crate_root) = std::env::var("CARGO_MANIFEST_DIR") {
        let cargo_config = PathBuf::from(&crate_root)
            .join("config")
            .join("config.toml");
        if cargo_config.exists() {
            return read_config(&cargo_config);
        }
    }

    anyhow::bail!(
        "Could not find config.toml in ./config/config.toml or \
         CARGO_MANIFEST_DIR/config/config.toml. Use --config-file to specify a path."
    )
}
