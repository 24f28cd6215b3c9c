use anyhow::Result;
use festival_ledger::{Market, MarketConfig, MarketHandle, MarketService, RegistryConfig};
use festival_types::primitives::{AccountId, Amount};
use tracing::info;

pub const ORGANIZER: &str = "TicketWizard";
pub const REGISTRY: &str = "FestivalTicket";
pub const PRIMARY_PRICE: u128 = 100;

/// Market with the organizer, registry account and primary price used throughout the tests.
pub fn test_market_config() -> MarketConfig {
    MarketConfig::new(RegistryConfig::new(
        AccountId::new(REGISTRY),
        AccountId::new(ORGANIZER),
        Amount::new(PRIMARY_PRICE),
    ))
}

/// Starts a market service in the background.
/// The service is stopped when the returned guard is dropped.
pub async fn start_market(config: MarketConfig) -> Result<MarketGuard> {
    let service = MarketService::spawn(Market::new(config));
    let handle = service.handle();
    info!("Market service is ready at ledger end {}", handle.ledger_end().await?);
    Ok(MarketGuard {
        service: Some(service),
        handle,
    })
}

pub struct MarketGuard {
    service: Option<MarketService>,
    pub handle: MarketHandle,
}

impl MarketGuard {
    /// Stops the service and hands back the final market state. Waits for every clone of
    /// `handle` to be dropped.
    pub async fn close(mut self) -> Result<Market> {
        let service = self
            .service
            .take()
            .ok_or_else(|| anyhow::anyhow!("market service already closed"))?;
        drop(self);
        Ok(service.shutdown().await?)
    }
}

impl Drop for MarketGuard {
    fn drop(&mut self) {
        if let Some(service) = &self.service {
            service.abort();
        }
    }
}
