use anyhow::Result;
use festival_ledger::MarketHandle;

pub async fn get_ledger_end(handle: &MarketHandle) -> Result<u64> {
    Ok(handle.ledger_end().await?)
}
