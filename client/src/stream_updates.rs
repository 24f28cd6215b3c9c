use anyhow::{Context, Result};
use festival_api::v1::Transaction;
use festival_ledger::MarketHandle;
use festival_types::primitives::AccountId;
use std::vec::IntoIter;
use tokio_stream::Iter;

/// Streams committed transactions involving `parties`, starting after `begin_exclusive`.
/// `end_inclusive` is optional; without it the stream ends at the current ledger end.
pub async fn stream_updates(
    handle: &MarketHandle,
    begin_exclusive: u64,
    end_inclusive: Option<u64>,
    parties: Vec<AccountId>,
) -> Result<Iter<IntoIter<Transaction>>> {
    let updates = handle
        .updates(begin_exclusive, end_inclusive, parties)
        .await
        .with_context(|| format!("Failed to get updates after offset {}", begin_exclusive))?;
    Ok(tokio_stream::iter(updates))
}
