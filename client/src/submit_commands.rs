use anyhow::Result;
use festival_api::v1::{CommandResult, Commands};
use festival_ledger::MarketHandle;
use tracing::{debug, error, info};

/// Submits a batch and waits for it to commit. Rejections surface as
/// [`festival_ledger::LedgerError`] inside the returned error.
pub async fn submit_commands(
    handle: &MarketHandle,
    commands: Commands,
) -> Result<Vec<CommandResult>> {
    info!(
        "Submitting commands at {}:{}: act_as={}, command_id={}, commands: {:?}",
        file!(),
        line!(),
        commands.act_as,
        commands.command_id,
        commands.commands
    );

    let response = match handle.submit(commands).await {
        Ok(response) => response,
        Err(e) => {
            error!("Error at {}:{} - {:?}", file!(), line!(), e);
            return Err(e.into());
        }
    };

    debug!("Transaction at {}:{}: {:#?}", file!(), line!(), response.transaction);
    info!(
        "Submit commands result at offset {}: {:?}",
        response.transaction.offset, response.results
    );
    Ok(response.results)
}
