use anyhow::Result;
use client::submit_commands::submit_commands;
use festival_api::v1::{Command, Commands};
use festival_ledger::MarketHandle;
use festival_types::primitives::{AccountId, Amount};

pub async fn mint(handle: &MarketHandle, account: &AccountId, amount: u128) -> Result<()> {
    let commands = Commands::single(
        account.clone(),
        Command::Mint {
            account: account.clone(),
            amount: Amount::new(amount),
        },
    );
    submit_commands(handle, commands).await?;
    Ok(())
}

pub async fn approve(
    handle: &MarketHandle,
    owner: &AccountId,
    spender: &AccountId,
    amount: u128,
) -> Result<()> {
    let commands = Commands::single(
        owner.clone(),
        Command::Approve {
            spender: spender.clone(),
            amount: Amount::new(amount),
        },
    );
    submit_commands(handle, commands).await?;
    Ok(())
}

pub async fn transfer(
    handle: &MarketHandle,
    from: &AccountId,
    to: &AccountId,
    amount: u128,
) -> Result<()> {
    let commands = Commands::single(
        from.clone(),
        Command::Transfer {
            to: to.clone(),
            amount: Amount::new(amount),
        },
    );
    submit_commands(handle, commands).await?;
    Ok(())
}

pub async fn transfer_from(
    handle: &MarketHandle,
    spender: &AccountId,
    from: &AccountId,
    to: &AccountId,
    amount: u128,
) -> Result<()> {
    let commands = Commands::single(
        spender.clone(),
        Command::TransferFrom {
            from: from.clone(),
            to: to.clone(),
            amount: Amount::new(amount),
        },
    );
    submit_commands(handle, commands).await?;
    Ok(())
}

pub async fn balance_of(handle: &MarketHandle, account: &AccountId) -> Result<u128> {
    Ok(handle.balance_of(account).await?.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::testutils::{start_market, test_market_config};
    use festival_ledger::LedgerError;

    #[tokio::test]
    async fn test_mint_and_transfer() -> Result<()> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let market = start_market(test_market_config()).await?;
        let alice = AccountId::new("Alice");
        let bob = AccountId::new("Bob");

        mint(&market.handle, &alice, 1_000).await?;
        transfer(&market.handle, &alice, &bob, 250).await?;

        assert_eq!(balance_of(&market.handle, &alice).await?, 750);
        assert_eq!(balance_of(&market.handle, &bob).await?, 250);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_more_than_balance_fails() -> Result<()> {
        let market = start_market(test_market_config()).await?;
        let alice = AccountId::new("Alice");
        let bob = AccountId::new("Bob");
        mint(&market.handle, &alice, 10).await?;

        let err = transfer(&market.handle, &alice, &bob, 11).await.unwrap_err();
        assert_eq!(err.to_string(), "insufficient balance");
        assert_eq!(balance_of(&market.handle, &alice).await?, 10);
        assert_eq!(balance_of(&market.handle, &bob).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_from_spends_allowance() -> Result<()> {
        let market = start_market(test_market_config()).await?;
        let alice = AccountId::new("Alice");
        let bob = AccountId::new("Bob");
        let carol = AccountId::new("Carol");
        mint(&market.handle, &alice, 500).await?;
        approve(&market.handle, &alice, &bob, 200).await?;

        transfer_from(&market.handle, &bob, &alice, &carol, 150).await?;
        assert_eq!(balance_of(&market.handle, &carol).await?, 150);
        assert_eq!(market.handle.allowance(&alice, &bob).await?, Amount::new(50));

        let err = transfer_from(&market.handle, &bob, &alice, &carol, 51).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<LedgerError>().map(|e| e.to_string()).as_deref(),
            Some("insufficient allowance")
        );
        assert_eq!(balance_of(&market.handle, &alice).await?, 350);
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_overwrites_previous_allowance() -> Result<()> {
        let market = start_market(test_market_config()).await?;
        let alice = AccountId::new("Alice");
        let bob = AccountId::new("Bob");

        approve(&market.handle, &alice, &bob, 300).await?;
        approve(&market.handle, &alice, &bob, 20).await?;
        assert_eq!(market.handle.allowance(&alice, &bob).await?, Amount::new(20));

        approve(&market.handle, &alice, &bob, 0).await?;
        assert_eq!(market.handle.allowance(&alice, &bob).await?, Amount::ZERO);
        Ok(())
    }
}
