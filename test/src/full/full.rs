//! End-to-end festival flows across the currency ledger, the ticket registry and the journal.

use anyhow::Result;
use client::submit_commands::submit_commands;
use festival_api::v1::{Command, CommandResult, Commands, Event, SaleEvent, Transaction};
use festival_ledger::MarketHandle;
use festival_types::primitives::{AccountId, Amount, TicketId};
use tracing::info;

/// Funds `buyer`, approves the registry and buys one ticket in a single transaction.
pub async fn fund_and_buy(
    handle: &MarketHandle,
    registry: &AccountId,
    buyer: &AccountId,
    funds: u128,
    price: u128,
) -> Result<TicketId> {
    let commands = Commands::new(
        buyer.clone(),
        vec![
            Command::Mint {
                account: buyer.clone(),
                amount: Amount::new(funds),
            },
            Command::Approve {
                spender: registry.clone(),
                amount: Amount::new(price),
            },
            Command::BuyTicketFromOrganizer,
        ],
    );
    let results = submit_commands(handle, commands).await?;
    match results.last() {
        Some(CommandResult::TicketIssued { ticket_id }) => Ok(*ticket_id),
        other => anyhow::bail!("No ticket issued in fund_and_buy result: {:?}", other),
    }
}

/// Secondary sales recorded in `transactions`, in journal order.
pub fn secondary_sales(transactions: &[Transaction]) -> Vec<&SaleEvent> {
    transactions
        .iter()
        .flat_map(|tx| tx.events.iter())
        .filter_map(|event| match event {
            Event::Sale(sale @ SaleEvent::Secondary { .. }) => Some(sale),
            _ => None,
        })
        .collect()
}

pub async fn log_updates(handle: &MarketHandle, parties: Vec<AccountId>) -> Result<usize> {
    let updates = handle.updates(0, None, parties).await?;
    for tx in &updates {
        info!("Offset {} ({}): {} event(s)", tx.offset, tx.command_id, tx.events.len());
    }
    Ok(updates.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::festival_currency::{approve, balance_of};
    use crate::ticket::festival_ticket::{approve_ticket, buy_from_previous_owner, owner_of};
    use client::snapshot::{load_market, save_market};
    use client::stream_updates::stream_updates;
    use client::testutils::{ORGANIZER, PRIMARY_PRICE, REGISTRY, start_market, test_market_config};
    use festival_ledger::{LedgerError, Market, MarketConfig, RegistryConfig};
    use proptest::prelude::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_full_festival_flow() -> Result<()> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let market = start_market(test_market_config()).await?;
        let organizer = AccountId::new(ORGANIZER);
        let registry = AccountId::new(REGISTRY);
        let alice = AccountId::new("Alice");
        let bob = AccountId::new("Bob");
        let carol = AccountId::new("Carol");

        let first = fund_and_buy(&market.handle, &registry, &alice, 1_000, PRIMARY_PRICE).await?;
        let second = fund_and_buy(&market.handle, &registry, &bob, 1_000, PRIMARY_PRICE).await?;
        assert_eq!((first, second), (TicketId::new(1), TicketId::new(2)));
        assert_eq!(balance_of(&market.handle, &organizer).await?, 2 * PRIMARY_PRICE);

        // Alice resells to Carol at the cap.
        submit_commands(
            &market.handle,
            Commands::single(
                carol.clone(),
                Command::Mint {
                    account: carol.clone(),
                    amount: Amount::new(500),
                },
            ),
        )
        .await?;
        approve(&market.handle, &carol, &registry, 110).await?;
        approve_ticket(&market.handle, &alice, first, &carol).await?;
        let (cut, proceeds) = buy_from_previous_owner(&market.handle, &carol, first, 110).await?;
        assert_eq!((cut, proceeds), (11, 99));
        assert_eq!(owner_of(&market.handle, 1).await?, carol);

        // Carol resells on to Bob; the cap stays anchored to the primary price.
        approve(&market.handle, &bob, &registry, 200).await?;
        approve_ticket(&market.handle, &carol, first, &bob).await?;
        let err = buy_from_previous_owner(&market.handle, &bob, first, 111).await.unwrap_err();
        assert_eq!(err.to_string(), "Price too high");
        buy_from_previous_owner(&market.handle, &bob, first, 100).await?;
        assert_eq!(owner_of(&market.handle, 1).await?, bob);

        assert_eq!(balance_of(&market.handle, &organizer).await?, 2 * PRIMARY_PRICE + 11 + 10);
        assert_eq!(balance_of(&market.handle, &alice).await?, 1_000 - PRIMARY_PRICE + 99);
        assert_eq!(balance_of(&market.handle, &carol).await?, 500 - 110 + 90);
        assert_eq!(balance_of(&market.handle, &bob).await?, 1_000 - PRIMARY_PRICE - 100);

        let all = log_updates(&market.handle, vec![]).await?;
        let carol_only = log_updates(&market.handle, vec![carol.clone()]).await?;
        assert!(carol_only < all);

        let stream = stream_updates(&market.handle, 0, None, vec![bob.clone()]).await?;
        let bob_updates: Vec<Transaction> = stream.collect().await;
        let sales = secondary_sales(&bob_updates);
        assert_eq!(sales.len(), 1);
        assert!(matches!(
            sales[0],
            SaleEvent::Secondary { seller, buyer, .. } if *seller == carol && *buyer == bob
        ));

        let closed = market.close().await?;
        let total: u128 = closed.currency().balances().map(|(_, amount)| amount.value()).sum();
        assert_eq!(total, 2_500);
        assert_eq!(closed.currency().total_supply(), Amount::new(2_500));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_no_trace() -> Result<()> {
        let market = start_market(test_market_config()).await?;
        let registry = AccountId::new(REGISTRY);
        let dave = AccountId::new("Dave");
        let before = market.handle.ledger_end().await?;

        // Approves less than the primary price, so the purchase at the end of the batch fails.
        let err = fund_and_buy(&market.handle, &registry, &dave, 1_000, PRIMARY_PRICE - 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::InsufficientAllowance { .. })
        ));
        assert_eq!(market.handle.ledger_end().await?, before);
        assert_eq!(balance_of(&market.handle, &dave).await?, 0);
        assert_eq!(market.handle.allowance(&dave, &registry).await?, Amount::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_restores_market() -> Result<()> {
        let market = start_market(test_market_config()).await?;
        let registry = AccountId::new(REGISTRY);
        let erin = AccountId::new("Erin");
        fund_and_buy(&market.handle, &registry, &erin, 300, PRIMARY_PRICE).await?;
        let closed = market.close().await?;

        let dir = std::env::temp_dir().join(format!("festival-full-{}", std::process::id()));
        let path = dir.join("state.json");
        save_market(&path, &closed)?;
        let restored = load_market(&path)?;
        std::fs::remove_dir_all(&dir)?;

        assert_eq!(restored, closed);
        let mut restored = restored;
        restored.approve(&erin, &registry, Amount::new(PRIMARY_PRICE))?;
        assert_eq!(restored.buy_ticket_from_organizer(&erin)?, TicketId::new(2));
        Ok(())
    }

    #[derive(Debug, Clone)]
    enum Op {
        Mint(usize, u128),
        Approve(usize, u128),
        Transfer(usize, usize, u128),
        Buy(usize),
        ApproveTicket(u64, usize),
        Resell(usize, u64, u128),
    }

    const ACCOUNTS: [&str; 4] = ["TicketWizard", "Alice", "Bob", "Carol"];

    fn account(index: usize) -> AccountId {
        AccountId::new(ACCOUNTS[index % ACCOUNTS.len()])
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let who = 0..ACCOUNTS.len();
        prop_oneof![
            (who.clone(), 0..500u128).prop_map(|(a, n)| Op::Mint(a, n)),
            (who.clone(), 0..300u128).prop_map(|(a, n)| Op::Approve(a, n)),
            (who.clone(), who.clone(), 0..300u128).prop_map(|(a, b, n)| Op::Transfer(a, b, n)),
            who.clone().prop_map(Op::Buy),
            (1..7u64, who.clone()).prop_map(|(t, a)| Op::ApproveTicket(t, a)),
            (who, 1..7u64, 80..120u128).prop_map(|(a, t, p)| Op::Resell(a, t, p)),
        ]
    }

    fn apply(market: &mut Market, op: &Op) -> festival_ledger::error::Result<()> {
        let registry = market.registry().address().clone();
        match op {
            Op::Mint(a, n) => market.mint(&account(*a), Amount::new(*n)),
            Op::Approve(a, n) => market.approve(&account(*a), &registry, Amount::new(*n)),
            Op::Transfer(a, b, n) => market.transfer(&account(*a), &account(*b), Amount::new(*n)),
            Op::Buy(a) => market.buy_ticket_from_organizer(&account(*a)).map(|_| ()),
            Op::ApproveTicket(t, a) => {
                let ticket_id = TicketId::new(*t);
                let holder = market.owner_of(ticket_id).unwrap_or_else(|_| account(0));
                market.approve_ticket(&holder, ticket_id, &account(*a))
            }
            Op::Resell(a, t, p) => market
                .buy_from_previous_owner(&account(*a), TicketId::new(*t), Amount::new(*p))
                .map(|_| ()),
        }
    }

    proptest! {
        #[test]
        fn random_sessions_conserve_currency_and_tickets(
            ops in proptest::collection::vec(op_strategy(), 1..60)
        ) {
            let mut config = RegistryConfig::new(
                AccountId::new(REGISTRY),
                account(0),
                Amount::new(PRIMARY_PRICE),
            );
            config.max_supply = 5;
            let mut market = Market::new(MarketConfig::new(config));

            for op in &ops {
                let before = market.clone();
                let result = apply(&mut market, op);
                if result.is_err() {
                    prop_assert_eq!(&market, &before, "rejected {:?} changed state", op);
                }

                let total: u128 =
                    market.currency().balances().map(|(_, amount)| amount.value()).sum();
                prop_assert_eq!(Amount::new(total), market.currency().total_supply());

                let registry = market.registry();
                prop_assert!(registry.tickets_issued() <= registry.max_supply());
                let held: u64 = (0..ACCOUNTS.len()).map(|i| registry.balance_of(&account(i))).sum();
                prop_assert_eq!(held, registry.tickets_issued());
            }
        }
    }
}
