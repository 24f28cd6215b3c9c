//! The transactional market: currency ledger, ticket registry and journal behind a single
//! commit boundary.
//!
//! Every [`Commands`] batch runs against a staged copy of the ledger state. The copy
//! replaces the live state only after all commands succeeded, so a rejected batch leaves
//! balances, allowances, holders and the issuance counter exactly as they were.

use festival_api::v1::{Command, CommandResult, Commands, Event, SubmitResponse, Transaction};
use festival_types::primitives::{AccountId, Amount, TicketId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::currency::CurrencyLedger;
use crate::error::{LedgerError, Result};
use crate::journal::Journal;
use crate::registry::{RegistryConfig, TicketRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub currency_name: String,
    pub currency_symbol: String,
    pub registry: RegistryConfig,
}

impl MarketConfig {
    pub fn new(registry: RegistryConfig) -> Self {
        MarketConfig {
            currency_name: "FestivalCurrency".to_string(),
            currency_symbol: "FEST".to_string(),
            registry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct LedgerState {
    currency: CurrencyLedger,
    registry: TicketRegistry,
}

impl LedgerState {
    fn apply(
        &mut self,
        act_as: &AccountId,
        command: &Command,
    ) -> Result<(CommandResult, Vec<Event>)> {
        let LedgerState { currency, registry } = self;
        match command {
            Command::Mint { account, amount } => {
                let event = currency.mint(account, *amount)?;
                Ok((CommandResult::Done, vec![event.into()]))
            }
            Command::Approve { spender, amount } => {
                let event = currency.approve(act_as, spender, *amount);
                Ok((CommandResult::Done, vec![event.into()]))
            }
            Command::Transfer { to, amount } => {
                let event = currency.transfer(act_as, to, *amount)?;
                Ok((CommandResult::Done, vec![event.into()]))
            }
            Command::TransferFrom { from, to, amount } => {
                let event = currency.transfer_from(act_as, from, to, *amount)?;
                Ok((CommandResult::Done, vec![event.into()]))
            }
            Command::BuyTicketFromOrganizer => {
                let (ticket_id, events) = registry.buy_ticket_from_organizer(currency, act_as)?;
                Ok((CommandResult::TicketIssued { ticket_id }, events))
            }
            Command::ApproveTicket { ticket_id, spender } => {
                let event = registry.approve(act_as, *ticket_id, spender)?;
                Ok((CommandResult::Done, vec![event.into()]))
            }
            Command::SetApprovalForAll { operator, approved } => {
                let event = registry.set_approval_for_all(act_as, operator, *approved)?;
                Ok((CommandResult::Done, vec![event.into()]))
            }
            Command::TransferTicket { from, to, ticket_id } => {
                let event = registry.transfer_ticket(act_as, from, to, *ticket_id)?;
                Ok((CommandResult::Done, vec![event.into()]))
            }
            Command::BuyFromPreviousOwner { ticket_id, offered_price } => {
                let (resale, events) =
                    registry.buy_from_previous_owner(currency, act_as, *ticket_id, *offered_price)?;
                Ok((
                    CommandResult::TicketResold {
                        ticket_id: resale.ticket_id,
                        organizer_cut: resale.organizer_cut,
                        seller_proceeds: resale.seller_proceeds,
                    },
                    events,
                ))
            }
        }
    }
}

/// Serializable image of a whole market, journal included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    state: LedgerState,
    journal: Journal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    state: LedgerState,
    journal: Journal,
}

impl Market {
    pub fn new(config: MarketConfig) -> Self {
        info!(
            "Creating market: organizer={}, registry={}, primary_price={}, max_supply={}",
            config.registry.organizer,
            config.registry.address,
            config.registry.primary_price,
            config.registry.max_supply
        );
        Market {
            state: LedgerState {
                currency: CurrencyLedger::new(config.currency_name, config.currency_symbol),
                registry: TicketRegistry::new(config.registry),
            },
            journal: Journal::new(),
        }
    }

    /// Applies the batch atomically and records it in the journal.
    pub fn submit(&mut self, commands: &Commands) -> Result<SubmitResponse> {
        if commands.commands.is_empty() {
            return Err(LedgerError::EmptyCommands);
        }
        debug!(
            "Applying {} command(s) for {} ({})",
            commands.commands.len(),
            commands.act_as,
            commands.command_id
        );

        let mut staged = self.state.clone();
        let mut results = Vec::with_capacity(commands.commands.len());
        let mut events = Vec::new();
        for command in &commands.commands {
            match staged.apply(&commands.act_as, command) {
                Ok((result, command_events)) => {
                    results.push(result);
                    events.extend(command_events);
                }
                Err(e) => {
                    warn!(
                        "Rejected {} by {} ({}): {} [{:?}]",
                        command.name(),
                        commands.act_as,
                        commands.command_id,
                        e,
                        e
                    );
                    return Err(e);
                }
            }
        }

        self.state = staged;
        let transaction = self
            .journal
            .append(commands.command_id.clone(), commands.act_as.clone(), events)
            .clone();
        info!(
            "Committed {} at offset {} with {} event(s)",
            commands.command_id,
            transaction.offset,
            transaction.events.len()
        );
        Ok(SubmitResponse { transaction, results })
    }

    fn submit_single(&mut self, act_as: &AccountId, command: Command) -> Result<CommandResult> {
        let mut response = self.submit(&Commands::single(act_as.clone(), command))?;
        Ok(response.results.pop().unwrap_or(CommandResult::Done))
    }

    pub fn mint(&mut self, account: &AccountId, amount: Amount) -> Result<()> {
        self.submit_single(
            account,
            Command::Mint {
                account: account.clone(),
                amount,
            },
        )
        .map(|_| ())
    }

    pub fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.submit_single(
            owner,
            Command::Approve {
                spender: spender.clone(),
                amount,
            },
        )
        .map(|_| ())
    }

    pub fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        self.submit_single(from, Command::Transfer { to: to.clone(), amount })
            .map(|_| ())
    }

    pub fn transfer_from(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.submit_single(
            caller,
            Command::TransferFrom {
                from: from.clone(),
                to: to.clone(),
                amount,
            },
        )
        .map(|_| ())
    }

    pub fn buy_ticket_from_organizer(&mut self, buyer: &AccountId) -> Result<TicketId> {
        let command = Command::BuyTicketFromOrganizer;
        let name = command.name();
        match self.submit_single(buyer, command)? {
            CommandResult::TicketIssued { ticket_id } => Ok(ticket_id),
            _ => Err(LedgerError::UnexpectedResult { command: name }),
        }
    }

    pub fn approve_ticket(
        &mut self,
        caller: &AccountId,
        ticket_id: TicketId,
        spender: &AccountId,
    ) -> Result<()> {
        self.submit_single(
            caller,
            Command::ApproveTicket {
                ticket_id,
                spender: spender.clone(),
            },
        )
        .map(|_| ())
    }

    pub fn set_approval_for_all(
        &mut self,
        holder: &AccountId,
        operator: &AccountId,
        approved: bool,
    ) -> Result<()> {
        self.submit_single(
            holder,
            Command::SetApprovalForAll {
                operator: operator.clone(),
                approved,
            },
        )
        .map(|_| ())
    }

    pub fn transfer_ticket(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        ticket_id: TicketId,
    ) -> Result<()> {
        self.submit_single(
            caller,
            Command::TransferTicket {
                from: from.clone(),
                to: to.clone(),
                ticket_id,
            },
        )
        .map(|_| ())
    }

    /// Returns `(organizer_cut, seller_proceeds)`.
    pub fn buy_from_previous_owner(
        &mut self,
        buyer: &AccountId,
        ticket_id: TicketId,
        offered_price: Amount,
    ) -> Result<(Amount, Amount)> {
        let command = Command::BuyFromPreviousOwner { ticket_id, offered_price };
        let name = command.name();
        match self.submit_single(buyer, command)? {
            CommandResult::TicketResold {
                organizer_cut,
                seller_proceeds,
                ..
            } => Ok((organizer_cut, seller_proceeds)),
            _ => Err(LedgerError::UnexpectedResult { command: name }),
        }
    }

    pub fn currency(&self) -> &CurrencyLedger {
        &self.state.currency
    }

    pub fn registry(&self) -> &TicketRegistry {
        &self.state.registry
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.state.currency.balance_of(account)
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.state.currency.allowance(owner, spender)
    }

    pub fn owner_of(&self, ticket_id: TicketId) -> Result<AccountId> {
        self.state.registry.owner_of(ticket_id).cloned()
    }

    pub fn ledger_end(&self) -> u64 {
        self.journal.ledger_end()
    }

    pub fn updates(
        &self,
        begin_exclusive: u64,
        end_inclusive: Option<u64>,
        parties: &[AccountId],
    ) -> Vec<Transaction> {
        self.journal.updates(begin_exclusive, end_inclusive, parties)
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            state: self.state.clone(),
            journal: self.journal.clone(),
        }
    }

    pub fn restore(snapshot: MarketSnapshot) -> Self {
        Market {
            state: snapshot.state,
            journal: snapshot.journal,
        }
    }
}
