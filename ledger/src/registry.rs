//! Non-fungible ticket registry with primary issuance and capped secondary resale.
//!
//! The registry owns ticket holders, per-ticket approvals, operator approvals and the
//! issuance counter. Payments go through the [`CurrencyLedger`] passed in by the caller,
//! with the registry's own account acting as the spender of buyer allowances.

use std::collections::{BTreeMap, BTreeSet};

use festival_api::v1::{Event, SaleEvent, TicketEvent};
use festival_types::percent::Percent;
use festival_types::primitives::{AccountId, Amount, TicketId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::currency::CurrencyLedger;
use crate::error::{LedgerError, Result};

pub const DEFAULT_MAX_SUPPLY: u64 = 1000;

/// Parameters fixed when the registry is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub name: String,
    pub symbol: String,
    /// Account the registry spends buyer allowances as.
    pub address: AccountId,
    /// Receives primary proceeds and the royalty of every resale.
    pub organizer: AccountId,
    pub primary_price: Amount,
    pub max_supply: u64,
    /// Maximum resale markup over the primary price.
    pub markup: Percent,
    /// Organizer share of every resale.
    pub royalty: Percent,
}

impl RegistryConfig {
    pub fn new(address: AccountId, organizer: AccountId, primary_price: Amount) -> Self {
        RegistryConfig {
            name: "FestivalTicket".to_string(),
            symbol: "FTIX".to_string(),
            address,
            organizer,
            primary_price,
            max_supply: DEFAULT_MAX_SUPPLY,
            markup: Percent::TEN,
            royalty: Percent::TEN,
        }
    }
}

/// Settlement of one secondary sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resale {
    pub ticket_id: TicketId,
    pub seller: AccountId,
    pub organizer_cut: Amount,
    pub seller_proceeds: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRegistry {
    config: RegistryConfig,
    issued: u64,
    holders: BTreeMap<TicketId, AccountId>,
    approvals: BTreeMap<TicketId, AccountId>,
    operators: BTreeMap<AccountId, BTreeSet<AccountId>>,
}

impl TicketRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        TicketRegistry {
            config,
            issued: 0,
            holders: BTreeMap::new(),
            approvals: BTreeMap::new(),
            operators: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn address(&self) -> &AccountId {
        &self.config.address
    }

    pub fn organizer(&self) -> &AccountId {
        &self.config.organizer
    }

    pub fn primary_price(&self) -> Amount {
        self.config.primary_price
    }

    pub fn max_supply(&self) -> u64 {
        self.config.max_supply
    }

    pub fn tickets_issued(&self) -> u64 {
        self.issued
    }

    pub fn owner_of(&self, ticket_id: TicketId) -> Result<&AccountId> {
        self.holders
            .get(&ticket_id)
            .ok_or(LedgerError::NonexistentTicket(ticket_id))
    }

    /// Number of tickets held by `holder`.
    pub fn balance_of(&self, holder: &AccountId) -> u64 {
        self.holders.values().filter(|h| *h == holder).count() as u64
    }

    pub fn tickets_of<'a>(&'a self, holder: &'a AccountId) -> impl Iterator<Item = TicketId> + 'a {
        self.holders
            .iter()
            .filter(move |(_, h)| *h == holder)
            .map(|(ticket_id, _)| *ticket_id)
    }

    pub fn get_approved(&self, ticket_id: TicketId) -> Result<Option<&AccountId>> {
        self.owner_of(ticket_id)?;
        Ok(self.approvals.get(&ticket_id))
    }

    pub fn is_approved_for_all(&self, holder: &AccountId, operator: &AccountId) -> bool {
        self.operators
            .get(holder)
            .is_some_and(|operators| operators.contains(operator))
    }

    /// Highest accepted resale offer: the primary price plus the markup. Independent of
    /// earlier resale prices.
    pub fn resale_cap(&self) -> Result<Amount> {
        let markup = self
            .config
            .markup
            .of(self.config.primary_price)
            .ok_or(LedgerError::Overflow)?;
        self.config
            .primary_price
            .checked_add(markup)
            .ok_or(LedgerError::Overflow)
    }

    /// Holder, per-ticket approved account, or operator of the holder.
    pub fn is_authorized(&self, caller: &AccountId, ticket_id: TicketId) -> Result<bool> {
        let holder = self.owner_of(ticket_id)?;
        Ok(holder == caller
            || self.approvals.get(&ticket_id) == Some(caller)
            || self.is_approved_for_all(holder, caller))
    }

    /// Issues the next ticket to `buyer` against the primary price, paid to the organizer
    /// out of the buyer's allowance to the registry.
    pub fn buy_ticket_from_organizer(
        &mut self,
        currency: &mut CurrencyLedger,
        buyer: &AccountId,
    ) -> Result<(TicketId, Vec<Event>)> {
        if self.issued >= self.config.max_supply {
            return Err(LedgerError::SupplyExhausted {
                max_supply: self.config.max_supply,
            });
        }
        let ticket_id = TicketId::after(self.issued).ok_or(LedgerError::Overflow)?;
        let price = self.config.primary_price;
        let payment =
            currency.transfer_from(&self.config.address, buyer, &self.config.organizer, price)?;

        self.issued += 1;
        self.holders.insert(ticket_id, buyer.clone());
        info!("Issued ticket {} to {} for {}", ticket_id, buyer, price);

        Ok((
            ticket_id,
            vec![
                payment.into(),
                TicketEvent::Transfer {
                    from: None,
                    to: buyer.clone(),
                    ticket_id,
                }
                .into(),
                SaleEvent::Primary {
                    ticket_id,
                    buyer: buyer.clone(),
                    price,
                }
                .into(),
            ],
        ))
    }

    /// Sets the single account allowed to take `ticket_id` next.
    pub fn approve(
        &mut self,
        caller: &AccountId,
        ticket_id: TicketId,
        spender: &AccountId,
    ) -> Result<TicketEvent> {
        let holder = self.owner_of(ticket_id)?.clone();
        if &holder == spender {
            return Err(LedgerError::ApprovalToCurrentOwner(ticket_id));
        }
        if !self.is_authorized(caller, ticket_id)? {
            return Err(LedgerError::NotAuthorized {
                caller: caller.clone(),
                ticket_id,
            });
        }
        self.approvals.insert(ticket_id, spender.clone());
        Ok(TicketEvent::Approval {
            holder,
            approved: spender.clone(),
            ticket_id,
        })
    }

    pub fn set_approval_for_all(
        &mut self,
        holder: &AccountId,
        operator: &AccountId,
        approved: bool,
    ) -> Result<TicketEvent> {
        if holder == operator {
            return Err(LedgerError::ApproveToCaller(holder.clone()));
        }
        if approved {
            self.operators
                .entry(holder.clone())
                .or_default()
                .insert(operator.clone());
        } else if let Some(operators) = self.operators.get_mut(holder) {
            operators.remove(operator);
            if operators.is_empty() {
                self.operators.remove(holder);
            }
        }
        Ok(TicketEvent::ApprovalForAll {
            holder: holder.clone(),
            operator: operator.clone(),
            approved,
        })
    }

    /// Moves a ticket without payment.
    pub fn transfer_ticket(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        ticket_id: TicketId,
    ) -> Result<TicketEvent> {
        if !self.is_authorized(caller, ticket_id)? {
            return Err(LedgerError::NotAuthorized {
                caller: caller.clone(),
                ticket_id,
            });
        }
        if self.owner_of(ticket_id)? != from {
            return Err(LedgerError::IncorrectOwner {
                ticket_id,
                claimed: from.clone(),
            });
        }
        Ok(self.move_ticket(ticket_id, from, to))
    }

    /// Sells `ticket_id` from its holder to `buyer` at `offered_price`.
    ///
    /// The offer may not exceed [`resale_cap`](Self::resale_cap). The royalty share goes
    /// to the organizer and the rest to the holder, both drawn from the buyer's allowance
    /// to the registry. Nothing is moved unless every check passes.
    pub fn buy_from_previous_owner(
        &mut self,
        currency: &mut CurrencyLedger,
        buyer: &AccountId,
        ticket_id: TicketId,
        offered_price: Amount,
    ) -> Result<(Resale, Vec<Event>)> {
        let seller = self.owner_of(ticket_id)?.clone();

        let cap = self.resale_cap()?;
        if offered_price > cap {
            return Err(LedgerError::PriceTooHigh {
                offered: offered_price,
                cap,
            });
        }

        let approved = currency.allowance(buyer, &self.config.address);
        if approved < offered_price {
            return Err(LedgerError::NotEnoughApproved {
                buyer: buyer.clone(),
                approved,
                offered: offered_price,
            });
        }

        if !self.is_authorized(buyer, ticket_id)? {
            return Err(LedgerError::NotAuthorized {
                caller: buyer.clone(),
                ticket_id,
            });
        }

        let balance = currency.balance_of(buyer);
        if balance < offered_price {
            return Err(LedgerError::InsufficientBalance {
                account: buyer.clone(),
                balance,
                needed: offered_price,
            });
        }

        let organizer_cut = self.config.royalty.of(offered_price).ok_or(LedgerError::Overflow)?;
        let seller_proceeds = offered_price
            .checked_sub(organizer_cut)
            .ok_or(LedgerError::Overflow)?;

        let address = self.config.address.clone();
        let royalty_leg =
            currency.transfer_from(&address, buyer, &self.config.organizer, organizer_cut)?;
        let seller_leg = currency.transfer_from(&address, buyer, &seller, seller_proceeds)?;
        let ticket_leg = self.move_ticket(ticket_id, &seller, buyer);

        debug!(
            "Resold ticket {} from {} to {}: cut {}, proceeds {}",
            ticket_id, seller, buyer, organizer_cut, seller_proceeds
        );

        let events = vec![
            royalty_leg.into(),
            seller_leg.into(),
            ticket_leg.into(),
            SaleEvent::Secondary {
                ticket_id,
                seller: seller.clone(),
                buyer: buyer.clone(),
                price: offered_price,
                organizer_cut,
                seller_proceeds,
            }
            .into(),
        ];
        Ok((
            Resale {
                ticket_id,
                seller,
                organizer_cut,
                seller_proceeds,
            },
            events,
        ))
    }

    fn move_ticket(
        &mut self,
        ticket_id: TicketId,
        from: &AccountId,
        to: &AccountId,
    ) -> TicketEvent {
        self.approvals.remove(&ticket_id);
        self.holders.insert(ticket_id, to.clone());
        TicketEvent::Transfer {
            from: Some(from.clone()),
            to: to.clone(),
            ticket_id,
        }
    }
}
