use festival_types::primitives::{AccountId, Amount, TicketId};
use serde::{Deserialize, Serialize};

/// Effects recorded by a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Currency(CurrencyEvent),
    Ticket(TicketEvent),
    Sale(SaleEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyEvent {
    /// `from` is `None` for minted currency.
    Transfer {
        from: Option<AccountId>,
        to: AccountId,
        amount: Amount,
    },
    Approval {
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketEvent {
    /// `from` is `None` for a freshly issued ticket.
    Transfer {
        from: Option<AccountId>,
        to: AccountId,
        ticket_id: TicketId,
    },
    Approval {
        holder: AccountId,
        approved: AccountId,
        ticket_id: TicketId,
    },
    ApprovalForAll {
        holder: AccountId,
        operator: AccountId,
        approved: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleEvent {
    Primary {
        ticket_id: TicketId,
        buyer: AccountId,
        price: Amount,
    },
    Secondary {
        ticket_id: TicketId,
        seller: AccountId,
        buyer: AccountId,
        price: Amount,
        organizer_cut: Amount,
        seller_proceeds: Amount,
    },
}

impl Event {
    /// Whether `party` appears in this event in any role.
    pub fn involves(&self, party: &AccountId) -> bool {
        match self {
            Event::Currency(CurrencyEvent::Transfer { from, to, .. }) => {
                from.as_ref() == Some(party) || to == party
            }
            Event::Currency(CurrencyEvent::Approval { owner, spender, .. }) => {
                owner == party || spender == party
            }
            Event::Ticket(TicketEvent::Transfer { from, to, .. }) => {
                from.as_ref() == Some(party) || to == party
            }
            Event::Ticket(TicketEvent::Approval { holder, approved, .. }) => {
                holder == party || approved == party
            }
            Event::Ticket(TicketEvent::ApprovalForAll { holder, operator, .. }) => {
                holder == party || operator == party
            }
            Event::Sale(SaleEvent::Primary { buyer, .. }) => buyer == party,
            Event::Sale(SaleEvent::Secondary { seller, buyer, .. }) => {
                seller == party || buyer == party
            }
        }
    }
}

impl From<CurrencyEvent> for Event {
    fn from(event: CurrencyEvent) -> Self {
        Event::Currency(event)
    }
}

impl From<TicketEvent> for Event {
    fn from(event: TicketEvent) -> Self {
        Event::Ticket(event)
    }
}

impl From<SaleEvent> for Event {
    fn from(event: SaleEvent) -> Self {
        Event::Sale(event)
    }
}
