use festival_types::primitives::{AccountId, Amount, TicketId};
use serde::{Deserialize, Serialize};

/// A batch of commands submitted by one party. The batch commits or fails as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commands {
    pub command_id: String,
    pub act_as: AccountId,
    pub commands: Vec<Command>,
}

impl Commands {
    pub fn new(act_as: AccountId, commands: Vec<Command>) -> Self {
        Commands {
            command_id: format!("command-{}", uuid::Uuid::new_v4()),
            act_as,
            commands,
        }
    }

    pub fn single(act_as: AccountId, command: Command) -> Self {
        Commands::new(act_as, vec![command])
    }
}

/// State-changing operations. The acting party of the surrounding [`Commands`] is the
/// caller: the owner for `Approve`, the payer for `Transfer`, the spender for
/// `TransferFrom` and the buyer for both purchases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Mint {
        account: AccountId,
        amount: Amount,
    },
    Approve {
        spender: AccountId,
        amount: Amount,
    },
    Transfer {
        to: AccountId,
        amount: Amount,
    },
    TransferFrom {
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
    BuyTicketFromOrganizer,
    ApproveTicket {
        ticket_id: TicketId,
        spender: AccountId,
    },
    SetApprovalForAll {
        operator: AccountId,
        approved: bool,
    },
    TransferTicket {
        from: AccountId,
        to: AccountId,
        ticket_id: TicketId,
    },
    BuyFromPreviousOwner {
        ticket_id: TicketId,
        offered_price: Amount,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Mint { .. } => "mint",
            Command::Approve { .. } => "approve",
            Command::Transfer { .. } => "transfer",
            Command::TransferFrom { .. } => "transferFrom",
            Command::BuyTicketFromOrganizer => "buyTicketFromOrganizer",
            Command::ApproveTicket { .. } => "approveTicket",
            Command::SetApprovalForAll { .. } => "setApprovalForAll",
            Command::TransferTicket { .. } => "transferTicket",
            Command::BuyFromPreviousOwner { .. } => "buyFromPreviousOwner",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandResult {
    Done,
    TicketIssued {
        ticket_id: TicketId,
    },
    TicketResold {
        ticket_id: TicketId,
        organizer_cut: Amount,
        seller_proceeds: Amount,
    },
}
