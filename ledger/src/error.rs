use festival_types::primitives::{AccountId, Amount, TicketId};

/// Rejections raised by the currency ledger, the ticket registry and the market service.
///
/// The `Display` text of each variant is the user-visible message; the fields carry the
/// detail that ends up in logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient balance")]
    InsufficientBalance {
        account: AccountId,
        balance: Amount,
        needed: Amount,
    },
    #[error("insufficient allowance")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        allowance: Amount,
        needed: Amount,
    },
    #[error("arithmetic overflow")]
    Overflow,
    #[error("Maximum tickets reached")]
    SupplyExhausted { max_supply: u64 },
    #[error("Price too high")]
    PriceTooHigh { offered: Amount, cap: Amount },
    #[error("Not enough tokens approved for transaction")]
    NotEnoughApproved {
        buyer: AccountId,
        approved: Amount,
        offered: Amount,
    },
    #[error("invalid ticket id {0}")]
    NonexistentTicket(TicketId),
    #[error("caller is not ticket owner or approved")]
    NotAuthorized { caller: AccountId, ticket_id: TicketId },
    #[error("transfer from incorrect owner")]
    IncorrectOwner { ticket_id: TicketId, claimed: AccountId },
    #[error("approval to current owner")]
    ApprovalToCurrentOwner(TicketId),
    #[error("approve to caller")]
    ApproveToCaller(AccountId),
    #[error("empty command batch")]
    EmptyCommands,
    #[error("{command} produced an unexpected result")]
    UnexpectedResult { command: &'static str },
    #[error("market service is not running")]
    ServiceUnavailable,
}

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller-supplied argument violates a precondition.
    Validation,
    /// Balance or allowance too low.
    Funds,
    /// Ticket supply is exhausted. Permanent for the registry instance.
    Capacity,
    /// The caller may not act on the ticket.
    Authorization,
    Unavailable,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InsufficientBalance { .. }
            | LedgerError::InsufficientAllowance { .. }
            | LedgerError::NotEnoughApproved { .. } => ErrorKind::Funds,
            LedgerError::SupplyExhausted { .. } => ErrorKind::Capacity,
            LedgerError::NotAuthorized { .. } => ErrorKind::Authorization,
            LedgerError::ServiceUnavailable | LedgerError::UnexpectedResult { .. } => {
                ErrorKind::Unavailable
            }
            LedgerError::Overflow
            | LedgerError::PriceTooHigh { .. }
            | LedgerError::NonexistentTicket(_)
            | LedgerError::IncorrectOwner { .. }
            | LedgerError::ApprovalToCurrentOwner(_)
            | LedgerError::ApproveToCaller(_)
            | LedgerError::EmptyCommands => ErrorKind::Validation,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
