mod commands;
mod events;
mod transaction;

pub use commands::{Command, CommandResult, Commands};
pub use events::{CurrencyEvent, Event, SaleEvent, TicketEvent};
pub use transaction::{SubmitResponse, Transaction};
