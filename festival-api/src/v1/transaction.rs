use chrono::{DateTime, Utc};
use festival_types::primitives::AccountId;
use serde::{Deserialize, Serialize};

use super::{CommandResult, Event};

/// A committed batch of commands as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub offset: u64,
    pub command_id: String,
    pub act_as: AccountId,
    pub effective_at: DateTime<Utc>,
    pub events: Vec<Event>,
}

impl Transaction {
    /// An empty filter matches every transaction.
    pub fn involves_any(&self, parties: &[AccountId]) -> bool {
        parties.is_empty()
            || parties.iter().any(|party| {
                &self.act_as == party || self.events.iter().any(|event| event.involves(party))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub transaction: Transaction,
    pub results: Vec<CommandResult>,
}
