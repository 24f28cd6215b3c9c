use chrono::Utc;
use festival_api::v1::{Event, Transaction};
use festival_types::primitives::AccountId;
use serde::{Deserialize, Serialize};

/// Append-only log of committed transactions. Offsets start at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    transactions: Vec<Transaction>,
}

impl Journal {
    pub fn new() -> Self {
        Journal::default()
    }

    /// Offset of the last committed transaction, 0 for an empty journal.
    pub fn ledger_end(&self) -> u64 {
        self.transactions.len() as u64
    }

    pub fn append(
        &mut self,
        command_id: String,
        act_as: AccountId,
        events: Vec<Event>,
    ) -> &Transaction {
        let offset = self.ledger_end() + 1;
        self.transactions.push(Transaction {
            offset,
            command_id,
            act_as,
            effective_at: Utc::now(),
            events,
        });
        &self.transactions[self.transactions.len() - 1]
    }

    pub fn get(&self, offset: u64) -> Option<&Transaction> {
        let index = offset.checked_sub(1)?;
        self.transactions.get(usize::try_from(index).ok()?)
    }

    /// Transactions with `begin_exclusive < offset <= end_inclusive` involving any of
    /// `parties`. An empty party list matches everything.
    pub fn updates(
        &self,
        begin_exclusive: u64,
        end_inclusive: Option<u64>,
        parties: &[AccountId],
    ) -> Vec<Transaction> {
        let end = end_inclusive
            .unwrap_or(u64::MAX)
            .min(self.ledger_end());
        self.transactions
            .iter()
            .skip(usize::try_from(begin_exclusive).unwrap_or(usize::MAX))
            .take_while(|tx| tx.offset <= end)
            .filter(|tx| tx.involves_any(parties))
            .cloned()
            .collect()
    }
}
