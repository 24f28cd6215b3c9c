//! Single-writer executor around a [`Market`].
//!
//! One task owns the market and drains a request queue, so submissions from any number of
//! handles are applied strictly one after another and readers never observe a batch half
//! applied.

use std::panic::{self, AssertUnwindSafe};

use festival_api::v1::{Commands, SubmitResponse, Transaction};
use festival_types::primitives::{AccountId, Amount, TicketId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{LedgerError, Result};
use crate::market::{Market, MarketSnapshot};

const QUEUE_DEPTH: usize = 256;

type ReadJob = Box<dyn FnOnce(&Market) + Send>;

enum Request {
    Submit {
        commands: Commands,
        reply: oneshot::Sender<Result<SubmitResponse>>,
    },
    Read(ReadJob),
}

/// Cloneable access point to a running [`MarketService`].
#[derive(Debug, Clone)]
pub struct MarketHandle {
    sender: mpsc::Sender<Request>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Submit { commands, .. } => write!(f, "Submit({})", commands.command_id),
            Request::Read(_) => f.write_str("Read"),
        }
    }
}

impl MarketHandle {
    pub async fn submit(&self, commands: Commands) -> Result<SubmitResponse> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Request::Submit { commands, reply })
            .await
            .map_err(|_| LedgerError::ServiceUnavailable)?;
        response.await.map_err(|_| LedgerError::ServiceUnavailable)?
    }

    /// Runs `f` against the current committed state on the executor task.
    ///
    /// `f` blocks every other request while it runs. A panic inside `f` is contained: this
    /// read fails with [`LedgerError::ServiceUnavailable`] and the service keeps running.
    pub async fn read<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&Market) -> R + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let job: ReadJob = Box::new(move |market| {
            let _ = reply.send(f(market));
        });
        self.sender
            .send(Request::Read(job))
            .await
            .map_err(|_| LedgerError::ServiceUnavailable)?;
        response.await.map_err(|_| LedgerError::ServiceUnavailable)
    }

    pub async fn balance_of(&self, account: &AccountId) -> Result<Amount> {
        let account = account.clone();
        self.read(move |market| market.balance_of(&account)).await
    }

    pub async fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Result<Amount> {
        let (owner, spender) = (owner.clone(), spender.clone());
        self.read(move |market| market.allowance(&owner, &spender)).await
    }

    pub async fn owner_of(&self, ticket_id: TicketId) -> Result<AccountId> {
        self.read(move |market| market.owner_of(ticket_id)).await?
    }

    pub async fn ledger_end(&self) -> Result<u64> {
        self.read(|market| market.ledger_end()).await
    }

    pub async fn updates(
        &self,
        begin_exclusive: u64,
        end_inclusive: Option<u64>,
        parties: Vec<AccountId>,
    ) -> Result<Vec<Transaction>> {
        self.read(move |market| market.updates(begin_exclusive, end_inclusive, &parties))
            .await
    }

    pub async fn snapshot(&self) -> Result<MarketSnapshot> {
        self.read(|market| market.snapshot()).await
    }
}

/// Owns the task that serializes access to a market.
pub struct MarketService {
    handle: MarketHandle,
    task: JoinHandle<Market>,
}

impl MarketService {
    /// Spawns the executor on the current tokio runtime.
    pub fn spawn(market: Market) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_DEPTH);
        let task = tokio::spawn(run(market, receiver));
        MarketService {
            handle: MarketHandle { sender },
            task,
        }
    }

    pub fn handle(&self) -> MarketHandle {
        self.handle.clone()
    }

    /// Stops accepting requests once every handle is dropped and returns the final market.
    pub async fn shutdown(self) -> Result<Market> {
        let MarketService { handle, task } = self;
        drop(handle);
        task.await.map_err(|_| LedgerError::ServiceUnavailable)
    }

    /// Stops the executor immediately, discarding queued requests.
    pub fn abort(&self) {
        self.task.abort();
    }
}

async fn run(mut market: Market, mut receiver: mpsc::Receiver<Request>) -> Market {
    info!("Market service started at ledger end {}", market.ledger_end());
    while let Some(request) = receiver.recv().await {
        debug!("Processing {:?}", request);
        match request {
            Request::Submit { commands, reply } => {
                let _ = reply.send(market.submit(&commands));
            }
            Request::Read(job) => {
                if panic::catch_unwind(AssertUnwindSafe(|| job(&market))).is_err() {
                    error!("Read job panicked at ledger end {}", market.ledger_end());
                }
            }
        }
    }
    info!("Market service stopped at ledger end {}", market.ledger_end());
    market
}
