use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use futures_util::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use client::config::{Config, read_config, read_config_from_toml};
use client::ledger_end::get_ledger_end;
use client::snapshot::{load_market, save_market};
use client::stream_updates::stream_updates;
use client::submit_commands::submit_commands;
use festival_api::v1::{self, Command};
use festival_ledger::{Market, MarketService};
use festival_types::primitives::{AccountId, Amount, TicketId};

#[derive(Parser, Debug)]
#[command(name = "festival")]
struct Cli {
    /// Config file, defaults to ./config/config.toml
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the market state and mint the initial supply to the organizer
    Deploy {
        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },
    /// Mint currency to an account
    Mint {
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        amount: Amount,
    },
    /// Set the currency allowance of a spender
    Approve {
        #[arg(long)]
        owner: AccountId,
        #[arg(long)]
        spender: AccountId,
        #[arg(long)]
        amount: Amount,
    },
    Transfer {
        #[arg(long)]
        from: AccountId,
        #[arg(long)]
        to: AccountId,
        #[arg(long)]
        amount: Amount,
    },
    /// Move currency on behalf of its owner using an allowance
    TransferFrom {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        from: AccountId,
        #[arg(long)]
        to: AccountId,
        #[arg(long)]
        amount: Amount,
    },
    /// Buy a new ticket from the organizer at the primary price
    BuyTicket {
        #[arg(long)]
        buyer: AccountId,
    },
    /// Allow one account to take a ticket next
    ApproveTicket {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        ticket_id: TicketId,
        #[arg(long)]
        spender: AccountId,
    },
    SetApprovalForAll {
        #[arg(long)]
        holder: AccountId,
        #[arg(long)]
        operator: AccountId,
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        approved: bool,
    },
    /// Move a ticket without payment
    TransferTicket {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        from: AccountId,
        #[arg(long)]
        to: AccountId,
        #[arg(long)]
        ticket_id: TicketId,
    },
    /// Buy a ticket from its current holder
    Resell {
        #[arg(long)]
        buyer: AccountId,
        #[arg(long)]
        ticket_id: TicketId,
        #[arg(long)]
        price: Amount,
    },
    Balance {
        #[arg(long)]
        account: AccountId,
    },
    OwnerOf {
        #[arg(long)]
        ticket_id: TicketId,
    },
    LedgerEnd,
    /// Print committed transactions as JSON lines
    StreamUpdates {
        #[arg(long, default_value_t = 0)]
        begin_exclusive: u64,
        #[arg(long)]
        end_inclusive: Option<u64>,
        /// Only transactions involving these parties
        #[arg(long)]
        party: Vec<AccountId>,
    },
}

impl Commands {
    /// The acting party and ledger command for state-changing subcommands.
    fn to_ledger_command(&self) -> Option<(AccountId, Command)> {
        let command = match self {
            Commands::Mint { account, amount } => (
                account.clone(),
                Command::Mint { account: account.clone(), amount: *amount },
            ),
            Commands::Approve { owner, spender, amount } => (
                owner.clone(),
                Command::Approve { spender: spender.clone(), amount: *amount },
            ),
            Commands::Transfer { from, to, amount } => (
                from.clone(),
                Command::Transfer { to: to.clone(), amount: *amount },
            ),
            Commands::TransferFrom { caller, from, to, amount } => (
                caller.clone(),
                Command::TransferFrom { from: from.clone(), to: to.clone(), amount: *amount },
            ),
            Commands::BuyTicket { buyer } => (buyer.clone(), Command::BuyTicketFromOrganizer),
            Commands::ApproveTicket { caller, ticket_id, spender } => (
                caller.clone(),
                Command::ApproveTicket { ticket_id: *ticket_id, spender: spender.clone() },
            ),
            Commands::SetApprovalForAll { holder, operator, approved } => (
                holder.clone(),
                Command::SetApprovalForAll { operator: operator.clone(), approved: *approved },
            ),
            Commands::TransferTicket { caller, from, to, ticket_id } => (
                caller.clone(),
                Command::TransferTicket {
                    from: from.clone(),
                    to: to.clone(),
                    ticket_id: *ticket_id,
                },
            ),
            Commands::Resell { buyer, ticket_id, price } => (
                buyer.clone(),
                Command::BuyFromPreviousOwner { ticket_id: *ticket_id, offered_price: *price },
            ),
            Commands::Deploy { .. }
            | Commands::Balance { .. }
            | Commands::OwnerOf { .. }
            | Commands::LedgerEnd
            | Commands::StreamUpdates { .. } => return None,
        };
        Some(command)
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn deploy(config: &Config, force: bool) -> Result<()> {
    let state_path = &config.state.path;
    if state_path.exists() && !force {
        anyhow::bail!(
            "market state already exists at '{}', pass --force to replace it",
            state_path.display()
        );
    }
    let market_config = config.market_config()?;
    let organizer = market_config.registry.organizer.clone();
    info!("Deploying market with organizer {}", organizer);

    let mut market = Market::new(market_config);
    if config.deploy.initial_supply > 0 {
        market
            .mint(&organizer, Amount::from(config.deploy.initial_supply))
            .context("failed to mint initial supply")?;
    }
    info!(
        "{} deployed as {}, {} deployed as {}",
        market.currency().name(),
        market.currency().symbol(),
        market.registry().config().name,
        market.registry().address()
    );
    save_market(state_path, &market)
}

async fn submit(state_path: &Path, act_as: AccountId, command: Command) -> Result<()> {
    let service = MarketService::spawn(load_market(state_path)?);
    let outcome = submit_commands(&service.handle(), v1::Commands::single(act_as, command)).await;
    let market = service.shutdown().await?;
    let results = outcome?;
    info!("Results: {:?}", results);
    save_market(state_path, &market)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config_file {
        Some(path) => read_config(path)?,
        None => read_config_from_toml()?,
    };
    init_tracing(&config.logging.level);
    let state_path = config.state.path.clone();

    if let Some((act_as, command)) = cli.command.to_ledger_command() {
        return submit(&state_path, act_as, command).await;
    }

    match cli.command {
        Commands::Deploy { force } => deploy(&config, force).await,
        Commands::Balance { account } => {
            let market = load_market(&state_path)?;
            info!(
                "{} holds {} {} and {} ticket(s)",
                account,
                market.balance_of(&account),
                market.currency().symbol(),
                market.registry().balance_of(&account)
            );
            Ok(())
        }
        Commands::OwnerOf { ticket_id } => {
            let market = load_market(&state_path)?;
            let holder = market.owner_of(ticket_id)?;
            info!("Ticket {} is held by {}", ticket_id, holder);
            Ok(())
        }
        Commands::LedgerEnd => {
            let service = MarketService::spawn(load_market(&state_path)?);
            let ledger_end = get_ledger_end(&service.handle()).await?;
            info!("Ledger end: {}", ledger_end);
            Ok(())
        }
        Commands::StreamUpdates { begin_exclusive, end_inclusive, party } => {
            info!(
                "StreamUpdates called with begin_exclusive: {}, end_inclusive: {:?}, parties: {:?}",
                begin_exclusive, end_inclusive, party
            );
            let service = MarketService::spawn(load_market(&state_path)?);
            let mut stream =
                stream_updates(&service.handle(), begin_exclusive, end_inclusive, party).await?;
            while let Some(transaction) = stream.next().await {
                println!("{}", serde_json::to_string(&transaction)?);
            }
            Ok(())
        }
        other => Err(anyhow::anyhow!("No handler found for subcommand {:?}", other)),
    }
}
