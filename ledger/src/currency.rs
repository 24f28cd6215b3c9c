//! Fungible festival currency: balances, allowances and delegated transfers.

use std::collections::BTreeMap;

use festival_api::v1::CurrencyEvent;
use festival_types::primitives::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyLedger {
    name: String,
    symbol: String,
    total_supply: Amount,
    balances: BTreeMap<AccountId, Amount>,
    /// owner -> spender -> remaining budget
    allowances: BTreeMap<AccountId, BTreeMap<AccountId, Amount>>,
}

impl CurrencyLedger {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        CurrencyLedger {
            name: name.into(),
            symbol: symbol.into(),
            total_supply: Amount::ZERO,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn balances(&self) -> impl Iterator<Item = (&AccountId, Amount)> {
        self.balances.iter().map(|(account, amount)| (account, *amount))
    }

    /// Creates `amount` new units on `account`. Open to any caller.
    pub fn mint(&mut self, account: &AccountId, amount: Amount) -> Result<CurrencyEvent> {
        let total_supply = self.total_supply.checked_add(amount).ok_or(LedgerError::Overflow)?;
        let balance = self.balance_of(account).checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.total_supply = total_supply;
        self.balances.insert(account.clone(), balance);
        debug!("Minted {} to {}, total supply {}", amount, account, total_supply);
        Ok(CurrencyEvent::Transfer {
            from: None,
            to: account.clone(),
            amount,
        })
    }

    /// Sets the allowance to exactly `amount`, replacing any previous value.
    pub fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> CurrencyEvent {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
        CurrencyEvent::Approval {
            owner: owner.clone(),
            spender: spender.clone(),
            amount,
        }
    }

    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<CurrencyEvent> {
        self.move_balance(from, to, amount)?;
        Ok(CurrencyEvent::Transfer {
            from: Some(from.clone()),
            to: to.clone(),
            amount,
        })
    }

    /// Moves `amount` from `from` to `to` on behalf of `caller`, consuming the
    /// `(from, caller)` allowance.
    pub fn transfer_from(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<CurrencyEvent> {
        let allowance = self.allowance(from, caller);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientAllowance {
                owner: from.clone(),
                spender: caller.clone(),
                allowance,
                needed: amount,
            })?;
        self.move_balance(from, to, amount)?;
        self.allowances
            .entry(from.clone())
            .or_default()
            .insert(caller.clone(), remaining);
        Ok(CurrencyEvent::Transfer {
            from: Some(from.clone()),
            to: to.clone(),
            amount,
        })
    }

    // Validates both sides before touching either balance.
    fn move_balance(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        let balance = self.balance_of(from);
        let debited = balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                account: from.clone(),
                balance,
                needed: amount,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self.balance_of(to).checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}
