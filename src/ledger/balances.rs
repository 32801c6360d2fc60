//! Balance Ledger
//!
//! Bridged value owned by destination-chain accounts. Unknown accounts hold 0.

use std::collections::HashMap;

use crate::error::{BridgeError, BridgeResult};
use crate::types::Principal;

#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    balances: HashMap<Principal, u64>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: &Principal) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Balance `account` would hold after crediting `amount`.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - The new balance
    /// * `Err(BridgeError::InvalidAmount)` - The credit would overflow
    pub fn credited(&self, account: &Principal, amount: u64) -> BridgeResult<u64> {
        self.get(account)
            .checked_add(amount)
            .ok_or(BridgeError::InvalidAmount)
    }

    /// Balance `account` would hold after debiting `amount`.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - The new balance
    /// * `Err(BridgeError::InsufficientBalance)` - `amount` exceeds the balance
    pub fn debited(&self, account: &Principal, amount: u64) -> BridgeResult<u64> {
        self.get(account)
            .checked_sub(amount)
            .ok_or(BridgeError::InsufficientBalance)
    }

    /// Adds `amount` to `account` with checked addition.
    pub fn credit(&mut self, account: &Principal, amount: u64) -> BridgeResult<u64> {
        let balance = self.credited(account, amount)?;
        self.balances.insert(account.clone(), balance);
        Ok(balance)
    }

    /// Removes `amount` from `account`; never lets a balance go negative.
    pub fn debit(&mut self, account: &Principal, amount: u64) -> BridgeResult<u64> {
        let balance = self.debited(account, amount)?;
        self.balances.insert(account.clone(), balance);
        Ok(balance)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Principal, u64)> {
        self.balances.iter().map(|(account, balance)| (account, *balance))
    }

    pub(crate) fn from_entries(entries: impl IntoIterator<Item = (Principal, u64)>) -> Self {
        Self {
            balances: entries.into_iter().collect(),
        }
    }
}
