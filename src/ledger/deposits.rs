//! Deposit Ledger
//!
//! Write-once mapping from source-chain transaction hash to deposit record.
//! A record moves `Registered -> Processed` exactly once and is never deleted.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::{BridgeError, BridgeResult};
use crate::types::{Principal, SourceSender, TxHash};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Lifecycle position of a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    /// Registered by a validator, waiting for confirmations
    Registered,
    /// Threshold reached and recipient credited (terminal)
    Processed,
}

/// A source-chain deposit observed by the validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Amount in source-chain minor units
    pub amount: u64,
    /// Destination-chain account credited on finalization
    pub recipient: Principal,
    /// Whether the deposit has been finalized
    pub processed: bool,
    /// Number of validator confirmations recorded
    pub confirmations: u32,
    /// Destination-chain height at registration
    pub timestamp: u64,
    /// Source-chain sender identity
    pub source_sender: SourceSender,
}

impl Deposit {
    pub fn new(amount: u64, recipient: Principal, source_sender: SourceSender, height: u64) -> Self {
        Self {
            amount,
            recipient,
            processed: false,
            confirmations: 0,
            timestamp: height,
            source_sender,
        }
    }

    pub fn status(&self) -> DepositStatus {
        if self.processed {
            DepositStatus::Processed
        } else {
            DepositStatus::Registered
        }
    }
}

// ============================================================================
// LEDGER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DepositLedger {
    deposits: HashMap<TxHash, Deposit>,
}

impl DepositLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks a deposit up by raw hash bytes; malformed hashes are simply absent.
    pub fn get(&self, tx_hash: &[u8]) -> Option<&Deposit> {
        TxHash::from_slice(tx_hash).and_then(|hash| self.deposits.get(&hash))
    }

    pub fn contains(&self, tx_hash: &TxHash) -> bool {
        self.deposits.contains_key(tx_hash)
    }

    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TxHash, &Deposit)> {
        self.deposits.iter()
    }

    /// Inserts a new deposit if the key has never been used.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Deposit registered
    /// * `Err(BridgeError::AlreadyProcessed)` - A deposit already exists for this hash
    pub fn register(&mut self, tx_hash: TxHash, deposit: Deposit) -> BridgeResult<()> {
        match self.deposits.entry(tx_hash) {
            Entry::Occupied(_) => Err(BridgeError::AlreadyProcessed),
            Entry::Vacant(slot) => {
                slot.insert(deposit);
                Ok(())
            }
        }
    }

    /// Bumps the confirmation counter and returns the new count.
    pub(crate) fn add_confirmation(&mut self, tx_hash: &TxHash) -> BridgeResult<u32> {
        let deposit = self
            .deposits
            .get_mut(tx_hash)
            .ok_or(BridgeError::InvalidBridgeStatus)?;
        if deposit.processed {
            return Err(BridgeError::AlreadyProcessed);
        }
        deposit.confirmations = deposit.confirmations.saturating_add(1);
        Ok(deposit.confirmations)
    }

    /// Flips `processed` to true. Never reverts.
    pub(crate) fn mark_processed(&mut self, tx_hash: &TxHash) -> BridgeResult<()> {
        let deposit = self
            .deposits
            .get_mut(tx_hash)
            .ok_or(BridgeError::InvalidBridgeStatus)?;
        if deposit.processed {
            return Err(BridgeError::AlreadyProcessed);
        }
        deposit.processed = true;
        Ok(())
    }

    pub(crate) fn from_entries(entries: impl IntoIterator<Item = (TxHash, Deposit)>) -> Self {
        Self {
            deposits: entries.into_iter().collect(),
        }
    }
}
