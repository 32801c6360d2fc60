//! Signature Collector
//!
//! Records at most one signature per (transaction, validator) pair. A second
//! submission for the same pair is rejected, never overwritten.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::{BridgeError, BridgeResult};
use crate::types::{Principal, TxHash, ValidatorSignatureBytes};

/// A validator's submitted signature for one deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// The 65-byte signature blob as submitted
    pub signature: ValidatorSignatureBytes,
    /// Destination-chain height at submission
    pub submitted_at: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SignatureCollector {
    signatures: HashMap<(TxHash, Principal), SignatureRecord>,
}

impl SignatureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_signed(&self, tx_hash: &TxHash, validator: &Principal) -> bool {
        self.signatures
            .contains_key(&(*tx_hash, validator.clone()))
    }

    pub fn get(&self, tx_hash: &TxHash, validator: &Principal) -> Option<&SignatureRecord> {
        self.signatures.get(&(*tx_hash, validator.clone()))
    }

    /// Validators that have signed `tx_hash`, sorted for stable output.
    pub fn signers(&self, tx_hash: &TxHash) -> Vec<Principal> {
        let mut signers: Vec<Principal> = self
            .signatures
            .keys()
            .filter(|(hash, _)| hash == tx_hash)
            .map(|(_, validator)| validator.clone())
            .collect();
        signers.sort();
        signers
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TxHash, &Principal, &SignatureRecord)> {
        self.signatures
            .iter()
            .map(|((hash, validator), record)| (hash, validator, record))
    }

    /// Stores a signature if the pair has none yet.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Signature recorded
    /// * `Err(BridgeError::AlreadyProcessed)` - This validator already signed this transaction
    pub fn record(
        &mut self,
        tx_hash: TxHash,
        validator: Principal,
        signature: ValidatorSignatureBytes,
        height: u64,
    ) -> BridgeResult<()> {
        match self.signatures.entry((tx_hash, validator)) {
            Entry::Occupied(_) => Err(BridgeError::AlreadyProcessed),
            Entry::Vacant(slot) => {
                slot.insert(SignatureRecord {
                    signature,
                    submitted_at: height,
                });
                Ok(())
            }
        }
    }

    pub(crate) fn from_entries(
        entries: impl IntoIterator<Item = (TxHash, Principal, SignatureRecord)>,
    ) -> Self {
        Self {
            signatures: entries
                .into_iter()
                .map(|(hash, validator, record)| ((hash, validator), record))
                .collect(),
        }
    }
}
