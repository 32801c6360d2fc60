//! Ledger Snapshot Module
//!
//! Serializes the complete controller state (validator status, deposits,
//! signatures, balances, the three bridge scalars and the emitted records) to
//! JSON and restores it. Entries are sorted so identical states produce
//! identical files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::controller::{
    BridgeController, BridgePolicy, BridgeState, EmergencyCredit, WithdrawalIntent,
};
use crate::ledger::{
    BalanceLedger, CircuitBreaker, Deposit, DepositLedger, SignatureCollector, SignatureRecord,
    ValidatorRegistry,
};
use crate::types::{Principal, TxHash};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

// ============================================================================
// SNAPSHOT STRUCTURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub identity: Principal,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEntry {
    pub tx_hash: TxHash,
    #[serde(flatten)]
    pub deposit: Deposit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub tx_hash: TxHash,
    pub validator: Principal,
    #[serde(flatten)]
    pub record: SignatureRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub account: Principal,
    pub balance: u64,
}

/// Full durable state of a bridge controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub admin: Principal,
    pub state: BridgeState,
    /// Destination-chain height in effect when the snapshot was written
    #[serde(default)]
    pub block_height: u64,
    pub validators: Vec<ValidatorEntry>,
    pub deposits: Vec<DepositEntry>,
    pub signatures: Vec<SignatureEntry>,
    pub balances: Vec<BalanceEntry>,
    #[serde(default)]
    pub withdrawals: Vec<WithdrawalIntent>,
    #[serde(default)]
    pub emergency_credits: Vec<EmergencyCredit>,
}

impl LedgerSnapshot {
    /// Captures the current state of `controller`.
    pub fn capture(controller: &BridgeController) -> Self {
        let mut validators: Vec<ValidatorEntry> = controller
            .validators()
            .entries()
            .map(|(identity, active)| ValidatorEntry {
                identity: identity.clone(),
                active,
            })
            .collect();
        validators.sort_by(|a, b| a.identity.cmp(&b.identity));

        let mut deposits: Vec<DepositEntry> = controller
            .deposits()
            .iter()
            .map(|(tx_hash, deposit)| DepositEntry {
                tx_hash: *tx_hash,
                deposit: deposit.clone(),
            })
            .collect();
        deposits.sort_by(|a, b| a.tx_hash.cmp(&b.tx_hash));

        let mut signatures: Vec<SignatureEntry> = controller
            .signatures()
            .iter()
            .map(|(tx_hash, validator, record)| SignatureEntry {
                tx_hash: *tx_hash,
                validator: validator.clone(),
                record: record.clone(),
            })
            .collect();
        signatures.sort_by(|a, b| {
            a.tx_hash
                .cmp(&b.tx_hash)
                .then_with(|| a.validator.cmp(&b.validator))
        });

        let mut balances: Vec<BalanceEntry> = controller
            .balances()
            .iter()
            .map(|(account, balance)| BalanceEntry {
                account: account.clone(),
                balance,
            })
            .collect();
        balances.sort_by(|a, b| a.account.cmp(&b.account));

        Self {
            version: SNAPSHOT_VERSION,
            admin: controller.admin().clone(),
            state: controller.get_bridge_state(),
            block_height: controller.highest_recorded_height(),
            validators,
            deposits,
            signatures,
            balances,
            withdrawals: controller.withdrawal_intents(0).to_vec(),
            emergency_credits: controller.emergency_credits().to_vec(),
        }
    }

    /// Raises the recorded block height to at least `height`.
    pub fn with_block_height(mut self, height: u64) -> Self {
        self.block_height = self.block_height.max(height);
        self
    }

    /// Rebuilds a controller governed by `policy`.
    ///
    /// # Returns
    ///
    /// * `Ok(BridgeController)` - Restored controller
    /// * `Err(anyhow::Error)` - Unsupported version or admin mismatch
    pub fn restore(self, admin: &Principal, policy: BridgePolicy) -> Result<BridgeController> {
        if self.version != SNAPSHOT_VERSION {
            return Err(anyhow::anyhow!(
                "Unsupported snapshot version {} (expected {})",
                self.version,
                SNAPSHOT_VERSION
            ));
        }
        if &self.admin != admin {
            return Err(anyhow::anyhow!(
                "Snapshot admin {} does not match configured admin {}",
                self.admin,
                admin
            ));
        }

        let validators = ValidatorRegistry::from_entries(
            self.validators
                .into_iter()
                .map(|entry| (entry.identity, entry.active)),
        );
        let deposits = DepositLedger::from_entries(
            self.deposits
                .into_iter()
                .map(|entry| (entry.tx_hash, entry.deposit)),
        );
        let signatures = SignatureCollector::from_entries(
            self.signatures
                .into_iter()
                .map(|entry| (entry.tx_hash, entry.validator, entry.record)),
        );
        let balances = BalanceLedger::from_entries(
            self.balances
                .into_iter()
                .map(|entry| (entry.account, entry.balance)),
        );

        Ok(BridgeController::from_parts(
            self.admin,
            policy,
            validators,
            CircuitBreaker::with_paused(self.state.paused),
            deposits,
            signatures,
            balances,
            self.state,
            self.withdrawals,
            self.emergency_credits,
        ))
    }

    /// Writes the snapshot to `path` via a temporary file and rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_vec_pretty(self).context("Failed to serialize snapshot")?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write snapshot to {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;
        Ok(())
    }

    /// Reads a snapshot from `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(LedgerSnapshot))` - Snapshot loaded
    /// * `Ok(None)` - No snapshot exists yet
    /// * `Err(anyhow::Error)` - The file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: LedgerSnapshot = serde_json::from_slice(&content)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        info!(
            "Loaded ledger snapshot from {} ({} deposits, {} balances)",
            path.display(),
            snapshot.deposits.len(),
            snapshot.balances.len()
        );
        Ok(Some(snapshot))
    }
}
