//! Bridge Service Module
//!
//! Async front for a single [`BridgeController`]. Mutating calls are serialized
//! behind one write lock; queries share a read lock and always observe a
//! consistent state. When a snapshot file is configured, each mutation is
//! applied to a copy, persisted, and only then made visible.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::controller::{
    BridgeController, BridgeState, ConfirmationOutcome, EmergencyCredit, WithdrawalIntent,
};
use crate::error::{BridgeError, BridgeResult};
use crate::ledger::Deposit;
use crate::storage::LedgerSnapshot;
use crate::types::{CallContext, Principal, TxHash};

// ============================================================================
// ERRORS
// ============================================================================

/// Failure of a service call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The ledger rejected the operation; nothing changed
    #[error(transparent)]
    Ledger(#[from] BridgeError),
    /// The operation was valid but its result could not be persisted; nothing changed
    #[error("Failed to persist ledger state: {0:#}")]
    Persistence(anyhow::Error),
}

impl ServiceError {
    /// The ledger error, if this is one.
    pub fn ledger_error(&self) -> Option<BridgeError> {
        match self {
            ServiceError::Ledger(err) => Some(*err),
            ServiceError::Persistence(_) => None,
        }
    }
}

// ============================================================================
// SERVICE
// ============================================================================

/// Shared handle to the ledger. Cloning is cheap and all clones see the same state.
#[derive(Clone)]
pub struct BridgeService {
    controller: Arc<RwLock<BridgeController>>,
    block_height: Arc<AtomicU64>,
    state_file: Option<Arc<PathBuf>>,
}

impl BridgeService {
    /// Wraps an existing controller.
    pub fn new(controller: BridgeController, state_file: Option<PathBuf>) -> Self {
        Self {
            controller: Arc::new(RwLock::new(controller)),
            block_height: Arc::new(AtomicU64::new(0)),
            state_file: state_file.map(Arc::new),
        }
    }

    /// Builds the service described by `config`.
    ///
    /// Restores the configured snapshot when one exists; otherwise starts an
    /// empty ledger with the configured initial validators.
    ///
    /// # Returns
    ///
    /// * `Ok(BridgeService)` - Ready service
    /// * `Err(anyhow::Error)` - Snapshot unreadable or inconsistent with config
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let bridge = &config.bridge;
        let policy = bridge.policy();

        let restored = match &bridge.state_file {
            Some(path) => LedgerSnapshot::load(path)?,
            None => None,
        };

        let (controller, saved_height) = match restored {
            Some(snapshot) => {
                let saved_height = snapshot.block_height;
                let controller = snapshot
                    .restore(&bridge.admin, policy)
                    .context("Failed to restore ledger snapshot")?;
                info!(
                    "Restored ledger with {} deposits",
                    controller.deposits().len()
                );
                (controller, saved_height)
            }
            None => {
                let mut controller = BridgeController::new(bridge.admin.clone(), policy);
                controller
                    .bootstrap_validators(&bridge.initial_validators)
                    .map_err(|e| anyhow::anyhow!("Invalid initial validator set: {}", e))?;
                info!(
                    "Started empty ledger with {} initial validators",
                    bridge.initial_validators.len()
                );
                (controller, 0)
            }
        };

        // Resume no lower than any height already stamped on a record.
        let height = saved_height.max(controller.highest_recorded_height());
        let service = Self::new(controller, bridge.state_file.clone());
        service.set_block_height(height);
        Ok(service)
    }

    // ------------------------------------------------------------------------
    // Block height
    // ------------------------------------------------------------------------

    /// Current destination-chain height used for new calls.
    pub fn block_height(&self) -> u64 {
        self.block_height.load(Ordering::SeqCst)
    }

    /// Advances the height reported by the chain-monitoring agent.
    ///
    /// Heights never move backwards; returns the height now in effect.
    pub fn set_block_height(&self, height: u64) -> u64 {
        let previous = self.block_height.fetch_max(height, Ordering::SeqCst);
        previous.max(height)
    }

    fn context(&self, caller: &Principal) -> CallContext {
        CallContext::new(caller.clone(), self.block_height())
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Runs one operation as an atomic unit under the write lock.
    async fn apply<T>(
        &self,
        operation: &str,
        caller: &Principal,
        f: impl FnOnce(&mut BridgeController, &CallContext) -> BridgeResult<T>,
    ) -> Result<T, ServiceError> {
        let ctx = self.context(caller);
        let mut controller = self.controller.write().await;

        let result = match &self.state_file {
            None => f(&mut *controller, &ctx),
            Some(path) => {
                let mut next = (*controller).clone();
                match f(&mut next, &ctx) {
                    Ok(value) => {
                        let snapshot =
                            LedgerSnapshot::capture(&next).with_block_height(self.block_height());
                        let path = Arc::clone(path);
                        tokio::task::spawn_blocking(move || snapshot.save(&path))
                            .await
                            .context("Snapshot writer task failed")
                            .and_then(|saved| saved)
                            .map_err(ServiceError::Persistence)?;
                        *controller = next;
                        Ok(value)
                    }
                    Err(err) => Err(err),
                }
            }
        };

        result.map_err(|err| {
            warn!(
                "{} rejected for {} at height {}: {} (code {})",
                operation,
                caller,
                ctx.block_height,
                err,
                err.code()
            );
            ServiceError::Ledger(err)
        })
    }

    pub async fn initialize_bridge(&self, caller: &Principal) -> Result<(), ServiceError> {
        self.apply("initialize_bridge", caller, |c, ctx| c.initialize_bridge(ctx))
            .await
    }

    pub async fn pause_bridge(&self, caller: &Principal) -> Result<(), ServiceError> {
        self.apply("pause_bridge", caller, |c, ctx| c.pause_bridge(ctx))
            .await
    }

    pub async fn resume_bridge(&self, caller: &Principal) -> Result<(), ServiceError> {
        self.apply("resume_bridge", caller, |c, ctx| c.resume_bridge(ctx))
            .await
    }

    pub async fn add_validator(
        &self,
        caller: &Principal,
        identity: &Principal,
    ) -> Result<(), ServiceError> {
        self.apply("add_validator", caller, |c, ctx| c.add_validator(ctx, identity))
            .await
    }

    pub async fn remove_validator(
        &self,
        caller: &Principal,
        identity: &Principal,
    ) -> Result<(), ServiceError> {
        self.apply("remove_validator", caller, |c, ctx| {
            c.remove_validator(ctx, identity)
        })
        .await
    }

    pub async fn emergency_withdraw(
        &self,
        caller: &Principal,
        amount: u64,
        recipient: &Principal,
    ) -> Result<u64, ServiceError> {
        self.apply("emergency_withdraw", caller, |c, ctx| {
            c.emergency_withdraw(ctx, amount, recipient)
        })
        .await
    }

    pub async fn initiate_deposit(
        &self,
        caller: &Principal,
        tx_hash: &[u8],
        amount: u64,
        recipient: &Principal,
        source_sender: &[u8],
    ) -> Result<(), ServiceError> {
        self.apply("initiate_deposit", caller, |c, ctx| {
            c.initiate_deposit(ctx, tx_hash, amount, recipient, source_sender)
        })
        .await
    }

    pub async fn confirm_deposit(
        &self,
        caller: &Principal,
        tx_hash: &[u8],
        signature: &[u8],
    ) -> Result<ConfirmationOutcome, ServiceError> {
        self.apply("confirm_deposit", caller, |c, ctx| {
            c.confirm_deposit(ctx, tx_hash, signature)
        })
        .await
    }

    pub async fn withdraw(
        &self,
        caller: &Principal,
        amount: u64,
        destination_address: &[u8],
    ) -> Result<WithdrawalIntent, ServiceError> {
        self.apply("withdraw", caller, |c, ctx| {
            c.withdraw(ctx, amount, destination_address)
        })
        .await
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub async fn get_deposit(&self, tx_hash: &[u8]) -> Option<Deposit> {
        self.controller.read().await.get_deposit(tx_hash).cloned()
    }

    /// Deposit together with its signers, read under one guard.
    pub async fn get_deposit_with_signers(
        &self,
        tx_hash: &TxHash,
    ) -> Option<(Deposit, Vec<Principal>)> {
        let controller = self.controller.read().await;
        let deposit = controller.get_deposit(tx_hash.as_bytes())?.clone();
        Some((deposit, controller.get_signers(tx_hash)))
    }

    pub async fn get_bridge_status(&self) -> bool {
        self.controller.read().await.get_bridge_status()
    }

    pub async fn get_validator_status(&self, identity: &Principal) -> bool {
        self.controller.read().await.get_validator_status(identity)
    }

    pub async fn get_bridge_balance(&self, account: &Principal) -> u64 {
        self.controller.read().await.get_bridge_balance(account)
    }

    pub async fn validate_deposit_amount(&self, amount: u64) -> bool {
        self.controller.read().await.validate_deposit_amount(amount)
    }

    pub async fn get_bridge_state(&self) -> BridgeState {
        self.controller.read().await.get_bridge_state()
    }

    pub async fn get_signers(&self, tx_hash: &TxHash) -> Vec<Principal> {
        self.controller.read().await.get_signers(tx_hash)
    }

    pub async fn withdrawal_intents(&self, since: u64) -> Vec<WithdrawalIntent> {
        self.controller.read().await.withdrawal_intents(since).to_vec()
    }

    pub async fn emergency_credits(&self) -> Vec<EmergencyCredit> {
        self.controller.read().await.emergency_credits().to_vec()
    }

    /// Consistent point-in-time copy of the whole ledger.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::capture(&*self.controller.read().await)
            .with_block_height(self.block_height())
    }
}
