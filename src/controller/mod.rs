//! Bridge Controller Module
//!
//! Orchestrates the ledger components: deposit registration, per-validator
//! confirmation, balance accounting, withdrawals and the administrative paths.
//!
//! Every public operation is atomic. All preconditions are evaluated, in the
//! documented order, before the first mutation; a returned error leaves the
//! controller untouched.
//!
//! ## Confirmation threshold
//!
//! Each accepted `confirm_deposit` records the caller's signature and bumps the
//! deposit's confirmation count. The call that brings the count to
//! `required_confirmations` finalizes the deposit and credits the recipient.
//! With a threshold of 1 the first valid confirmation finalizes.

pub mod events;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::ledger::{
    BalanceLedger, CircuitBreaker, Deposit, DepositLedger, SignatureCollector, SignatureRecord,
    ValidatorRegistry,
};
use crate::types::{
    CallContext, PayoutAddress, Principal, SourceSender, TxHash, ValidatorSignatureBytes,
};
use crate::validation::{
    is_valid_account_identity, is_valid_signature_format, is_valid_source_address,
    is_valid_tx_hash, AmountRange, SourceAddressRole,
};

pub use events::{EmergencyCredit, WithdrawalIntent, WITHDRAWAL_EVENT_TYPE};

// ============================================================================
// POLICY AND STATE
// ============================================================================

/// Smallest deposit or withdrawal accepted by default (source-chain minor units)
pub const MIN_DEPOSIT_AMOUNT: u64 = 100_000;

/// Largest deposit or withdrawal accepted by default
pub const MAX_DEPOSIT_AMOUNT: u64 = 1_000_000_000;

/// Validator confirmations needed to finalize a deposit by default
pub const REQUIRED_CONFIRMATIONS: u32 = 1;

/// Tunable rules the controller enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgePolicy {
    /// Inclusive range for deposits and withdrawals
    pub amounts: AmountRange,
    /// Confirmations needed before a deposit is credited
    pub required_confirmations: u32,
}

impl Default for BridgePolicy {
    fn default() -> Self {
        Self {
            amounts: AmountRange::new(MIN_DEPOSIT_AMOUNT, MAX_DEPOSIT_AMOUNT),
            required_confirmations: REQUIRED_CONFIRMATIONS,
        }
    }
}

/// Process-wide scalars of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeState {
    pub paused: bool,
    /// Net credits minus debits; emergency credits are deliberately not counted
    pub total_bridged_amount: u64,
    pub last_processed_height: u64,
}

/// Result of an accepted confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConfirmationOutcome {
    /// Signature recorded; more confirmations are needed
    Pending { confirmations: u32, required: u32 },
    /// Threshold reached in this call; the recipient has been credited
    Finalized {
        confirmations: u32,
        recipient: Principal,
        amount: u64,
    },
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Owner of the whole ledger state.
#[derive(Debug, Clone)]
pub struct BridgeController {
    admin: Principal,
    policy: BridgePolicy,
    validators: ValidatorRegistry,
    breaker: CircuitBreaker,
    deposits: DepositLedger,
    signatures: SignatureCollector,
    balances: BalanceLedger,
    total_bridged_amount: u64,
    last_processed_height: u64,
    withdrawals: Vec<WithdrawalIntent>,
    emergency_credits: Vec<EmergencyCredit>,
}

impl BridgeController {
    /// Creates an empty, running ledger governed by `admin`.
    pub fn new(admin: Principal, policy: BridgePolicy) -> Self {
        Self {
            admin,
            policy,
            validators: ValidatorRegistry::new(),
            breaker: CircuitBreaker::new(),
            deposits: DepositLedger::new(),
            signatures: SignatureCollector::new(),
            balances: BalanceLedger::new(),
            total_bridged_amount: 0,
            last_processed_height: 0,
            withdrawals: Vec::new(),
            emergency_credits: Vec::new(),
        }
    }

    /// Reassembles a controller from persisted parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        admin: Principal,
        policy: BridgePolicy,
        validators: ValidatorRegistry,
        breaker: CircuitBreaker,
        deposits: DepositLedger,
        signatures: SignatureCollector,
        balances: BalanceLedger,
        state: BridgeState,
        withdrawals: Vec<WithdrawalIntent>,
        emergency_credits: Vec<EmergencyCredit>,
    ) -> Self {
        Self {
            admin,
            policy,
            validators,
            breaker,
            deposits,
            signatures,
            balances,
            total_bridged_amount: state.total_bridged_amount,
            last_processed_height: state.last_processed_height,
            withdrawals,
            emergency_credits,
        }
    }

    // ------------------------------------------------------------------------
    // Administrative operations (not gated by the circuit breaker)
    // ------------------------------------------------------------------------

    /// Starts (or restarts) the bridge: clears the pause flag and records the
    /// starting height.
    pub fn initialize_bridge(&mut self, ctx: &CallContext) -> BridgeResult<()> {
        self.require_admin(ctx)?;
        self.breaker.reset();
        self.last_processed_height = ctx.block_height;
        info!("Bridge initialized at height {}", ctx.block_height);
        Ok(())
    }

    /// Engages the circuit breaker. Pausing a paused bridge succeeds.
    pub fn pause_bridge(&mut self, ctx: &CallContext) -> BridgeResult<()> {
        self.require_admin(ctx)?;
        self.breaker.pause();
        warn!("Bridge paused by {} at height {}", ctx.caller, ctx.block_height);
        Ok(())
    }

    /// Releases the circuit breaker; fails with `InvalidBridgeStatus` unless paused.
    pub fn resume_bridge(&mut self, ctx: &CallContext) -> BridgeResult<()> {
        self.require_admin(ctx)?;
        self.breaker.resume()?;
        info!("Bridge resumed by {} at height {}", ctx.caller, ctx.block_height);
        Ok(())
    }

    pub fn add_validator(&mut self, ctx: &CallContext, identity: &Principal) -> BridgeResult<()> {
        self.require_admin(ctx)?;
        self.validators.add(identity)?;
        info!("Validator added: {}", identity);
        Ok(())
    }

    pub fn remove_validator(&mut self, ctx: &CallContext, identity: &Principal) -> BridgeResult<()> {
        self.require_admin(ctx)?;
        self.validators.remove(identity)?;
        info!("Validator removed: {}", identity);
        Ok(())
    }

    /// Credits `recipient` from the pooled total during crisis recovery.
    ///
    /// The pooled total is intentionally left unchanged: this is a
    /// reallocation inside the pool, not an outflow.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - The recipient's new balance
    /// * `Err(BridgeError)` - `NotAuthorized`, `InsufficientBalance` (pool total
    ///   below `amount`), `InvalidRecipientAddress`, or `InvalidAmount` when the
    ///   balance would not strictly increase
    pub fn emergency_withdraw(
        &mut self,
        ctx: &CallContext,
        amount: u64,
        recipient: &Principal,
    ) -> BridgeResult<u64> {
        self.require_admin(ctx)?;
        if self.total_bridged_amount < amount {
            return Err(BridgeError::InsufficientBalance);
        }
        if !is_valid_account_identity(recipient.as_str()) {
            return Err(BridgeError::InvalidRecipientAddress);
        }
        let prior = self.balances.get(recipient);
        let new_balance = self.balances.credited(recipient, amount)?;
        if new_balance <= prior {
            return Err(BridgeError::InvalidAmount);
        }

        self.balances.credit(recipient, amount)?;
        self.emergency_credits.push(EmergencyCredit {
            recipient: recipient.clone(),
            amount,
            new_balance,
            height: ctx.block_height,
            recorded_at: Utc::now(),
        });
        warn!(
            "Emergency credit of {} to {} (pool total stays {})",
            amount, recipient, self.total_bridged_amount
        );
        Ok(new_balance)
    }

    // ------------------------------------------------------------------------
    // Validator operations
    // ------------------------------------------------------------------------

    /// Registers a source-chain deposit observed by an active validator.
    ///
    /// Preconditions, in order: bridge running, amount in range, caller active
    /// validator, hash is 32 bytes, hash never used, recipient well-formed,
    /// sender is 33 bytes.
    pub fn initiate_deposit(
        &mut self,
        ctx: &CallContext,
        tx_hash: &[u8],
        amount: u64,
        recipient: &Principal,
        source_sender: &[u8],
    ) -> BridgeResult<()> {
        self.breaker.ensure_running()?;
        if !self.policy.amounts.contains(amount) {
            return Err(BridgeError::InvalidAmount);
        }
        self.require_active_validator(ctx)?;
        if !is_valid_tx_hash(tx_hash) {
            return Err(BridgeError::InvalidTxHash);
        }
        let hash = TxHash::from_slice(tx_hash).ok_or(BridgeError::InvalidTxHash)?;
        if self.deposits.contains(&hash) {
            return Err(BridgeError::AlreadyProcessed);
        }
        if !is_valid_account_identity(recipient.as_str()) {
            return Err(BridgeError::InvalidRecipientAddress);
        }
        if !is_valid_source_address(source_sender, SourceAddressRole::Sender) {
            return Err(BridgeError::InvalidBtcAddress);
        }
        let sender = SourceSender::from_slice(source_sender).ok_or(BridgeError::InvalidBtcAddress)?;

        self.deposits.register(
            hash,
            Deposit::new(amount, recipient.clone(), sender, ctx.block_height),
        )?;
        info!(
            "Deposit {} registered by {}: {} for {}",
            hash, ctx.caller, amount, recipient
        );
        Ok(())
    }

    /// Records the caller's confirmation of a registered deposit.
    ///
    /// Preconditions, in order: bridge running, deposit exists, hash and
    /// signature well-formed, deposit not processed, caller active validator,
    /// caller has not signed this deposit yet.
    pub fn confirm_deposit(
        &mut self,
        ctx: &CallContext,
        tx_hash: &[u8],
        signature: &[u8],
    ) -> BridgeResult<ConfirmationOutcome> {
        self.breaker.ensure_running()?;
        let deposit = self
            .deposits
            .get(tx_hash)
            .ok_or(BridgeError::InvalidBridgeStatus)?;
        // Unreachable after a successful lookup; keeps the failure order explicit.
        if !is_valid_tx_hash(tx_hash) {
            return Err(BridgeError::InvalidTxHash);
        }
        let hash = TxHash::from_slice(tx_hash).ok_or(BridgeError::InvalidTxHash)?;
        if !is_valid_signature_format(signature) {
            return Err(BridgeError::InvalidSignatureFormat);
        }
        let signature = ValidatorSignatureBytes::from_slice(signature)
            .ok_or(BridgeError::InvalidSignatureFormat)?;
        if signature.0.iter().all(|byte| *byte == 0) {
            return Err(BridgeError::InvalidSignature);
        }
        if deposit.processed {
            return Err(BridgeError::AlreadyProcessed);
        }
        self.require_active_validator(ctx)?;
        if self.signatures.has_signed(&hash, &ctx.caller) {
            return Err(BridgeError::AlreadyProcessed);
        }

        let confirmations = deposit.confirmations.saturating_add(1);
        let required = self.policy.required_confirmations;
        let finalize = confirmations >= required;
        let amount = deposit.amount;
        let recipient = deposit.recipient.clone();
        let new_total = if finalize {
            // Both additions are checked before anything is written.
            self.balances.credited(&recipient, amount)?;
            Some(
                self.total_bridged_amount
                    .checked_add(amount)
                    .ok_or(BridgeError::InvalidAmount)?,
            )
        } else {
            None
        };

        self.signatures
            .record(hash, ctx.caller.clone(), signature, ctx.block_height)?;
        self.deposits.add_confirmation(&hash)?;
        debug!(
            "Deposit {} confirmed by {} ({}/{})",
            hash, ctx.caller, confirmations, required
        );

        match new_total {
            Some(total) => {
                self.deposits.mark_processed(&hash)?;
                self.balances.credit(&recipient, amount)?;
                self.total_bridged_amount = total;
                self.last_processed_height = ctx.block_height;
                info!(
                    "Deposit {} finalized: credited {} to {} (pool total {})",
                    hash, amount, recipient, total
                );
                Ok(ConfirmationOutcome::Finalized {
                    confirmations,
                    recipient,
                    amount,
                })
            }
            None => Ok(ConfirmationOutcome::Pending {
                confirmations,
                required,
            }),
        }
    }

    // ------------------------------------------------------------------------
    // User operations
    // ------------------------------------------------------------------------

    /// Debits the caller and records an intent to release on the source chain.
    ///
    /// Preconditions, in order: bridge running, balance covers `amount`, amount
    /// in range, destination is a 34-byte payout address, pool total covers
    /// `amount`.
    pub fn withdraw(
        &mut self,
        ctx: &CallContext,
        amount: u64,
        destination_address: &[u8],
    ) -> BridgeResult<WithdrawalIntent> {
        self.breaker.ensure_running()?;
        self.balances.debited(&ctx.caller, amount)?;
        if !self.policy.amounts.contains(amount) {
            return Err(BridgeError::InvalidAmount);
        }
        if !is_valid_source_address(destination_address, SourceAddressRole::Payout) {
            return Err(BridgeError::InvalidBtcAddress);
        }
        let destination =
            PayoutAddress::from_slice(destination_address).ok_or(BridgeError::InvalidBtcAddress)?;
        let new_total = self
            .total_bridged_amount
            .checked_sub(amount)
            .ok_or(BridgeError::InsufficientBalance)?;

        self.balances.debit(&ctx.caller, amount)?;
        self.total_bridged_amount = new_total;
        let intent = WithdrawalIntent::new(
            self.withdrawals.len() as u64,
            ctx.caller.clone(),
            amount,
            destination,
            ctx.block_height,
        );
        self.withdrawals.push(intent.clone());
        info!(
            "Withdrawal {} by {}: {} to {}",
            intent.id, ctx.caller, amount, destination
        );
        Ok(intent)
    }

    // ------------------------------------------------------------------------
    // Read-only queries
    // ------------------------------------------------------------------------

    pub fn get_deposit(&self, tx_hash: &[u8]) -> Option<&Deposit> {
        self.deposits.get(tx_hash)
    }

    pub fn get_bridge_status(&self) -> bool {
        self.breaker.is_paused()
    }

    pub fn get_validator_status(&self, identity: &Principal) -> bool {
        self.validators.is_active(identity)
    }

    pub fn get_bridge_balance(&self, account: &Principal) -> u64 {
        self.balances.get(account)
    }

    pub fn validate_deposit_amount(&self, amount: u64) -> bool {
        self.policy.amounts.contains(amount)
    }

    pub fn get_bridge_state(&self) -> BridgeState {
        BridgeState {
            paused: self.breaker.is_paused(),
            total_bridged_amount: self.total_bridged_amount,
            last_processed_height: self.last_processed_height,
        }
    }

    pub fn get_signature(&self, tx_hash: &TxHash, validator: &Principal) -> Option<&SignatureRecord> {
        self.signatures.get(tx_hash, validator)
    }

    /// Validators that have confirmed `tx_hash`.
    pub fn get_signers(&self, tx_hash: &TxHash) -> Vec<Principal> {
        self.signatures.signers(tx_hash)
    }

    /// Withdrawal intents with `sequence >= since`.
    pub fn withdrawal_intents(&self, since: u64) -> &[WithdrawalIntent] {
        let start = usize::try_from(since)
            .unwrap_or(usize::MAX)
            .min(self.withdrawals.len());
        &self.withdrawals[start..]
    }

    pub fn emergency_credits(&self) -> &[EmergencyCredit] {
        &self.emergency_credits
    }

    /// Highest block height stamped on any record held by the ledger.
    pub fn highest_recorded_height(&self) -> u64 {
        let deposits = self.deposits.iter().map(|(_, deposit)| deposit.timestamp);
        let signatures = self.signatures.iter().map(|(_, _, record)| record.submitted_at);
        let withdrawals = self.withdrawals.iter().map(|intent| intent.height);
        let credits = self.emergency_credits.iter().map(|credit| credit.height);
        deposits
            .chain(signatures)
            .chain(withdrawals)
            .chain(credits)
            .fold(self.last_processed_height, u64::max)
    }

    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    pub fn policy(&self) -> &BridgePolicy {
        &self.policy
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    pub fn deposits(&self) -> &DepositLedger {
        &self.deposits
    }

    pub fn signatures(&self) -> &SignatureCollector {
        &self.signatures
    }

    pub fn balances(&self) -> &BalanceLedger {
        &self.balances
    }

    // ------------------------------------------------------------------------
    // Bootstrap
    // ------------------------------------------------------------------------

    /// Seeds the validator set from configuration, bypassing the admin check.
    pub fn bootstrap_validators<'a>(
        &mut self,
        identities: impl IntoIterator<Item = &'a Principal>,
    ) -> BridgeResult<()> {
        for identity in identities {
            self.validators.add(identity)?;
            debug!("Bootstrapped validator {}", identity);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------------

    fn require_admin(&self, ctx: &CallContext) -> BridgeResult<()> {
        if ctx.caller == self.admin {
            Ok(())
        } else {
            Err(BridgeError::NotAuthorized)
        }
    }

    fn require_active_validator(&self, ctx: &CallContext) -> BridgeResult<()> {
        if self.validators.is_active(&ctx.caller) {
            Ok(())
        } else {
            Err(BridgeError::NotAuthorized)
        }
    }
}
