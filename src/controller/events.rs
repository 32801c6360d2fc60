//! Records emitted by the controller for external agents.
//!
//! The relay agent polls withdrawal intents and executes the matching release
//! on the source chain; emergency credits form an audit trail of the crisis
//! path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{PayoutAddress, Principal};

/// Type tag carried by every withdrawal intent
pub const WITHDRAWAL_EVENT_TYPE: &str = "withdrawal";

/// Intent to release funds on the source chain, emitted by a successful withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalIntent {
    /// Hex SHA-256 over the intent fields, stable across restarts
    pub id: String,
    /// Position in the intent log (0-based)
    pub sequence: u64,
    /// Event type tag, always "withdrawal"
    pub event_type: String,
    /// Account whose balance was debited
    pub sender: Principal,
    /// Amount to release in source-chain minor units
    pub amount: u64,
    /// Source-chain payout address
    pub destination_address: PayoutAddress,
    /// Destination-chain height of the withdrawal
    pub height: u64,
    /// Wall-clock time the intent was recorded
    pub recorded_at: DateTime<Utc>,
}

impl WithdrawalIntent {
    pub fn new(
        sequence: u64,
        sender: Principal,
        amount: u64,
        destination_address: PayoutAddress,
        height: u64,
    ) -> Self {
        let id = intent_id(sequence, &sender, amount, &destination_address, height);
        Self {
            id,
            sequence,
            event_type: WITHDRAWAL_EVENT_TYPE.to_string(),
            sender,
            amount,
            destination_address,
            height,
            recorded_at: Utc::now(),
        }
    }
}

fn intent_id(
    sequence: u64,
    sender: &Principal,
    amount: u64,
    destination: &PayoutAddress,
    height: u64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(WITHDRAWAL_EVENT_TYPE.as_bytes());
    hasher.update(sequence.to_be_bytes());
    hasher.update(sender.as_str().as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(destination.as_bytes());
    hasher.update(height.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Manual credit made by the administrative authority from the pooled total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyCredit {
    pub recipient: Principal,
    pub amount: u64,
    /// Recipient balance after the credit
    pub new_balance: u64,
    pub height: u64,
    pub recorded_at: DateTime<Utc>,
}
