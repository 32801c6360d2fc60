//! Error types for the bridge ledger.

use thiserror::Error;

/// Every way a ledger operation can be rejected.
///
/// Failures are detected before any state is touched, so a returned error
/// always means the ledger is exactly as it was before the call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Caller is not authorized for this operation")]
    NotAuthorized,

    #[error("Amount is outside the allowed range")]
    InvalidAmount,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Operation is invalid for the current bridge or deposit state")]
    InvalidBridgeStatus,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Already processed")]
    AlreadyProcessed,

    #[error("Bridge is paused")]
    BridgePaused,

    #[error("Invalid validator address")]
    InvalidValidatorAddress,

    #[error("Invalid recipient address")]
    InvalidRecipientAddress,

    #[error("Invalid source-chain address")]
    InvalidBtcAddress,

    #[error("Invalid transaction hash")]
    InvalidTxHash,

    #[error("Invalid signature format")]
    InvalidSignatureFormat,
}

impl BridgeError {
    /// Stable numeric code reported to external agents.
    pub fn code(&self) -> u32 {
        match self {
            BridgeError::NotAuthorized => 100,
            BridgeError::InvalidAmount => 101,
            BridgeError::InsufficientBalance => 102,
            BridgeError::InvalidBridgeStatus => 103,
            BridgeError::InvalidSignature => 104,
            BridgeError::AlreadyProcessed => 105,
            BridgeError::BridgePaused => 106,
            BridgeError::InvalidValidatorAddress => 107,
            BridgeError::InvalidRecipientAddress => 108,
            BridgeError::InvalidBtcAddress => 109,
            BridgeError::InvalidTxHash => 110,
            BridgeError::InvalidSignatureFormat => 111,
        }
    }
}

/// Result type returned by all ledger operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
