//! Bridge Ledger Library
//!
//! This crate provides the destination-chain ledger of a validator-governed
//! two-chain bridge: deposit registration and confirmation, bridged balances,
//! withdrawals, a circuit breaker and administrative controls, plus the
//! service, persistence and REST layers that run it.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod ledger;
pub mod service;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::{ApiConfig, BridgeConfig, Config};
pub use controller::{BridgeController, BridgePolicy, BridgeState, ConfirmationOutcome};
pub use error::{BridgeError, BridgeResult};
pub use service::{BridgeService, ServiceError};
pub use types::{CallContext, Principal, TxHash};
