//! Ledger State Module
//!
//! The maps owned by the bridge controller. Each component enforces its own
//! key discipline (write-once deposits, one signature per validator per
//! transaction, non-negative balances); authorization and cross-component
//! ordering live in [`crate::controller`].

pub mod balances;
pub mod circuit_breaker;
pub mod deposits;
pub mod signatures;
pub mod validators;

pub use balances::BalanceLedger;
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use deposits::{Deposit, DepositLedger, DepositStatus};
pub use signatures::{SignatureCollector, SignatureRecord};
pub use validators::ValidatorRegistry;
