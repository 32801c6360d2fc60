//! Storage Module
//!
//! Durable form of the ledger: a JSON snapshot of every map and scalar the
//! controller owns, written after each successful mutation.

pub mod snapshot;

// Re-export for convenience
pub use snapshot::LedgerSnapshot;
