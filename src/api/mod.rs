//! REST API Server Module
//!
//! This module provides a REST API server for the bridge ledger, exposing
//! deposit registration and confirmation for validators, withdrawals for
//! account holders, administrative controls and read-only queries.
//!
//! The caller identity is taken from the `x-bridge-caller` header. Verifying
//! that header is the job of the gateway in front of this service.

// Generic shared code
mod generic;

// Endpoint groups
mod accounts;
mod admin;
mod deposits;

pub use generic::{status_for, ApiResponse, ApiServer, CALLER_HEADER};
