//! Shared test helpers
//!
//! This module provides helper functions used by the integration tests.
//!
//! The module is organized into several categories:
//! - **Identities**: Well-formed principals for the admin, validators and users
//! - **Byte Builders**: Transaction hashes, sender/payout addresses and signatures of the right length
//! - **Ledger Builders**: Controllers and configurations in a known starting state

use bridge_ledger::config::{ApiConfig, BridgeConfig, Config};
use bridge_ledger::controller::{BridgeController, BridgePolicy};
use bridge_ledger::types::{
    CallContext, Principal, PAYOUT_ADDRESS_LEN, SIGNATURE_LEN, SOURCE_SENDER_LEN, TX_HASH_LEN,
};

// ============================================================================
// CONSTANTS
// ============================================================================

// -------------------------------- USERS ---------------------------------

/// Dummy administrative authority (testnet standard principal)
pub const DUMMY_ADMIN: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

/// Dummy first validator (mainnet standard principal)
pub const DUMMY_VALIDATOR_1: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";

/// Dummy second validator
pub const DUMMY_VALIDATOR_2: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

/// Dummy deposit recipient / account holder
pub const DUMMY_RECIPIENT: &str = "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC";

/// Dummy second account holder
#[allow(dead_code)]
pub const DUMMY_USER: &str = "ST1SJ3DTE5DN7X54YDH5D64R3BCB6A2AG2ZQ8YPD5";

/// Dummy contract principal
#[allow(dead_code)]
pub const DUMMY_CONTRACT_PRINCIPAL: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM.bridge-token";

// ------------------------------- AMOUNTS --------------------------------

/// Deposit amount inside the default range
pub const DUMMY_DEPOSIT_AMOUNT: u64 = 500_000;

/// Block height used for most calls
pub const DUMMY_HEIGHT: u64 = 1_000;

// ============================================================================
// IDENTITIES
// ============================================================================

pub fn principal(value: &str) -> Principal {
    Principal::new(value)
}

pub fn admin() -> Principal {
    principal(DUMMY_ADMIN)
}

pub fn validator_1() -> Principal {
    principal(DUMMY_VALIDATOR_1)
}

#[allow(dead_code)]
pub fn validator_2() -> Principal {
    principal(DUMMY_VALIDATOR_2)
}

pub fn recipient() -> Principal {
    principal(DUMMY_RECIPIENT)
}

/// Call context for `caller` at `DUMMY_HEIGHT`.
pub fn ctx(caller: &str) -> CallContext {
    CallContext::new(caller, DUMMY_HEIGHT)
}

/// Call context for `caller` at an explicit height.
#[allow(dead_code)]
pub fn ctx_at(caller: &str, height: u64) -> CallContext {
    CallContext::new(caller, height)
}

// ============================================================================
// BYTE BUILDERS
// ============================================================================

/// 32-byte transaction hash whose last byte is `seed`.
pub fn tx_hash(seed: u8) -> Vec<u8> {
    let mut bytes = vec![0u8; TX_HASH_LEN];
    bytes[TX_HASH_LEN - 1] = seed;
    bytes
}

/// 33-byte compressed-key style source sender.
pub fn source_sender() -> Vec<u8> {
    let mut bytes = vec![0x11u8; SOURCE_SENDER_LEN];
    bytes[0] = 0x02;
    bytes
}

/// 34-byte payout address.
pub fn payout_address() -> Vec<u8> {
    vec![0x22u8; PAYOUT_ADDRESS_LEN]
}

/// Non-zero 65-byte signature whose first byte is `seed`.
pub fn signature(seed: u8) -> Vec<u8> {
    let mut bytes = vec![0x33u8; SIGNATURE_LEN];
    bytes[0] = seed;
    bytes
}

// ============================================================================
// LEDGER BUILDERS
// ============================================================================

/// Empty ledger governed by `DUMMY_ADMIN` with default policy.
pub fn new_controller() -> BridgeController {
    BridgeController::new(admin(), BridgePolicy::default())
}

/// Ledger with `DUMMY_VALIDATOR_1` active.
pub fn controller_with_validator() -> BridgeController {
    let mut controller = new_controller();
    controller
        .add_validator(&ctx(DUMMY_ADMIN), &validator_1())
        .expect("admin can add validator");
    controller
}

/// Ledger where `DUMMY_RECIPIENT` holds `amount` from one finalized deposit.
#[allow(dead_code)]
pub fn controller_with_balance(amount: u64) -> BridgeController {
    let mut controller = controller_with_validator();
    let validator = ctx(DUMMY_VALIDATOR_1);
    controller
        .initiate_deposit(&validator, &tx_hash(0xaa), amount, &recipient(), &source_sender())
        .expect("deposit registers");
    controller
        .confirm_deposit(&validator, &tx_hash(0xaa), &signature(1))
        .expect("deposit finalizes");
    controller
}

/// In-memory configuration with `DUMMY_VALIDATOR_1` as the initial validator.
#[allow(dead_code)]
pub fn build_test_config() -> Config {
    Config {
        bridge: BridgeConfig {
            admin: admin(),
            min_deposit_amount: 100_000,
            max_deposit_amount: 1_000_000_000,
            required_confirmations: 1,
            initial_validators: vec![validator_1()],
            state_file: None,
        },
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 3335,
            cors_origins: vec!["http://localhost:3335".to_string()],
        },
    }
}
