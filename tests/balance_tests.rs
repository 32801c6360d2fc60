//! Unit tests for balances, withdrawals and emergency credits
//!
//! These tests verify the balance ledger arithmetic, the withdrawal path and
//! its intent log, and the admin-only emergency credit with its deliberate
//! pool-total exception.

use bridge_ledger::controller::WITHDRAWAL_EVENT_TYPE;
use bridge_ledger::error::BridgeError;
use bridge_ledger::ledger::BalanceLedger;
use bridge_ledger::types::Principal;

#[path = "mod.rs"]
mod test_helpers;

use test_helpers::{
    controller_with_balance, ctx, ctx_at, new_controller, payout_address, principal, recipient,
    DUMMY_ADMIN, DUMMY_DEPOSIT_AMOUNT, DUMMY_RECIPIENT, DUMMY_USER, DUMMY_VALIDATOR_1,
};

// ============================================================================
// BALANCE LEDGER TESTS
// ============================================================================

/// Test credit and debit arithmetic
/// What is tested: Unknown accounts read 0, credit/debit adjust, overdraft fails
/// Why: Balances are the only representation of bridged value
#[test]
fn test_balance_ledger_arithmetic() {
    let mut ledger = BalanceLedger::new();
    let account = recipient();

    assert_eq!(ledger.get(&account), 0);
    assert_eq!(ledger.credit(&account, 700).unwrap(), 700);
    assert_eq!(ledger.debit(&account, 200).unwrap(), 500);
    assert_eq!(ledger.debit(&account, 501), Err(BridgeError::InsufficientBalance));
    assert_eq!(ledger.get(&account), 500);
}

/// Test overflow protection
/// What is tested: Crediting past u64::MAX fails InvalidAmount without changing the balance
/// Why: Arithmetic is checked, never wrapping
#[test]
fn test_balance_ledger_overflow() {
    let mut ledger = BalanceLedger::new();
    let account = recipient();
    ledger.credit(&account, u64::MAX).unwrap();
    assert_eq!(ledger.credited(&account, 1), Err(BridgeError::InvalidAmount));
    assert_eq!(ledger.credit(&account, 1), Err(BridgeError::InvalidAmount));
    assert_eq!(ledger.get(&account), u64::MAX);
}

// ============================================================================
// WITHDRAWAL TESTS
// ============================================================================

/// Test withdrawing with no balance
/// What is tested: withdraw(1000) by an account with balance 0 fails InsufficientBalance
/// Why: The balance check precedes the amount range check
#[test]
fn test_withdraw_without_balance() {
    let mut controller = new_controller();
    let result = controller.withdraw(&ctx(DUMMY_USER), 1_000, &payout_address());
    assert_eq!(result, Err(BridgeError::InsufficientBalance));
    assert!(controller.withdrawal_intents(0).is_empty());
}

/// Test a successful withdrawal
/// What is tested: Balance and pool total drop by the amount; an intent is recorded
/// Why: Withdrawals must mirror deposits in the pool total
#[test]
fn test_withdraw_debits_and_records_intent() {
    let mut controller = controller_with_balance(DUMMY_DEPOSIT_AMOUNT);

    let intent = controller
        .withdraw(&ctx_at(DUMMY_RECIPIENT, 3_000), 200_000, &payout_address())
        .unwrap();

    assert_eq!(controller.get_bridge_balance(&recipient()), 300_000);
    assert_eq!(controller.get_bridge_state().total_bridged_amount, 300_000);

    assert_eq!(intent.sequence, 0);
    assert_eq!(intent.event_type, WITHDRAWAL_EVENT_TYPE);
    assert_eq!(intent.sender, recipient());
    assert_eq!(intent.amount, 200_000);
    assert_eq!(intent.destination_address.as_bytes(), payout_address().as_slice());
    assert_eq!(intent.height, 3_000);
    assert_eq!(intent.id.len(), 64);
    assert_eq!(controller.withdrawal_intents(0), &[intent]);
}

/// Test the withdrawal intent log cursor
/// What is tested: withdrawal_intents(since) returns intents from that sequence on
/// Why: The relay agent polls incrementally
#[test]
fn test_withdrawal_intents_since() {
    let mut controller = controller_with_balance(DUMMY_DEPOSIT_AMOUNT);
    let caller = ctx(DUMMY_RECIPIENT);
    let first = controller.withdraw(&caller, 100_000, &payout_address()).unwrap();
    let second = controller.withdraw(&caller, 100_000, &payout_address()).unwrap();

    assert_eq!(second.sequence, 1);
    assert_ne!(first.id, second.id);
    assert_eq!(controller.withdrawal_intents(0).len(), 2);
    assert_eq!(controller.withdrawal_intents(1), &[second]);
    assert!(controller.withdrawal_intents(2).is_empty());
    assert!(controller.withdrawal_intents(u64::MAX).is_empty());
}

/// Test the amount range on withdrawal
/// What is tested: A covered but below-minimum amount fails InvalidAmount
/// Why: Withdrawals share the deposit range
#[test]
fn test_withdraw_amount_range() {
    let mut controller = controller_with_balance(DUMMY_DEPOSIT_AMOUNT);
    assert_eq!(
        controller.withdraw(&ctx(DUMMY_RECIPIENT), 50_000, &payout_address()),
        Err(BridgeError::InvalidAmount)
    );
    assert_eq!(controller.get_bridge_balance(&recipient()), DUMMY_DEPOSIT_AMOUNT);
}

/// Test payout address validation
/// What is tested: A 33-byte destination fails InvalidBtcAddress
/// Why: Funds must only be released to well-formed payout addresses
#[test]
fn test_withdraw_invalid_destination() {
    let mut controller = controller_with_balance(DUMMY_DEPOSIT_AMOUNT);
    assert_eq!(
        controller.withdraw(&ctx(DUMMY_RECIPIENT), 200_000, &[0x22u8; 33]),
        Err(BridgeError::InvalidBtcAddress)
    );
    assert_eq!(controller.get_bridge_balance(&recipient()), DUMMY_DEPOSIT_AMOUNT);
    assert_eq!(controller.get_bridge_state().total_bridged_amount, DUMMY_DEPOSIT_AMOUNT);
}

// ============================================================================
// EMERGENCY WITHDRAW TESTS
// ============================================================================

/// Test an emergency credit
/// What is tested: Recipient is credited, pool total unchanged, audit record kept
/// Why: The crisis path reallocates inside the pool without an outflow
#[test]
fn test_emergency_withdraw_credits_without_touching_total() {
    let mut controller = controller_with_balance(DUMMY_DEPOSIT_AMOUNT);
    let rescue = principal(DUMMY_USER);

    let new_balance = controller
        .emergency_withdraw(&ctx(DUMMY_ADMIN), 150_000, &rescue)
        .unwrap();

    assert_eq!(new_balance, 150_000);
    assert_eq!(controller.get_bridge_balance(&rescue), 150_000);
    assert_eq!(controller.get_bridge_state().total_bridged_amount, DUMMY_DEPOSIT_AMOUNT);

    let credits = controller.emergency_credits();
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].recipient, rescue);
    assert_eq!(credits[0].amount, 150_000);
    assert_eq!(credits[0].new_balance, 150_000);
}

/// Test emergency credit failures and their order
/// What is tested: NotAuthorized, then InsufficientBalance, then InvalidRecipientAddress, then InvalidAmount
/// Why: Failure kinds are reported in a fixed order and never change state
#[test]
fn test_emergency_withdraw_failures() {
    let mut controller = controller_with_balance(DUMMY_DEPOSIT_AMOUNT);
    let bogus = Principal::new("bogus");

    assert_eq!(
        controller.emergency_withdraw(&ctx(DUMMY_VALIDATOR_1), u64::MAX, &bogus),
        Err(BridgeError::NotAuthorized)
    );
    assert_eq!(
        controller.emergency_withdraw(&ctx(DUMMY_ADMIN), DUMMY_DEPOSIT_AMOUNT + 1, &bogus),
        Err(BridgeError::InsufficientBalance)
    );
    assert_eq!(
        controller.emergency_withdraw(&ctx(DUMMY_ADMIN), 1_000, &bogus),
        Err(BridgeError::InvalidRecipientAddress)
    );
    assert_eq!(
        controller.emergency_withdraw(&ctx(DUMMY_ADMIN), 0, &recipient()),
        Err(BridgeError::InvalidAmount)
    );

    assert_eq!(controller.get_bridge_balance(&recipient()), DUMMY_DEPOSIT_AMOUNT);
    assert!(controller.emergency_credits().is_empty());
}

/// Test the pool total after emergency credits
/// What is tested: Withdrawing emergency-credited value the pool no longer covers fails InsufficientBalance
/// Why: Emergency credits do not add to the total, so the total can fall short of balances
#[test]
fn test_withdraw_pool_total_underflow() {
    let mut controller = controller_with_balance(DUMMY_DEPOSIT_AMOUNT);
    let rescue = principal(DUMMY_USER);
    controller
        .emergency_withdraw(&ctx(DUMMY_ADMIN), DUMMY_DEPOSIT_AMOUNT, &rescue)
        .unwrap();

    controller
        .withdraw(&ctx(DUMMY_RECIPIENT), DUMMY_DEPOSIT_AMOUNT, &payout_address())
        .unwrap();
    assert_eq!(controller.get_bridge_state().total_bridged_amount, 0);

    assert_eq!(
        controller.withdraw(&ctx(DUMMY_USER), DUMMY_DEPOSIT_AMOUNT, &payout_address()),
        Err(BridgeError::InsufficientBalance)
    );
    assert_eq!(controller.get_bridge_balance(&rescue), DUMMY_DEPOSIT_AMOUNT);
    assert_eq!(controller.withdrawal_intents(0).len(), 1);
}
