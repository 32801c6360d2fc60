//! Account and status API handlers
//!
//! Balance and validator lookups, withdrawals, bridge status and the
//! block-height feed from the chain-monitoring agent.

use serde::{Deserialize, Serialize};

use crate::api::generic::{decode_field, ok_reply, service_error_reply, JsonReply};
use crate::service::BridgeService;
use crate::types::Principal;

// ============================================================================
// REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Request body for `POST /withdraw`.
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    /// Amount in source-chain minor units
    pub amount: u64,
    /// Source-chain payout address (hex, 34 bytes)
    pub destination_address: String,
}

/// Request body for `POST /height`.
#[derive(Debug, Deserialize)]
pub struct BlockHeightRequest {
    pub block_height: u64,
}

/// Query string for `GET /withdrawals`.
#[derive(Debug, Default, Deserialize)]
pub struct WithdrawalsQuery {
    /// Only intents with a sequence number at or above this value
    pub since: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub paused: bool,
}

#[derive(Debug, Serialize)]
pub struct HeightView {
    pub block_height: u64,
}

#[derive(Debug, Serialize)]
pub struct BalanceView {
    pub account: Principal,
    pub balance: u64,
}

#[derive(Debug, Serialize)]
pub struct ValidatorView {
    pub identity: Principal,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct AmountView {
    pub amount: u64,
    pub valid: bool,
}

// ============================================================================
// API HANDLERS
// ============================================================================

pub async fn get_status_handler(service: BridgeService) -> Result<JsonReply, warp::Rejection> {
    Ok(ok_reply(StatusView {
        paused: service.get_bridge_status().await,
    }))
}

pub async fn get_state_handler(service: BridgeService) -> Result<JsonReply, warp::Rejection> {
    Ok(ok_reply(service.get_bridge_state().await))
}

/// Handler for the height feed. Lower heights than the current one are ignored.
pub async fn set_height_handler(
    request: BlockHeightRequest,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    Ok(ok_reply(HeightView {
        block_height: service.set_block_height(request.block_height),
    }))
}

pub async fn get_validator_status_handler(
    identity: String,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    let identity = Principal::new(identity);
    let active = service.get_validator_status(&identity).await;
    Ok(ok_reply(ValidatorView { identity, active }))
}

pub async fn get_balance_handler(
    account: String,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    let account = Principal::new(account);
    let balance = service.get_bridge_balance(&account).await;
    Ok(ok_reply(BalanceView { account, balance }))
}

pub async fn validate_amount_handler(
    amount: u64,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    Ok(ok_reply(AmountView {
        amount,
        valid: service.validate_deposit_amount(amount).await,
    }))
}

/// Handler for a withdrawal.
///
/// Debits the caller and returns the withdrawal intent the source-chain
/// agent acts on.
pub async fn withdraw_handler(
    caller: Principal,
    request: WithdrawRequest,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    let destination = match decode_field("destination_address", &request.destination_address) {
        Ok(bytes) => bytes,
        Err(reply) => return Ok(reply),
    };

    match service.withdraw(&caller, request.amount, &destination).await {
        Ok(intent) => Ok(ok_reply(intent)),
        Err(e) => Ok(service_error_reply(e)),
    }
}

pub async fn get_withdrawals_handler(
    query: WithdrawalsQuery,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    let intents = service.withdrawal_intents(query.since.unwrap_or(0)).await;
    Ok(ok_reply(intents))
}
