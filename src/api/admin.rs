//! Administrative API handlers
//!
//! Every endpoint here is restricted to the configured admin; the ledger
//! rejects other callers with `NotAuthorized` (HTTP 403).

use serde::{Deserialize, Serialize};

use crate::api::generic::{ok_reply, service_error_reply, JsonReply};
use crate::service::BridgeService;
use crate::types::Principal;

// ============================================================================
// REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Request body for `POST /admin/validators`.
#[derive(Debug, Deserialize)]
pub struct ValidatorRequest {
    pub identity: Principal,
}

/// Request body for `POST /admin/emergency-withdraw`.
#[derive(Debug, Deserialize)]
pub struct EmergencyWithdrawRequest {
    pub amount: u64,
    pub recipient: Principal,
}

/// Result of a validator add/remove.
#[derive(Debug, Serialize)]
pub struct ValidatorStatusView {
    pub identity: Principal,
    pub active: bool,
}

/// Result of an emergency credit.
#[derive(Debug, Serialize)]
pub struct EmergencyWithdrawView {
    pub recipient: Principal,
    pub amount: u64,
    pub new_balance: u64,
}

// ============================================================================
// API HANDLERS
// ============================================================================

pub async fn initialize_handler(
    caller: Principal,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    match service.initialize_bridge(&caller).await {
        Ok(()) => Ok(ok_reply(service.get_bridge_state().await)),
        Err(e) => Ok(service_error_reply(e)),
    }
}

pub async fn pause_handler(
    caller: Principal,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    match service.pause_bridge(&caller).await {
        Ok(()) => Ok(ok_reply(service.get_bridge_state().await)),
        Err(e) => Ok(service_error_reply(e)),
    }
}

pub async fn resume_handler(
    caller: Principal,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    match service.resume_bridge(&caller).await {
        Ok(()) => Ok(ok_reply(service.get_bridge_state().await)),
        Err(e) => Ok(service_error_reply(e)),
    }
}

pub async fn add_validator_handler(
    caller: Principal,
    request: ValidatorRequest,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    match service.add_validator(&caller, &request.identity).await {
        Ok(()) => Ok(ok_reply(ValidatorStatusView {
            identity: request.identity,
            active: true,
        })),
        Err(e) => Ok(service_error_reply(e)),
    }
}

pub async fn remove_validator_handler(
    identity: String,
    caller: Principal,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    let identity = Principal::new(identity);
    match service.remove_validator(&caller, &identity).await {
        Ok(()) => Ok(ok_reply(ValidatorStatusView {
            identity,
            active: false,
        })),
        Err(e) => Ok(service_error_reply(e)),
    }
}

/// Handler for the emergency credit.
///
/// Credits `recipient` directly from the pool without touching the pool
/// total. The resulting audit record is listed under `/admin/emergency-credits`.
pub async fn emergency_withdraw_handler(
    caller: Principal,
    request: EmergencyWithdrawRequest,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    match service
        .emergency_withdraw(&caller, request.amount, &request.recipient)
        .await
    {
        Ok(new_balance) => Ok(ok_reply(EmergencyWithdrawView {
            recipient: request.recipient,
            amount: request.amount,
            new_balance,
        })),
        Err(e) => Ok(service_error_reply(e)),
    }
}

pub async fn get_emergency_credits_handler(
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    Ok(ok_reply(service.emergency_credits().await))
}
