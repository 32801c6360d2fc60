//! Deposit API handlers
//!
//! Endpoints used by validators to register and confirm source-chain deposits,
//! and by anyone to inspect a deposit record.

use serde::{Deserialize, Serialize};
use tracing::debug;
use warp::http::StatusCode;

use crate::api::generic::{decode_field, error_reply, ok_reply, service_error_reply, JsonReply};
use crate::ledger::{Deposit, DepositStatus};
use crate::service::BridgeService;
use crate::types::{Principal, TxHash};

// ============================================================================
// REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Request body for `POST /deposits`.
#[derive(Debug, Deserialize)]
pub struct InitiateDepositRequest {
    /// Source-chain transaction hash (hex, 32 bytes)
    pub tx_hash: String,
    /// Amount in source-chain minor units
    pub amount: u64,
    /// Destination-chain account to credit
    pub recipient: Principal,
    /// Source-chain sender identity (hex, 33 bytes)
    pub source_sender: String,
}

/// Request body for `POST /deposits/:tx_hash/confirm`.
#[derive(Debug, Deserialize)]
pub struct ConfirmDepositRequest {
    /// Validator signature over the deposit (hex, 65 bytes)
    pub signature: String,
}

/// Deposit record as returned by `GET /deposits/:tx_hash`.
#[derive(Debug, Serialize)]
pub struct DepositView {
    pub tx_hash: TxHash,
    pub status: DepositStatus,
    #[serde(flatten)]
    pub deposit: Deposit,
    /// Validators that have confirmed this deposit
    pub signers: Vec<Principal>,
}

// ============================================================================
// API HANDLERS
// ============================================================================

/// Handler for registering a new deposit.
///
/// # Arguments
///
/// * `caller` - Identity from the caller header
/// * `request` - Deposit details
/// * `service` - The bridge service
///
/// # Returns
///
/// * `Ok(JsonReply)` - Registered deposit or ledger error
pub async fn initiate_deposit_handler(
    caller: Principal,
    request: InitiateDepositRequest,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    let tx_hash = match decode_field("tx_hash", &request.tx_hash) {
        Ok(bytes) => bytes,
        Err(reply) => return Ok(reply),
    };
    let source_sender = match decode_field("source_sender", &request.source_sender) {
        Ok(bytes) => bytes,
        Err(reply) => return Ok(reply),
    };

    debug!(
        "POST /deposits from {} for {} to {}",
        caller, request.amount, request.recipient
    );

    match service
        .initiate_deposit(
            &caller,
            &tx_hash,
            request.amount,
            &request.recipient,
            &source_sender,
        )
        .await
    {
        Ok(()) => match service.get_deposit(&tx_hash).await {
            Some(deposit) => Ok(ok_reply(deposit)),
            None => Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Deposit vanished after registration",
                None,
            )),
        },
        Err(e) => Ok(service_error_reply(e)),
    }
}

/// Handler for a validator confirmation.
///
/// Returns the confirmation outcome: `pending` while below the threshold,
/// `finalized` on the call that credited the recipient.
pub async fn confirm_deposit_handler(
    tx_hash: String,
    caller: Principal,
    request: ConfirmDepositRequest,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    let tx_hash = match decode_field("tx_hash", &tx_hash) {
        Ok(bytes) => bytes,
        Err(reply) => return Ok(reply),
    };
    let signature = match decode_field("signature", &request.signature) {
        Ok(bytes) => bytes,
        Err(reply) => return Ok(reply),
    };

    match service.confirm_deposit(&caller, &tx_hash, &signature).await {
        Ok(outcome) => Ok(ok_reply(outcome)),
        Err(e) => Ok(service_error_reply(e)),
    }
}

/// Handler for looking up a deposit by transaction hash.
pub async fn get_deposit_handler(
    tx_hash: String,
    service: BridgeService,
) -> Result<JsonReply, warp::Rejection> {
    let bytes = match decode_field("tx_hash", &tx_hash) {
        Ok(bytes) => bytes,
        Err(reply) => return Ok(reply),
    };

    let found = match TxHash::from_slice(&bytes) {
        Some(hash) => service
            .get_deposit_with_signers(&hash)
            .await
            .map(|(deposit, signers)| (hash, deposit, signers)),
        None => None,
    };
    let (hash, deposit, signers) = match found {
        Some(found) => found,
        None => {
            return Ok(error_reply(
                StatusCode::NOT_FOUND,
                format!("No deposit found for {}", tx_hash),
                None,
            ))
        }
    };

    Ok(ok_reply(DepositView {
        tx_hash: hash,
        status: deposit.status(),
        deposit,
        signers,
    }))
}
