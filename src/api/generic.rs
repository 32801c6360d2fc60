//! Generic API structures and handlers
//!
//! This module contains the shared response envelope, error mapping, warp filter
//! helpers, the global rejection handler and the API server itself. Endpoint
//! handlers live in the per-area modules next to this one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{error, info};
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::config::Config;
use crate::error::BridgeError;
use crate::service::{BridgeService, ServiceError};
use crate::types::{decode_hex, Principal};

/// Header carrying the destination-chain identity of the caller
pub const CALLER_HEADER: &str = "x-bridge-caller";

// ============================================================================
// SHARED REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Standardized response structure for all API endpoints.
///
/// This structure provides a consistent response format for all API endpoints,
/// including success/error status and relevant data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    pub data: Option<T>,
    /// Error message (if failed)
    pub error: Option<String>,
    /// Numeric ledger error code (if the ledger rejected the call)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>, code: Option<u32>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code,
        }
    }
}

/// Reply type shared by every handler.
pub type JsonReply = warp::reply::WithStatus<warp::reply::Json>;

/// Wraps `data` in a successful envelope with HTTP 200.
pub fn ok_reply<T: Serialize>(data: T) -> JsonReply {
    warp::reply::with_status(warp::reply::json(&ApiResponse::ok(data)), StatusCode::OK)
}

/// Builds a failed envelope with the given status.
pub fn error_reply(status: StatusCode, message: impl Into<String>, code: Option<u32>) -> JsonReply {
    warp::reply::with_status(
        warp::reply::json(&ApiResponse::failure(message, code)),
        status,
    )
}

/// HTTP status a ledger rejection is reported with.
pub fn status_for(err: BridgeError) -> StatusCode {
    match err {
        BridgeError::NotAuthorized => StatusCode::FORBIDDEN,
        BridgeError::AlreadyProcessed => StatusCode::CONFLICT,
        BridgeError::BridgePaused => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Converts a service failure into an error reply.
pub fn service_error_reply(err: ServiceError) -> JsonReply {
    match err {
        ServiceError::Ledger(err) => error_reply(status_for(err), err.to_string(), Some(err.code())),
        ServiceError::Persistence(e) => {
            error!("Persistence failure: {:#}", e);
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to persist ledger state",
                None,
            )
        }
    }
}

/// Decodes a hex request field, naming the field on failure.
pub fn decode_field(field: &str, value: &str) -> Result<Vec<u8>, JsonReply> {
    decode_hex(value).map_err(|e| {
        error_reply(
            StatusCode::BAD_REQUEST,
            format!("Invalid hex in '{}': {}", field, e),
            None,
        )
    })
}

// ============================================================================
// WARP FILTER HELPERS
// ============================================================================

/// Creates a warp filter that provides access to the bridge service.
///
/// # Arguments
///
/// * `service` - The shared bridge service
///
/// # Returns
///
/// A warp filter that provides the service to handlers
pub fn with_service(
    service: BridgeService,
) -> impl Filter<Extract = (BridgeService,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// Extracts the calling identity from the `x-bridge-caller` header.
pub fn with_caller() -> impl Filter<Extract = (Principal,), Error = Rejection> + Clone {
    warp::header::<String>(CALLER_HEADER).map(Principal::new)
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Global rejection handler for all API routes.
///
/// This function handles all warp rejections and converts them into
/// standardized API responses with appropriate HTTP status codes.
///
/// # Arguments
///
/// * `rej` - The warp rejection to handle
///
/// # Returns
///
/// A warp reply with an error response
pub async fn handle_rejection(rej: Rejection) -> Result<impl Reply, std::convert::Infallible> {
    let (status, message) = if let Some(err) = rej.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", err))
    } else if let Some(err) = rej.find::<warp::reject::MissingHeader>() {
        (
            StatusCode::UNAUTHORIZED,
            format!("Missing {} header", err.name()),
        )
    } else if let Some(err) = rej.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, format!("Invalid query: {}", err))
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
    } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", rej);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(error_reply(status, message, None))
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// REST API server for the bridge ledger.
///
/// Exposes the ledger operations to validators, the administrator and
/// account holders, plus read-only queries for monitoring.
pub struct ApiServer {
    /// Service configuration
    config: Arc<Config>,
    /// Shared ledger service
    service: BridgeService,
}

impl ApiServer {
    /// Creates a new API server over the given service.
    pub fn new(config: Config, service: BridgeService) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }

    /// Starts the API server and begins handling HTTP requests.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Server stopped
    /// * `Err(anyhow::Error)` - Configured host is not a valid IP address
    pub async fn run(&self) -> Result<()> {
        let host: IpAddr = self
            .config
            .api
            .host
            .parse()
            .with_context(|| format!("Invalid API host '{}'", self.config.api.host))?;
        let addr = SocketAddr::new(host, self.config.api.port);

        info!("Starting API server on {}", addr);

        let cors = warp::cors()
            .allow_origins(self.config.api.cors_origins.iter().map(String::as_str))
            .allow_methods(vec!["GET", "POST", "DELETE"])
            .allow_headers(vec!["content-type", CALLER_HEADER]);

        warp::serve(self.create_routes().with(cors)).run(addr).await;

        Ok(())
    }

    /// Creates all API routes for the server.
    ///
    /// # Returns
    ///
    /// A warp filter containing all API routes
    pub(crate) fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        use super::{accounts, admin, deposits};

        let service = self.service.clone();

        // Health check endpoint - returns service status
        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .map(|| ok_reply("Bridge ledger is running"));

        // GET /status - whether the circuit breaker is engaged
        let status = warp::path("status")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_service(service.clone()))
            .and_then(accounts::get_status_handler);

        // GET /state - paused flag, pool total and last processed height
        let state = warp::path("state")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_service(service.clone()))
            .and_then(accounts::get_state_handler);

        // POST /height - chain-monitoring agent reports the destination-chain height
        let height = warp::path("height")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(with_service(service.clone()))
            .and_then(accounts::set_height_handler);

        // POST /deposits - validator registers a source-chain deposit
        let initiate = warp::path("deposits")
            .and(warp::path::end())
            .and(warp::post())
            .and(with_caller())
            .and(warp::body::json())
            .and(with_service(service.clone()))
            .and_then(deposits::initiate_deposit_handler);

        // GET /deposits/:tx_hash
        let get_deposit = warp::path("deposits")
            .and(warp::path::param())
            .and(warp::path::end())
            .and(warp::get())
            .and(with_service(service.clone()))
            .and_then(deposits::get_deposit_handler);

        // POST /deposits/:tx_hash/confirm - validator submits its signature
        let confirm = warp::path("deposits")
            .and(warp::path::param())
            .and(warp::path("confirm"))
            .and(warp::path::end())
            .and(warp::post())
            .and(with_caller())
            .and(warp::body::json())
            .and(with_service(service.clone()))
            .and_then(deposits::confirm_deposit_handler);

        // GET /validators/:identity
        let validator_status = warp::path("validators")
            .and(warp::path::param())
            .and(warp::path::end())
            .and(warp::get())
            .and(with_service(service.clone()))
            .and_then(accounts::get_validator_status_handler);

        // GET /balances/:account
        let balance = warp::path("balances")
            .and(warp::path::param())
            .and(warp::path::end())
            .and(warp::get())
            .and(with_service(service.clone()))
            .and_then(accounts::get_balance_handler);

        // GET /amounts/:amount/valid
        let amount_valid = warp::path("amounts")
            .and(warp::path::param())
            .and(warp::path("valid"))
            .and(warp::path::end())
            .and(warp::get())
            .and(with_service(service.clone()))
            .and_then(accounts::validate_amount_handler);

        // POST /withdraw - account holder burns balance for a source-chain payout
        let withdraw = warp::path("withdraw")
            .and(warp::path::end())
            .and(warp::post())
            .and(with_caller())
            .and(warp::body::json())
            .and(with_service(service.clone()))
            .and_then(accounts::withdraw_handler);

        // GET /withdrawals?since=N - payout intents for the source-chain agent
        let withdrawals = warp::path("withdrawals")
            .and(warp::path::end())
            .and(warp::get())
            .and(warp::query::<accounts::WithdrawalsQuery>())
            .and(with_service(service.clone()))
            .and_then(accounts::get_withdrawals_handler);

        // Admin endpoints
        let initialize = warp::path!("admin" / "initialize")
            .and(warp::post())
            .and(with_caller())
            .and(with_service(service.clone()))
            .and_then(admin::initialize_handler);

        let pause = warp::path!("admin" / "pause")
            .and(warp::post())
            .and(with_caller())
            .and(with_service(service.clone()))
            .and_then(admin::pause_handler);

        let resume = warp::path!("admin" / "resume")
            .and(warp::post())
            .and(with_caller())
            .and(with_service(service.clone()))
            .and_then(admin::resume_handler);

        let add_validator = warp::path!("admin" / "validators")
            .and(warp::post())
            .and(with_caller())
            .and(warp::body::json())
            .and(with_service(service.clone()))
            .and_then(admin::add_validator_handler);

        let remove_validator = warp::path!("admin" / "validators" / String)
            .and(warp::delete())
            .and(with_caller())
            .and(with_service(service.clone()))
            .and_then(admin::remove_validator_handler);

        let emergency = warp::path!("admin" / "emergency-withdraw")
            .and(warp::post())
            .and(with_caller())
            .and(warp::body::json())
            .and(with_service(service.clone()))
            .and_then(admin::emergency_withdraw_handler);

        let emergency_log = warp::path!("admin" / "emergency-credits")
            .and(warp::get())
            .and(with_service(service))
            .and_then(admin::get_emergency_credits_handler);

        // Combine all routes and apply rejection handler
        health
            .or(status)
            .or(state)
            .or(height)
            .or(initiate)
            .or(get_deposit)
            .or(confirm)
            .or(validator_status)
            .or(balance)
            .or(amount_valid)
            .or(withdraw)
            .or(withdrawals)
            .or(initialize)
            .or(pause)
            .or(resume)
            .or(add_validator)
            .or(remove_validator)
            .or(emergency)
            .or(emergency_log)
            .recover(handle_rejection)
    }

    /// Public method for testing - exposes routes for integration tests
    #[allow(dead_code)] // Used by tests
    pub fn test_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        self.create_routes()
    }
}
