//! Integration tests for the REST API
//!
//! These tests drive the warp routes in-process and verify status codes,
//! the response envelope, and the mapping of ledger errors to HTTP.

use bridge_ledger::api::{ApiResponse, ApiServer, CALLER_HEADER};
use bridge_ledger::service::BridgeService;
use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::test::request;

#[path = "mod.rs"]
mod test_helpers;

use test_helpers::{
    build_test_config, payout_address, signature, source_sender, tx_hash, DUMMY_ADMIN,
    DUMMY_DEPOSIT_AMOUNT, DUMMY_RECIPIENT, DUMMY_USER, DUMMY_VALIDATOR_1, DUMMY_VALIDATOR_2,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Create a test API server over an in-memory ledger
fn create_test_api_server() -> ApiServer {
    let config = build_test_config();
    let service = BridgeService::from_config(&config).unwrap();
    ApiServer::new(config, service)
}

fn parse(body: &[u8]) -> ApiResponse<Value> {
    serde_json::from_slice(body).unwrap()
}

fn deposit_body(seed: u8) -> Value {
    json!({
        "tx_hash": format!("0x{}", hex::encode(tx_hash(seed))),
        "amount": DUMMY_DEPOSIT_AMOUNT,
        "recipient": DUMMY_RECIPIENT,
        "source_sender": hex::encode(source_sender()),
    })
}

// ============================================================================
// QUERY ENDPOINT TESTS
// ============================================================================

/// Test the health endpoint
/// What is tested: GET /health returns a successful envelope
/// Why: Used by deployment probes
#[tokio::test]
async fn test_health() {
    let routes = create_test_api_server().test_routes();
    let response = request().method("GET").path("/health").reply(&routes).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse(response.body());
    assert!(body.success);
    assert!(body.error.is_none());
}

/// Test status, state, validator and amount queries on a fresh ledger
/// What is tested: Read-only endpoints return the expected values
/// Why: Monitoring relies on these queries
#[tokio::test]
async fn test_read_only_queries() {
    let routes = create_test_api_server().test_routes();

    let status = parse(request().path("/status").reply(&routes).await.body());
    assert_eq!(status.data.unwrap()["paused"], json!(false));

    let state = parse(request().path("/state").reply(&routes).await.body());
    assert_eq!(state.data.unwrap()["total_bridged_amount"], json!(0));

    let path = format!("/validators/{}", DUMMY_VALIDATOR_1);
    let validator = parse(request().path(&path).reply(&routes).await.body());
    assert_eq!(validator.data.unwrap()["active"], json!(true));

    let valid = parse(request().path("/amounts/50000/valid").reply(&routes).await.body());
    assert_eq!(valid.data.unwrap()["valid"], json!(false));

    let path = format!("/balances/{}", DUMMY_RECIPIENT);
    let balance = parse(request().path(&path).reply(&routes).await.body());
    assert_eq!(balance.data.unwrap()["balance"], json!(0));
}

/// Test unknown routes and deposits
/// What is tested: Unknown path and unknown deposit both return 404
/// Why: Clients must distinguish "no such resource" from ledger rejections
#[tokio::test]
async fn test_not_found() {
    let routes = create_test_api_server().test_routes();

    let response = request().path("/nope").reply(&routes).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let path = format!("/deposits/{}", hex::encode(tx_hash(9)));
    let response = request().path(&path).reply(&routes).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!parse(response.body()).success);
}

// ============================================================================
// DEPOSIT FLOW TESTS
// ============================================================================

/// Test the deposit flow over HTTP
/// What is tested: Register, look up, confirm, and check the credited balance
/// Why: This is the path validators take for every deposit
#[tokio::test]
async fn test_deposit_flow() {
    let routes = create_test_api_server().test_routes();

    let response = request()
        .method("POST")
        .path("/deposits")
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .json(&deposit_body(1))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse(response.body());
    assert_eq!(body.data.unwrap()["processed"], json!(false));

    let hash_hex = hex::encode(tx_hash(1));
    let response = request()
        .method("POST")
        .path(&format!("/deposits/{}/confirm", hash_hex))
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .json(&json!({ "signature": hex::encode(signature(1)) }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = parse(response.body()).data.unwrap();
    assert_eq!(outcome["status"], json!("finalized"));
    assert_eq!(outcome["amount"], json!(DUMMY_DEPOSIT_AMOUNT));

    let response = request()
        .path(&format!("/deposits/{}", hash_hex))
        .reply(&routes)
        .await;
    let deposit = parse(response.body()).data.unwrap();
    assert_eq!(deposit["status"], json!("processed"));
    assert_eq!(deposit["confirmations"], json!(1));
    assert_eq!(deposit["signers"], json!([DUMMY_VALIDATOR_1]));

    let response = request()
        .path(&format!("/balances/{}", DUMMY_RECIPIENT))
        .reply(&routes)
        .await;
    assert_eq!(
        parse(response.body()).data.unwrap()["balance"],
        json!(DUMMY_DEPOSIT_AMOUNT)
    );
}

/// Test ledger error mapping
/// What is tested: NotAuthorized -> 403, AlreadyProcessed -> 409, InvalidAmount -> 400, with codes
/// Why: External agents branch on the HTTP status and numeric code
#[tokio::test]
async fn test_ledger_error_mapping() {
    let routes = create_test_api_server().test_routes();

    let response = request()
        .method("POST")
        .path("/deposits")
        .header(CALLER_HEADER, DUMMY_USER)
        .json(&deposit_body(1))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = parse(response.body());
    assert!(!body.success);
    assert_eq!(body.code, Some(100));

    let mut low = deposit_body(2);
    low["amount"] = json!(50_000);
    let response = request()
        .method("POST")
        .path("/deposits")
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .json(&low)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse(response.body()).code, Some(101));

    for expected in [StatusCode::OK, StatusCode::CONFLICT] {
        let response = request()
            .method("POST")
            .path("/deposits")
            .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
            .json(&deposit_body(3))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), expected);
    }
}

/// Test request validation before the ledger
/// What is tested: Missing caller header -> 401, invalid JSON and invalid hex -> 400
/// Why: Malformed requests must never reach the ledger
#[tokio::test]
async fn test_malformed_requests() {
    let routes = create_test_api_server().test_routes();

    let response = request()
        .method("POST")
        .path("/deposits")
        .json(&deposit_body(1))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = request()
        .method("POST")
        .path("/deposits")
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .body("invalid{")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(parse(response.body()).error.unwrap().contains("Invalid JSON"));

    let mut bad_hex = deposit_body(1);
    bad_hex["tx_hash"] = json!("0xnothex");
    let response = request()
        .method("POST")
        .path("/deposits")
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .json(&bad_hex)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(parse(response.body()).error.unwrap().contains("tx_hash"));
}

// ============================================================================
// ADMIN AND WITHDRAWAL TESTS
// ============================================================================

/// Test pause over HTTP
/// What is tested: Admin pauses, deposit then fails with 503, resume restores service
/// Why: Operators use the breaker through the API during incidents
#[tokio::test]
async fn test_pause_and_resume() {
    let routes = create_test_api_server().test_routes();

    let response = request()
        .method("POST")
        .path("/admin/pause")
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = request()
        .method("POST")
        .path("/admin/pause")
        .header(CALLER_HEADER, DUMMY_ADMIN)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse(response.body()).data.unwrap()["paused"], json!(true));

    let response = request()
        .method("POST")
        .path("/deposits")
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .json(&deposit_body(1))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(parse(response.body()).code, Some(106));

    let response = request()
        .method("POST")
        .path("/admin/resume")
        .header(CALLER_HEADER, DUMMY_ADMIN)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse(response.body()).data.unwrap()["paused"], json!(false));
}

/// Test validator management over HTTP
/// What is tested: POST adds, DELETE removes, status endpoint follows
/// Why: The validator set is governed through these endpoints
#[tokio::test]
async fn test_validator_management() {
    let routes = create_test_api_server().test_routes();

    let response = request()
        .method("POST")
        .path("/admin/validators")
        .header(CALLER_HEADER, DUMMY_ADMIN)
        .json(&json!({ "identity": DUMMY_VALIDATOR_2 }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let path = format!("/validators/{}", DUMMY_VALIDATOR_2);
    let status = parse(request().path(&path).reply(&routes).await.body());
    assert_eq!(status.data.unwrap()["active"], json!(true));

    let response = request()
        .method("DELETE")
        .path(&format!("/admin/validators/{}", DUMMY_VALIDATOR_2))
        .header(CALLER_HEADER, DUMMY_ADMIN)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let status = parse(request().path(&path).reply(&routes).await.body());
    assert_eq!(status.data.unwrap()["active"], json!(false));

    let response = request()
        .method("POST")
        .path("/admin/validators")
        .header(CALLER_HEADER, DUMMY_ADMIN)
        .json(&json!({ "identity": "not-a-principal" }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse(response.body()).code, Some(107));
}

/// Test withdrawal and the intent feed over HTTP
/// What is tested: Funded account withdraws; intent appears under /withdrawals
/// Why: The source-chain agent consumes the intent feed
#[tokio::test]
async fn test_withdraw_and_intent_feed() {
    let routes = create_test_api_server().test_routes();

    request()
        .method("POST")
        .path("/deposits")
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .json(&deposit_body(1))
        .reply(&routes)
        .await;
    request()
        .method("POST")
        .path(&format!("/deposits/{}/confirm", hex::encode(tx_hash(1))))
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .json(&json!({ "signature": hex::encode(signature(1)) }))
        .reply(&routes)
        .await;

    let response = request()
        .method("POST")
        .path("/withdraw")
        .header(CALLER_HEADER, DUMMY_RECIPIENT)
        .json(&json!({
            "amount": 200_000,
            "destination_address": hex::encode(payout_address()),
        }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let intent = parse(response.body()).data.unwrap();
    assert_eq!(intent["event_type"], json!("withdrawal"));
    assert_eq!(intent["sequence"], json!(0));

    let feed = parse(request().path("/withdrawals").reply(&routes).await.body());
    assert_eq!(feed.data.unwrap().as_array().unwrap().len(), 1);

    let feed = parse(request().path("/withdrawals?since=1").reply(&routes).await.body());
    assert!(feed.data.unwrap().as_array().unwrap().is_empty());

    let response = request()
        .method("POST")
        .path("/withdraw")
        .header(CALLER_HEADER, DUMMY_USER)
        .json(&json!({
            "amount": 1_000,
            "destination_address": hex::encode(payout_address()),
        }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse(response.body()).code, Some(102));
}

/// Test the emergency credit and height endpoints
/// What is tested: Admin emergency credit returns the new balance; height is monotonic
/// Why: Crisis recovery and the height feed are operator-facing
#[tokio::test]
async fn test_emergency_and_height() {
    let routes = create_test_api_server().test_routes();

    let response = request()
        .method("POST")
        .path("/height")
        .json(&json!({ "block_height": 900 }))
        .reply(&routes)
        .await;
    assert_eq!(parse(response.body()).data.unwrap()["block_height"], json!(900));

    let response = request()
        .method("POST")
        .path("/height")
        .json(&json!({ "block_height": 100 }))
        .reply(&routes)
        .await;
    assert_eq!(parse(response.body()).data.unwrap()["block_height"], json!(900));

    // Empty pool: nothing to reallocate
    let response = request()
        .method("POST")
        .path("/admin/emergency-withdraw")
        .header(CALLER_HEADER, DUMMY_ADMIN)
        .json(&json!({ "amount": 1_000, "recipient": DUMMY_USER }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse(response.body()).code, Some(102));

    request()
        .method("POST")
        .path("/deposits")
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .json(&deposit_body(1))
        .reply(&routes)
        .await;
    request()
        .method("POST")
        .path(&format!("/deposits/{}/confirm", hex::encode(tx_hash(1))))
        .header(CALLER_HEADER, DUMMY_VALIDATOR_1)
        .json(&json!({ "signature": hex::encode(signature(1)) }))
        .reply(&routes)
        .await;

    let response = request()
        .method("POST")
        .path("/admin/emergency-withdraw")
        .header(CALLER_HEADER, DUMMY_ADMIN)
        .json(&json!({ "amount": 1_000, "recipient": DUMMY_USER }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse(response.body()).data.unwrap()["new_balance"], json!(1_000));

    let log = parse(request().path("/admin/emergency-credits").reply(&routes).await.body());
    assert_eq!(log.data.unwrap().as_array().unwrap().len(), 1);
}
