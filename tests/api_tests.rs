mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use swap_analyzer::api::router::create_router;
use swap_analyzer::config::AppConfig;

use common::{build_state, make_swap, test_config, FakeHistory, FakePrices, FakeQuotes, WALLET};

fn build_test_app(config: AppConfig) -> axum::Router {
    let history = Arc::new(FakeHistory::with_swaps(vec![
        make_swap("0xaaa", 1, "Uniswap V3", 100_000, 50),
        make_swap("0xbbb", 2, "Uniswap V3", 100_000, 50),
    ]));
    let mut prices = FakePrices::with_spot(&[("WETH", 3_000), ("ETH", 3_100)]);
    prices.historical.insert(
        ("ETH".into(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
        Decimal::new(252_512, 2),
    );

    let state = build_state(
        config,
        history,
        Arc::new(FakeQuotes::new(80_000)),
        Arc::new(prices),
    );
    create_router(state)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn rpc(app: axum::Router, body: Value) -> Value {
    let resp = app.oneshot(post_json("/mcp", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

/// Decode the payload carried in a `tools/call` text envelope.
fn tool_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["duneConfigured"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"],
        "text/plain; version=0.0.4"
    );
}

#[tokio::test]
async fn test_initialize_and_ping() {
    let app = build_test_app(test_config());

    let init = rpc(
        app.clone(),
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;
    assert_eq!(init["id"], 1);
    assert_eq!(init["result"]["serverInfo"]["name"], "swap-analyzer");

    let ping = rpc(app, json!({"jsonrpc": "2.0", "id": "p", "method": "ping"})).await;
    assert_eq!(ping["id"], "p");
    assert_eq!(ping["result"], json!({}));
}

#[tokio::test]
async fn test_tools_list() {
    let app = build_test_app(test_config());

    let resp = rpc(app, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})).await;
    let names: Vec<_> = resp["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(
        names,
        vec![
            "get_user_transactions",
            "compare_with_1inch",
            "generate_swap_report",
            "get_token_price"
        ]
    );
    assert_eq!(
        resp["result"]["tools"][0]["inputSchema"]["required"],
        json!(["walletAddress"])
    );
}

#[tokio::test]
async fn test_unknown_method_and_tool() {
    let app = build_test_app(test_config());

    let resp = rpc(
        app.clone(),
        json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32601);

    let resp = rpc(
        app.clone(),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
               "params": {"name": "swap_now", "arguments": {}}}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
    assert!(resp.get("result").is_none());

    // A known tool with missing arguments fails in the payload.
    let resp = rpc(
        app,
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "compare_with_1inch", "arguments": {}}}),
    )
    .await;
    assert!(resp.get("error").is_none());
    assert_eq!(resp["result"]["isError"], true);
    let payload = tool_payload(&resp);
    assert_eq!(payload["success"], false);
    assert_eq!(payload["errorKind"], "InvalidInput");
    assert_eq!(payload["message"], "Failed to compare transactions with 1inch");
}

#[tokio::test]
async fn test_mistyped_wallet_argument_is_invalid_input() {
    let app = build_test_app(test_config());

    let resp = rpc(
        app.clone(),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
               "params": {"name": "get_user_transactions",
                          "arguments": {"walletAddress": 12345}}}),
    )
    .await;
    assert!(resp.get("error").is_none());
    assert_eq!(resp["result"]["isError"], true);
    let payload = tool_payload(&resp);
    assert_eq!(payload["success"], false);
    assert_eq!(payload["errorKind"], "InvalidInput");
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("get_user_transactions"));

    let resp = app
        .oneshot(post_json("/api/tools/generate_swap_report", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["errorKind"], "InvalidInput");
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(resp).await;
    assert_eq!(json["error"]["code"], -32700);
    assert_eq!(json["id"], Value::Null);
}

#[tokio::test]
async fn test_notification_is_accepted_without_body() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_tools_call_get_user_transactions() {
    let app = build_test_app(test_config());

    let resp = rpc(
        app,
        json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call",
               "params": {"name": "get_user_transactions",
                          "arguments": {"walletAddress": WALLET, "limit": 1}}}),
    )
    .await;

    assert_eq!(resp["result"]["isError"], false);
    assert_eq!(resp["result"]["content"][0]["type"], "text");

    let payload = tool_payload(&resp);
    assert_eq!(payload["success"], true);
    assert_eq!(payload["data"].as_array().unwrap().len(), 1);
    assert_eq!(payload["data"][0]["hash"], "0xaaa");
    assert_eq!(payload["message"], "Found 1 swap transactions");
}

#[tokio::test]
async fn test_tool_failure_is_payload_not_fault() {
    let app = build_test_app(test_config());

    let resp = rpc(
        app,
        json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call",
               "params": {"name": "generate_swap_report",
                          "arguments": {"walletAddress": "0x123"}}}),
    )
    .await;

    assert!(resp.get("error").is_none());
    assert_eq!(resp["result"]["isError"], true);

    let payload = tool_payload(&resp);
    assert_eq!(payload["success"], false);
    assert_eq!(payload["errorKind"], "InvalidInput");
    assert_eq!(payload["message"], "Failed to generate swap report");
    assert!(payload["error"].as_str().unwrap().contains("0x123"));
}

#[tokio::test]
async fn test_rest_compare_with_1inch() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(post_json(
            "/api/tools/compare_with_1inch",
            json!({"walletAddress": WALLET}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["totalTransactions"], 2);
    assert_eq!(json["data"]["totalActualGasCost"], "10000000");
    assert_eq!(json["data"]["gasSavingsPotential"], "2000000");
    assert_eq!(json["data"]["detailedComparisons"][0]["optimalDex"], "UNISWAP_V3");
}

#[tokio::test]
async fn test_rest_generate_swap_report() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(post_json(
            "/api/tools/generate_swap_report",
            json!({"walletAddress": WALLET}),
        ))
        .await
        .unwrap();

    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["summary"]["totalSwaps"], 2);
    assert_eq!(json["data"]["summary"]["mostUsedDex"], "Uniswap V3");
    assert_eq!(json["data"]["summary"]["totalVolumeUsd"], "6000");
    assert!(json["data"]["generatedAt"].is_string());
}

#[tokio::test]
async fn test_rest_unknown_tool_is_not_found() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(post_json("/api/tools/swap_now", json!({})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["errorKind"], "NotFound");
}

#[tokio::test]
async fn test_token_price_spot_and_historical() {
    let app = build_test_app(test_config());

    let resp = app
        .clone()
        .oneshot(post_json("/api/tools/get_token_price", json!({"symbol": "eth"})))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["symbol"], "ETH");
    assert_eq!(json["data"]["priceUsd"], "3100");
    assert!(json["data"].get("date").is_none());

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/tools/get_token_price",
            json!({"symbol": "ETH", "date": "2024-01-15"}),
        ))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["data"]["priceUsd"], "2525.12");
    assert_eq!(json["data"]["date"], "2024-01-15");

    let resp = app
        .oneshot(post_json(
            "/api/tools/get_token_price",
            json!({"symbol": "ETH", "date": "15-01-2024"}),
        ))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["errorKind"], "InvalidInput");
}

#[tokio::test]
async fn test_token_price_unknown_symbol() {
    let app = build_test_app(test_config());

    let resp = app
        .oneshot(post_json("/api/tools/get_token_price", json!({"symbol": "NOPE"})))
        .await
        .unwrap();

    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["errorKind"], "NotFound");
}

#[tokio::test]
async fn test_auth_required_when_token_set() {
    let app = build_test_app(AppConfig {
        api_token: Some("secret".into()),
        ..test_config()
    });

    let resp = app
        .clone()
        .oneshot(post_json("/mcp", json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let mut authed = post_json("/mcp", json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}));
    authed
        .headers_mut()
        .insert("authorization", "Bearer secret".parse().unwrap());
    let resp = app.clone().oneshot(authed).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let mut wrong = post_json("/api/tools/get_token_price", json!({"symbol": "ETH"}));
    wrong
        .headers_mut()
        .insert("authorization", "Bearer nope".parse().unwrap());
    let resp = app.clone().oneshot(wrong).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
