//! End-to-end API tests against a server on an ephemeral port

use serde_json::{json, Value};
use solver_daemon::api::{create_router, AppState};
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    let app = create_router(AppState::new(), true);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

async fn post_solve(base: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}/solve"))
        .json(&body)
        .send()
        .await
        .expect("request");
    let status = response.status().as_u16();
    let body: Value = response.json().await.expect("json body");
    (status, body)
}

#[tokio::test]
async fn solve_evaluates_arithmetic_numerically() {
    let base = spawn_server().await;
    let (status, body) = post_solve(&base, json!({"expression": "2+2"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], "4.00000000000000");
}

#[tokio::test]
async fn solve_simplifies_symbolic_expressions() {
    let base = spawn_server().await;
    let (status, body) = post_solve(&base, json!({"expression": "x^2 + 2*x + 1"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], "x**2 + 2*x + 1");
}

#[tokio::test]
async fn solve_carries_out_integrals() {
    let base = spawn_server().await;
    let (status, body) = post_solve(&base, json!({"expression": "Integral(x**2, x)"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], "x**3/3");

    let (status, body) =
        post_solve(&base, json!({"expression": "Integral(x**2, (x, 0, 1))"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], "1/3");
}

#[tokio::test]
async fn solve_carries_out_derivatives() {
    let base = spawn_server().await;
    let (status, body) = post_solve(&base, json!({"expression": "Derivative(x**2, x)"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], "2*x");
}

#[tokio::test]
async fn missing_expression_is_a_client_error() {
    let base = spawn_server().await;
    let (status, body) = post_solve(&base, json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "No expression provided");
}

#[tokio::test]
async fn malformed_syntax_is_a_client_error() {
    let base = spawn_server().await;
    let (status, body) = post_solve(&base, json!({"expression": "2+*"})).await;
    assert_eq!(status, 400);
    let message = body["error"].as_str().expect("error field");
    assert!(message.starts_with("Invalid mathematical expression:"));
}

#[tokio::test]
async fn unsupported_evaluation_is_a_server_error() {
    let base = spawn_server().await;
    let (status, body) =
        post_solve(&base, json!({"expression": "Integral(exp(x**2), x)"})).await;
    assert_eq!(status, 500);
    let message = body["error"].as_str().expect("error field");
    assert!(message.starts_with("Server error:"));
}

#[tokio::test]
async fn health_is_fixed_and_idempotent() {
    let base = spawn_server().await;
    for _ in 0..2 {
        let response = reqwest::get(format!("{base}/health")).await.expect("request");
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.expect("json body");
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], "1.0.0");
    }
}

#[tokio::test]
async fn info_describes_the_service() {
    let base = spawn_server().await;
    let response = reqwest::get(format!("{base}/")).await.expect("request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["name"], "Symbolic Math Server");
    assert!(body["endpoints"]["/solve"].is_string());
    assert!(body["endpoints"]["/health"].is_string());
}

#[tokio::test]
async fn identical_requests_return_identical_results() {
    let base = spawn_server().await;
    let first = post_solve(&base, json!({"expression": "sin(1) + cos(1)"})).await;
    let second = post_solve(&base, json!({"expression": "sin(1) + cos(1)"})).await;
    assert_eq!(first, second);
}
