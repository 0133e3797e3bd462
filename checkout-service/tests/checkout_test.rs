mod common;

use common::{TestApp, TEST_KEY_ID};
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn create_order_forwards_amount_in_paise() {
    let app = TestApp::spawn().await;

    // 500 rupees must reach Razorpay as 50000 paise with capture enabled.
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(basic_auth(TEST_KEY_ID, common::TEST_KEY_SECRET))
        .and(body_json(json!({
            "amount": 50000,
            "currency": "INR",
            "payment_capture": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_MkWk6PQeLyaTUH",
            "amount": 50000,
            "currency": "INR",
            "status": "created"
        })))
        .expect(1)
        .mount(&app.razorpay_server)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/create-order", app.address))
        .json(&json!({ "amount": 500 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Invalid response body");
    assert_eq!(body["order_id"], "order_MkWk6PQeLyaTUH");
    assert_eq!(body["amount"], 50000);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["key"], TEST_KEY_ID);
}

#[tokio::test]
async fn create_order_with_missing_amount_is_bad_request() {
    let app = TestApp::spawn().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/create-order", app.address))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.expect("Invalid response body");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn create_order_with_non_integer_amount_is_bad_request() {
    let app = TestApp::spawn().await;

    let client = reqwest::Client::new();
    for bad_amount in [json!("five hundred"), json!(12.5), json!(-3), json!(null)] {
        let body = json!({ "amount": bad_amount });
        let response = client
            .post(format!("{}/create-order", app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), 400, "body {} not rejected", body);
    }
}

#[tokio::test]
async fn create_order_with_zero_amount_is_bad_request() {
    let app = TestApp::spawn().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/create-order", app.address))
        .json(&json!({ "amount": 0 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn create_order_provider_failure_is_bad_gateway_without_detail() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {
                "code": "SERVER_ERROR",
                "description": "internal razorpay stack trace"
            }
        })))
        .mount(&app.razorpay_server)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/create-order", app.address))
        .json(&json!({ "amount": 100 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 502);

    let text = response.text().await.expect("Invalid response body");
    assert!(!text.contains("stack trace"), "provider detail leaked: {}", text);
}

#[tokio::test]
async fn verify_payment_accepts_valid_signature() {
    let app = TestApp::spawn().await;

    let signature = app.sign("order_123", "pay_456");

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/verify-payment", app.address))
        .json(&json!({
            "razorpay_order_id": "order_123",
            "razorpay_payment_id": "pay_456",
            "razorpay_signature": signature
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Invalid response body");
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn verify_payment_rejects_tampered_signature() {
    let app = TestApp::spawn().await;

    // Signature for a different payment id.
    let signature = app.sign("order_123", "pay_999");

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/verify-payment", app.address))
        .json(&json!({
            "razorpay_order_id": "order_123",
            "razorpay_payment_id": "pay_456",
            "razorpay_signature": signature
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Invalid response body");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn verify_payment_with_missing_fields_is_false_not_an_error() {
    let app = TestApp::spawn().await;

    let client = reqwest::Client::new();
    for body in [
        json!({}),
        json!({ "razorpay_order_id": "order_123" }),
        json!({
            "razorpay_order_id": "order_123",
            "razorpay_payment_id": "pay_456",
            "razorpay_signature": ""
        }),
    ] {
        let response = client
            .post(format!("{}/verify-payment", app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), 200);

        let parsed: serde_json::Value = response.json().await.expect("Invalid response body");
        assert_eq!(parsed["success"], false);
    }
}

#[tokio::test]
async fn verify_payment_with_malformed_body_is_false_not_an_error() {
    let app = TestApp::spawn().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/verify-payment", app.address))
        .header("content-type", "application/json")
        .body("not json at all")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);

    let parsed: serde_json::Value = response.json().await.expect("Invalid response body");
    assert_eq!(parsed["success"], false);
}
