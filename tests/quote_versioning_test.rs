//! Tests for quote creation, cloning, and in-place revision.
//!
//! Cloning produces an independent draft under a fresh reference without
//! touching the source's version flags; revising bumps the version inside
//! the same reference and keeps exactly one latest version per reference.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn create_quote_computes_total_from_line_items() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Acme Fabrication", "acme@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "customer_id": customer_id,
                "title": "Laser-cut panels",
                "line_items": [
                    { "description": "Panel", "quantity": 4, "unit_price": "25.00" },
                    { "description": "Fasteners", "quantity": 10, "unit_price": "1.50" }
                ]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let quote = &body["data"];
    assert_eq!(quote["status"], "draft");
    assert_eq!(quote["version_number"], 1);
    assert_eq!(quote["is_latest_version"], true);
    assert!(quote["parent_quote_id"].is_null());
    assert_eq!(decimal(&quote["total_amount"]), dec!(115));
    assert_eq!(quote["line_items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_quote_without_line_items_is_rejected() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Empty Quote Co", "empty@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "customer_id": customer_id,
                "title": "Nothing in here",
                "line_items": []
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("at least one line item"));
}

#[tokio::test]
async fn create_quote_for_unknown_customer_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "customer_id": uuid::Uuid::new_v4(),
                "title": "Orphan quote",
                "line_items": [
                    { "description": "Widget", "quantity": 1, "unit_price": "5" }
                ]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clone_creates_independent_draft_and_leaves_source_untouched() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Clone Co", "clone@example.com").await;
    let quote = app.seed_quote(customer_id).await;
    let quote_id = quote["id"].as_str().unwrap();

    // Approve the source first: cloning must produce a draft regardless.
    app.approve_quote(quote_id).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotes/{quote_id}/clone"),
            Some(json!({})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let clone = &body["data"];

    assert_eq!(clone["status"], "draft");
    assert_eq!(clone["version_number"], 1);
    assert_eq!(clone["is_latest_version"], true);
    assert_eq!(clone["parent_quote_id"], quote["id"]);
    assert_ne!(clone["quote_reference"], quote["quote_reference"]);
    assert_eq!(
        clone["line_items"].as_array().unwrap().len(),
        quote["line_items"].as_array().unwrap().len()
    );

    // Source keeps its status and latest flag.
    let source = response_json(
        app.request(Method::GET, &format!("/api/v1/quotes/{quote_id}"), None)
            .await,
    )
    .await;
    assert_eq!(source["data"]["status"], "approved");
    assert_eq!(source["data"]["is_latest_version"], true);
}

#[tokio::test]
async fn clone_of_missing_quote_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotes/{}/clone", uuid::Uuid::new_v4()),
            Some(json!({})),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn revision_chain_keeps_exactly_one_latest_version() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Rev Co", "rev@example.com").await;
    let quote = app.seed_quote(customer_id).await;
    let quote_id = quote["id"].as_str().unwrap().to_string();
    let reference = quote["quote_reference"].as_str().unwrap().to_string();

    // First revision.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotes/{quote_id}/revise"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let v2 = response_json(response).await["data"].clone();
    assert_eq!(v2["version_number"], 2);
    assert_eq!(v2["quote_reference"], reference.as_str());
    assert_eq!(v2["parent_quote_id"].as_str().unwrap(), quote_id);

    // Second revision, off the second version.
    let v2_id = v2["id"].as_str().unwrap();
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotes/{v2_id}/revise"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let v3 = response_json(response).await["data"].clone();
    assert_eq!(v3["version_number"], 3);

    // History shows all three versions, newest first, with exactly one
    // latest flag among them.
    let history = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/quotes/history/{reference}"),
            None,
        )
        .await,
    )
    .await;
    let versions = history["data"].as_array().unwrap();
    assert_eq!(versions.len(), 3);
    assert_eq!(versions[0]["version_number"], 3);
    assert_eq!(versions[2]["version_number"], 1);

    let latest_count = versions
        .iter()
        .filter(|v| v["is_latest_version"] == true)
        .count();
    assert_eq!(latest_count, 1);
    assert_eq!(versions[0]["is_latest_version"], true);
}

#[tokio::test]
async fn history_of_unknown_reference_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/quotes/history/QR-DOESNOTEXIST", None)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_status_machine_rejects_invalid_transitions() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Status Co", "status@example.com").await;
    let quote = app.seed_quote(customer_id).await;
    let quote_id = quote["id"].as_str().unwrap();

    // draft -> declined is not a valid move.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/quotes/{quote_id}/status"),
            Some(json!({ "status": "declined" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // converted is reserved for the conversion pipeline.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/quotes/{quote_id}/status"),
            Some(json!({ "status": "converted" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .request_anonymous(Method::GET, "/api/v1/quotes", None)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
