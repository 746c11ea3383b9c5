//! Tests for direct job creation, status transitions, and guarded deletion.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

async fn seed_order(app: &TestApp, customer_id: Uuid) -> Value {
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "items": [
                    { "description": "Widget", "quantity": 3, "unit_price": "12" }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["data"].clone()
}

#[tokio::test]
async fn direct_job_creation_requires_an_owner_entity() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/jobs",
            Some(json!({
                "title": "Orphan job",
                "expected_end_date": "2026-10-01T00:00:00Z"
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("order_id or customer_id"));
}

#[tokio::test]
async fn job_created_from_an_order_links_it_transactionally() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Link Co", "link@example.com").await;
    let order = seed_order(&app, customer_id).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/jobs",
            Some(json!({
                "title": "Fabrication run",
                "expected_end_date": "2026-10-01T00:00:00Z",
                "order_id": order_id
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let job = response_json(response).await["data"].clone();
    assert_eq!(job["status"], "draft");
    assert_eq!(
        job["customer_id"].as_str().unwrap(),
        customer_id.to_string()
    );

    // The order now points at the job.
    let fetched = response_json(
        app.request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
            .await,
    )
    .await;
    assert_eq!(fetched["data"]["job_id"], job["id"]);

    // A second job against the same order conflicts.
    let second = app
        .request(
            Method::POST,
            "/api/v1/jobs",
            Some(json!({
                "title": "Duplicate run",
                "expected_end_date": "2026-10-01T00:00:00Z",
                "order_id": order_id
            })),
        )
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn active_jobs_refuse_deletion() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Guard Co", "guard@example.com").await;

    let job = response_json(
        app.request(
            Method::POST,
            "/api/v1/jobs",
            Some(json!({
                "title": "Guarded job",
                "expected_end_date": "2026-10-01T00:00:00Z",
                "customer_id": customer_id
            })),
        )
        .await,
    )
    .await;
    let job_id = job["data"]["id"].as_str().unwrap().to_string();

    // draft -> active, then deletion must fail.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/jobs/{job_id}/status"),
            Some(json!({ "status": "active" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let delete = app
        .request(Method::DELETE, &format!("/api/v1/jobs/{job_id}"), None)
        .await;
    assert_eq!(delete.status(), StatusCode::BAD_REQUEST);
    let body = response_json(delete).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Only draft or canceled jobs"));

    // Completed jobs refuse deletion too.
    app.request(
        Method::PUT,
        &format!("/api/v1/jobs/{job_id}/status"),
        Some(json!({ "status": "completed" })),
    )
    .await;
    let delete = app
        .request(Method::DELETE, &format!("/api/v1/jobs/{job_id}"), None)
        .await;
    assert_eq!(delete.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_canceled_job_unlinks_its_orders() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Unlink Co", "unlink@example.com").await;
    let order = seed_order(&app, customer_id).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let job = response_json(
        app.request(
            Method::POST,
            "/api/v1/jobs",
            Some(json!({
                "title": "Doomed job",
                "expected_end_date": "2026-10-01T00:00:00Z",
                "order_id": order_id
            })),
        )
        .await,
    )
    .await;
    let job_id = job["data"]["id"].as_str().unwrap().to_string();

    // draft -> canceled, then delete.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/jobs/{job_id}/status"),
            Some(json!({ "status": "canceled" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let delete = app
        .request(Method::DELETE, &format!("/api/v1/jobs/{job_id}"), None)
        .await;
    assert_eq!(delete.status(), StatusCode::NO_CONTENT);

    // The job is gone; the order survives with its link cleared.
    let missing = app
        .request(Method::GET, &format!("/api/v1/jobs/{job_id}"), None)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let fetched = response_json(
        app.request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
            .await,
    )
    .await;
    assert!(fetched["data"]["job_id"].is_null());
}

#[tokio::test]
async fn job_status_machine_rejects_backward_moves() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Machine Co", "machine@example.com").await;

    let job = response_json(
        app.request(
            Method::POST,
            "/api/v1/jobs",
            Some(json!({
                "title": "State machine job",
                "expected_end_date": "2026-10-01T00:00:00Z",
                "customer_id": customer_id
            })),
        )
        .await,
    )
    .await;
    let job_id = job["data"]["id"].as_str().unwrap().to_string();

    // draft -> completed skips the machine.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/jobs/{job_id}/status"),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn job_costs_require_positive_amounts() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Cost Co", "cost@example.com").await;

    let job = response_json(
        app.request(
            Method::POST,
            "/api/v1/jobs",
            Some(json!({
                "title": "Costed job",
                "expected_end_date": "2026-10-01T00:00:00Z",
                "customer_id": customer_id
            })),
        )
        .await,
    )
    .await;
    let job_id = job["data"]["id"].as_str().unwrap().to_string();

    let rejected = app
        .request(
            Method::POST,
            &format!("/api/v1/jobs/{job_id}/costs"),
            Some(json!({
                "category": "labor",
                "description": "Welding",
                "amount": "0"
            })),
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let accepted = app
        .request(
            Method::POST,
            &format!("/api/v1/jobs/{job_id}/costs"),
            Some(json!({
                "category": "labor",
                "description": "Welding",
                "amount": "180.00"
            })),
        )
        .await;
    assert_eq!(accepted.status(), StatusCode::CREATED);

    // The cost shows up on the job.
    let fetched = response_json(
        app.request(Method::GET, &format!("/api/v1/jobs/{job_id}"), None)
            .await,
    )
    .await;
    let costs = fetched["data"]["costs"].as_array().unwrap();
    assert_eq!(costs.len(), 1);
    assert_eq!(costs[0]["category"], "labor");
    assert_eq!(decimal(&costs[0]["amount"]), dec!(180));
}

#[tokio::test]
async fn materials_on_missing_jobs_return_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/jobs/{}/materials", Uuid::new_v4()),
            Some(json!({ "material_id": Uuid::new_v4(), "quantity_needed": "1" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
