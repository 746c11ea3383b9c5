//! Tests for the customer and material supporting surfaces.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn duplicate_customer_emails_conflict() {
    let app = TestApp::new().await;
    app.seed_customer("First", "shared@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/customers",
            Some(json!({ "name": "Second", "email": "shared@example.com" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn invalid_customer_email_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/customers",
            Some(json!({ "name": "Bad Email", "email": "not-an-email" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_customer_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/customers/{}", Uuid::new_v4()),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_material_skus_conflict() {
    let app = TestApp::new().await;

    let payload = json!({
        "name": "Aluminium rod",
        "sku": "ALU-ROD-10",
        "unit": "m",
        "unit_cost": "3.20"
    });

    let first = app
        .request(Method::POST, "/api/v1/materials", Some(payload.clone()))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request(Method::POST, "/api/v1/materials", Some(payload))
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn materials_list_paginates() {
    let app = TestApp::new().await;

    for i in 0..3 {
        let response = app
            .request(
                Method::POST,
                "/api/v1/materials",
                Some(json!({
                    "name": format!("Material {i}"),
                    "sku": format!("SKU-{i}"),
                    "unit": "ea",
                    "unit_cost": "1.00"
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let page = response_json(
        app.request(Method::GET, "/api/v1/materials?page=1&limit=2", None)
            .await,
    )
    .await;
    assert_eq!(page["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["data"]["total"], 3);
    assert_eq!(page["data"]["total_pages"], 2);
}
