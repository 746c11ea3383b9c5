//! Tests for the append-only audit trail and its fire-and-forget sink.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, response_json, TestApp};
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use serde_json::json;

#[tokio::test]
async fn each_successful_mutation_appends_one_record() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Trail Co", "trail@example.com").await;
    let quote = app.seed_quote(customer_id).await;
    let quote_id = quote["id"].as_str().unwrap().to_string();

    // Three mutations on the same quote: create, status change, status change.
    app.request(
        Method::PUT,
        &format!("/api/v1/quotes/{quote_id}/status"),
        Some(json!({ "status": "sent" })),
    )
    .await;
    app.request(
        Method::PUT,
        &format!("/api/v1/quotes/{quote_id}/status"),
        Some(json!({ "status": "approved", "reason": "Customer signed off" })),
    )
    .await;

    let records = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/audit?entity_type=quote&entity_id={quote_id}"),
            None,
        )
        .await,
    )
    .await;

    let items = records["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);

    // Newest first: the approval carries its reason and a tagged
    // status-change payload.
    assert_eq!(items[0]["change_type"], "status_change");
    assert_eq!(items[0]["reason"], "Customer signed off");
    assert_eq!(items[0]["detail"]["kind"], "status_change");
    assert_eq!(items[0]["detail"]["from"], "sent");
    assert_eq!(items[0]["detail"]["to"], "approved");
    assert_eq!(items[2]["change_type"], "create");

    for item in items {
        assert_eq!(
            item["actor_id"].as_str().unwrap(),
            app.actor_id.to_string()
        );
    }
}

#[tokio::test]
async fn conversions_land_in_the_trail_with_linked_ids() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Convert Trail", "ctrail@example.com").await;
    let quote = app.seed_quote(customer_id).await;
    let quote_id = quote["id"].as_str().unwrap().to_string();
    app.approve_quote(&quote_id).await;

    let conversion = response_json(
        app.request(
            Method::POST,
            &format!("/api/v1/quotes/{quote_id}/convert"),
            None,
        )
        .await,
    )
    .await;
    let order_id = conversion["data"]["order"]["id"].as_str().unwrap().to_string();

    let records = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/audit?entity_type=quote&entity_id={quote_id}"),
            None,
        )
        .await,
    )
    .await;
    let items = records["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["change_type"], "converted_to_order");
    assert_eq!(items[0]["detail"]["kind"], "conversion");
    assert_eq!(items[0]["detail"]["source_id"].as_str().unwrap(), quote_id);
    assert_eq!(items[0]["detail"]["target_id"].as_str().unwrap(), order_id);
}

#[tokio::test]
async fn a_broken_audit_store_does_not_change_the_operation_outcome() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Broken Sink", "broken@example.com").await;

    // Take the audit table away: every subsequent sink write fails
    // internally and is logged, never surfaced.
    app.state
        .db
        .execute(Statement::from_string(
            DbBackend::Sqlite,
            "DROP TABLE audit_records;".to_string(),
        ))
        .await
        .expect("drop audit table");

    let response = app
        .request(
            Method::POST,
            "/api/v1/quotes",
            Some(json!({
                "customer_id": customer_id,
                "title": "Quote without a trail",
                "line_items": [
                    { "description": "Widget", "quantity": 1, "unit_price": "3" }
                ]
            })),
        )
        .await;

    // The business operation still succeeds.
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "draft");
}

#[tokio::test]
async fn material_allocations_carry_a_material_change_payload() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Materials Co", "materials@example.com").await;

    let material = response_json(
        app.request(
            Method::POST,
            "/api/v1/materials",
            Some(json!({
                "name": "Steel sheet 2mm",
                "sku": "STL-2MM",
                "unit": "sheet",
                "unit_cost": "42.00"
            })),
        )
        .await,
    )
    .await;
    let material_id = material["data"]["id"].as_str().unwrap().to_string();

    let job = response_json(
        app.request(
            Method::POST,
            "/api/v1/jobs",
            Some(json!({
                "title": "Bracket run",
                "expected_end_date": "2026-10-01T00:00:00Z",
                "customer_id": customer_id
            })),
        )
        .await,
    )
    .await;
    let job_id = job["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/jobs/{job_id}/materials"),
            Some(json!({ "material_id": material_id, "quantity_needed": "8" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let records = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/audit?entity_type=job&entity_id={job_id}"),
            None,
        )
        .await,
    )
    .await;
    let items = records["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["change_type"], "material_added");
    assert_eq!(items[0]["detail"]["kind"], "material_change");
    assert_eq!(
        items[0]["detail"]["material_id"].as_str().unwrap(),
        material_id
    );
    assert_eq!(items[0]["detail"]["action"], "added");
    // The unit cost defaulted from the catalog.
    assert_eq!(decimal(&items[0]["detail"]["unit_cost"]), dec!(42));
}

#[tokio::test]
async fn customer_approval_is_recorded_for_orders() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Approval Co", "approval@example.com").await;

    let order = response_json(
        app.request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "customer_id": customer_id,
                "items": [
                    { "description": "Widget", "quantity": 2, "unit_price": "7" }
                ]
            })),
        )
        .await,
    )
    .await;
    let order_id = order["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/approval"),
            Some(json!({ "approved": true, "signature": "J. Customer" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "approved");

    let records = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/audit?entity_type=order&entity_id={order_id}"),
            None,
        )
        .await,
    )
    .await;
    let items = records["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["change_type"], "customer_approval");
    assert_eq!(items[0]["detail"]["kind"], "customer_approval");
    assert_eq!(items[0]["detail"]["approved"], true);
    assert_eq!(items[0]["detail"]["signature"], "J. Customer");
}
