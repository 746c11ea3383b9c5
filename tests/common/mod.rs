use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use shopflow_api::{
    audit::{AuditSink, DbAuditSink},
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    services::AppServices,
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

const TEST_JWT_SECRET: &str =
    "test_secret_key_for_testing_purposes_only_and_it_is_long_enough_64ch";

/// Helper harness spinning up the full application router backed by a
/// per-test SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub actor_id: Uuid,
    token: String,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = tmp.path().join("shopflow_test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let mut cfg = AppConfig::new(database_url, TEST_JWT_SECRET, "127.0.0.1", 18_080, "test");
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let auth_service = Arc::new(AuthService::new(AuthConfig::from_app_config(&cfg)));
        let audit_sink: Arc<dyn AuditSink> = Arc::new(DbAuditSink::new(db_arc.clone()));
        let services =
            AppServices::new(db_arc.clone(), audit_sink, cfg.default_lead_time_days);

        let state = AppState {
            db: db_arc,
            config: cfg,
            auth: auth_service.clone(),
            services,
        };

        let actor_id = Uuid::new_v4();
        let token = auth_service
            .issue_token(actor_id, Some("Test User"), Some("tester@example.com"))
            .expect("failed to mint test token");

        let router = Router::new()
            .route("/", get(|| async { "shopflow-api up" }))
            .nest("/api/v1", shopflow_api::api_v1_routes())
            .layer(axum::middleware::from_fn_with_state(
                auth_service,
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: axum::http::Request<Body>,
                 next: axum::middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .layer(axum::middleware::from_fn(
                shopflow_api::request_id::request_id_middleware,
            ))
            .with_state(state.clone());

        Self {
            router,
            state,
            actor_id,
            token,
            _tmp: tmp,
        }
    }

    /// Issue an authenticated request with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "application/json");

        let request = match body {
            Some(value) => builder
                .body(Body::from(value.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    /// Issue a request without credentials.
    pub async fn request_anonymous(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        let request = match body {
            Some(value) => builder
                .body(Body::from(value.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    /// Creates a customer over HTTP and returns its id.
    pub async fn seed_customer(&self, name: &str, email: &str) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/customers",
                Some(json!({ "name": name, "email": email })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "seed customer");
        let body = response_json(response).await;
        Uuid::parse_str(body["data"]["id"].as_str().expect("customer id")).expect("uuid")
    }

    /// Creates a draft quote with a single line item and returns the body.
    pub async fn seed_quote(&self, customer_id: Uuid) -> Value {
        let response = self
            .request(
                Method::POST,
                "/api/v1/quotes",
                Some(json!({
                    "customer_id": customer_id,
                    "title": "Steel brackets",
                    "lead_time_weeks": 2,
                    "line_items": [
                        { "description": "Widget", "quantity": 2, "unit_price": "10" }
                    ]
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "seed quote");
        let body = response_json(response).await;
        body["data"].clone()
    }

    /// Walks a draft quote to approved through the status endpoint.
    pub async fn approve_quote(&self, quote_id: &str) {
        let response = self
            .request(
                Method::PUT,
                &format!("/api/v1/quotes/{quote_id}/status"),
                Some(json!({ "status": "approved" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "approve quote");
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Parses a JSON amount (string or number) into a Decimal for comparisons
/// that should not depend on how the store rendered the scale.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("not a decimal value: {other:?}"),
    }
}
