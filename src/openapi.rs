use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shopflow API",
        version = "1.0.0",
        description = r#"
# Shopflow API

Backend for made-to-order workshops: versioned quotes, the one-way
quote → order → job conversion pipeline, and the append-only audit trail
recording every mutation.

## Authentication

All API endpoints require a JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Errors use a consistent format with appropriate HTTP status codes:

```json
{
  "error": "Conflict",
  "message": "Order has already been converted to a job",
  "details": "existing_job_id=6dd2...",
  "request_id": "req-abc123",
  "timestamp": "2026-01-01T00:00:00Z"
}
```

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20).
        "#,
        contact(
            name = "Shopflow Support",
            email = "support@shopflow.dev"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Quotes", description = "Quote creation, versioning and conversion"),
        (name = "Orders", description = "Order management and conversion"),
        (name = "Jobs", description = "Job tracking, materials and costs"),
        (name = "Customers", description = "Customer records"),
        (name = "Materials", description = "Material catalog"),
        (name = "Audit", description = "Read-only audit trail")
    ),
    paths(
        // Quotes
        crate::handlers::quotes::list_quotes,
        crate::handlers::quotes::create_quote,
        crate::handlers::quotes::get_quote,
        crate::handlers::quotes::get_quote_history,
        crate::handlers::quotes::clone_quote,
        crate::handlers::quotes::revise_quote,
        crate::handlers::quotes::update_quote_status,
        crate::handlers::quotes::convert_quote_to_order,

        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::record_customer_approval,
        crate::handlers::orders::convert_order_to_job,

        // Jobs
        crate::handlers::jobs::list_jobs,
        crate::handlers::jobs::create_job,
        crate::handlers::jobs::get_job,
        crate::handlers::jobs::update_job_status,
        crate::handlers::jobs::add_job_material,
        crate::handlers::jobs::add_job_cost,
        crate::handlers::jobs::delete_job,

        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::get_customer,

        // Materials
        crate::handlers::materials::list_materials,
        crate::handlers::materials::create_material,
        crate::handlers::materials::get_material,

        // Audit
        crate::handlers::audit::list_audit_records,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Quote types
            crate::services::quotes::QuoteResponse,
            crate::services::quotes::QuoteLineItemResponse,
            crate::services::quotes::QuoteLineItemInput,
            crate::services::quotes::CreateQuoteRequest,
            crate::services::quotes::CloneQuoteRequest,
            crate::handlers::quotes::UpdateQuoteStatusRequest,
            crate::entities::quote::QuoteStatus,

            // Conversion results
            crate::services::conversion::QuoteConversion,
            crate::services::conversion::OrderConversion,

            // Order types
            crate::services::orders::OrderResponse,
            crate::services::orders::OrderItem,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderStatusRequest,
            crate::services::orders::CustomerApprovalRequest,
            crate::entities::order::OrderStatus,

            // Job types
            crate::services::jobs::JobResponse,
            crate::services::jobs::JobMaterialResponse,
            crate::services::jobs::JobCostResponse,
            crate::services::jobs::CreateJobRequest,
            crate::services::jobs::UpdateJobStatusRequest,
            crate::services::jobs::AddJobMaterialRequest,
            crate::services::jobs::AddJobCostRequest,
            crate::entities::job::JobStatus,
            crate::entities::job_cost::CostCategory,

            // Customer and material types
            crate::services::customers::CustomerResponse,
            crate::services::customers::CreateCustomerRequest,
            crate::services::materials::MaterialResponse,
            crate::services::materials::CreateMaterialRequest,

            // Audit types
            crate::services::audit_trail::AuditRecordResponse,
            crate::entities::audit_record::AuditEntityType,
            crate::audit::ChangeType,
            crate::audit::AuditDetail,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
