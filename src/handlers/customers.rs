use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::customers::{CreateCustomerRequest, CustomerResponse};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

/// List customers
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    summary = "List customers",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Customers retrieved successfully", body = ApiResponse<PaginatedResponse<CustomerResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<CustomerResponse>>>, ServiceError> {
    let (items, total) = state
        .services
        .customers
        .list_customers(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, query.page, query.limit, total,
    ))))
}

/// Create a new customer
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    summary = "Create customer",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created successfully", body = ApiResponse<CustomerResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_customer(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerResponse>>), ServiceError> {
    let customer = state.services.customers.create_customer(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(customer))))
}

/// Get customer by ID
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    summary = "Get customer",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer retrieved successfully", body = ApiResponse<CustomerResponse>),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<CustomerResponse>>, ServiceError> {
    let customer = state.services.customers.get_customer(id).await?;
    Ok(Json(ApiResponse::success(customer)))
}
