use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::audit::AuditContext;
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::conversion::OrderConversion;
use crate::services::orders::{
    CreateOrderRequest, CustomerApprovalRequest, OrderResponse, UpdateOrderStatusRequest,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

fn context(auth_user: &AuthUser, reason: Option<String>) -> AuditContext {
    AuditContext {
        actor_id: auth_user.user_id,
        reason,
    }
}

/// List orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<PaginatedResponse<OrderResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<OrderResponse>>>, ServiceError> {
    let (items, total) = state
        .services
        .orders
        .list_orders(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, query.page, query.limit, total,
    ))))
}

/// Create a new order directly
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Create order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    let order = state
        .services
        .orders
        .create_order(request, context(&auth_user, None))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Get order by ID
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Update order status
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    summary = "Update order status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let reason = request
        .reason
        .clone()
        .or_else(|| Some(format!("Status changed to: {}", request.status.as_str())));
    let order = state
        .services
        .orders
        .update_order_status(id, request.status, context(&auth_user, reason))
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Record a customer's approval decision for an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/approval",
    summary = "Record customer approval",
    description = "Approval moves the order to approved; either decision lands in the audit trail",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CustomerApprovalRequest,
    responses(
        (status = 200, description = "Approval recorded", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order cannot be approved from its current status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn record_customer_approval(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<CustomerApprovalRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let reason = request.reason.clone();
    let order = state
        .services
        .orders
        .record_customer_approval(id, request, context(&auth_user, reason))
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Convert an approved order into a job
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/convert",
    summary = "Convert order to job",
    description = "Creates an active job and moves the order to in_production, atomically. A repeat call returns 409 with the existing job id.",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 201, description = "Order converted successfully", body = ApiResponse<OrderConversion>),
        (status = 400, description = "Order is not approved", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already converted", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn convert_order_to_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<(StatusCode, Json<ApiResponse<OrderConversion>>), ServiceError> {
    let conversion = state
        .services
        .conversion
        .convert_order_to_job(id, context(&auth_user, None))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(conversion))))
}
