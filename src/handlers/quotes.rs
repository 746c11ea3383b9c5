use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::audit::AuditContext;
use crate::auth::AuthUser;
use crate::entities::quote::QuoteStatus;
use crate::errors::ServiceError;
use crate::services::conversion::QuoteConversion;
use crate::services::quotes::{CloneQuoteRequest, CreateQuoteRequest, QuoteResponse};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuoteStatusRequest {
    pub status: QuoteStatus,
    pub reason: Option<String>,
}

fn context(auth_user: &AuthUser, reason: Option<String>) -> AuditContext {
    AuditContext {
        actor_id: auth_user.user_id,
        reason,
    }
}

/// List quotes
#[utoipa::path(
    get,
    path = "/api/v1/quotes",
    summary = "List quotes",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Quotes retrieved successfully", body = ApiResponse<PaginatedResponse<QuoteResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<QuoteResponse>>>, ServiceError> {
    let (items, total) = state
        .services
        .quotes
        .list_quotes(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, query.page, query.limit, total,
    ))))
}

/// Create a new quote
#[utoipa::path(
    post,
    path = "/api/v1/quotes",
    summary = "Create quote",
    request_body = CreateQuoteRequest,
    responses(
        (status = 201, description = "Quote created successfully", body = ApiResponse<QuoteResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_quote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuoteResponse>>), ServiceError> {
    let quote = state
        .services
        .quotes
        .create_quote(request, context(&auth_user, None))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(quote))))
}

/// Get quote by ID
#[utoipa::path(
    get,
    path = "/api/v1/quotes/{id}",
    summary = "Get quote",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote retrieved successfully", body = ApiResponse<QuoteResponse>),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<QuoteResponse>>, ServiceError> {
    let quote = state.services.quotes.get_quote(id).await?;
    Ok(Json(ApiResponse::success(quote)))
}

/// Get the version history of a quote reference
#[utoipa::path(
    get,
    path = "/api/v1/quotes/history/{reference}",
    summary = "Get quote history",
    description = "All versions sharing a quote reference, newest first",
    params(("reference" = String, Path, description = "Quote reference")),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<QuoteResponse>>),
        (status = 404, description = "Reference not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_quote_history(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<QuoteResponse>>>, ServiceError> {
    let history = state.services.quotes.get_quote_history(&reference).await?;
    Ok(Json(ApiResponse::success(history)))
}

/// Clone a quote into an independent draft
#[utoipa::path(
    post,
    path = "/api/v1/quotes/{id}/clone",
    summary = "Clone quote",
    description = "Creates an independent draft copy under a fresh reference",
    params(("id" = Uuid, Path, description = "Source quote ID")),
    request_body = CloneQuoteRequest,
    responses(
        (status = 201, description = "Quote cloned successfully", body = ApiResponse<QuoteResponse>),
        (status = 404, description = "Source quote not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn clone_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<CloneQuoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuoteResponse>>), ServiceError> {
    let quote = state
        .services
        .quotes
        .clone_quote(id, request, context(&auth_user, None))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(quote))))
}

/// Create the next version of a quote within its reference
#[utoipa::path(
    post,
    path = "/api/v1/quotes/{id}/revise",
    summary = "Revise quote",
    description = "Creates the next version inside the same reference; prior versions lose the latest flag",
    params(("id" = Uuid, Path, description = "Source quote ID")),
    responses(
        (status = 201, description = "Revision created successfully", body = ApiResponse<QuoteResponse>),
        (status = 404, description = "Source quote not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn revise_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<(StatusCode, Json<ApiResponse<QuoteResponse>>), ServiceError> {
    let quote = state
        .services
        .quotes
        .revise_quote(id, context(&auth_user, None))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(quote))))
}

/// Update quote status
#[utoipa::path(
    put,
    path = "/api/v1/quotes/{id}/status",
    summary = "Update quote status",
    params(("id" = Uuid, Path, description = "Quote ID")),
    request_body = UpdateQuoteStatusRequest,
    responses(
        (status = 200, description = "Status updated successfully", body = ApiResponse<QuoteResponse>),
        (status = 400, description = "Invalid transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quote not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_quote_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateQuoteStatusRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ServiceError> {
    let reason = request
        .reason
        .clone()
        .or_else(|| Some(format!("Status changed to: {}", request.status.as_str())));
    let quote = state
        .services
        .quotes
        .update_quote_status(id, request.status, context(&auth_user, reason))
        .await?;
    Ok(Json(ApiResponse::success(quote)))
}

/// Convert an approved quote into an order
#[utoipa::path(
    post,
    path = "/api/v1/quotes/{id}/convert",
    summary = "Convert quote to order",
    description = "Creates an order from an approved quote and marks the quote converted, atomically",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 201, description = "Quote converted successfully", body = ApiResponse<QuoteConversion>),
        (status = 400, description = "Quote is not approved", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quote or customer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn convert_quote_to_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<(StatusCode, Json<ApiResponse<QuoteConversion>>), ServiceError> {
    let conversion = state
        .services
        .conversion
        .convert_quote_to_order(id, context(&auth_user, None))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(conversion))))
}
