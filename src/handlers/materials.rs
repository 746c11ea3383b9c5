use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::materials::{CreateMaterialRequest, MaterialResponse};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

/// List materials
#[utoipa::path(
    get,
    path = "/api/v1/materials",
    summary = "List materials",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Materials retrieved successfully", body = ApiResponse<PaginatedResponse<MaterialResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<MaterialResponse>>>, ServiceError> {
    let (items, total) = state
        .services
        .materials
        .list_materials(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, query.page, query.limit, total,
    ))))
}

/// Create a new material
#[utoipa::path(
    post,
    path = "/api/v1/materials",
    summary = "Create material",
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Material created successfully", body = ApiResponse<MaterialResponse>),
        (status = 409, description = "SKU already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_material(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<CreateMaterialRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MaterialResponse>>), ServiceError> {
    let material = state.services.materials.create_material(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(material))))
}

/// Get material by ID
#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}",
    summary = "Get material",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material retrieved successfully", body = ApiResponse<MaterialResponse>),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<MaterialResponse>>, ServiceError> {
    let material = state.services.materials.get_material(id).await?;
    Ok(Json(ApiResponse::success(material)))
}
