use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::audit::AuditContext;
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::jobs::{
    AddJobCostRequest, AddJobMaterialRequest, CreateJobRequest, JobCostResponse,
    JobMaterialResponse, JobResponse, UpdateJobStatusRequest,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

fn context(auth_user: &AuthUser, reason: Option<String>) -> AuditContext {
    AuditContext {
        actor_id: auth_user.user_id,
        reason,
    }
}

/// List jobs
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    summary = "List jobs",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Jobs retrieved successfully", body = ApiResponse<PaginatedResponse<JobResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<JobResponse>>>, ServiceError> {
    let (items, total) = state.services.jobs.list_jobs(query.page, query.limit).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, query.page, query.limit, total,
    ))))
}

/// Create a new job directly
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    summary = "Create job",
    description = "Direct creation outside the conversion pipeline. Requires title, expected_end_date and order_id or customer_id.",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created successfully", body = ApiResponse<JobResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already linked to a job", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_job(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JobResponse>>), ServiceError> {
    let job = state
        .services
        .jobs
        .create_job(request, context(&auth_user, None))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(job))))
}

/// Get job by ID
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    summary = "Get job",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job retrieved successfully", body = ApiResponse<JobResponse>),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<JobResponse>>, ServiceError> {
    let job = state.services.jobs.get_job(id).await?;
    Ok(Json(ApiResponse::success(job)))
}

/// Update job status
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/status",
    summary = "Update job status",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateJobStatusRequest,
    responses(
        (status = 200, description = "Status updated successfully", body = ApiResponse<JobResponse>),
        (status = 400, description = "Invalid transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_job_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateJobStatusRequest>,
) -> Result<Json<ApiResponse<JobResponse>>, ServiceError> {
    let reason = request
        .reason
        .clone()
        .or_else(|| Some(format!("Status changed to: {}", request.status.as_str())));
    let job = state
        .services
        .jobs
        .update_job_status(id, request.status, context(&auth_user, reason))
        .await?;
    Ok(Json(ApiResponse::success(job)))
}

/// Allocate a material to a job
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/materials",
    summary = "Add job material",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = AddJobMaterialRequest,
    responses(
        (status = 201, description = "Material allocated", body = ApiResponse<JobMaterialResponse>),
        (status = 404, description = "Job or material not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn add_job_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<AddJobMaterialRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JobMaterialResponse>>), ServiceError> {
    let material = state
        .services
        .jobs
        .add_material(id, request, context(&auth_user, None))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(material))))
}

/// Record a cost against a job
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/costs",
    summary = "Add job cost",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = AddJobCostRequest,
    responses(
        (status = 201, description = "Cost recorded", body = ApiResponse<JobCostResponse>),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn add_job_cost(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<AddJobCostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JobCostResponse>>), ServiceError> {
    let cost = state
        .services
        .jobs
        .add_cost(id, request, context(&auth_user, None))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(cost))))
}

/// Delete a draft or canceled job
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    summary = "Delete job",
    description = "Only draft or canceled jobs may be deleted; linked orders are unlinked, not removed",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 400, description = "Job status does not allow deletion", body = crate::errors::ErrorResponse),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .jobs
        .delete_job(id, context(&auth_user, None))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
