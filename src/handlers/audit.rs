use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::audit_record::AuditEntityType;
use crate::errors::ServiceError;
use crate::services::audit_trail::AuditRecordResponse;
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AuditQuery {
    pub entity_type: Option<AuditEntityType>,
    pub entity_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

/// Query the audit trail
#[utoipa::path(
    get,
    path = "/api/v1/audit",
    summary = "Query audit records",
    description = "Read-only view over the append-only audit trail, newest first",
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit records retrieved successfully", body = ApiResponse<PaginatedResponse<AuditRecordResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_audit_records(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
    _auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<AuditRecordResponse>>>, ServiceError> {
    let (items, total) = state
        .services
        .audit_trail
        .list_records(query.entity_type, query.entity_id, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, query.page, query.limit, total,
    ))))
}
