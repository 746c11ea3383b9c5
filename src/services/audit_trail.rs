use crate::{
    db::DbPool,
    entities::audit_record::{self, AuditEntityType, Entity as AuditRecordEntity, Model},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditRecordResponse {
    pub id: Uuid,
    pub entity_type: AuditEntityType,
    pub entity_id: Uuid,
    pub change_type: String,
    pub actor_id: Uuid,
    pub reason: Option<String>,
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for AuditRecordResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            entity_type: model.entity_type,
            entity_id: model.entity_id,
            change_type: model.change_type,
            actor_id: model.actor_id,
            reason: model.reason,
            detail: model.detail,
            created_at: model.created_at,
        }
    }
}

/// Read surface over the audit trail. There is deliberately no mutation
/// path: records are written by the sink and never touched again.
#[derive(Clone)]
pub struct AuditTrailService {
    db_pool: Arc<DbPool>,
}

impl AuditTrailService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_records(
        &self,
        entity_type: Option<AuditEntityType>,
        entity_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<AuditRecordResponse>, u64), ServiceError> {
        let mut query = AuditRecordEntity::find();

        if let Some(entity_type) = entity_type {
            query = query.filter(audit_record::Column::EntityType.eq(entity_type));
        }
        if let Some(entity_id) = entity_id {
            query = query.filter(audit_record::Column::EntityId.eq(entity_id));
        }

        let paginator = query
            .order_by_desc(audit_record::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let records = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((records.into_iter().map(Into::into).collect(), total))
    }
}
