use crate::{
    db::DbPool,
    entities::material::{self, Entity as MaterialEntity, Model as MaterialModel},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialRequest {
    #[validate(length(min = 1, max = 200, message = "Material name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "SKU is required"))]
    pub sku: String,
    #[validate(length(min = 1, max = 32, message = "Unit is required"))]
    pub unit: String,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaterialResponse {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub unit: String,
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<MaterialModel> for MaterialResponse {
    fn from(model: MaterialModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sku: model.sku,
            unit: model.unit,
            unit_cost: model.unit_cost,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Service for the material catalog backing quote line items and job
/// material allocations.
#[derive(Clone)]
pub struct MaterialService {
    db_pool: Arc<DbPool>,
}

impl MaterialService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create_material(
        &self,
        request: CreateMaterialRequest,
    ) -> Result<MaterialResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let existing = MaterialEntity::find()
            .filter(material::Column::Sku.eq(request.sku.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A material with SKU {} already exists",
                request.sku
            )));
        }

        let model = material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            sku: Set(request.sku),
            unit: Set(request.unit),
            unit_cost: Set(request.unit_cost),
            ..Default::default()
        };

        let saved = model.insert(db).await?;
        info!(material_id = %saved.id, "Material created");
        Ok(saved.into())
    }

    #[instrument(skip(self), fields(material_id = %material_id))]
    pub async fn get_material(
        &self,
        material_id: Uuid,
    ) -> Result<MaterialResponse, ServiceError> {
        let found = MaterialEntity::find_by_id(material_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material with ID {material_id} not found"))
            })?;

        Ok(found.into())
    }

    #[instrument(skip(self))]
    pub async fn list_materials(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<MaterialResponse>, u64), ServiceError> {
        let paginator = MaterialEntity::find()
            .order_by_asc(material::Column::Name)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let materials = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((materials.into_iter().map(Into::into).collect(), total))
    }
}
