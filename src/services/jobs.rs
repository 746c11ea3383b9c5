use crate::{
    audit::{AuditContext, AuditDetail, AuditEntry, AuditSink, ChangeType},
    db::DbPool,
    entities::audit_record::AuditEntityType,
    entities::customer::Entity as CustomerEntity,
    entities::job::{self, Entity as JobEntity, JobStatus, Model as JobModel},
    entities::job_cost::{self, CostCategory, Entity as JobCostEntity, Model as JobCostModel},
    entities::job_material::{self, Entity as JobMaterialEntity, Model as JobMaterialModel},
    entities::material::Entity as MaterialEntity,
    entities::order::{self, Entity as OrderEntity},
    errors::ServiceError,
    services::generate_number,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 200, message = "Job title is required"))]
    pub title: String,
    pub expected_end_date: DateTime<Utc>,
    /// Link the job to this order (and derive the customer from it).
    pub order_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    /// Used to resolve or auto-create a customer when the order path
    /// cannot supply one.
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateJobStatusRequest {
    pub status: JobStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddJobMaterialRequest {
    pub material_id: Uuid,
    pub quantity_needed: Decimal,
    /// Defaults to the material's catalog cost when absent.
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddJobCostRequest {
    pub category: CostCategory,
    pub description: String,
    pub amount: Decimal,
    pub incurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobMaterialResponse {
    pub id: Uuid,
    pub material_id: Uuid,
    pub quantity_needed: Decimal,
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<JobMaterialModel> for JobMaterialResponse {
    fn from(model: JobMaterialModel) -> Self {
        Self {
            id: model.id,
            material_id: model.material_id,
            quantity_needed: model.quantity_needed,
            unit_cost: model.unit_cost,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobCostResponse {
    pub id: Uuid,
    pub category: CostCategory,
    pub description: String,
    pub amount: Decimal,
    pub incurred_at: DateTime<Utc>,
}

impl From<JobCostModel> for JobCostResponse {
    fn from(model: JobCostModel) -> Self {
        Self {
            id: model.id,
            category: model.category,
            description: model.description,
            amount: model.amount,
            incurred_at: model.incurred_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub id: Uuid,
    pub job_number: String,
    pub title: String,
    pub customer_id: Uuid,
    pub status: JobStatus,
    pub start_date: DateTime<Utc>,
    pub expected_end_date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub materials: Vec<JobMaterialResponse>,
    pub costs: Vec<JobCostResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub(crate) fn model_to_response(
    model: JobModel,
    materials: Vec<JobMaterialModel>,
    costs: Vec<JobCostModel>,
) -> JobResponse {
    JobResponse {
        id: model.id,
        job_number: model.job_number,
        title: model.title,
        customer_id: model.customer_id,
        status: model.status,
        start_date: model.start_date,
        expected_end_date: model.expected_end_date,
        description: model.description,
        created_by: model.created_by,
        materials: materials.into_iter().map(Into::into).collect(),
        costs: costs.into_iter().map(Into::into).collect(),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Service for jobs: direct creation, status transitions, material and
/// cost tracking, and guarded deletion.
#[derive(Clone)]
pub struct JobService {
    db_pool: Arc<DbPool>,
    audit: Arc<dyn AuditSink>,
}

impl JobService {
    pub fn new(db_pool: Arc<DbPool>, audit: Arc<dyn AuditSink>) -> Self {
        Self { db_pool, audit }
    }

    /// Creates a job directly, outside the order conversion path.
    ///
    /// The customer comes from `customer_id`, from the linked order, or,
    /// when the order cannot supply one, from a name/email match. Order
    /// linking happens inside the same transaction as the job insert, so a
    /// failed link rolls the job back.
    #[instrument(skip(self, request, ctx))]
    pub async fn create_job(
        &self,
        request: CreateJobRequest,
        ctx: AuditContext,
    ) -> Result<JobResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.order_id.is_none() && request.customer_id.is_none() {
            return Err(ServiceError::ValidationError(
                "Either order_id or customer_id is required".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let linked_order = match request.order_id {
            Some(order_id) => Some(
                OrderEntity::find_by_id(order_id)
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Order with ID {order_id} not found"))
                    })?,
            ),
            None => None,
        };

        if let Some(order_model) = &linked_order {
            if order_model.job_id.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "Order {} is already linked to a job",
                    order_model.id
                )));
            }
        }

        let customer_id = match request.customer_id {
            Some(customer_id) => {
                CustomerEntity::find_by_id(customer_id)
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Customer with ID {customer_id} not found"
                        ))
                    })?
                    .id
            }
            None => {
                let Some(order_model) = linked_order.as_ref() else {
                    return Err(ServiceError::ValidationError(
                        "Either order_id or customer_id is required".to_string(),
                    ));
                };
                match CustomerEntity::find_by_id(order_model.customer_id)
                    .one(db)
                    .await?
                {
                    Some(customer) => customer.id,
                    None => {
                        // The order references a customer row that no longer
                        // resolves; fall back to a name/email match.
                        let customers = crate::services::customers::CustomerService::new(
                            self.db_pool.clone(),
                        );
                        customers
                            .find_or_create(
                                request
                                    .customer_name
                                    .as_deref()
                                    .or(Some(order_model.customer_name.as_str())),
                                request.customer_email.as_deref(),
                            )
                            .await?
                            .id
                    }
                }
            }
        };

        let job_id = Uuid::new_v4();
        let now = Utc::now();
        let txn = db.begin().await?;

        let job_model = job::ActiveModel {
            id: Set(job_id),
            job_number: Set(generate_number("JOB")),
            title: Set(request.title),
            customer_id: Set(customer_id),
            status: Set(JobStatus::Draft),
            start_date: Set(request.start_date.unwrap_or(now)),
            expected_end_date: Set(request.expected_end_date),
            description: Set(request.description),
            created_by: Set(ctx.actor_id),
            ..Default::default()
        };
        let saved = job_model.insert(&txn).await?;

        if let Some(order_model) = linked_order {
            let mut order_active: order::ActiveModel = order_model.into();
            order_active.job_id = Set(Some(job_id));
            order_active.updated_at = Set(Some(now));
            order_active.update(&txn).await?;
        }

        txn.commit().await?;

        info!(job_id = %job_id, job_number = %saved.job_number, "Job created");

        self.audit
            .record(AuditEntry::new(
                AuditEntityType::Job,
                job_id,
                ChangeType::Create,
                ctx,
            ))
            .await;

        Ok(model_to_response(saved, Vec::new(), Vec::new()))
    }

    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn get_job(&self, job_id: Uuid) -> Result<JobResponse, ServiceError> {
        let db = &*self.db_pool;

        let job_model = JobEntity::find_by_id(job_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job with ID {job_id} not found")))?;

        let materials = job_model
            .find_related(JobMaterialEntity)
            .order_by_asc(job_material::Column::CreatedAt)
            .all(db)
            .await?;
        let costs = job_model
            .find_related(JobCostEntity)
            .order_by_asc(job_cost::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(model_to_response(job_model, materials, costs))
    }

    #[instrument(skip(self))]
    pub async fn list_jobs(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<JobResponse>, u64), ServiceError> {
        let paginator = JobEntity::find()
            .order_by_desc(job::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let jobs = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((
            jobs.into_iter()
                .map(|j| model_to_response(j, Vec::new(), Vec::new()))
                .collect(),
            total,
        ))
    }

    #[instrument(skip(self, ctx), fields(job_id = %job_id, new_status = ?new_status))]
    pub async fn update_job_status(
        &self,
        job_id: Uuid,
        new_status: JobStatus,
        ctx: AuditContext,
    ) -> Result<JobResponse, ServiceError> {
        let db = &*self.db_pool;

        let job_model = JobEntity::find_by_id(job_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job with ID {job_id} not found")))?;

        let old_status = job_model.status;
        if !old_status.can_transition_to(new_status) {
            warn!(
                job_id = %job_id,
                from = old_status.as_str(),
                to = new_status.as_str(),
                "Rejected job status transition"
            );
            return Err(ServiceError::PreconditionFailed(format!(
                "Job cannot move from {} to {}",
                old_status.as_str(),
                new_status.as_str()
            )));
        }

        let mut active: job::ActiveModel = job_model.into();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(
            job_id = %job_id,
            old_status = old_status.as_str(),
            new_status = new_status.as_str(),
            "Job status updated"
        );

        self.audit
            .record(
                AuditEntry::new(AuditEntityType::Job, job_id, ChangeType::StatusChange, ctx)
                    .with_detail(AuditDetail::StatusChange {
                        from: old_status.as_str().to_string(),
                        to: new_status.as_str().to_string(),
                    }),
            )
            .await;

        Ok(model_to_response(updated, Vec::new(), Vec::new()))
    }

    /// Deletes a draft or canceled job. Linked orders are unlinked, never
    /// deleted.
    #[instrument(skip(self, ctx), fields(job_id = %job_id))]
    pub async fn delete_job(&self, job_id: Uuid, ctx: AuditContext) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let job_model = JobEntity::find_by_id(job_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job with ID {job_id} not found")))?;

        if !job_model.status.is_deletable() {
            return Err(ServiceError::PreconditionFailed(format!(
                "Only draft or canceled jobs can be deleted (current status: {})",
                job_model.status.as_str()
            )));
        }

        let txn = db.begin().await?;

        OrderEntity::update_many()
            .col_expr(
                order::Column::JobId,
                sea_orm::sea_query::Expr::value(Option::<Uuid>::None),
            )
            .filter(order::Column::JobId.eq(job_id))
            .exec(&txn)
            .await?;

        JobMaterialEntity::delete_many()
            .filter(job_material::Column::JobId.eq(job_id))
            .exec(&txn)
            .await?;
        JobCostEntity::delete_many()
            .filter(job_cost::Column::JobId.eq(job_id))
            .exec(&txn)
            .await?;
        JobEntity::delete_by_id(job_id).exec(&txn).await?;

        txn.commit().await?;

        info!(job_id = %job_id, "Job deleted; linked orders unlinked");

        self.audit
            .record(AuditEntry::new(
                AuditEntityType::Job,
                job_id,
                ChangeType::Delete,
                ctx,
            ))
            .await;

        Ok(())
    }

    /// Allocates a material to a job.
    #[instrument(skip(self, request, ctx), fields(job_id = %job_id, material_id = %request.material_id))]
    pub async fn add_material(
        &self,
        job_id: Uuid,
        request: AddJobMaterialRequest,
        ctx: AuditContext,
    ) -> Result<JobMaterialResponse, ServiceError> {
        if request.quantity_needed <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantity_needed must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;

        JobEntity::find_by_id(job_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job with ID {job_id} not found")))?;

        let material = MaterialEntity::find_by_id(request.material_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Material with ID {} not found",
                    request.material_id
                ))
            })?;

        let unit_cost = request.unit_cost.unwrap_or(material.unit_cost);

        let model = job_material::ActiveModel {
            id: Set(Uuid::new_v4()),
            job_id: Set(job_id),
            material_id: Set(material.id),
            quantity_needed: Set(request.quantity_needed),
            unit_cost: Set(unit_cost),
            ..Default::default()
        };
        let saved = model.insert(db).await?;

        info!(job_id = %job_id, material_id = %material.id, "Material allocated to job");

        self.audit
            .record(
                AuditEntry::new(AuditEntityType::Job, job_id, ChangeType::MaterialAdded, ctx)
                    .with_detail(AuditDetail::MaterialChange {
                        material_id: material.id,
                        quantity_needed: request.quantity_needed,
                        unit_cost,
                        action: "added".to_string(),
                    }),
            )
            .await;

        Ok(saved.into())
    }

    /// Records a cost entry against a job.
    #[instrument(skip(self, request, ctx), fields(job_id = %job_id))]
    pub async fn add_cost(
        &self,
        job_id: Uuid,
        request: AddJobCostRequest,
        ctx: AuditContext,
    ) -> Result<JobCostResponse, ServiceError> {
        if request.description.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Cost description is required".to_string(),
            ));
        }
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Cost amount must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;

        JobEntity::find_by_id(job_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job with ID {job_id} not found")))?;

        let model = job_cost::ActiveModel {
            id: Set(Uuid::new_v4()),
            job_id: Set(job_id),
            category: Set(request.category),
            description: Set(request.description),
            amount: Set(request.amount),
            incurred_at: Set(request.incurred_at.unwrap_or_else(Utc::now)),
            ..Default::default()
        };
        let saved = model.insert(db).await?;

        info!(job_id = %job_id, cost_id = %saved.id, "Cost recorded for job");

        self.audit
            .record(AuditEntry::new(
                AuditEntityType::Job,
                job_id,
                ChangeType::CostAdded,
                ctx,
            ))
            .await;

        Ok(saved.into())
    }
}
