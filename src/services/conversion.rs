use crate::{
    audit::{AuditContext, AuditDetail, AuditEntry, AuditSink, ChangeType},
    db::DbPool,
    entities::audit_record::AuditEntityType,
    entities::customer::Entity as CustomerEntity,
    entities::job::{self, JobStatus},
    entities::order::{self, Entity as OrderEntity, OrderStatus},
    entities::quote::{self, Entity as QuoteEntity, QuoteStatus},
    entities::quote_line_item::{self, Entity as LineItemEntity},
    errors::ServiceError,
    services::generate_number,
    services::jobs::JobResponse,
    services::orders::{self, OrderItem, OrderResponse},
    services::quotes::QuoteResponse,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Result of promoting a quote: the new order plus the updated quote, so
/// callers can reflect the status flip without a second read.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteConversion {
    pub order: OrderResponse,
    pub quote: QuoteResponse,
}

/// Result of promoting an order: the new job plus the updated order.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderConversion {
    pub job: JobResponse,
    pub order: OrderResponse,
}

/// One-way promotion pipeline: quote → order → job.
///
/// Each conversion runs its read-check-write sequence inside a single
/// transaction; two racing conversions of the same entity serialize on the
/// store, and the loser fails its precondition re-check. The audit sink is
/// invoked only after commit.
#[derive(Clone)]
pub struct ConversionService {
    db_pool: Arc<DbPool>,
    audit: Arc<dyn AuditSink>,
    default_lead_time_days: i64,
}

impl ConversionService {
    pub fn new(db_pool: Arc<DbPool>, audit: Arc<dyn AuditSink>, default_lead_time_days: i64) -> Self {
        Self {
            db_pool,
            audit,
            default_lead_time_days,
        }
    }

    /// Promotes an approved quote into an order and marks the quote
    /// converted. Both writes commit together or not at all.
    #[instrument(skip(self, ctx), fields(quote_id = %quote_id))]
    pub async fn convert_quote_to_order(
        &self,
        quote_id: Uuid,
        ctx: AuditContext,
    ) -> Result<QuoteConversion, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let quote_model = QuoteEntity::find_by_id(quote_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Quote with ID {quote_id} not found"))
            })?;

        if quote_model.status != QuoteStatus::Approved {
            warn!(
                quote_id = %quote_id,
                status = quote_model.status.as_str(),
                "Rejected quote conversion"
            );
            return Err(ServiceError::PreconditionFailed(format!(
                "Only approved quotes can be converted (current status: {})",
                quote_model.status.as_str()
            )));
        }

        let customer = CustomerEntity::find_by_id(quote_model.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Customer {} referenced by quote {} not found",
                    quote_model.customer_id, quote_id
                ))
            })?;

        let line_items = LineItemEntity::find()
            .filter(quote_line_item::Column::QuoteId.eq(quote_id))
            .order_by_asc(quote_line_item::Column::Position)
            .all(&txn)
            .await?;

        let items: Vec<OrderItem> = line_items
            .iter()
            .map(|item| OrderItem {
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                material_id: item.material_id,
            })
            .collect();

        let order_id = Uuid::new_v4();
        let order_model = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(generate_number("SO")),
            quote_ref: Set(Some(quote_model.quote_reference.clone())),
            source_quote_id: Set(Some(quote_id)),
            customer_id: Set(customer.id),
            customer_name: Set(customer.name.clone()),
            status: Set(OrderStatus::Approved),
            job_id: Set(None),
            total_amount: Set(quote_model.total_amount),
            lead_time_weeks: Set(quote_model.lead_time_weeks),
            items: Set(orders::items_to_json(&items)?),
            notes: Set(None),
            ..Default::default()
        };
        let saved_order = order_model.insert(&txn).await?;

        let mut quote_active: quote::ActiveModel = quote_model.into();
        quote_active.status = Set(QuoteStatus::Converted);
        quote_active.updated_at = Set(Some(Utc::now()));
        let updated_quote = quote_active.update(&txn).await?;

        txn.commit().await?;

        info!(
            quote_id = %quote_id,
            order_id = %order_id,
            order_number = %saved_order.order_number,
            "Quote converted to order"
        );

        self.audit
            .record(
                AuditEntry::new(
                    AuditEntityType::Quote,
                    quote_id,
                    ChangeType::ConvertedToOrder,
                    ctx,
                )
                .with_detail(AuditDetail::Conversion {
                    source_id: quote_id,
                    target_id: order_id,
                }),
            )
            .await;

        Ok(QuoteConversion {
            order: orders::model_to_response(saved_order),
            quote: crate::services::quotes::model_to_response(updated_quote, line_items),
        })
    }

    /// Promotes an approved order into an active job. The order's `job_id`
    /// transitions null → set exactly once; a second call reports the
    /// existing job instead of creating another.
    #[instrument(skip(self, ctx), fields(order_id = %order_id))]
    pub async fn convert_order_to_job(
        &self,
        order_id: Uuid,
        ctx: AuditContext,
    ) -> Result<OrderConversion, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let order_model = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {order_id} not found"))
            })?;

        if let Some(existing_job_id) = order_model.job_id {
            warn!(
                order_id = %order_id,
                existing_job_id = %existing_job_id,
                "Order already converted to a job"
            );
            return Err(ServiceError::AlreadyConverted { existing_job_id });
        }

        if order_model.status != OrderStatus::Approved {
            warn!(
                order_id = %order_id,
                status = order_model.status.as_str(),
                "Rejected order conversion"
            );
            return Err(ServiceError::PreconditionFailed(format!(
                "Only approved orders can be converted to a job (current status: {})",
                order_model.status.as_str()
            )));
        }

        let now = Utc::now();
        let expected_end_date = match order_model.lead_time_weeks {
            Some(weeks) => now + Duration::days(i64::from(weeks) * 7),
            None => now + Duration::days(self.default_lead_time_days),
        };

        let job_id = Uuid::new_v4();
        let job_model = job::ActiveModel {
            id: Set(job_id),
            job_number: Set(generate_number("JOB")),
            title: Set(format!(
                "Production for {} ({})",
                order_model.order_number, order_model.customer_name
            )),
            customer_id: Set(order_model.customer_id),
            status: Set(JobStatus::Active),
            start_date: Set(now),
            expected_end_date: Set(expected_end_date),
            description: Set(None),
            created_by: Set(ctx.actor_id),
            ..Default::default()
        };
        let saved_job = job_model.insert(&txn).await?;

        let mut order_active: order::ActiveModel = order_model.into();
        order_active.job_id = Set(Some(job_id));
        order_active.status = Set(OrderStatus::InProduction);
        order_active.updated_at = Set(Some(now));
        let updated_order = order_active.update(&txn).await?;

        txn.commit().await?;

        info!(
            order_id = %order_id,
            job_id = %job_id,
            job_number = %saved_job.job_number,
            "Order converted to job"
        );

        self.audit
            .record(
                AuditEntry::new(
                    AuditEntityType::Order,
                    order_id,
                    ChangeType::ConvertedToJob,
                    ctx,
                )
                .with_detail(AuditDetail::Conversion {
                    source_id: order_id,
                    target_id: job_id,
                }),
            )
            .await;

        Ok(OrderConversion {
            job: crate::services::jobs::model_to_response(saved_job, Vec::new(), Vec::new()),
            order: orders::model_to_response(updated_order),
        })
    }
}
