use crate::{
    audit::{AuditContext, AuditDetail, AuditEntry, AuditSink, ChangeType},
    db::DbPool,
    entities::audit_record::AuditEntityType,
    entities::customer::Entity as CustomerEntity,
    entities::quote::{self, Entity as QuoteEntity, Model as QuoteModel, QuoteStatus},
    entities::quote_line_item::{self, Entity as LineItemEntity, Model as LineItemModel},
    errors::ServiceError,
    services::generate_number,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteLineItemInput {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub material_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuoteRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub lead_time_weeks: Option<i32>,
    /// Overrides the computed line-item sum when present.
    pub total_amount: Option<Decimal>,
    pub line_items: Vec<QuoteLineItemInput>,
}

/// Optional overrides applied when cloning a quote.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CloneQuoteRequest {
    pub customer_id: Option<Uuid>,
    pub title: Option<String>,
    pub total_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteLineItemResponse {
    pub id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub material_id: Option<Uuid>,
    pub position: i32,
}

impl From<LineItemModel> for QuoteLineItemResponse {
    fn from(model: LineItemModel) -> Self {
        let line_total = model.line_total();
        Self {
            id: model.id,
            description: model.description,
            quantity: model.quantity,
            unit_price: model.unit_price,
            line_total,
            material_id: model.material_id,
            position: model.position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    pub id: Uuid,
    pub quote_number: String,
    pub quote_reference: String,
    pub version_number: i32,
    pub is_latest_version: bool,
    pub parent_quote_id: Option<Uuid>,
    pub status: QuoteStatus,
    pub customer_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub total_amount: Decimal,
    pub lead_time_weeks: Option<i32>,
    pub line_items: Vec<QuoteLineItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Service for creating and versioning quotes.
///
/// Cloning produces an independent draft under a fresh reference; revising
/// produces the next version inside the same reference and keeps the
/// one-latest-per-reference invariant by clearing prior flags in the same
/// transaction.
#[derive(Clone)]
pub struct QuoteService {
    db_pool: Arc<DbPool>,
    audit: Arc<dyn AuditSink>,
}

impl QuoteService {
    pub fn new(db_pool: Arc<DbPool>, audit: Arc<dyn AuditSink>) -> Self {
        Self { db_pool, audit }
    }

    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_quote(
        &self,
        request: CreateQuoteRequest,
        ctx: AuditContext,
    ) -> Result<QuoteResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_line_items(&request.line_items)?;

        let db = &*self.db_pool;

        let customer = CustomerEntity::find_by_id(request.customer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Customer {} does not exist",
                    request.customer_id
                ))
            })?;

        let quote_id = Uuid::new_v4();
        let total_amount = request
            .total_amount
            .unwrap_or_else(|| line_items_total(&request.line_items));

        let txn = db.begin().await?;

        let quote_model = quote::ActiveModel {
            id: Set(quote_id),
            quote_number: Set(generate_number("Q")),
            quote_reference: Set(generate_number("QR")),
            version_number: Set(1),
            is_latest_version: Set(true),
            parent_quote_id: Set(None),
            status: Set(QuoteStatus::Draft),
            customer_id: Set(customer.id),
            created_by: Set(ctx.actor_id),
            title: Set(request.title),
            description: Set(request.description),
            valid_until: Set(request.valid_until),
            total_amount: Set(total_amount),
            lead_time_weeks: Set(request.lead_time_weeks),
            ..Default::default()
        };

        let saved = quote_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, quote_id = %quote_id, "Failed to create quote");
            ServiceError::from(e)
        })?;

        let items = insert_line_items(&txn, quote_id, &request.line_items).await?;

        txn.commit().await?;

        info!(quote_id = %quote_id, quote_number = %saved.quote_number, "Quote created");

        self.audit
            .record(AuditEntry::new(
                AuditEntityType::Quote,
                quote_id,
                ChangeType::Create,
                ctx,
            ))
            .await;

        Ok(model_to_response(saved, items))
    }

    /// Creates an independent draft copy of a quote under a fresh
    /// reference. The source quote's version flags are not touched.
    #[instrument(skip(self, request), fields(source_quote_id = %source_quote_id))]
    pub async fn clone_quote(
        &self,
        source_quote_id: Uuid,
        request: CloneQuoteRequest,
        ctx: AuditContext,
    ) -> Result<QuoteResponse, ServiceError> {
        let db = &*self.db_pool;

        let source = QuoteEntity::find_by_id(source_quote_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Quote with ID {source_quote_id} not found"))
            })?;

        let source_items = LineItemEntity::find()
            .filter(quote_line_item::Column::QuoteId.eq(source_quote_id))
            .order_by_asc(quote_line_item::Column::Position)
            .all(db)
            .await?;

        let customer_id = request.customer_id.unwrap_or(source.customer_id);
        if CustomerEntity::find_by_id(customer_id).one(db).await?.is_none() {
            return Err(ServiceError::ValidationError(format!(
                "Customer {customer_id} does not exist"
            )));
        }

        let quote_id = Uuid::new_v4();
        let txn = db.begin().await?;

        let clone_model = quote::ActiveModel {
            id: Set(quote_id),
            quote_number: Set(generate_number("Q")),
            quote_reference: Set(generate_number("QR")),
            version_number: Set(1),
            is_latest_version: Set(true),
            parent_quote_id: Set(Some(source.id)),
            status: Set(QuoteStatus::Draft),
            customer_id: Set(customer_id),
            created_by: Set(ctx.actor_id),
            title: Set(request.title.unwrap_or_else(|| source.title.clone())),
            description: Set(source.description.clone()),
            valid_until: Set(source.valid_until),
            total_amount: Set(request.total_amount.unwrap_or(source.total_amount)),
            lead_time_weeks: Set(source.lead_time_weeks),
            ..Default::default()
        };

        let saved = clone_model.insert(&txn).await?;
        let items = copy_line_items(&txn, quote_id, &source_items).await?;

        txn.commit().await?;

        info!(
            quote_id = %quote_id,
            source_quote_id = %source.id,
            "Quote cloned into independent draft"
        );

        self.audit
            .record(
                AuditEntry::new(AuditEntityType::Quote, quote_id, ChangeType::Cloned, ctx)
                    .with_detail(AuditDetail::Conversion {
                        source_id: source.id,
                        target_id: quote_id,
                    }),
            )
            .await;

        Ok(model_to_response(saved, items))
    }

    /// Creates the next version of a quote inside its existing reference.
    /// Prior versions lose their latest flag in the same transaction.
    #[instrument(skip(self), fields(source_quote_id = %source_quote_id))]
    pub async fn revise_quote(
        &self,
        source_quote_id: Uuid,
        ctx: AuditContext,
    ) -> Result<QuoteResponse, ServiceError> {
        let db = &*self.db_pool;

        let source = QuoteEntity::find_by_id(source_quote_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Quote with ID {source_quote_id} not found"))
            })?;

        let source_items = LineItemEntity::find()
            .filter(quote_line_item::Column::QuoteId.eq(source_quote_id))
            .order_by_asc(quote_line_item::Column::Position)
            .all(db)
            .await?;

        let quote_id = Uuid::new_v4();
        let txn = db.begin().await?;

        let latest_version = QuoteEntity::find()
            .filter(quote::Column::QuoteReference.eq(source.quote_reference.clone()))
            .order_by_desc(quote::Column::VersionNumber)
            .one(&txn)
            .await?
            .map(|q| q.version_number)
            .unwrap_or(source.version_number);

        // Exactly one latest per reference: clear the flag on every prior
        // version before inserting the new one.
        QuoteEntity::update_many()
            .col_expr(
                quote::Column::IsLatestVersion,
                sea_orm::sea_query::Expr::value(false),
            )
            .filter(quote::Column::QuoteReference.eq(source.quote_reference.clone()))
            .exec(&txn)
            .await?;

        let revision_model = quote::ActiveModel {
            id: Set(quote_id),
            quote_number: Set(generate_number("Q")),
            quote_reference: Set(source.quote_reference.clone()),
            version_number: Set(latest_version + 1),
            is_latest_version: Set(true),
            parent_quote_id: Set(Some(source.id)),
            status: Set(QuoteStatus::Draft),
            customer_id: Set(source.customer_id),
            created_by: Set(ctx.actor_id),
            title: Set(source.title.clone()),
            description: Set(source.description.clone()),
            valid_until: Set(source.valid_until),
            total_amount: Set(source.total_amount),
            lead_time_weeks: Set(source.lead_time_weeks),
            ..Default::default()
        };

        let saved = revision_model.insert(&txn).await?;
        let items = copy_line_items(&txn, quote_id, &source_items).await?;

        txn.commit().await?;

        info!(
            quote_id = %quote_id,
            quote_reference = %saved.quote_reference,
            version = saved.version_number,
            "Quote revised"
        );

        self.audit
            .record(
                AuditEntry::new(AuditEntityType::Quote, quote_id, ChangeType::Revised, ctx)
                    .with_detail(AuditDetail::Conversion {
                        source_id: source.id,
                        target_id: quote_id,
                    }),
            )
            .await;

        Ok(model_to_response(saved, items))
    }

    #[instrument(skip(self), fields(quote_id = %quote_id))]
    pub async fn get_quote(&self, quote_id: Uuid) -> Result<QuoteResponse, ServiceError> {
        let db = &*self.db_pool;

        let quote = QuoteEntity::find_by_id(quote_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Quote with ID {quote_id} not found"))
            })?;

        let items = LineItemEntity::find()
            .filter(quote_line_item::Column::QuoteId.eq(quote_id))
            .order_by_asc(quote_line_item::Column::Position)
            .all(db)
            .await?;

        Ok(model_to_response(quote, items))
    }

    /// The full version chain of a reference, newest version first.
    #[instrument(skip(self))]
    pub async fn get_quote_history(
        &self,
        quote_reference: &str,
    ) -> Result<Vec<QuoteResponse>, ServiceError> {
        let db = &*self.db_pool;

        let quotes = QuoteEntity::find()
            .filter(quote::Column::QuoteReference.eq(quote_reference))
            .order_by_desc(quote::Column::VersionNumber)
            .all(db)
            .await?;

        if quotes.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "No quotes found for reference {quote_reference}"
            )));
        }

        let quote_ids: Vec<Uuid> = quotes.iter().map(|q| q.id).collect();
        let mut items_by_quote: HashMap<Uuid, Vec<LineItemModel>> = HashMap::new();
        let all_items = LineItemEntity::find()
            .filter(quote_line_item::Column::QuoteId.is_in(quote_ids))
            .order_by_asc(quote_line_item::Column::Position)
            .all(db)
            .await?;
        for item in all_items {
            items_by_quote.entry(item.quote_id).or_default().push(item);
        }

        Ok(quotes
            .into_iter()
            .map(|q| {
                let items = items_by_quote.remove(&q.id).unwrap_or_default();
                model_to_response(q, items)
            })
            .collect())
    }

    /// Applies a status transition. `converted` is only reachable through
    /// the conversion pipeline, never through this endpoint.
    #[instrument(skip(self, ctx), fields(quote_id = %quote_id, new_status = ?new_status))]
    pub async fn update_quote_status(
        &self,
        quote_id: Uuid,
        new_status: QuoteStatus,
        ctx: AuditContext,
    ) -> Result<QuoteResponse, ServiceError> {
        if new_status == QuoteStatus::Converted {
            return Err(ServiceError::InvalidStatus(
                "A quote becomes converted only by converting it to an order".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let quote = QuoteEntity::find_by_id(quote_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Quote with ID {quote_id} not found"))
            })?;

        let old_status = quote.status;
        if !old_status.can_transition_to(new_status) {
            warn!(
                quote_id = %quote_id,
                from = old_status.as_str(),
                to = new_status.as_str(),
                "Rejected quote status transition"
            );
            return Err(ServiceError::PreconditionFailed(format!(
                "Quote cannot move from {} to {}",
                old_status.as_str(),
                new_status.as_str()
            )));
        }

        let mut active: quote::ActiveModel = quote.into();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        let items = LineItemEntity::find()
            .filter(quote_line_item::Column::QuoteId.eq(quote_id))
            .order_by_asc(quote_line_item::Column::Position)
            .all(db)
            .await?;

        info!(
            quote_id = %quote_id,
            old_status = old_status.as_str(),
            new_status = new_status.as_str(),
            "Quote status updated"
        );

        self.audit
            .record(
                AuditEntry::new(
                    AuditEntityType::Quote,
                    quote_id,
                    ChangeType::StatusChange,
                    ctx,
                )
                .with_detail(AuditDetail::StatusChange {
                    from: old_status.as_str().to_string(),
                    to: new_status.as_str().to_string(),
                }),
            )
            .await;

        Ok(model_to_response(updated, items))
    }

    #[instrument(skip(self))]
    pub async fn list_quotes(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<QuoteResponse>, u64), ServiceError> {
        let paginator = QuoteEntity::find()
            .order_by_desc(quote::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let quotes = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((
            quotes
                .into_iter()
                .map(|q| model_to_response(q, Vec::new()))
                .collect(),
            total,
        ))
    }
}

fn validate_line_items(items: &[QuoteLineItemInput]) -> Result<(), ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::ValidationError(
            "A quote requires at least one line item".to_string(),
        ));
    }
    for (index, item) in items.iter().enumerate() {
        if item.description.trim().is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "line_items[{index}].description is required"
            )));
        }
        if item.quantity < 1 {
            return Err(ServiceError::ValidationError(format!(
                "line_items[{index}].quantity must be at least 1"
            )));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "line_items[{index}].unit_price must not be negative"
            )));
        }
    }
    Ok(())
}

fn line_items_total(items: &[QuoteLineItemInput]) -> Decimal {
    items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum()
}

async fn insert_line_items<C: sea_orm::ConnectionTrait>(
    conn: &C,
    quote_id: Uuid,
    inputs: &[QuoteLineItemInput],
) -> Result<Vec<LineItemModel>, ServiceError> {
    let mut saved = Vec::with_capacity(inputs.len());
    for (position, input) in inputs.iter().enumerate() {
        let model = quote_line_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            quote_id: Set(quote_id),
            description: Set(input.description.clone()),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            material_id: Set(input.material_id),
            position: Set(position as i32),
            ..Default::default()
        };
        saved.push(model.insert(conn).await?);
    }
    Ok(saved)
}

async fn copy_line_items<C: sea_orm::ConnectionTrait>(
    conn: &C,
    quote_id: Uuid,
    source_items: &[LineItemModel],
) -> Result<Vec<LineItemModel>, ServiceError> {
    let mut saved = Vec::with_capacity(source_items.len());
    for item in source_items {
        let model = quote_line_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            quote_id: Set(quote_id),
            description: Set(item.description.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            material_id: Set(item.material_id),
            position: Set(item.position),
            ..Default::default()
        };
        saved.push(model.insert(conn).await?);
    }
    Ok(saved)
}

pub(crate) fn model_to_response(model: QuoteModel, items: Vec<LineItemModel>) -> QuoteResponse {
    QuoteResponse {
        id: model.id,
        quote_number: model.quote_number,
        quote_reference: model.quote_reference,
        version_number: model.version_number,
        is_latest_version: model.is_latest_version,
        parent_quote_id: model.parent_quote_id,
        status: model.status,
        customer_id: model.customer_id,
        created_by: model.created_by,
        title: model.title,
        description: model.description,
        valid_until: model.valid_until,
        total_amount: model.total_amount,
        lead_time_weeks: model.lead_time_weeks,
        line_items: items.into_iter().map(Into::into).collect(),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
