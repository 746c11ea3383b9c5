use crate::{
    audit::{AuditContext, AuditDetail, AuditEntry, AuditSink, ChangeType},
    db::DbPool,
    entities::audit_record::AuditEntityType,
    entities::customer::Entity as CustomerEntity,
    entities::order::{self, Entity as OrderEntity, Model as OrderModel, OrderStatus},
    errors::ServiceError,
    services::generate_number,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Line-item snapshot stored in the order's `items` JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_id: Option<Uuid>,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

pub fn items_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::line_total).sum()
}

pub fn items_to_json(items: &[OrderItem]) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(items)
        .map_err(|e| ServiceError::InternalError(format!("failed to encode order items: {e}")))
}

pub fn items_from_json(value: &serde_json::Value) -> Vec<OrderItem> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<OrderItem>,
    pub lead_time_weeks: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerApprovalRequest {
    pub approved: bool,
    pub signature: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub quote_ref: Option<String>,
    pub source_quote_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub status: OrderStatus,
    pub job_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub lead_time_weeks: Option<i32>,
    pub items: Vec<OrderItem>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub(crate) fn model_to_response(model: OrderModel) -> OrderResponse {
    let items = items_from_json(&model.items);
    OrderResponse {
        id: model.id,
        order_number: model.order_number,
        quote_ref: model.quote_ref,
        source_quote_id: model.source_quote_id,
        customer_id: model.customer_id,
        customer_name: model.customer_name,
        status: model.status,
        job_id: model.job_id,
        total_amount: model.total_amount,
        lead_time_weeks: model.lead_time_weeks,
        items,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Service for managing orders.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    audit: Arc<dyn AuditSink>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, audit: Arc<dyn AuditSink>) -> Self {
        Self { db_pool, audit }
    }

    /// Creates an order directly, outside the quote conversion path.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        ctx: AuditContext,
    ) -> Result<OrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        for (index, item) in request.items.iter().enumerate() {
            if item.quantity < 1 {
                return Err(ServiceError::ValidationError(format!(
                    "items[{index}].quantity must be at least 1"
                )));
            }
        }

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

        let order_id = Uuid::new_v4();
        let total_amount = items_total(&request.items);

        let model = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(generate_number("SO")),
            quote_ref: Set(None),
            source_quote_id: Set(None),
            customer_id: Set(customer.id),
            customer_name: Set(customer.name.clone()),
            status: Set(OrderStatus::Draft),
            job_id: Set(None),
            total_amount: Set(total_amount),
            lead_time_weeks: Set(request.lead_time_weeks),
            items: Set(items_to_json(&request.items)?),
            notes: Set(request.notes),
            ..Default::default()
        };

        let saved = model.insert(db).await?;

        info!(order_id = %order_id, order_number = %saved.order_number, "Order created");

        self.audit
            .record(AuditEntry::new(
                AuditEntityType::Order,
                order_id,
                ChangeType::Create,
                ctx,
            ))
            .await;

        Ok(model_to_response(saved))
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {order_id} not found"))
            })?;

        Ok(model_to_response(order))
    }

    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<OrderResponse>, u64), ServiceError> {
        let paginator = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((orders.into_iter().map(model_to_response).collect(), total))
    }

    /// Applies a status transition. `in_production` is normally set by the
    /// conversion pipeline but the transition table is the single gate.
    #[instrument(skip(self, ctx), fields(order_id = %order_id, new_status = ?new_status))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        ctx: AuditContext,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {order_id} not found"))
            })?;

        let old_status = order.status;
        if !old_status.can_transition_to(new_status) {
            warn!(
                order_id = %order_id,
                from = old_status.as_str(),
                to = new_status.as_str(),
                "Rejected order status transition"
            );
            return Err(ServiceError::PreconditionFailed(format!(
                "Order cannot move from {} to {}",
                old_status.as_str(),
                new_status.as_str()
            )));
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(
            order_id = %order_id,
            old_status = old_status.as_str(),
            new_status = new_status.as_str(),
            "Order status updated"
        );

        self.audit
            .record(
                AuditEntry::new(
                    AuditEntityType::Order,
                    order_id,
                    ChangeType::StatusChange,
                    ctx,
                )
                .with_detail(AuditDetail::StatusChange {
                    from: old_status.as_str().to_string(),
                    to: new_status.as_str().to_string(),
                }),
            )
            .await;

        Ok(model_to_response(updated))
    }

    /// Records a customer's approval decision. An approval moves the order
    /// to `approved`; a rejection leaves the status untouched. Either way
    /// the decision lands in the audit trail.
    #[instrument(skip(self, request, ctx), fields(order_id = %order_id, approved = request.approved))]
    pub async fn record_customer_approval(
        &self,
        order_id: Uuid,
        request: CustomerApprovalRequest,
        ctx: AuditContext,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {order_id} not found"))
            })?;

        let updated = if request.approved {
            let old_status = order.status;
            if !old_status.can_transition_to(OrderStatus::Approved) {
                return Err(ServiceError::PreconditionFailed(format!(
                    "Order cannot be approved from {}",
                    old_status.as_str()
                )));
            }
            let mut active: order::ActiveModel = order.into();
            active.status = Set(OrderStatus::Approved);
            active.updated_at = Set(Some(Utc::now()));
            active.update(db).await?
        } else {
            order
        };

        info!(order_id = %order_id, approved = request.approved, "Customer approval recorded");

        self.audit
            .record(
                AuditEntry::new(
                    AuditEntityType::Order,
                    order_id,
                    ChangeType::CustomerApproval,
                    ctx,
                )
                .with_detail(AuditDetail::CustomerApproval {
                    approved: request.approved,
                    signature: request.signature,
                }),
            )
            .await;

        Ok(model_to_response(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn widget(quantity: i32, unit_price: Decimal) -> OrderItem {
        OrderItem {
            description: "Widget".to_string(),
            quantity,
            unit_price,
            material_id: None,
        }
    }

    #[test]
    fn items_round_trip_through_json() {
        let items = vec![widget(2, dec!(10.00)), widget(1, dec!(5.25))];
        let value = items_to_json(&items).unwrap();
        let decoded = items_from_json(&value);
        assert_eq!(decoded, items);
    }

    #[test]
    fn items_total_matches_example() {
        let items = vec![widget(2, dec!(10))];
        assert_eq!(items_total(&items), dec!(20));
    }

    #[test]
    fn malformed_items_json_decodes_to_empty() {
        let decoded = items_from_json(&serde_json::json!({"not": "a list"}));
        assert!(decoded.is_empty());
    }
}
