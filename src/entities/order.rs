use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle states for an order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "in_production")]
    InProduction,
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    #[sea_orm(string_value = "ready_for_delivery")]
    ReadyForDelivery,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Valid transitions of the order state machine. `Cancelled` is
    /// reachable from every state except `Completed`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if next == Cancelled {
            return !matches!(self, Completed | Cancelled);
        }
        match (self, next) {
            (Draft, PendingApproval) | (Draft, Approved) => true,
            (PendingApproval, Approved) => true,
            (Approved, InProduction) => true,
            (InProduction, OnHold) | (InProduction, ReadyForDelivery) => true,
            (OnHold, InProduction) => true,
            (ReadyForDelivery, Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::InProduction => "in_production",
            Self::OnHold => "on_hold",
            Self::ReadyForDelivery => "ready_for_delivery",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    #[validate(length(
        min = 1,
        max = 50,
        message = "Order number must be between 1 and 50 characters"
    ))]
    pub order_number: String,

    /// Human-facing reference of the source quote, when the order came
    /// out of the conversion pipeline.
    pub quote_ref: Option<String>,
    pub source_quote_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub status: OrderStatus,
    /// Set exactly once when the order is converted to a job; never reset.
    pub job_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub lead_time_weeks: Option<i32>,
    /// Snapshot of the line items at order time.
    #[sea_orm(column_type = "Json")]
    pub items: Json,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::job::Entity",
        from = "Column::JobId",
        to = "super::job::Column::Id"
    )]
    Job,
    #[sea_orm(
        belongs_to = "super::quote::Entity",
        from = "Column::SourceQuoteId",
        to = "super::quote::Column::Id"
    )]
    SourceQuote,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_reachable_from_any_state_before_completed() {
        use OrderStatus::*;
        for status in [
            Draft,
            PendingApproval,
            Approved,
            InProduction,
            OnHold,
            ReadyForDelivery,
        ] {
            assert!(status.can_transition_to(Cancelled));
        }
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn production_flow_is_one_way() {
        use OrderStatus::*;
        assert!(Approved.can_transition_to(InProduction));
        assert!(!InProduction.can_transition_to(Approved));
        assert!(!Completed.can_transition_to(InProduction));
    }
}
