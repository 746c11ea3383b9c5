use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle states for a quote.
///
/// Approved quotes may be converted to an order; `Converted`, `Declined`
/// and `Expired` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "declined")]
    Declined,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "converted")]
    Converted,
}

impl QuoteStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Expired | Self::Converted)
    }

    /// Valid transitions of the quote state machine. Conversion to
    /// `Converted` is only reachable through the conversion pipeline.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        match (self, next) {
            (Draft, Sent) | (Draft, Pending) | (Draft, Approved) => true,
            (Sent, Pending) | (Sent, Approved) | (Sent, Declined) | (Sent, Expired) => true,
            (Pending, Approved) | (Pending, Declined) | (Pending, Expired) => true,
            (Approved, Converted) | (Approved, Declined) | (Approved, Expired) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Expired => "expired",
            Self::Converted => "converted",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    #[validate(length(
        min = 1,
        max = 50,
        message = "Quote number must be between 1 and 50 characters"
    ))]
    pub quote_number: String,

    /// Lineage key shared by all versions of the same quote.
    pub quote_reference: String,
    pub version_number: i32,
    pub is_latest_version: bool,
    pub parent_quote_id: Option<Uuid>,
    pub status: QuoteStatus,
    pub customer_id: Uuid,
    pub created_by: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub total_amount: Decimal,
    pub lead_time_weeks: Option<i32>,
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
    #[sea_orm(has_many = "super::quote_line_item::Entity")]
    LineItems,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::quote_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
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
    fn approved_is_the_only_convertible_status() {
        for status in [
            QuoteStatus::Draft,
            QuoteStatus::Sent,
            QuoteStatus::Pending,
            QuoteStatus::Declined,
            QuoteStatus::Expired,
            QuoteStatus::Converted,
        ] {
            assert!(!status.can_transition_to(QuoteStatus::Converted));
        }
        assert!(QuoteStatus::Approved.can_transition_to(QuoteStatus::Converted));
    }

    #[test]
    fn terminal_states_reject_all_transitions() {
        use QuoteStatus::*;
        for terminal in [Declined, Expired, Converted] {
            for next in [Draft, Sent, Pending, Approved, Declined, Expired, Converted] {
                assert!(
                    !terminal.can_transition_to(next),
                    "{terminal:?} -> {next:?} should be rejected"
                );
            }
        }
    }
}
