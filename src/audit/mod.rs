//! Append-only audit trail for quote/order/job mutations.
//!
//! Recording is a cross-cutting concern layered around each mutating
//! operation: the caller invokes [`AuditSink::record`] only after the
//! business write has committed. Sink failures are caught and logged
//! inside the sink and never propagate, so a broken trail cannot change
//! the outcome of the operation it describes.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::audit_record::{self, AuditEntityType};

/// Action tag describing what happened to the entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
    StatusChange,
    ConvertedToOrder,
    ConvertedToJob,
    MaterialAdded,
    CostAdded,
    CustomerApproval,
    Cloned,
    Revised,
}

/// The acting user plus an optional human-supplied reason, captured at
/// the operation boundary.
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub actor_id: Uuid,
    pub reason: Option<String>,
}

impl AuditContext {
    pub fn new(actor_id: Uuid) -> Self {
        Self {
            actor_id,
            reason: None,
        }
    }

    pub fn with_reason(actor_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            actor_id,
            reason: Some(reason.into()),
        }
    }
}

/// Structured payload attached to an audit record, one variant per
/// payload kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditDetail {
    StatusChange {
        from: String,
        to: String,
    },
    MaterialChange {
        material_id: Uuid,
        quantity_needed: Decimal,
        unit_cost: Decimal,
        action: String,
    },
    CustomerApproval {
        approved: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    Conversion {
        source_id: Uuid,
        target_id: Uuid,
    },
}

/// One pending audit record.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub entity_type: AuditEntityType,
    pub entity_id: Uuid,
    pub change_type: ChangeType,
    pub context: AuditContext,
    pub detail: Option<AuditDetail>,
}

impl AuditEntry {
    pub fn new(
        entity_type: AuditEntityType,
        entity_id: Uuid,
        change_type: ChangeType,
        context: AuditContext,
    ) -> Self {
        Self {
            entity_type,
            entity_id,
            change_type,
            context,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: AuditDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Destination for audit records. Implementations must swallow their own
/// failures; the signature is infallible on purpose.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry);
}

/// Persists audit records into the `audit_records` table.
#[derive(Clone)]
pub struct DbAuditSink {
    db: Arc<DbPool>,
}

impl DbAuditSink {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for DbAuditSink {
    async fn record(&self, entry: AuditEntry) {
        let detail = match entry
            .detail
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
        {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, entity_id = %entry.entity_id, "Failed to serialize audit detail");
                None
            }
        };

        let record = audit_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            entity_type: Set(entry.entity_type),
            entity_id: Set(entry.entity_id),
            change_type: Set(entry.change_type.to_string()),
            actor_id: Set(entry.context.actor_id),
            reason: Set(entry.context.reason.clone()),
            detail: Set(detail),
            ..Default::default()
        };

        // The wrapped operation has already committed. A failed audit
        // write is logged and dropped, never surfaced to the caller.
        match record.insert(&*self.db).await {
            Ok(saved) => {
                debug!(
                    audit_id = %saved.id,
                    entity_type = ?entry.entity_type,
                    entity_id = %entry.entity_id,
                    change_type = %entry.change_type,
                    "audit record written"
                );
            }
            Err(e) => {
                error!(
                    error = %e,
                    entity_type = ?entry.entity_type,
                    entity_id = %entry.entity_id,
                    change_type = %entry.change_type,
                    "Failed to write audit record"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn change_type_round_trips_through_strings() {
        assert_eq!(ChangeType::StatusChange.to_string(), "status_change");
        assert_eq!(
            ChangeType::from_str("converted_to_job").unwrap(),
            ChangeType::ConvertedToJob
        );
        assert!(ChangeType::from_str("bogus").is_err());
    }

    #[test]
    fn detail_payloads_are_tagged() {
        let detail = AuditDetail::StatusChange {
            from: "approved".into(),
            to: "converted".into(),
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["kind"], "status_change");
        assert_eq!(value["from"], "approved");
        assert_eq!(value["to"], "converted");

        let material = AuditDetail::MaterialChange {
            material_id: Uuid::nil(),
            quantity_needed: dec!(4),
            unit_cost: dec!(12.50),
            action: "added".into(),
        };
        let value = serde_json::to_value(&material).unwrap();
        assert_eq!(value["kind"], "material_change");

        let approval = AuditDetail::CustomerApproval {
            approved: true,
            signature: None,
        };
        let value = serde_json::to_value(&approval).unwrap();
        assert_eq!(value["kind"], "customer_approval");
        assert!(value.get("signature").is_none());
    }
}
