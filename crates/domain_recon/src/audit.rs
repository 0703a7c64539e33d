//! Audit events
//!
//! Append-only entries created alongside every ledger-mutating operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::AuditEventId;

/// Sentinel actor identifiers for non-interactive mutations
pub mod actors {
    /// Scheduled feed ingestion running inside the service
    pub const SYSTEM_SYNC: &str = "SYSTEM_SYNC";
    /// External scheduler calling the feed endpoint with the shared secret
    pub const API_KEY_USER: &str = "API_KEY_USER";
    /// Operator-driven bulk spreadsheet upload
    pub const MANUAL_UPLOAD: &str = "MANUAL_UPLOAD";
}

/// Audit action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
        }
    }
}

/// One append-only audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    /// Entity name, e.g. "Payment" or "SyncRecord"
    pub entity: String,
    pub entity_id: Uuid,
    pub action: AuditAction,
    /// Structured description of what changed
    pub payload: serde_json::Value,
    /// Acting user, or a sentinel from [`actors`]
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        entity: impl Into<String>,
        entity_id: Uuid,
        action: AuditAction,
        payload: serde_json::Value,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            id: AuditEventId::new_v7(),
            entity: entity.into(),
            entity_id,
            action,
            payload,
            actor: actor.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_new() {
        let entity_id = Uuid::new_v4();
        let event = AuditEvent::new(
            "Payment",
            entity_id,
            AuditAction::Create,
            serde_json::json!({ "amount": "1000" }),
            actors::SYSTEM_SYNC,
        );

        assert_eq!(event.entity, "Payment");
        assert_eq!(event.entity_id, entity_id);
        assert_eq!(event.actor, "SYSTEM_SYNC");
        assert_eq!(event.action.as_str(), "CREATE");
    }
}
