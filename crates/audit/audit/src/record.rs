use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hookwork_core::{Action, ActionId, ActionType, TenantId};

use crate::error::AuditError;

/// The mutation an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOperation {
    Add,
    Update,
    Delete,
    Activate,
    Deactivate,
}

impl AuditOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Activate => "ACTIVATE",
            Self::Deactivate => "DEACTIVATE",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit record capturing one committed action mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique identifier for this audit record (UUID v7, time ordered).
    pub id: String,
    pub operation: AuditOperation,
    pub tenant: TenantId,
    pub action_id: ActionId,
    pub action_type: ActionType,

    /// The action as committed. Absent for deletes.
    pub after: Option<serde_json::Value>,
    /// The action before the mutation, for updates and deletes.
    pub before: Option<serde_json::Value>,

    /// When the mutation was committed.
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Build a record for a mutation whose result is `after`.
    pub fn new(
        operation: AuditOperation,
        tenant: &TenantId,
        after: &Action,
    ) -> Result<Self, AuditError> {
        Ok(Self {
            after: Some(serde_json::to_value(after)?),
            ..Self::bare(operation, tenant, &after.id, after.action_type)
        })
    }

    /// Build a record for the deletion of `deleted`.
    pub fn deleted(tenant: &TenantId, deleted: &Action) -> Result<Self, AuditError> {
        Self::bare(AuditOperation::Delete, tenant, &deleted.id, deleted.action_type)
            .with_before(deleted)
    }

    /// Attach the prior state of the action.
    pub fn with_before(mut self, before: &Action) -> Result<Self, AuditError> {
        self.before = Some(serde_json::to_value(before)?);
        Ok(self)
    }

    fn bare(
        operation: AuditOperation,
        tenant: &TenantId,
        action_id: &ActionId,
        action_type: ActionType,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            operation,
            tenant: tenant.clone(),
            action_id: action_id.clone(),
            action_type,
            after: None,
            before: None,
            recorded_at: Utc::now(),
        }
    }
}

/// Query parameters for searching audit records.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    pub tenant: Option<TenantId>,
    pub action_id: Option<ActionId>,
    pub action_type: Option<ActionType>,
    pub operation: Option<AuditOperation>,
    /// Maximum number of records to return (default 50, max 1000).
    pub limit: Option<u32>,
    /// Number of records to skip for pagination.
    pub offset: Option<u32>,
}

impl AuditQuery {
    /// Return the effective limit, clamped to 1..=1000, defaulting to 50.
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(50).clamp(1, 1000)
    }

    /// Return the effective offset, defaulting to 0.
    pub fn effective_offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    /// Returns `true` if `record` passes every filter set on this query.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.tenant.as_ref().is_none_or(|t| *t == record.tenant)
            && self.action_id.as_ref().is_none_or(|id| *id == record.action_id)
            && self.action_type.is_none_or(|t| t == record.action_type)
            && self.operation.is_none_or(|op| op == record.operation)
    }
}

/// A paginated page of audit records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditPage {
    /// The records matching the query.
    pub records: Vec<AuditRecord>,
    /// Total number of records matching the query (before pagination).
    pub total: u64,
    /// The limit used for this page.
    pub limit: u32,
    /// The offset used for this page.
    pub offset: u32,
}
