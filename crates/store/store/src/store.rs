use std::collections::HashMap;

use async_trait::async_trait;

use hookwork_core::{ActionId, ActionProperties, ActionRecord, ActionStatus, ActionType, TenantId};

use crate::error::StoreError;

/// Storage backend for action records.
///
/// Each record is keyed by `(tenant, id)` and indexed by `(tenant, type)`.
/// The record's generic fields and its type-specific properties are one
/// unit: every method must write or remove both together, so a reader never
/// sees one without the other.
#[async_trait]
pub trait ActionStore: Send + Sync {
    /// Insert a new record with its properties.
    ///
    /// Fails with [`StoreError::Conflict`] if the id is already taken in the
    /// tenant.
    async fn insert(&self, tenant: &TenantId, record: &ActionRecord) -> Result<(), StoreError>;

    /// Fetch a record and its properties by id, regardless of type.
    async fn get(&self, tenant: &TenantId, id: &ActionId)
    -> Result<Option<ActionRecord>, StoreError>;

    /// List the records of one type in insertion order.
    async fn list_by_type(
        &self,
        tenant: &TenantId,
        action_type: ActionType,
    ) -> Result<Vec<ActionRecord>, StoreError>;

    /// Replace a stored record, properties included. The stored `status`
    /// is kept; only [`ActionStore::set_status`] changes it.
    ///
    /// Fails with [`StoreError::NotFound`] if no record has this id.
    async fn update(&self, tenant: &TenantId, record: &ActionRecord) -> Result<(), StoreError>;

    /// Remove a record and all of its properties.
    ///
    /// Returns `true` if the record existed.
    async fn delete(&self, tenant: &TenantId, id: &ActionId) -> Result<bool, StoreError>;

    /// Set the status of the record with this id and type.
    ///
    /// Returns the updated record, or `None` if no record of that type has
    /// this id.
    async fn set_status(
        &self,
        tenant: &TenantId,
        action_type: ActionType,
        id: &ActionId,
        status: ActionStatus,
    ) -> Result<Option<ActionRecord>, StoreError>;

    /// Count the tenant's records per type. Types with no records may be
    /// omitted.
    async fn count_by_type(&self, tenant: &TenantId)
    -> Result<HashMap<ActionType, u64>, StoreError>;

    /// Read the raw type-specific properties stored for an id.
    ///
    /// Returns `None` when no property rows exist for it.
    async fn get_properties(
        &self,
        tenant: &TenantId,
        id: &ActionId,
    ) -> Result<Option<ActionProperties>, StoreError>;
}
