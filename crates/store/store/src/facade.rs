//! The single path through which action records are read and written.
//!
//! The facade pairs an [`ActionStore`] with the [`ResolverRegistry`]: the
//! type's resolver shapes the properties, and the backend commits them in
//! the same call as the generic fields.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use hookwork_core::{
    ActionId, ActionMgtError, ActionPatch, ActionProperties, ActionRecord, ActionStatus,
    ActionType, TenantId,
};
use hookwork_extension::ResolverRegistry;

use crate::error::StoreError;
use crate::store::ActionStore;

/// Consistency boundary over an [`ActionStore`].
#[derive(Clone)]
pub struct PersistenceFacade {
    store: Arc<dyn ActionStore>,
    resolvers: Arc<ResolverRegistry>,
}

impl PersistenceFacade {
    pub fn new(store: Arc<dyn ActionStore>, resolvers: Arc<ResolverRegistry>) -> Self {
        Self { store, resolvers }
    }

    /// Insert a new record together with its type-specific properties.
    ///
    /// If the insert fails after the resolver produced the properties, the
    /// resolver's `delete_properties` hook is run before the error is
    /// returned.
    pub async fn add(&self, record: &ActionRecord, tenant: &TenantId) -> Result<(), ActionMgtError> {
        let Some(resolver) = self.resolvers.get(record.action_type) else {
            return Ok(self.store.insert(tenant, record).await?);
        };

        let mut stored = record.clone();
        stored.properties = resolver.add_properties(record, tenant).await?;
        if let Err(e) = self.store.insert(tenant, &stored).await {
            if let Err(cleanup) = resolver.delete_properties(&stored, tenant).await {
                warn!(
                    action_id = %record.id,
                    error = %cleanup,
                    "failed to release properties after insert failure"
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// All records of a type in the tenant, in insertion order.
    pub async fn get_by_type(
        &self,
        action_type: ActionType,
        tenant: &TenantId,
    ) -> Result<Vec<ActionRecord>, ActionMgtError> {
        let records = self.store.list_by_type(tenant, action_type).await?;
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.read(record, tenant).await?);
        }
        Ok(out)
    }

    /// Point lookup. A record stored under a different type reads as absent.
    pub async fn get_by_id(
        &self,
        action_type: ActionType,
        id: &ActionId,
        tenant: &TenantId,
    ) -> Result<Option<ActionRecord>, ActionMgtError> {
        match self.store.get(tenant, id).await? {
            Some(record) if record.action_type == action_type => {
                Ok(Some(self.read(record, tenant).await?))
            }
            Some(record) => {
                debug!(
                    action_id = %id,
                    stored_type = %record.action_type,
                    requested_type = %action_type,
                    "action type mismatch on lookup"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Apply `patch` on top of `existing` and commit the merged record.
    /// The stored status is left as it is.
    ///
    /// Returns the merged record that was written.
    pub async fn update(
        &self,
        patch: &ActionPatch,
        existing: &ActionRecord,
        tenant: &TenantId,
    ) -> Result<ActionRecord, ActionMgtError> {
        let mut merged = existing.merged(patch);
        if let Some(resolver) = self.resolvers.get(existing.action_type) {
            merged.properties = resolver.update_properties(patch, existing, tenant).await?;
        }
        self.store
            .update(tenant, &merged)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ActionMgtError::NotFound {
                    action_type: existing.action_type,
                    id: existing.id.to_string(),
                },
                other => other.into(),
            })?;
        Ok(merged)
    }

    /// Remove the record and all of its properties.
    ///
    /// The backend removes both in one step, which is the commit. The
    /// resolver's cleanup hook runs afterwards; a cleanup failure is logged
    /// and does not fail the delete.
    pub async fn delete(&self, record: &ActionRecord, tenant: &TenantId) -> Result<(), ActionMgtError> {
        if !self.store.delete(tenant, &record.id).await? {
            return Err(ActionMgtError::NotFound {
                action_type: record.action_type,
                id: record.id.to_string(),
            });
        }
        let Some(resolver) = self.resolvers.get(record.action_type) else {
            return Ok(());
        };
        if let Err(e) = resolver.delete_properties(record, tenant).await {
            warn!(
                action_id = %record.id,
                error = %e,
                "failed to release properties after delete"
            );
        }
        Ok(())
    }

    /// Mark the record active.
    pub async fn activate(
        &self,
        action_type: ActionType,
        id: &ActionId,
        tenant: &TenantId,
    ) -> Result<ActionRecord, ActionMgtError> {
        self.set_status(action_type, id, tenant, ActionStatus::Active).await
    }

    /// Mark the record inactive.
    pub async fn deactivate(
        &self,
        action_type: ActionType,
        id: &ActionId,
        tenant: &TenantId,
    ) -> Result<ActionRecord, ActionMgtError> {
        self.set_status(action_type, id, tenant, ActionStatus::Inactive).await
    }

    /// Number of records per type in the tenant. Every catalog type is
    /// present in the result, with zero for types that have no records.
    pub async fn count_by_type(
        &self,
        tenant: &TenantId,
    ) -> Result<HashMap<ActionType, u64>, ActionMgtError> {
        let mut counts = self.store.count_by_type(tenant).await?;
        for action_type in ActionType::all() {
            counts.entry(*action_type).or_insert(0);
        }
        Ok(counts)
    }

    /// Raw type-specific properties stored for an id.
    pub async fn stored_properties(
        &self,
        id: &ActionId,
        tenant: &TenantId,
    ) -> Result<Option<ActionProperties>, ActionMgtError> {
        Ok(self.store.get_properties(tenant, id).await?)
    }

    async fn set_status(
        &self,
        action_type: ActionType,
        id: &ActionId,
        tenant: &TenantId,
        status: ActionStatus,
    ) -> Result<ActionRecord, ActionMgtError> {
        let record = self
            .store
            .set_status(tenant, action_type, id, status)
            .await?
            .ok_or_else(|| ActionMgtError::NotFound {
                action_type,
                id: id.to_string(),
            })?;
        self.read(record, tenant).await
    }

    async fn read(&self, mut record: ActionRecord, tenant: &TenantId) -> Result<ActionRecord, ActionMgtError> {
        if let Some(resolver) = self.resolvers.get(record.action_type) {
            record.properties = resolver.read_properties(&record, tenant).await?;
        }
        Ok(record)
    }
}
