use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use hookwork_audit::{AuditOperation, AuditStore};
use hookwork_core::validate::{validate_authentication, validate_name, validate_uri};
use hookwork_core::{
    Action, ActionDraft, ActionId, ActionMgtError, ActionPatch, ActionRecord, ActionStatus,
    ActionType, ActionUpdate, Authentication, TenantId,
};
use hookwork_extension::{ConverterRegistry, ResolverRegistry};
use hookwork_store::{DistributedLock, LockGuard, PersistenceFacade};

use crate::audit_helpers::build_audit_record;
use crate::config::ServiceConfig;

/// Creates, reads, updates, activates and deletes actions.
///
/// Every operation takes its action type as an untrusted path token and
/// resolves it before touching storage. Mutations are written through the
/// [`PersistenceFacade`] and recorded to the audit store in the background.
pub struct ActionManagementService {
    pub(crate) facade: PersistenceFacade,
    pub(crate) resolvers: Arc<ResolverRegistry>,
    pub(crate) converters: Arc<ConverterRegistry>,
    pub(crate) lock: Arc<dyn DistributedLock>,
    pub(crate) audit: Option<Arc<dyn AuditStore>>,
    pub(crate) audit_tracker: TaskTracker,
    pub(crate) config: ServiceConfig,
}

impl ActionManagementService {
    /// Create a new action.
    ///
    /// Creations of the same type in the same tenant are serialized, so the
    /// per-type quota holds under concurrent calls.
    #[instrument(name = "action_mgt.add", skip_all, fields(action_type = %type_token, tenant = %tenant))]
    pub async fn add(
        &self,
        type_token: &str,
        draft: &ActionDraft,
        tenant: &TenantId,
    ) -> Result<Action, ActionMgtError> {
        let action_type = ActionType::from_path(type_token)?;
        debug!("adding action");

        let lock_name = format!("quota:{tenant}:{action_type}");
        let guard = self.acquire(&lock_name).await?;
        let result = self.add_locked(action_type, draft, tenant).await;
        Self::release(guard, &lock_name).await;
        let action = result?;

        info!(action_id = %action.id, "action added");
        self.emit_audit(AuditOperation::Add, tenant, &action, None);
        Ok(action)
    }

    async fn add_locked(
        &self,
        action_type: ActionType,
        draft: &ActionDraft,
        tenant: &TenantId,
    ) -> Result<Action, ActionMgtError> {
        let max = self.config.max_for(action_type);
        let count = self
            .facade
            .count_by_type(tenant)
            .await?
            .get(&action_type)
            .copied()
            .unwrap_or(0);
        if count >= u64::from(max) {
            debug!(count, max, "action quota reached");
            return Err(ActionMgtError::QuotaExceeded { action_type, max });
        }

        let id = ActionId::new(Uuid::new_v4().to_string());
        let record = self.converters.to_record(action_type, &id, draft)?;
        self.validate_for_add(&record)?;

        self.facade.add(&record, tenant).await?;
        let committed = self.existing(action_type, &id, tenant).await?;
        Ok(self.converters.to_action(&committed))
    }

    /// All actions of a type in the tenant, in creation order.
    #[instrument(name = "action_mgt.get_by_type", skip_all, fields(action_type = %type_token, tenant = %tenant))]
    pub async fn get_by_type(
        &self,
        type_token: &str,
        tenant: &TenantId,
    ) -> Result<Vec<Action>, ActionMgtError> {
        let action_type = ActionType::from_path(type_token)?;
        debug!("listing actions");
        let records = self.facade.get_by_type(action_type, tenant).await?;
        Ok(records
            .iter()
            .map(|record| self.converters.to_action(record))
            .collect())
    }

    /// A single action. An action stored under another type is not found.
    #[instrument(name = "action_mgt.get_by_id", skip_all, fields(action_type = %type_token, action_id = %id, tenant = %tenant))]
    pub async fn get_by_id(
        &self,
        type_token: &str,
        id: &str,
        tenant: &TenantId,
    ) -> Result<Action, ActionMgtError> {
        let action_type = ActionType::from_path(type_token)?;
        debug!("fetching action");
        let record = self
            .existing(action_type, &ActionId::new(id), tenant)
            .await?;
        Ok(self.converters.to_action(&record))
    }

    /// Apply a partial update. Fields absent from `update` keep their
    /// stored values and are not validated; `status` is never changed.
    #[instrument(name = "action_mgt.update", skip_all, fields(action_type = %type_token, action_id = %id, tenant = %tenant))]
    pub async fn update(
        &self,
        type_token: &str,
        id: &str,
        update: &ActionUpdate,
        tenant: &TenantId,
    ) -> Result<Action, ActionMgtError> {
        let action_type = ActionType::from_path(type_token)?;
        let id = ActionId::new(id);
        debug!("updating action");

        let lock_name = format!("action:{tenant}:{id}");
        let guard = self.acquire(&lock_name).await?;
        let result = self.update_locked(action_type, &id, update, tenant).await;
        Self::release(guard, &lock_name).await;
        let (before, after) = result?;

        info!("action updated");
        self.emit_audit(AuditOperation::Update, tenant, &after, Some(&before));
        Ok(after)
    }

    async fn update_locked(
        &self,
        action_type: ActionType,
        id: &ActionId,
        update: &ActionUpdate,
        tenant: &TenantId,
    ) -> Result<(Action, Action), ActionMgtError> {
        let existing = self.existing(action_type, id, tenant).await?;
        let patch = self.converters.to_patch(action_type, id, update)?;
        self.validate_for_update(&patch)?;

        self.facade.update(&patch, &existing, tenant).await?;
        let committed = self.existing(action_type, id, tenant).await?;
        Ok((
            self.converters.to_action(&existing),
            self.converters.to_action(&committed),
        ))
    }

    /// Delete an action together with its type-specific properties.
    #[instrument(name = "action_mgt.delete", skip_all, fields(action_type = %type_token, action_id = %id, tenant = %tenant))]
    pub async fn delete(
        &self,
        type_token: &str,
        id: &str,
        tenant: &TenantId,
    ) -> Result<(), ActionMgtError> {
        let action_type = ActionType::from_path(type_token)?;
        let id = ActionId::new(id);
        debug!("deleting action");

        let lock_name = format!("action:{tenant}:{id}");
        let guard = self.acquire(&lock_name).await?;
        let result = async {
            let existing = self.existing(action_type, &id, tenant).await?;
            self.facade.delete(&existing, tenant).await?;
            Ok::<_, ActionMgtError>(existing)
        }
        .await;
        Self::release(guard, &lock_name).await;
        let deleted = result?;

        info!("action deleted");
        let deleted = self.converters.to_action(&deleted);
        self.emit_audit(AuditOperation::Delete, tenant, &deleted, None);
        Ok(())
    }

    /// Set an action's status to `ACTIVE`. Activating an active action
    /// succeeds and returns it unchanged.
    #[instrument(name = "action_mgt.activate", skip_all, fields(action_type = %type_token, action_id = %id, tenant = %tenant))]
    pub async fn activate(
        &self,
        type_token: &str,
        id: &str,
        tenant: &TenantId,
    ) -> Result<Action, ActionMgtError> {
        let action_type = ActionType::from_path(type_token)?;
        debug!("activating action");
        let action = self
            .set_status(action_type, &ActionId::new(id), tenant, ActionStatus::Active)
            .await?;
        info!("action activated");
        self.emit_audit(AuditOperation::Activate, tenant, &action, None);
        Ok(action)
    }

    /// Set an action's status to `INACTIVE`.
    #[instrument(name = "action_mgt.deactivate", skip_all, fields(action_type = %type_token, action_id = %id, tenant = %tenant))]
    pub async fn deactivate(
        &self,
        type_token: &str,
        id: &str,
        tenant: &TenantId,
    ) -> Result<Action, ActionMgtError> {
        let action_type = ActionType::from_path(type_token)?;
        debug!("deactivating action");
        let action = self
            .set_status(action_type, &ActionId::new(id), tenant, ActionStatus::Inactive)
            .await?;
        info!("action deactivated");
        self.emit_audit(AuditOperation::Deactivate, tenant, &action, None);
        Ok(action)
    }

    /// Flip the status under the per-action lock shared with `update` and
    /// `delete`.
    async fn set_status(
        &self,
        action_type: ActionType,
        id: &ActionId,
        tenant: &TenantId,
        status: ActionStatus,
    ) -> Result<Action, ActionMgtError> {
        let lock_name = format!("action:{tenant}:{id}");
        let guard = self.acquire(&lock_name).await?;
        let result = match status {
            ActionStatus::Active => self.facade.activate(action_type, id, tenant).await,
            ActionStatus::Inactive => self.facade.deactivate(action_type, id, tenant).await,
        };
        Self::release(guard, &lock_name).await;
        Ok(self.converters.to_action(&result?))
    }

    /// Number of actions per type in the tenant, with every catalog type
    /// present.
    #[instrument(name = "action_mgt.counts_by_type", skip_all, fields(tenant = %tenant))]
    pub async fn counts_by_type(
        &self,
        tenant: &TenantId,
    ) -> Result<HashMap<ActionType, u64>, ActionMgtError> {
        debug!("counting actions");
        self.facade.count_by_type(tenant).await
    }

    /// Replace only the endpoint authentication of an action.
    #[instrument(name = "action_mgt.update_endpoint_authentication", skip_all, fields(action_type = %type_token, action_id = %id, tenant = %tenant))]
    pub async fn update_endpoint_authentication(
        &self,
        type_token: &str,
        id: &str,
        authentication: Authentication,
        tenant: &TenantId,
    ) -> Result<Action, ActionMgtError> {
        let update = ActionUpdate::authentication_only(authentication);
        self.update(type_token, id, &update, tenant).await
    }

    /// Wait for every audit write spawned so far to finish.
    pub async fn flush_audit(&self) {
        self.audit_tracker.close();
        self.audit_tracker.wait().await;
        self.audit_tracker.reopen();
    }

    /// Stop accepting audit writes and wait for the pending ones.
    pub async fn shutdown(&self) {
        self.audit_tracker.close();
        self.audit_tracker.wait().await;
        info!("action management service shutdown complete");
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The resolver registry, for registering plugins at runtime.
    pub fn resolvers(&self) -> &Arc<ResolverRegistry> {
        &self.resolvers
    }

    /// The converter registry, for registering plugins at runtime.
    pub fn converters(&self) -> &Arc<ConverterRegistry> {
        &self.converters
    }

    async fn existing(
        &self,
        action_type: ActionType,
        id: &ActionId,
        tenant: &TenantId,
    ) -> Result<ActionRecord, ActionMgtError> {
        self.facade
            .get_by_id(action_type, id, tenant)
            .await?
            .ok_or_else(|| ActionMgtError::NotFound {
                action_type,
                id: id.to_string(),
            })
    }

    fn validate_for_add(&self, record: &ActionRecord) -> Result<(), ActionMgtError> {
        validate_name(&record.name)?;
        validate_uri(&record.endpoint.uri)?;
        validate_authentication(&record.endpoint.authentication)?;
        if let Some(resolver) = self.resolvers.get(record.action_type) {
            resolver.validate_for_add(record)?;
        }
        Ok(())
    }

    fn validate_for_update(&self, patch: &ActionPatch) -> Result<(), ActionMgtError> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(uri) = patch.uri() {
            validate_uri(uri)?;
        }
        if let Some(authentication) = patch.authentication() {
            validate_authentication(authentication)?;
        }
        if let Some(resolver) = self.resolvers.get(patch.action_type) {
            resolver.validate_for_update(patch)?;
        }
        Ok(())
    }

    async fn acquire(&self, lock_name: &str) -> Result<Box<dyn LockGuard>, ActionMgtError> {
        self.lock
            .acquire(lock_name, self.config.lock_ttl(), self.config.lock_timeout())
            .await
            .map_err(|e| ActionMgtError::Lock(e.to_string()))
    }

    async fn release(guard: Box<dyn LockGuard>, lock_name: &str) {
        if let Err(e) = guard.release().await {
            warn!(lock = lock_name, error = %e, "failed to release lock");
        }
    }

    fn emit_audit(
        &self,
        operation: AuditOperation,
        tenant: &TenantId,
        subject: &Action,
        before: Option<&Action>,
    ) {
        let Some(audit) = &self.audit else {
            return;
        };
        let record = match build_audit_record(operation, tenant, subject, before) {
            Ok(record) => record,
            Err(e) => {
                warn!(%operation, error = %e, "failed to build audit record");
                return;
            }
        };
        let audit = Arc::clone(audit);
        self.audit_tracker.spawn(async move {
            if let Err(e) = audit.record(record).await {
                warn!(error = %e, "audit recording failed");
            }
        });
    }
}
