use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use hookwork_core::{ActionMgtError, ActionPatch, ActionProperties, ActionRecord, ActionType, TenantId};

/// Type-specific validation and property persistence for one action type.
///
/// The validation hooks run before anything is persisted. The property
/// hooks run inside the persistence facade, so whatever they return is
/// committed together with the generic record. Every hook has a
/// pass-through default.
#[async_trait]
pub trait ActionPropertyResolver: Send + Sync {
    /// The action type this resolver governs.
    fn action_type(&self) -> ActionType;

    /// Validate a complete record before it is created.
    fn validate_for_add(&self, record: &ActionRecord) -> Result<(), ActionMgtError> {
        let _ = record;
        Ok(())
    }

    /// Validate the fields present in a partial update.
    fn validate_for_update(&self, patch: &ActionPatch) -> Result<(), ActionMgtError> {
        let _ = patch;
        Ok(())
    }

    /// Produce the properties to persist for a new record.
    async fn add_properties(
        &self,
        record: &ActionRecord,
        tenant: &TenantId,
    ) -> Result<ActionProperties, ActionMgtError> {
        let _ = tenant;
        Ok(record.properties.clone())
    }

    /// Turn persisted properties back into the record's properties.
    async fn read_properties(
        &self,
        record: &ActionRecord,
        tenant: &TenantId,
    ) -> Result<ActionProperties, ActionMgtError> {
        let _ = tenant;
        Ok(record.properties.clone())
    }

    /// Produce the properties to persist after applying `patch` to
    /// `existing`.
    async fn update_properties(
        &self,
        patch: &ActionPatch,
        existing: &ActionRecord,
        tenant: &TenantId,
    ) -> Result<ActionProperties, ActionMgtError> {
        let _ = tenant;
        Ok(existing.merged(patch).properties)
    }

    /// Release anything the resolver holds for a deleted record.
    async fn delete_properties(
        &self,
        record: &ActionRecord,
        tenant: &TenantId,
    ) -> Result<(), ActionMgtError> {
        let _ = (record, tenant);
        Ok(())
    }
}

/// Maps action types to their property resolvers.
///
/// Backed by a [`DashMap`] so plugins can be registered and removed while the
/// registry is shared. A type with no resolver gets generic-only behavior.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: DashMap<ActionType, Arc<dyn ActionPropertyResolver>>,
}

impl ResolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver under its [`ActionPropertyResolver::action_type`],
    /// replacing any previous one.
    pub fn register(&self, resolver: Arc<dyn ActionPropertyResolver>) {
        let action_type = resolver.action_type();
        debug!(%action_type, "registering action property resolver");
        self.resolvers.insert(action_type, resolver);
    }

    /// Remove the resolver for a type, returning it if one was registered.
    pub fn unregister(&self, action_type: ActionType) -> Option<Arc<dyn ActionPropertyResolver>> {
        debug!(%action_type, "unregistering action property resolver");
        self.resolvers.remove(&action_type).map(|(_, r)| r)
    }

    /// Look up the resolver for a type.
    pub fn get(&self, action_type: ActionType) -> Option<Arc<dyn ActionPropertyResolver>> {
        self.resolvers.get(&action_type).map(|r| Arc::clone(r.value()))
    }

    /// Return the registered types in catalog order.
    pub fn types(&self) -> Vec<ActionType> {
        let mut types: Vec<ActionType> = self.resolvers.iter().map(|e| *e.key()).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use hookwork_core::{ActionDraft, ActionId, ActionProperty, ActionUpdate, Authentication};

    use super::*;

    struct RejectAll(ActionType);

    impl ActionPropertyResolver for RejectAll {
        fn action_type(&self) -> ActionType {
            self.0
        }

        fn validate_for_add(&self, _record: &ActionRecord) -> Result<(), ActionMgtError> {
            Err(ActionMgtError::validation("properties", "rejected"))
        }
    }

    struct PassThrough;

    impl ActionPropertyResolver for PassThrough {
        fn action_type(&self) -> ActionType {
            ActionType::PreRegistration
        }
    }

    fn record() -> ActionRecord {
        let draft = ActionDraft::new("n", "https://x.io", Authentication::none());
        let mut rec = ActionRecord::from_draft(ActionId::new("a"), ActionType::PreRegistration, &draft);
        rec.properties
            .insert("k".into(), ActionProperty::primitive("v"));
        rec
    }

    #[test]
    fn empty_registry() {
        let reg = ResolverRegistry::new();
        assert!(reg.is_empty());
        assert!(reg.get(ActionType::PreIssueAccessToken).is_none());
    }

    #[test]
    fn register_get_and_unregister() {
        let reg = ResolverRegistry::new();
        reg.register(Arc::new(RejectAll(ActionType::PreUpdatePassword)));
        reg.register(Arc::new(RejectAll(ActionType::PreIssueAccessToken)));

        assert_eq!(reg.len(), 2);
        assert_eq!(
            reg.types(),
            vec![ActionType::PreIssueAccessToken, ActionType::PreUpdatePassword]
        );

        let resolver = reg.get(ActionType::PreUpdatePassword).unwrap();
        assert!(resolver.validate_for_add(&record()).is_err());

        assert!(reg.unregister(ActionType::PreUpdatePassword).is_some());
        assert!(reg.get(ActionType::PreUpdatePassword).is_none());
        assert!(reg.unregister(ActionType::PreUpdatePassword).is_none());
    }

    #[test]
    fn register_replaces_existing() {
        let reg = ResolverRegistry::new();
        reg.register(Arc::new(RejectAll(ActionType::PreRegistration)));
        reg.register(Arc::new(PassThrough));
        assert_eq!(reg.len(), 1);
        let resolver = reg.get(ActionType::PreRegistration).unwrap();
        assert!(resolver.validate_for_add(&record()).is_ok());
    }

    #[tokio::test]
    async fn default_hooks_pass_properties_through() {
        let resolver = PassThrough;
        let tenant = TenantId::new("t1");
        let rec = record();

        let added = resolver.add_properties(&rec, &tenant).await.unwrap();
        assert_eq!(added, rec.properties);

        let read = resolver.read_properties(&rec, &tenant).await.unwrap();
        assert_eq!(read, rec.properties);

        let mut patch = hookwork_core::ActionPatch::from_update(
            rec.id.clone(),
            rec.action_type,
            &ActionUpdate::default(),
        );
        patch
            .properties
            .insert("k".into(), ActionProperty::primitive("v2"));
        let updated = resolver.update_properties(&patch, &rec, &tenant).await.unwrap();
        assert_eq!(updated["k"].as_primitive(), Some("v2"));

        resolver.delete_properties(&rec, &tenant).await.unwrap();
    }
}
