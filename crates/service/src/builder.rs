use std::sync::Arc;

use tokio_util::task::TaskTracker;

use hookwork_audit::{AuditStore, RedactingAuditStore};
use hookwork_core::{ActionMgtError, ActionType};
use hookwork_extension::{
    ActionConverter, ActionPropertyResolver, ConverterRegistry, PasswordUpdateConverter,
    PasswordUpdateResolver, ResolverRegistry,
};
use hookwork_store::{ActionStore, DistributedLock, PersistenceFacade};

use crate::config::ServiceConfig;
use crate::service::ActionManagementService;

/// Fluent builder for constructing an [`ActionManagementService`].
///
/// An [`ActionStore`] and a [`DistributedLock`] must be supplied. Without an
/// audit store, mutations are not recorded.
pub struct ActionServiceBuilder {
    store: Option<Arc<dyn ActionStore>>,
    lock: Option<Arc<dyn DistributedLock>>,
    audit: Option<Arc<dyn AuditStore>>,
    resolvers: Arc<ResolverRegistry>,
    converters: Arc<ConverterRegistry>,
    config: ServiceConfig,
    builtin_plugins: bool,
}

impl ActionServiceBuilder {
    /// Create a new builder with empty registries and default configuration.
    pub fn new() -> Self {
        Self {
            store: None,
            lock: None,
            audit: None,
            resolvers: Arc::new(ResolverRegistry::new()),
            converters: Arc::new(ConverterRegistry::new()),
            config: ServiceConfig::default(),
            builtin_plugins: true,
        }
    }

    /// Set the action store implementation.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn ActionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the distributed lock implementation.
    #[must_use]
    pub fn lock(mut self, lock: Arc<dyn DistributedLock>) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Set the audit store for recording mutations.
    #[must_use]
    pub fn audit(mut self, store: Arc<dyn AuditStore>) -> Self {
        self.audit = Some(store);
        self
    }

    /// Use a shared resolver registry.
    #[must_use]
    pub fn resolvers(mut self, resolvers: Arc<ResolverRegistry>) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Use a shared converter registry.
    #[must_use]
    pub fn converters(mut self, converters: Arc<ConverterRegistry>) -> Self {
        self.converters = converters;
        self
    }

    /// Register a property resolver.
    #[must_use]
    pub fn resolver(self, resolver: Arc<dyn ActionPropertyResolver>) -> Self {
        self.resolvers.register(resolver);
        self
    }

    /// Register a converter.
    #[must_use]
    pub fn converter(self, converter: Arc<dyn ActionConverter>) -> Self {
        self.converters.register(converter);
        self
    }

    #[must_use]
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Whether to register the built-in `PRE_UPDATE_PASSWORD` plugins for
    /// types that have none. Enabled by default.
    #[must_use]
    pub fn builtin_plugins(mut self, enabled: bool) -> Self {
        self.builtin_plugins = enabled;
        self
    }

    /// Build the service.
    ///
    /// # Errors
    ///
    /// Returns [`ActionMgtError::Configuration`] if the store or lock is
    /// missing, or if the configuration is invalid.
    pub fn build(self) -> Result<ActionManagementService, ActionMgtError> {
        let store = self
            .store
            .ok_or_else(|| ActionMgtError::Configuration("action store is required".into()))?;

        let lock = self
            .lock
            .ok_or_else(|| ActionMgtError::Configuration("distributed lock is required".into()))?;

        self.config.validate()?;

        if self.builtin_plugins {
            if self.resolvers.get(ActionType::PreUpdatePassword).is_none() {
                self.resolvers.register(Arc::new(PasswordUpdateResolver));
            }
            if self.converters.get(ActionType::PreUpdatePassword).is_none() {
                self.converters.register(Arc::new(PasswordUpdateConverter));
            }
        }

        let audit = self
            .audit
            .filter(|_| self.config.audit.enabled)
            .map(|inner| -> Arc<dyn AuditStore> {
                Arc::new(RedactingAuditStore::new(
                    inner,
                    &self.config.audit.redact_config(),
                ))
            });

        Ok(ActionManagementService {
            facade: PersistenceFacade::new(store, Arc::clone(&self.resolvers)),
            resolvers: self.resolvers,
            converters: self.converters,
            lock,
            audit,
            audit_tracker: TaskTracker::new(),
            config: self.config,
        })
    }
}

impl Default for ActionServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
