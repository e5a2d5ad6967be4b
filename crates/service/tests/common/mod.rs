#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use hookwork_audit_memory::MemoryAuditStore;
use hookwork_core::{
    ActionDraft, ActionId, ActionProperties, ActionRecord, ActionStatus, ActionType,
    Authentication, TenantId,
};
use hookwork_service::{ActionManagementService, ActionServiceBuilder, ServiceConfig};
use hookwork_store::{ActionStore, StoreError};
use hookwork_store_memory::{MemoryActionStore, MemoryDistributedLock};

/// [`ActionStore`] wrapper that counts every call reaching the backend.
pub struct CountingStore {
    inner: MemoryActionStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryActionStore::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ActionStore for CountingStore {
    async fn insert(&self, tenant: &TenantId, record: &ActionRecord) -> Result<(), StoreError> {
        self.hit();
        self.inner.insert(tenant, record).await
    }

    async fn get(
        &self,
        tenant: &TenantId,
        id: &ActionId,
    ) -> Result<Option<ActionRecord>, StoreError> {
        self.hit();
        self.inner.get(tenant, id).await
    }

    async fn list_by_type(
        &self,
        tenant: &TenantId,
        action_type: ActionType,
    ) -> Result<Vec<ActionRecord>, StoreError> {
        self.hit();
        self.inner.list_by_type(tenant, action_type).await
    }

    async fn update(&self, tenant: &TenantId, record: &ActionRecord) -> Result<(), StoreError> {
        self.hit();
        self.inner.update(tenant, record).await
    }

    async fn delete(&self, tenant: &TenantId, id: &ActionId) -> Result<bool, StoreError> {
        self.hit();
        self.inner.delete(tenant, id).await
    }

    async fn set_status(
        &self,
        tenant: &TenantId,
        action_type: ActionType,
        id: &ActionId,
        status: ActionStatus,
    ) -> Result<Option<ActionRecord>, StoreError> {
        self.hit();
        self.inner.set_status(tenant, action_type, id, status).await
    }

    async fn count_by_type(
        &self,
        tenant: &TenantId,
    ) -> Result<HashMap<ActionType, u64>, StoreError> {
        self.hit();
        self.inner.count_by_type(tenant).await
    }

    async fn get_properties(
        &self,
        tenant: &TenantId,
        id: &ActionId,
    ) -> Result<Option<ActionProperties>, StoreError> {
        self.hit();
        self.inner.get_properties(tenant, id).await
    }
}

/// A service wired to in-memory backends, with handles on the backends.
pub struct Harness {
    pub service: Arc<ActionManagementService>,
    pub store: Arc<CountingStore>,
    pub audit: Arc<MemoryAuditStore>,
}

pub fn harness() -> Harness {
    harness_with(ServiceConfig::default(), ActionServiceBuilder::new())
}

pub fn harness_with(config: ServiceConfig, builder: ActionServiceBuilder) -> Harness {
    let store = Arc::new(CountingStore::new());
    let audit = Arc::new(MemoryAuditStore::new());
    let service = builder
        .store(store.clone())
        .lock(Arc::new(MemoryDistributedLock::new()))
        .audit(audit.clone())
        .config(config)
        .build()
        .expect("service should build");
    Harness {
        service: Arc::new(service),
        store,
        audit,
    }
}

pub fn tenant() -> TenantId {
    TenantId::new("tenant1")
}

pub fn bearer_draft(name: &str) -> ActionDraft {
    ActionDraft::new(name, "https://example.com/hook", Authentication::bearer("tok"))
}
