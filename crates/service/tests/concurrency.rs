mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use hookwork_audit::{AuditOperation, AuditQuery, AuditStore};
use hookwork_audit_memory::MemoryAuditStore;
use hookwork_core::{
    ActionId, ActionMgtError, ActionProperties, ActionRecord, ActionStatus, ActionType,
    ActionUpdate, TenantId,
};
use hookwork_extension::ActionPropertyResolver;
use hookwork_service::{ActionManagementService, ActionServiceBuilder};
use hookwork_store::{ActionStore, StoreError};
use hookwork_store_memory::{MemoryActionStore, MemoryDistributedLock};

use common::{bearer_draft, harness, tenant};

/// [`ActionStore`] whose point reads are slow, widening the window between
/// an update's read and its write.
struct SlowReads {
    inner: MemoryActionStore,
    delay: Duration,
}

#[async_trait]
impl ActionStore for SlowReads {
    async fn insert(&self, tenant: &TenantId, record: &ActionRecord) -> Result<(), StoreError> {
        self.inner.insert(tenant, record).await
    }

    async fn get(
        &self,
        tenant: &TenantId,
        id: &ActionId,
    ) -> Result<Option<ActionRecord>, StoreError> {
        let record = self.inner.get(tenant, id).await?;
        tokio::time::sleep(self.delay).await;
        Ok(record)
    }

    async fn list_by_type(
        &self,
        tenant: &TenantId,
        action_type: ActionType,
    ) -> Result<Vec<ActionRecord>, StoreError> {
        self.inner.list_by_type(tenant, action_type).await
    }

    async fn update(&self, tenant: &TenantId, record: &ActionRecord) -> Result<(), StoreError> {
        self.inner.update(tenant, record).await
    }

    async fn delete(&self, tenant: &TenantId, id: &ActionId) -> Result<bool, StoreError> {
        self.inner.delete(tenant, id).await
    }

    async fn set_status(
        &self,
        tenant: &TenantId,
        action_type: ActionType,
        id: &ActionId,
        status: ActionStatus,
    ) -> Result<Option<ActionRecord>, StoreError> {
        self.inner.set_status(tenant, action_type, id, status).await
    }

    async fn count_by_type(
        &self,
        tenant: &TenantId,
    ) -> Result<HashMap<ActionType, u64>, StoreError> {
        self.inner.count_by_type(tenant).await
    }

    async fn get_properties(
        &self,
        tenant: &TenantId,
        id: &ActionId,
    ) -> Result<Option<ActionProperties>, StoreError> {
        self.inner.get_properties(tenant, id).await
    }
}

fn slow_service() -> Arc<ActionManagementService> {
    let store = SlowReads {
        inner: MemoryActionStore::new(),
        delay: Duration::from_millis(200),
    };
    let service = ActionServiceBuilder::new()
        .store(Arc::new(store))
        .lock(Arc::new(MemoryDistributedLock::new()))
        .build()
        .expect("service should build");
    Arc::new(service)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn deactivate_during_update_is_not_undone() {
    let service = slow_service();
    let added = service
        .add("preregistration", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();
    let id = added.id.to_string();

    let rename = {
        let service = Arc::clone(&service);
        let id = id.clone();
        tokio::spawn(async move {
            service
                .update(
                    "preregistration",
                    &id,
                    &ActionUpdate::default().with_name("Renamed"),
                    &tenant(),
                )
                .await
        })
    };
    // Land inside the update's read window.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let off = service
        .deactivate("preregistration", &id, &tenant())
        .await
        .unwrap();
    assert_eq!(off.status, ActionStatus::Inactive);
    rename.await.expect("task panicked").unwrap();

    let stored = service
        .get_by_id("preregistration", &id, &tenant())
        .await
        .unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.status, ActionStatus::Inactive);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_to_disjoint_fields_both_land() {
    let service = slow_service();
    let added = service
        .add("preregistration", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();
    let id = added.id.to_string();

    let updates = [
        ActionUpdate::default().with_name("Renamed"),
        ActionUpdate::default().with_uri("https://example.com/moved"),
    ];
    let tasks: Vec<_> = updates
        .into_iter()
        .map(|update| {
            let service = Arc::clone(&service);
            let id = id.clone();
            tokio::spawn(async move {
                service
                    .update("preregistration", &id, &update, &tenant())
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.expect("task panicked").unwrap();
    }

    let stored = service
        .get_by_id("preregistration", &id, &tenant())
        .await
        .unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.endpoint.uri, "https://example.com/moved");
    assert_eq!(stored.status, ActionStatus::Active);
}

/// Resolver whose cleanup hook always fails.
struct FailingCleanup;

#[async_trait]
impl ActionPropertyResolver for FailingCleanup {
    fn action_type(&self) -> ActionType {
        ActionType::Authentication
    }

    async fn delete_properties(
        &self,
        _record: &ActionRecord,
        _tenant: &TenantId,
    ) -> Result<(), ActionMgtError> {
        Err(ActionMgtError::Plugin("cleanup failed".into()))
    }
}

#[tokio::test]
async fn committed_delete_reports_success_when_cleanup_fails() {
    let store = Arc::new(MemoryActionStore::new());
    let audit = Arc::new(MemoryAuditStore::new());
    let service = ActionServiceBuilder::new()
        .store(store.clone())
        .lock(Arc::new(MemoryDistributedLock::new()))
        .audit(audit.clone())
        .resolver(Arc::new(FailingCleanup))
        .build()
        .unwrap();

    let added = service
        .add("authentication", &bearer_draft("Hook"), &tenant())
        .await
        .unwrap();
    service
        .delete("authentication", added.id.as_str(), &tenant())
        .await
        .unwrap();

    let err = service
        .get_by_id("authentication", added.id.as_str(), &tenant())
        .await
        .unwrap_err();
    assert!(matches!(err, ActionMgtError::NotFound { .. }));
    assert!(store.get_properties(&tenant(), &added.id).await.unwrap().is_none());

    service.flush_audit().await;
    let page = audit
        .query(&AuditQuery {
            operation: Some(AuditOperation::Delete),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].action_id, added.id);
}

#[tokio::test]
async fn activate_of_missing_action_releases_its_lock() {
    let h = harness();
    for _ in 0..2 {
        let err = h
            .service
            .activate("preregistration", "missing", &tenant())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionMgtError::NotFound { .. }));
    }
}
