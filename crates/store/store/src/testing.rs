use std::time::Duration;

use hookwork_core::{
    ActionDraft, ActionId, ActionProperty, ActionRecord, ActionStatus, ActionType, Authentication,
    TenantId,
};

use crate::error::StoreError;
use crate::lock::DistributedLock;
use crate::store::ActionStore;

fn tenant() -> TenantId {
    TenantId::new("conformance-tenant")
}

fn record(id: &str, action_type: ActionType) -> ActionRecord {
    let draft = ActionDraft::new(
        format!("action {id}"),
        "https://example.com/hook",
        Authentication::bearer("tok"),
    );
    ActionRecord::from_draft(ActionId::new(id), action_type, &draft)
}

/// Run the full action store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_store_conformance_tests(store: &dyn ActionStore) -> Result<(), StoreError> {
    test_get_missing(store).await?;
    test_insert_and_get(store).await?;
    test_insert_conflict(store).await?;
    test_list_by_type_order(store).await?;
    test_update(store).await?;
    test_update_missing(store).await?;
    test_update_keeps_status(store).await?;
    test_delete_removes_properties(store).await?;
    test_set_status(store).await?;
    test_count_by_type(store).await?;
    test_tenant_isolation(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn ActionStore) -> Result<(), StoreError> {
    let got = store.get(&tenant(), &ActionId::new("missing")).await?;
    assert!(got.is_none(), "get on missing id should return None");
    let props = store
        .get_properties(&tenant(), &ActionId::new("missing"))
        .await?;
    assert!(props.is_none(), "missing id should have no properties");
    Ok(())
}

async fn test_insert_and_get(store: &dyn ActionStore) -> Result<(), StoreError> {
    let mut rec = record("insert-get", ActionType::PreUpdatePassword);
    rec.properties
        .insert("format".into(), ActionProperty::primitive("PLAIN_TEXT"));
    store.insert(&tenant(), &rec).await?;

    let got = store.get(&tenant(), &rec.id).await?;
    assert_eq!(got.as_ref(), Some(&rec), "stored record should round-trip");

    let props = store.get_properties(&tenant(), &rec.id).await?;
    assert_eq!(props, Some(rec.properties.clone()));
    Ok(())
}

async fn test_insert_conflict(store: &dyn ActionStore) -> Result<(), StoreError> {
    let rec = record("dup", ActionType::PreRegistration);
    store.insert(&tenant(), &rec).await?;
    let second = store.insert(&tenant(), &rec).await;
    assert!(
        matches!(second, Err(StoreError::Conflict(_))),
        "duplicate insert should conflict"
    );
    Ok(())
}

async fn test_list_by_type_order(store: &dyn ActionStore) -> Result<(), StoreError> {
    let t = TenantId::new("conformance-order");
    for id in ["o-1", "o-2", "o-3"] {
        store.insert(&t, &record(id, ActionType::Authentication)).await?;
    }
    store
        .insert(&t, &record("o-other", ActionType::PreUpdateProfile))
        .await?;

    let listed = store.list_by_type(&t, ActionType::Authentication).await?;
    let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["o-1", "o-2", "o-3"], "list should keep insertion order");

    let empty = store
        .list_by_type(&t, ActionType::PreIssueAccessToken)
        .await?;
    assert!(empty.is_empty());
    Ok(())
}

async fn test_update(store: &dyn ActionStore) -> Result<(), StoreError> {
    let mut rec = record("update", ActionType::PreUpdatePassword);
    rec.properties
        .insert("format".into(), ActionProperty::primitive("PLAIN_TEXT"));
    store.insert(&tenant(), &rec).await?;

    rec.name = "renamed".into();
    rec.properties
        .insert("format".into(), ActionProperty::primitive("SHA256_HASHED"));
    store.update(&tenant(), &rec).await?;

    let got = store
        .get(&tenant(), &rec.id)
        .await?
        .expect("updated record should exist");
    assert_eq!(got.name, "renamed");
    assert_eq!(
        got.properties["format"].as_primitive(),
        Some("SHA256_HASHED")
    );
    Ok(())
}

async fn test_update_missing(store: &dyn ActionStore) -> Result<(), StoreError> {
    let rec = record("update-missing", ActionType::PreRegistration);
    let result = store.update(&tenant(), &rec).await;
    assert!(
        matches!(result, Err(StoreError::NotFound(_))),
        "update of missing record should fail with NotFound"
    );
    Ok(())
}

async fn test_update_keeps_status(store: &dyn ActionStore) -> Result<(), StoreError> {
    let mut rec = record("update-status", ActionType::PreRegistration);
    store.insert(&tenant(), &rec).await?;
    store
        .set_status(&tenant(), rec.action_type, &rec.id, ActionStatus::Inactive)
        .await?;

    // A write built from a read taken before the status flip.
    rec.name = "renamed".into();
    rec.status = ActionStatus::Active;
    store.update(&tenant(), &rec).await?;

    let got = store
        .get(&tenant(), &rec.id)
        .await?
        .expect("updated record should exist");
    assert_eq!(got.name, "renamed");
    assert_eq!(
        got.status,
        ActionStatus::Inactive,
        "update must not change the stored status"
    );
    Ok(())
}

async fn test_delete_removes_properties(store: &dyn ActionStore) -> Result<(), StoreError> {
    let mut rec = record("delete", ActionType::PreUpdatePassword);
    rec.properties.insert(
        "certificate".into(),
        ActionProperty::Object(serde_json::json!("PEM")),
    );
    store.insert(&tenant(), &rec).await?;

    assert!(store.delete(&tenant(), &rec.id).await?, "delete should report existing record");
    assert!(store.get(&tenant(), &rec.id).await?.is_none());
    assert!(
        store.get_properties(&tenant(), &rec.id).await?.is_none(),
        "properties should be removed with the record"
    );
    assert!(!store.delete(&tenant(), &rec.id).await?, "second delete should return false");
    Ok(())
}

async fn test_set_status(store: &dyn ActionStore) -> Result<(), StoreError> {
    let rec = record("status", ActionType::PreUpdateProfile);
    store.insert(&tenant(), &rec).await?;

    let updated = store
        .set_status(&tenant(), rec.action_type, &rec.id, ActionStatus::Inactive)
        .await?
        .expect("status flip should find the record");
    assert_eq!(updated.status, ActionStatus::Inactive);

    let wrong_type = store
        .set_status(
            &tenant(),
            ActionType::Authentication,
            &rec.id,
            ActionStatus::Active,
        )
        .await?;
    assert!(wrong_type.is_none(), "status flip must match on type");

    let missing = store
        .set_status(
            &tenant(),
            rec.action_type,
            &ActionId::new("nope"),
            ActionStatus::Active,
        )
        .await?;
    assert!(missing.is_none());
    Ok(())
}

async fn test_count_by_type(store: &dyn ActionStore) -> Result<(), StoreError> {
    let t = TenantId::new("conformance-count");
    store.insert(&t, &record("c-1", ActionType::PreIssueAccessToken)).await?;
    store.insert(&t, &record("c-2", ActionType::PreIssueAccessToken)).await?;
    store.insert(&t, &record("c-3", ActionType::PreRegistration)).await?;

    let counts = store.count_by_type(&t).await?;
    assert_eq!(counts.get(&ActionType::PreIssueAccessToken), Some(&2));
    assert_eq!(counts.get(&ActionType::PreRegistration), Some(&1));
    assert_eq!(counts.get(&ActionType::Authentication).copied().unwrap_or(0), 0);

    store.delete(&t, &ActionId::new("c-1")).await?;
    let counts = store.count_by_type(&t).await?;
    assert_eq!(counts.get(&ActionType::PreIssueAccessToken), Some(&1));
    Ok(())
}

async fn test_tenant_isolation(store: &dyn ActionStore) -> Result<(), StoreError> {
    let a = TenantId::new("conformance-a");
    let b = TenantId::new("conformance-b");
    let rec = record("shared-id", ActionType::PreRegistration);
    store.insert(&a, &rec).await?;
    store.insert(&b, &rec).await?;

    assert!(store.delete(&a, &rec.id).await?);
    assert!(store.get(&a, &rec.id).await?.is_none());
    assert!(
        store.get(&b, &rec.id).await?.is_some(),
        "delete in one tenant must not touch another"
    );
    Ok(())
}

/// Run the full distributed lock conformance test suite.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_lock_conformance_tests(lock: &dyn DistributedLock) -> Result<(), StoreError> {
    test_try_acquire_and_release(lock).await?;
    test_try_acquire_contention(lock).await?;
    test_lock_extend(lock).await?;
    test_lock_is_held(lock).await?;
    Ok(())
}

async fn test_try_acquire_and_release(lock: &dyn DistributedLock) -> Result<(), StoreError> {
    let guard = lock
        .try_acquire("test-lock-1", Duration::from_secs(10))
        .await?
        .expect("should acquire uncontested lock");
    guard.release().await?;

    let again = lock
        .try_acquire("test-lock-1", Duration::from_secs(10))
        .await?;
    assert!(again.is_some(), "released lock should be acquirable");
    if let Some(guard) = again {
        guard.release().await?;
    }
    Ok(())
}

async fn test_try_acquire_contention(lock: &dyn DistributedLock) -> Result<(), StoreError> {
    let held = lock
        .try_acquire("test-lock-2", Duration::from_secs(10))
        .await?
        .expect("should acquire lock");

    let second = lock
        .try_acquire("test-lock-2", Duration::from_secs(10))
        .await?;
    assert!(
        second.is_none(),
        "second acquire should fail while lock is held"
    );

    held.release().await?;
    Ok(())
}

async fn test_lock_extend(lock: &dyn DistributedLock) -> Result<(), StoreError> {
    let guard = lock
        .try_acquire("test-lock-3", Duration::from_secs(5))
        .await?
        .expect("should acquire lock");

    guard.extend(Duration::from_secs(10)).await?;
    assert!(guard.is_held().await?, "lock should still be held after extend");

    guard.release().await?;
    Ok(())
}

async fn test_lock_is_held(lock: &dyn DistributedLock) -> Result<(), StoreError> {
    let guard = lock
        .try_acquire("test-lock-4", Duration::from_secs(10))
        .await?
        .expect("should acquire lock");

    assert!(guard.is_held().await?, "lock should be held");
    guard.release().await?;
    Ok(())
}
