use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use hookwork_core::{ActionId, ActionProperties, ActionRecord, ActionStatus, ActionType, TenantId};
use hookwork_store::error::StoreError;
use hookwork_store::store::ActionStore;

/// Generic fields of a stored record plus its insertion sequence number.
#[derive(Debug, Clone)]
struct Row {
    seq: u64,
    record: ActionRecord,
}

/// The generic table and property table of one tenant.
#[derive(Debug, Default)]
struct TenantTables {
    next_seq: u64,
    rows: HashMap<ActionId, Row>,
    properties: HashMap<ActionId, ActionProperties>,
}

impl TenantTables {
    /// Split `record` across the two tables, replacing anything stored
    /// under the same id.
    fn put(&mut self, seq: u64, record: &ActionRecord) {
        let mut generic = record.clone();
        let properties = std::mem::take(&mut generic.properties);
        if properties.is_empty() {
            self.properties.remove(&record.id);
        } else {
            self.properties.insert(record.id.clone(), properties);
        }
        self.rows.insert(
            record.id.clone(),
            Row {
                seq,
                record: generic,
            },
        );
    }

    /// Join a row with its properties.
    fn joined(&self, row: &Row) -> ActionRecord {
        let mut record = row.record.clone();
        if let Some(props) = self.properties.get(&record.id) {
            record.properties.clone_from(props);
        }
        record
    }
}

/// In-memory [`ActionStore`] backed by a [`DashMap`] of per-tenant tables.
///
/// Every operation runs under the tenant's shard lock, so the generic row
/// and its properties always change together.
#[derive(Debug, Default)]
pub struct MemoryActionStore {
    tenants: DashMap<TenantId, TenantTables>,
}

impl MemoryActionStore {
    /// Create a new, empty in-memory action store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActionStore for MemoryActionStore {
    async fn insert(&self, tenant: &TenantId, record: &ActionRecord) -> Result<(), StoreError> {
        let mut tables = self.tenants.entry(tenant.clone()).or_default();
        if tables.rows.contains_key(&record.id) {
            return Err(StoreError::Conflict(record.id.to_string()));
        }
        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.put(seq, record);
        Ok(())
    }

    async fn get(
        &self,
        tenant: &TenantId,
        id: &ActionId,
    ) -> Result<Option<ActionRecord>, StoreError> {
        let Some(tables) = self.tenants.get(tenant) else {
            return Ok(None);
        };
        Ok(tables.rows.get(id).map(|row| tables.joined(row)))
    }

    async fn list_by_type(
        &self,
        tenant: &TenantId,
        action_type: ActionType,
    ) -> Result<Vec<ActionRecord>, StoreError> {
        let Some(tables) = self.tenants.get(tenant) else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<&Row> = tables
            .rows
            .values()
            .filter(|row| row.record.action_type == action_type)
            .collect();
        rows.sort_by_key(|row| row.seq);
        Ok(rows.into_iter().map(|row| tables.joined(row)).collect())
    }

    async fn update(&self, tenant: &TenantId, record: &ActionRecord) -> Result<(), StoreError> {
        let not_found = || StoreError::NotFound(record.id.to_string());
        let mut tables = self.tenants.get_mut(tenant).ok_or_else(not_found)?;
        let stored = tables.rows.get(&record.id).ok_or_else(not_found)?;
        let seq = stored.seq;
        let mut record = record.clone();
        record.status = stored.record.status;
        tables.put(seq, &record);
        Ok(())
    }

    async fn delete(&self, tenant: &TenantId, id: &ActionId) -> Result<bool, StoreError> {
        let Some(mut tables) = self.tenants.get_mut(tenant) else {
            return Ok(false);
        };
        let existed = tables.rows.remove(id).is_some();
        tables.properties.remove(id);
        Ok(existed)
    }

    async fn set_status(
        &self,
        tenant: &TenantId,
        action_type: ActionType,
        id: &ActionId,
        status: ActionStatus,
    ) -> Result<Option<ActionRecord>, StoreError> {
        let Some(mut tables) = self.tenants.get_mut(tenant) else {
            return Ok(None);
        };
        let Some(row) = tables
            .rows
            .get_mut(id)
            .filter(|row| row.record.action_type == action_type)
        else {
            return Ok(None);
        };
        row.record.status = status;
        let row = row.clone();
        Ok(Some(tables.joined(&row)))
    }

    async fn count_by_type(
        &self,
        tenant: &TenantId,
    ) -> Result<HashMap<ActionType, u64>, StoreError> {
        let mut counts = HashMap::new();
        if let Some(tables) = self.tenants.get(tenant) {
            for row in tables.rows.values() {
                *counts.entry(row.record.action_type).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn get_properties(
        &self,
        tenant: &TenantId,
        id: &ActionId,
    ) -> Result<Option<ActionProperties>, StoreError> {
        Ok(self
            .tenants
            .get(tenant)
            .and_then(|tables| tables.properties.get(id).cloned()))
    }
}
