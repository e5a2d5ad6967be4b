//! Credential redaction for audit records.
//!
//! [`RedactingAuditStore`] wraps any [`AuditStore`] and blanks the secret
//! endpoint authentication properties of the `before` and `after` snapshots
//! before they reach the inner store.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use hookwork_core::Authentication;

use crate::error::AuditError;
use crate::record::{AuditPage, AuditQuery, AuditRecord};
use crate::store::AuditStore;

/// Configuration for credential redaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactConfig {
    /// Authentication property names to redact (case-insensitive).
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    /// Placeholder text to replace redacted values with.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_fields() -> Vec<String> {
    Authentication::SECRET_PROPERTIES
        .iter()
        .map(|f| (*f).to_owned())
        .collect()
}

fn default_placeholder() -> String {
    "[REDACTED]".to_owned()
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            placeholder: default_placeholder(),
        }
    }
}

impl RedactConfig {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            placeholder: default_placeholder(),
        }
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }
}

/// Replaces secret authentication properties in serialized actions.
#[derive(Debug, Clone)]
pub struct Redactor {
    /// Lowercased property names to match.
    fields: Vec<String>,
    placeholder: Value,
}

impl Redactor {
    pub fn new(config: &RedactConfig) -> Self {
        Self {
            fields: config.fields.iter().map(|f| f.to_lowercase()).collect(),
            placeholder: Value::String(config.placeholder.clone()),
        }
    }

    /// Redact the `endpoint.authentication.properties` of a serialized
    /// action in place. Values elsewhere in the action are left alone.
    pub fn redact(&self, action: &mut Value) {
        let Some(properties) = action
            .pointer_mut("/endpoint/authentication/properties")
            .and_then(Value::as_object_mut)
        else {
            return;
        };
        for (key, value) in properties.iter_mut() {
            if self.fields.contains(&key.to_lowercase()) {
                value.clone_from(&self.placeholder);
            }
        }
    }

    /// Redact both snapshots of an audit record.
    pub fn redact_record(&self, record: &mut AuditRecord) {
        for snapshot in [record.after.as_mut(), record.before.as_mut()]
            .into_iter()
            .flatten()
        {
            self.redact(snapshot);
        }
    }
}

/// An audit store wrapper that redacts credentials before storage.
pub struct RedactingAuditStore {
    inner: Arc<dyn AuditStore>,
    redactor: Redactor,
}

impl RedactingAuditStore {
    pub fn new(inner: Arc<dyn AuditStore>, config: &RedactConfig) -> Self {
        Self {
            inner,
            redactor: Redactor::new(config),
        }
    }
}

#[async_trait]
impl AuditStore for RedactingAuditStore {
    async fn record(&self, entry: AuditRecord) -> Result<(), AuditError> {
        let mut redacted = entry;
        self.redactor.redact_record(&mut redacted);
        self.inner.record(redacted).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<AuditRecord>, AuditError> {
        self.inner.get_by_id(id).await
    }

    async fn query(&self, query: &AuditQuery) -> Result<AuditPage, AuditError> {
        self.inner.query(query).await
    }
}
