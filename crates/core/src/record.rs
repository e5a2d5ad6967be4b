//! The persisted shape of an action: generic fields plus type-specific
//! property rows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::{Action, ActionDraft, ActionStatus, ActionUpdate, EndpointConfig, EndpointUpdate};
use crate::action_type::ActionType;
use crate::types::ActionId;

/// A single type-specific property value.
///
/// Primitive values are stored as plain text; object values are stored as
/// serialized JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActionProperty {
    Primitive(String),
    Object(Value),
}

impl ActionProperty {
    #[must_use]
    pub fn primitive(value: impl Into<String>) -> Self {
        Self::Primitive(value.into())
    }

    #[must_use]
    pub fn as_primitive(&self) -> Option<&str> {
        match self {
            Self::Primitive(s) => Some(s),
            Self::Object(_) => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Value> {
        match self {
            Self::Object(v) => Some(v),
            Self::Primitive(_) => None,
        }
    }

    /// Convert to a JSON value for the wire model.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Primitive(s) => Value::String(s.clone()),
            Self::Object(v) => v.clone(),
        }
    }
}

/// Type-specific properties keyed by property name.
pub type ActionProperties = HashMap<String, ActionProperty>;

/// The canonical record the persistence layer stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: ActionId,
    pub action_type: ActionType,
    pub name: String,
    pub description: Option<String>,
    pub status: ActionStatus,
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub properties: ActionProperties,
}

impl ActionRecord {
    /// Structural copy of the generic draft fields. Properties are left
    /// empty and the record starts out active.
    #[must_use]
    pub fn from_draft(id: ActionId, action_type: ActionType, draft: &ActionDraft) -> Self {
        Self {
            id,
            action_type,
            name: draft.name.clone(),
            description: non_empty(draft.description.as_ref()),
            status: ActionStatus::Active,
            endpoint: draft.endpoint.clone(),
            properties: ActionProperties::new(),
        }
    }

    /// Structural copy of the generic fields into the wire model, with no
    /// type-specific properties.
    #[must_use]
    pub fn to_generic_action(&self) -> Action {
        Action {
            id: self.id.clone(),
            action_type: self.action_type,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            endpoint: self.endpoint.clone(),
            properties: Map::new(),
        }
    }

    /// Apply patch semantics: every field present in `patch` replaces the
    /// stored value, everything else is kept. `id`, `action_type` and
    /// `status` are never touched. Patch properties overlay stored ones
    /// key by key.
    #[must_use]
    pub fn merged(&self, patch: &ActionPatch) -> Self {
        let mut merged = self.clone();
        if let Some(name) = &patch.name {
            merged.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            merged.description = Some(description.clone());
        }
        if let Some(endpoint) = &patch.endpoint {
            if let Some(uri) = &endpoint.uri {
                merged.endpoint.uri.clone_from(uri);
            }
            if let Some(authentication) = &endpoint.authentication {
                merged.endpoint.authentication = authentication.clone();
            }
        }
        for (key, value) in &patch.properties {
            merged.properties.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// The candidate record built from a partial update: only the fields the
/// caller supplied are present.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPatch {
    pub id: ActionId,
    pub action_type: ActionType,
    pub name: Option<String>,
    pub description: Option<String>,
    pub endpoint: Option<EndpointUpdate>,
    pub properties: ActionProperties,
}

impl ActionPatch {
    /// Structural copy of the generic update fields. Empty strings count as
    /// absent, and an endpoint with nothing in it is dropped.
    #[must_use]
    pub fn from_update(id: ActionId, action_type: ActionType, update: &ActionUpdate) -> Self {
        let endpoint = update
            .endpoint
            .as_ref()
            .map(|e| EndpointUpdate {
                uri: non_empty(e.uri.as_ref()),
                authentication: e.authentication.clone(),
            })
            .filter(|e| !e.is_empty());
        Self {
            id,
            action_type,
            name: non_empty(update.name.as_ref()),
            description: non_empty(update.description.as_ref()),
            endpoint,
            properties: ActionProperties::new(),
        }
    }

    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.endpoint.as_ref().and_then(|e| e.uri.as_deref())
    }

    #[must_use]
    pub fn authentication(&self) -> Option<&crate::action::Authentication> {
        self.endpoint.as_ref().and_then(|e| e.authentication.as_ref())
    }

    /// Returns `true` if the patch would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.endpoint.is_none()
            && self.properties.is_empty()
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.is_empty()).cloned()
}
