use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use hookwork_core::{
    Action, ActionDraft, ActionId, ActionMgtError, ActionPatch, ActionRecord, ActionType,
    ActionUpdate,
};

/// Reshapes the wire model of one action type to and from its persisted
/// record.
///
/// Generic fields are expected to be copied as-is; a converter exists for
/// types that keep structured data in `properties`.
pub trait ActionConverter: Send + Sync {
    /// The action type this converter handles.
    fn action_type(&self) -> ActionType;

    /// Build the record for a new action.
    fn to_record(&self, id: &ActionId, draft: &ActionDraft) -> Result<ActionRecord, ActionMgtError>;

    /// Build the candidate patch for a partial update.
    fn to_patch(&self, id: &ActionId, update: &ActionUpdate) -> Result<ActionPatch, ActionMgtError>;

    /// Build the wire model from a persisted record.
    fn to_action(&self, record: &ActionRecord) -> Action;
}

/// Maps action types to their converters, falling back to a structural
/// copy of the generic fields when none is registered.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: DashMap<ActionType, Arc<dyn ActionConverter>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter under its [`ActionConverter::action_type`],
    /// replacing any previous one.
    pub fn register(&self, converter: Arc<dyn ActionConverter>) {
        let action_type = converter.action_type();
        debug!(%action_type, "registering action converter");
        self.converters.insert(action_type, converter);
    }

    /// Remove the converter for a type, returning it if one was registered.
    pub fn unregister(&self, action_type: ActionType) -> Option<Arc<dyn ActionConverter>> {
        debug!(%action_type, "unregistering action converter");
        self.converters.remove(&action_type).map(|(_, c)| c)
    }

    /// Look up the converter for a type.
    pub fn get(&self, action_type: ActionType) -> Option<Arc<dyn ActionConverter>> {
        self.converters.get(&action_type).map(|c| Arc::clone(c.value()))
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Build a new record of `action_type`.
    ///
    /// `id` and `action_type` are stamped on the result regardless of what
    /// the converter produced.
    pub fn to_record(
        &self,
        action_type: ActionType,
        id: &ActionId,
        draft: &ActionDraft,
    ) -> Result<ActionRecord, ActionMgtError> {
        let mut record = match self.get(action_type) {
            Some(converter) => converter.to_record(id, draft)?,
            None => ActionRecord::from_draft(id.clone(), action_type, draft),
        };
        record.id = id.clone();
        record.action_type = action_type;
        Ok(record)
    }

    /// Build the candidate patch for an update of `action_type`.
    pub fn to_patch(
        &self,
        action_type: ActionType,
        id: &ActionId,
        update: &ActionUpdate,
    ) -> Result<ActionPatch, ActionMgtError> {
        let mut patch = match self.get(action_type) {
            Some(converter) => converter.to_patch(id, update)?,
            None => ActionPatch::from_update(id.clone(), action_type, update),
        };
        patch.id = id.clone();
        patch.action_type = action_type;
        Ok(patch)
    }

    /// Build the wire model for a record, using the converter of the
    /// record's own type.
    pub fn to_action(&self, record: &ActionRecord) -> Action {
        match self.get(record.action_type) {
            Some(converter) => converter.to_action(record),
            None => record.to_generic_action(),
        }
    }
}
