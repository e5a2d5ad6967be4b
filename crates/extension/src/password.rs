//! Built-in plugin for `PRE_UPDATE_PASSWORD` actions.
//!
//! On the wire, these actions carry a `passwordSharing` object:
//!
//! ```json
//! { "passwordSharing": { "format": "SHA256_HASHED", "certificate": "-----BEGIN..." } }
//! ```
//!
//! It is persisted flat: the format becomes a primitive property and the
//! certificate an object property.

use std::fmt;

use serde_json::{Map, Value, json};

use hookwork_core::{
    Action, ActionDraft, ActionId, ActionMgtError, ActionPatch, ActionProperties, ActionProperty,
    ActionRecord, ActionType, ActionUpdate,
};

use crate::converter::ActionConverter;
use crate::resolver::ActionPropertyResolver;

/// Wire property holding the password sharing settings.
pub const PASSWORD_SHARING: &str = "passwordSharing";
/// Persisted primitive property holding the sharing format.
pub const PASSWORD_SHARING_FORMAT: &str = "passwordSharingFormat";
/// Persisted object property holding the encryption certificate.
pub const CERTIFICATE: &str = "certificate";

const FORMAT_FIELD: &str = "passwordSharing.format";

/// How the updated password is handed to the action endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasswordSharingFormat {
    PlainText,
    Sha256Hashed,
}

impl PasswordSharingFormat {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PlainText => "PLAIN_TEXT",
            Self::Sha256Hashed => "SHA256_HASHED",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ActionMgtError> {
        hookwork_core::validate::require_non_blank(FORMAT_FIELD, name)?;
        match name {
            "PLAIN_TEXT" => Ok(Self::PlainText),
            "SHA256_HASHED" => Ok(Self::Sha256Hashed),
            other => Err(ActionMgtError::validation(
                FORMAT_FIELD,
                format!("unsupported password sharing format '{other}'"),
            )),
        }
    }
}

impl fmt::Display for PasswordSharingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flattens `passwordSharing` into persisted properties and back.
#[derive(Debug, Default, Clone, Copy)]
pub struct PasswordUpdateConverter;

impl PasswordUpdateConverter {
    fn flatten(wire: &Map<String, Value>) -> Result<ActionProperties, ActionMgtError> {
        let mut properties = ActionProperties::new();
        let Some(sharing) = wire.get(PASSWORD_SHARING) else {
            return Ok(properties);
        };
        let sharing = match sharing {
            Value::Object(map) => map,
            Value::Null => return Ok(properties),
            _ => {
                return Err(ActionMgtError::validation(
                    PASSWORD_SHARING,
                    "must be an object",
                ));
            }
        };

        match sharing.get("format") {
            Some(Value::String(format)) if !format.is_empty() => {
                properties.insert(
                    PASSWORD_SHARING_FORMAT.to_owned(),
                    ActionProperty::primitive(format.clone()),
                );
            }
            None | Some(Value::Null | Value::String(_)) => {}
            Some(_) => {
                return Err(ActionMgtError::validation(FORMAT_FIELD, "must be a string"));
            }
        }
        if let Some(certificate) = sharing.get(CERTIFICATE).filter(|c| !c.is_null()) {
            properties.insert(
                CERTIFICATE.to_owned(),
                ActionProperty::Object(certificate.clone()),
            );
        }
        Ok(properties)
    }
}

impl ActionConverter for PasswordUpdateConverter {
    fn action_type(&self) -> ActionType {
        ActionType::PreUpdatePassword
    }

    fn to_record(&self, id: &ActionId, draft: &ActionDraft) -> Result<ActionRecord, ActionMgtError> {
        let mut record = ActionRecord::from_draft(id.clone(), self.action_type(), draft);
        record.properties = Self::flatten(&draft.properties)?;
        Ok(record)
    }

    fn to_patch(&self, id: &ActionId, update: &ActionUpdate) -> Result<ActionPatch, ActionMgtError> {
        let mut patch = ActionPatch::from_update(id.clone(), self.action_type(), update);
        patch.properties = Self::flatten(&update.properties)?;
        Ok(patch)
    }

    fn to_action(&self, record: &ActionRecord) -> Action {
        let mut action = record.to_generic_action();
        let format = record
            .properties
            .get(PASSWORD_SHARING_FORMAT)
            .and_then(ActionProperty::as_primitive);
        let certificate = record.properties.get(CERTIFICATE).map(ActionProperty::to_value);
        if format.is_none() && certificate.is_none() {
            return action;
        }

        let mut sharing = Map::new();
        if let Some(format) = format {
            sharing.insert("format".to_owned(), json!(format));
        }
        if let Some(certificate) = certificate {
            sharing.insert(CERTIFICATE.to_owned(), certificate);
        }
        action
            .properties
            .insert(PASSWORD_SHARING.to_owned(), Value::Object(sharing));
        action
    }
}

/// Requires a valid sharing format on create and checks any format supplied
/// in an update.
#[derive(Debug, Default, Clone, Copy)]
pub struct PasswordUpdateResolver;

impl PasswordUpdateResolver {
    fn check_format(property: &ActionProperty) -> Result<PasswordSharingFormat, ActionMgtError> {
        let name = property
            .as_primitive()
            .ok_or_else(|| ActionMgtError::validation(FORMAT_FIELD, "must be a string"))?;
        PasswordSharingFormat::from_name(name)
    }
}

impl ActionPropertyResolver for PasswordUpdateResolver {
    fn action_type(&self) -> ActionType {
        ActionType::PreUpdatePassword
    }

    fn validate_for_add(&self, record: &ActionRecord) -> Result<(), ActionMgtError> {
        let format = record
            .properties
            .get(PASSWORD_SHARING_FORMAT)
            .ok_or_else(|| ActionMgtError::validation(FORMAT_FIELD, "must not be blank"))?;
        Self::check_format(format)?;
        Ok(())
    }

    fn validate_for_update(&self, patch: &ActionPatch) -> Result<(), ActionMgtError> {
        if let Some(format) = patch.properties.get(PASSWORD_SHARING_FORMAT) {
            Self::check_format(format)?;
        }
        Ok(())
    }
}
