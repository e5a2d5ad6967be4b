use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action_type::ActionType;
use crate::error::ActionMgtError;
use crate::types::ActionId;
use crate::validate::field;

/// Activation state of an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    #[default]
    Active,
    Inactive,
}

impl ActionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheme used to authenticate calls to the action endpoint.
///
/// Deserializes from either the canonical name (`API_KEY`) or the
/// camel-case form used by older clients (`apiKey`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AuthenticationType {
    None,
    Basic,
    Bearer,
    ApiKey,
}

impl AuthenticationType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Basic => "BASIC",
            Self::Bearer => "BEARER",
            Self::ApiKey => "API_KEY",
        }
    }

    /// Parse an authentication type name. Blank or unknown names are a
    /// validation error on the authentication type field.
    pub fn from_name(name: &str) -> Result<Self, ActionMgtError> {
        crate::validate::require_non_blank(field::AUTHENTICATION_TYPE, name)?;
        match name.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "BASIC" => Ok(Self::Basic),
            "BEARER" => Ok(Self::Bearer),
            "API_KEY" | "APIKEY" => Ok(Self::ApiKey),
            _ => Err(ActionMgtError::validation(
                field::AUTHENTICATION_TYPE,
                format!("unsupported authentication type '{name}'"),
            )),
        }
    }
}

impl fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for AuthenticationType {
    type Error = ActionMgtError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<AuthenticationType> for String {
    fn from(value: AuthenticationType) -> Self {
        value.name().to_owned()
    }
}

/// Endpoint authentication: a scheme plus its scheme-specific properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    #[serde(rename = "type")]
    pub auth_type: AuthenticationType,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Authentication {
    pub const USERNAME: &'static str = "username";
    pub const PASSWORD: &'static str = "password";
    pub const ACCESS_TOKEN: &'static str = "accessToken";
    pub const HEADER: &'static str = "header";
    pub const VALUE: &'static str = "value";

    /// Property keys holding credentials.
    pub const SECRET_PROPERTIES: [&'static str; 3] =
        [Self::PASSWORD, Self::ACCESS_TOKEN, Self::VALUE];

    #[must_use]
    pub fn new(auth_type: AuthenticationType, properties: HashMap<String, String>) -> Self {
        Self {
            auth_type,
            properties,
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::new(AuthenticationType::None, HashMap::new())
    }

    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(
            AuthenticationType::Basic,
            HashMap::from([
                (Self::USERNAME.to_owned(), username.into()),
                (Self::PASSWORD.to_owned(), password.into()),
            ]),
        )
    }

    #[must_use]
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self::new(
            AuthenticationType::Bearer,
            HashMap::from([(Self::ACCESS_TOKEN.to_owned(), access_token.into())]),
        )
    }

    #[must_use]
    pub fn api_key(header: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            AuthenticationType::ApiKey,
            HashMap::from([
                (Self::HEADER.to_owned(), header.into()),
                (Self::VALUE.to_owned(), value.into()),
            ]),
        )
    }

    /// Look up a property value; absent keys read as `None`.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Where an action is invoked and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub uri: String,
    pub authentication: Authentication,
}

impl EndpointConfig {
    #[must_use]
    pub fn new(uri: impl Into<String>, authentication: Authentication) -> Self {
        Self {
            uri: uri.into(),
            authentication,
        }
    }
}

/// An action as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: ActionId,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ActionStatus,
    pub endpoint: EndpointConfig,
    /// Type-specific fields, shaped by the type's converter.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

/// Caller input for creating an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl ActionDraft {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        authentication: Authentication,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            endpoint: EndpointConfig::new(uri, authentication),
            properties: Map::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// Endpoint fields supplied in a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointUpdate {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub authentication: Option<Authentication>,
}

impl EndpointUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uri.is_none() && self.authentication.is_none()
    }
}

/// Caller input for a partial update. Only the fields that are present are
/// applied; `status` is not updatable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub endpoint: Option<EndpointUpdate>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl ActionUpdate {
    /// A patch that replaces only the endpoint authentication.
    #[must_use]
    pub fn authentication_only(authentication: Authentication) -> Self {
        Self::default().with_authentication(authentication)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.endpoint.get_or_insert_with(EndpointUpdate::default).uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.endpoint
            .get_or_insert_with(EndpointUpdate::default)
            .authentication = Some(authentication);
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}
