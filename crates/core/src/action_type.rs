//! The closed catalog of action types.
//!
//! Every public operation receives its type as an untrusted path token and
//! must resolve it through [`ActionType::from_path`] before touching storage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ActionMgtError;

/// Where in a flow an action type is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCategory {
    /// Invoked before or after a platform operation.
    PrePost,
    /// Invoked as a step inside a login flow.
    InFlow,
}

/// An extensibility point that an action can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    PreIssueAccessToken,
    PreUpdatePassword,
    PreUpdateProfile,
    PreRegistration,
    Authentication,
}

impl ActionType {
    const ALL: [Self; 5] = [
        Self::PreIssueAccessToken,
        Self::PreUpdatePassword,
        Self::PreUpdateProfile,
        Self::PreRegistration,
        Self::Authentication,
    ];

    /// Every known action type, in catalog order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &Self::ALL
    }

    /// Canonical machine name, e.g. `PRE_ISSUE_ACCESS_TOKEN`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PreIssueAccessToken => "PRE_ISSUE_ACCESS_TOKEN",
            Self::PreUpdatePassword => "PRE_UPDATE_PASSWORD",
            Self::PreUpdateProfile => "PRE_UPDATE_PROFILE",
            Self::PreRegistration => "PRE_REGISTRATION",
            Self::Authentication => "AUTHENTICATION",
        }
    }

    /// External path segment alias.
    #[must_use]
    pub fn path_alias(self) -> &'static str {
        match self {
            Self::PreIssueAccessToken => "preissueaccesstoken",
            Self::PreUpdatePassword => "preupdatepassword",
            Self::PreUpdateProfile => "preupdateprofile",
            Self::PreRegistration => "preregistration",
            Self::Authentication => "authentication",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::PreIssueAccessToken => "Pre Issue Access Token",
            Self::PreUpdatePassword => "Pre Update Password",
            Self::PreUpdateProfile => "Pre Update Profile",
            Self::PreRegistration => "Pre Registration",
            Self::Authentication => "Authentication",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::PreIssueAccessToken => {
                "Configure an extension point for modifying access token via a custom service."
            }
            Self::PreUpdatePassword => {
                "Configure an extension point for validating a password update via a custom service."
            }
            Self::PreUpdateProfile => {
                "Configure an extension point for validating a profile update via a custom service."
            }
            Self::PreRegistration => {
                "Configure an extension point for validating a user registration via a custom service."
            }
            Self::Authentication => {
                "Configure an extension point for user authentication via a custom service."
            }
        }
    }

    #[must_use]
    pub fn category(self) -> ActionCategory {
        match self {
            Self::Authentication => ActionCategory::InFlow,
            _ => ActionCategory::PrePost,
        }
    }

    /// Resolve an untrusted path token to an action type.
    ///
    /// Matching is exact against [`path_alias`](Self::path_alias); unknown
    /// tokens are a client error.
    pub fn from_path(token: &str) -> Result<Self, ActionMgtError> {
        Self::ALL
            .into_iter()
            .find(|t| t.path_alias() == token)
            .ok_or_else(|| ActionMgtError::InvalidActionType(token.to_owned()))
    }

    /// Resolve a canonical machine name to an action type.
    pub fn from_name(name: &str) -> Result<Self, ActionMgtError> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ActionMgtError::InvalidActionType(name.to_owned()))
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
