//! Stateless field checks shared by generic and type-specific validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::action::{Authentication, AuthenticationType};
use crate::error::ActionMgtError;

/// Maximum length of an action name.
const MAX_NAME_LEN: usize = 255;

/// Field identifiers reported in validation errors.
pub mod field {
    pub const NAME: &str = "name";
    pub const ENDPOINT_URI: &str = "endpoint.uri";
    pub const AUTHENTICATION_TYPE: &str = "endpoint.authentication.type";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const ACCESS_TOKEN: &str = "accessToken";
    pub const API_KEY_HEADER: &str = "header";
    pub const API_KEY_VALUE: &str = "value";
}

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_][-a-zA-Z0-9_ ]*$").expect("name regex is valid"));

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("uri regex is valid"));

/// RFC 9110 `token` characters.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-!#$%&'*+.^_`|~0-9A-Za-z]+$").expect("header regex is valid")
});

/// Fail if `value` is empty or only whitespace.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), ActionMgtError> {
    if value.trim().is_empty() {
        return Err(ActionMgtError::validation(field, "must not be blank"));
    }
    Ok(())
}

/// Validate an action name: 1-255 characters of letters, digits, spaces,
/// hyphens and underscores, not starting with a space.
pub fn validate_name(value: &str) -> Result<(), ActionMgtError> {
    require_non_blank(field::NAME, value)?;
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ActionMgtError::validation(
            field::NAME,
            format!("exceeds maximum length of {MAX_NAME_LEN} characters"),
        ));
    }
    if !NAME_RE.is_match(value) {
        return Err(ActionMgtError::validation(
            field::NAME,
            "must contain only alphanumeric characters, spaces, hyphens, and underscores",
        ));
    }
    Ok(())
}

/// Validate an endpoint URI: an absolute `http` or `https` URI without
/// whitespace.
pub fn validate_uri(value: &str) -> Result<(), ActionMgtError> {
    require_non_blank(field::ENDPOINT_URI, value)?;
    if !URI_RE.is_match(value) {
        return Err(ActionMgtError::validation(
            field::ENDPOINT_URI,
            "must be an absolute http or https URI",
        ));
    }
    Ok(())
}

/// Validate that `value` is a legal HTTP header field name.
pub fn validate_header_name(value: &str) -> Result<(), ActionMgtError> {
    require_non_blank(field::API_KEY_HEADER, value)?;
    if !HEADER_RE.is_match(value) {
        return Err(ActionMgtError::validation(
            field::API_KEY_HEADER,
            "must be a valid HTTP header name",
        ));
    }
    Ok(())
}

/// Check that an authentication carries every property its scheme needs.
///
/// `BASIC` needs `username` and `password`, `BEARER` needs `accessToken`,
/// `API_KEY` needs a legal `header` name and a `value`. `NONE` needs
/// nothing. Missing keys are reported as blank.
pub fn validate_authentication(authentication: &Authentication) -> Result<(), ActionMgtError> {
    let prop = |key| authentication.property(key).unwrap_or_default();
    match authentication.auth_type {
        AuthenticationType::Basic => {
            require_non_blank(field::USERNAME, prop(Authentication::USERNAME))?;
            require_non_blank(field::PASSWORD, prop(Authentication::PASSWORD))?;
        }
        AuthenticationType::Bearer => {
            require_non_blank(field::ACCESS_TOKEN, prop(Authentication::ACCESS_TOKEN))?;
        }
        AuthenticationType::ApiKey => {
            validate_header_name(prop(Authentication::HEADER))?;
            require_non_blank(field::API_KEY_VALUE, prop(Authentication::VALUE))?;
        }
        AuthenticationType::None => {}
    }
    Ok(())
}
