pub mod action;
pub mod action_type;
pub mod error;
pub mod record;
pub mod types;
pub mod validate;

pub use action::{
    Action, ActionDraft, ActionStatus, ActionUpdate, Authentication, AuthenticationType,
    EndpointConfig, EndpointUpdate,
};
pub use action_type::{ActionCategory, ActionType};
pub use error::{ActionMgtError, ErrorCategory};
pub use record::{ActionPatch, ActionProperties, ActionProperty, ActionRecord};
pub use types::{ActionId, TenantId};
