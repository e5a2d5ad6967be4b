pub mod error;
pub mod record;
pub mod redact;
pub mod store;

pub use error::AuditError;
pub use record::{AuditOperation, AuditPage, AuditQuery, AuditRecord};
pub use redact::{RedactConfig, RedactingAuditStore, Redactor};
pub use store::AuditStore;
