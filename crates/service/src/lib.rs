//! Orchestration of action configuration management.
//!
//! [`ActionManagementService`] composes the type catalog, field validation,
//! the plugin registries and the persistence facade into the public add,
//! read, update, activate, deactivate and delete operations.

pub mod builder;
pub mod config;
pub mod service;

mod audit_helpers;

pub use builder::ActionServiceBuilder;
pub use config::{AuditConfig, ServiceConfig};
pub use service::ActionManagementService;
