//! Plugin contracts for type-specific action behavior.
//!
//! A type may register an [`ActionPropertyResolver`] for extra validation
//! and property persistence, and an [`ActionConverter`] to reshape its wire
//! model. Types with neither get generic-only handling.

pub mod converter;
pub mod password;
pub mod resolver;

pub use converter::{ActionConverter, ConverterRegistry};
pub use password::{PasswordSharingFormat, PasswordUpdateConverter, PasswordUpdateResolver};
pub use resolver::{ActionPropertyResolver, ResolverRegistry};

