//! # bd-core
//!
//! Core domain models and business logic for the bizdesk client.
//!
//! This crate contains pure domain types, the port traits implemented by
//! the infrastructure layer, the client session containers and the form
//! validation engine. It has no infrastructure dependencies.

// Public module exports
pub mod ids;
pub mod ports;
pub mod session;
pub mod validation;

// Re-export commonly used types at the crate root
pub use ids::{OwnerId, ResourceKey};
pub use session::{ActiveBranch, ActiveCompany, CurrentUser, PermissionSet, Session};
pub use validation::{validate, validate_field, FieldKind, FieldRule, FormSchema, ValidationOutcome};
