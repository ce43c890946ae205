//! Declarative form validation.
//!
//! A form is described as a list of tagged field descriptors
//! ([`FieldRule`]) and interpreted by one generic engine. The engine
//! produces a uniform [`ValidationOutcome`] the UI can render: per-field
//! messages keyed by dotted path, with a `_general` fallback so malformed
//! input never crashes a screen.

mod engine;
mod schema;

pub use engine::{validate, validate_field, ValidationOutcome, GENERAL_ERROR_KEY};
pub use schema::{FieldKind, FieldRule, FormSchema, SchemaError};
