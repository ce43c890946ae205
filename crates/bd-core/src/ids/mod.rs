//! Identifier wrapper types.

mod id_macro;

use serde::{Deserialize, Serialize};

use id_macro::impl_id;

/// Backend-assigned identifier for a stored binary file ("system name").
///
/// Opaque and immutable once assigned; the client never generates one
/// locally, it only receives them from list responses and upload results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey(String);

/// Identifier of the UI row/entity that displays a resolved resource.
///
/// Distinct from [`ResourceKey`]: two rows may reference the same key but
/// each row keeps its own URI binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl_id!(ResourceKey, OwnerId);
