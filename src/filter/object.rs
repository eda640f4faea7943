//! Stored-object identity filters.
//!
//! `ObjectId` is an opaque identifier for a stored object; two identifiers
//! match when their canonical URI representations are equal. Objects that
//! carry such an identifier implement [`Identified`] and can be used as
//! filters directly, matching either another object or a bare identifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const GENERATED_SCHEME: &str = "x-object://";

/// Opaque stored-object identifier.
///
/// # Examples
///
/// ```
/// use protocast::ObjectId;
///
/// let id = ObjectId::new();
/// assert!(id.is_generated());
/// assert_eq!(ObjectId::from_uri(id.as_uri()), id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(format!("{GENERATED_SCHEME}{}", Uuid::new_v4()))
    }

    /// Wraps an existing canonical representation.
    #[must_use]
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Wraps a UUID using the generated-identifier scheme.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(format!("{GENERATED_SCHEME}{uuid}"))
    }

    /// Returns the canonical representation.
    #[must_use]
    pub fn as_uri(&self) -> &str {
        &self.0
    }

    /// Returns true if this identifier was produced by [`ObjectId::new`] or
    /// [`ObjectId::from_uuid`].
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.0
            .strip_prefix(GENERATED_SCHEME)
            .is_some_and(|rest| Uuid::parse_str(rest).is_ok())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for ObjectId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

/// An object that carries a stored-object identifier.
pub trait Identified: fmt::Debug + Send + Sync {
    /// The identifier of this object.
    fn object_id(&self) -> &ObjectId;
}
