//! Protocol identities.
//!
//! A protocol is the capability an observer is registered under. In Rust the
//! capability is a type, normally a trait object such as `dyn Greeter`, so the
//! identity is that type's `TypeId`. Conformance is therefore checked by the
//! compiler at the registration call site: only an `Arc<P>` can be registered
//! for protocol `P`.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque, comparable token identifying a protocol.
///
/// # Examples
///
/// ```
/// use protocast::ProtocolId;
///
/// trait Greeter: Send + Sync {}
/// trait Farewell: Send + Sync {}
///
/// assert_eq!(ProtocolId::of::<dyn Greeter>(), ProtocolId::of::<dyn Greeter>());
/// assert_ne!(ProtocolId::of::<dyn Greeter>(), ProtocolId::of::<dyn Farewell>());
/// ```
#[derive(Clone, Copy)]
pub struct ProtocolId {
    type_id: TypeId,
    name: &'static str,
}

impl ProtocolId {
    /// Returns the identity of protocol `P`.
    #[must_use]
    pub fn of<P: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            name: type_name::<P>(),
        }
    }

    /// Fully qualified type name of the protocol, for diagnostics only.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ProtocolId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ProtocolId {}

impl Hash for ProtocolId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProtocolId").field(&self.name).finish()
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
