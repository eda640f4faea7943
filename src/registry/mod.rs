//! Registration storage.
//!
//! The registry maps each protocol to the observers registered under it, at
//! most one entry per observer. Entries hold non-owning references: the
//! registry is never the reason an observer stays alive.

/// Per-center protocol → entries table.
mod table;

use std::fmt;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};

use crate::filter::Filter;

pub(crate) use table::{RegistrationTable, Upsert};

/// Identity of a registered observer.
///
/// Derived from the address of the observer's shared allocation, so every
/// `Arc` clone of the same object (whatever trait object it is viewed as)
/// has the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(usize);

impl ObserverId {
    /// Identity of a strong observer handle.
    #[must_use]
    pub fn of<P: ?Sized>(observer: &Arc<P>) -> Self {
        Self(Arc::as_ptr(observer).cast::<()>() as usize)
    }

    /// Identity of a weak observer handle.
    #[must_use]
    pub fn of_weak<P: ?Sized>(observer: &Weak<P>) -> Self {
        Self(Weak::as_ptr(observer).cast::<()>() as usize)
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Read-only view of one registration entry.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub struct RegistrationInfo {
    pub observer: ObserverId,
    pub filter: Option<Filter>,
    pub registered_at: DateTime<Utc>,
    /// False once the observer has been dropped without being removed.
    pub live: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Node(u8);

    impl Named for Node {
        fn name(&self) -> &str {
            "node"
        }
    }

    #[test]
    fn identity_survives_trait_object_coercion() {
        let concrete = Arc::new(Node(0));
        let as_named: Arc<dyn Named> = concrete.clone();
        assert_eq!(ObserverId::of(&concrete), ObserverId::of(&as_named));
        assert_eq!(as_named.name(), "node");
    }

    #[test]
    fn weak_and_strong_identity_agree() {
        let strong: Arc<dyn Named> = Arc::new(Node(0));
        let weak = Arc::downgrade(&strong);
        assert_eq!(ObserverId::of(&strong), ObserverId::of_weak(&weak));
    }

    #[test]
    fn distinct_objects_have_distinct_ids() {
        let a: Arc<dyn Named> = Arc::new(Node(0));
        let b: Arc<dyn Named> = Arc::new(Node(0));
        assert_ne!(ObserverId::of(&a), ObserverId::of(&b));
    }
}
