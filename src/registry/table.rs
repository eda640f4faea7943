//! Protocol → (observer, filter) table.
//!
//! One `RwLock` guards the whole table. Writers (register/remove/prune) take
//! the write lock briefly; `select` takes the read lock only long enough to
//! evaluate filters and upgrade matched observers, and never runs observer
//! code while holding it. Filters and entries leaving the table are dropped
//! after the guard is released, since a `Filter::Reference` may own the last
//! handle to a caller object whose `Drop` calls back into the center.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use chrono::{DateTime, Utc};

use crate::error::RegistryError;
use crate::filter::Filter;
use crate::protocol::ProtocolId;

use super::{ObserverId, RegistrationInfo};

fn lock_err(context: &'static str) -> RegistryError {
    RegistryError::LockPoisoned { context }
}

/// Type-erased non-owning observer reference.
trait ErasedObserver: fmt::Debug + Send + Sync {
    fn is_alive(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<P: ?Sized + Send + Sync + 'static> ErasedObserver for Weak<P> {
    fn is_alive(&self) -> bool {
        self.strong_count() > 0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct Entry {
    observer: Box<dyn ErasedObserver>,
    filter: Option<Filter>,
    registered_at: DateTime<Utc>,
}

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Upsert {
    Inserted,
    Replaced,
}

/// Matched observers of one protocol, taken under the read lock.
#[derive(Debug)]
pub(crate) struct Selection<P: ?Sized> {
    /// Live observers whose filter matched, upgraded to strong handles.
    pub matched: Vec<(ObserverId, Arc<P>)>,
    /// Entries that would have matched but whose observer is gone.
    pub stale: usize,
}

impl<P: ?Sized> Default for Selection<P> {
    fn default() -> Self {
        Self {
            matched: Vec::new(),
            stale: 0,
        }
    }
}

/// Thread-safe registration table.
#[derive(Debug, Default)]
pub(crate) struct RegistrationTable {
    state: RwLock<HashMap<ProtocolId, HashMap<ObserverId, Entry>>>,
}

impl RegistrationTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry for `observer` under `P`, or replaces its filter.
    pub(crate) fn upsert<P>(
        &self,
        observer: &Arc<P>,
        filter: Option<Filter>,
    ) -> Result<Upsert, RegistryError>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let protocol = ProtocolId::of::<P>();
        let id = ObserverId::of(observer);
        let mut state = self.state.write().map_err(|_| lock_err("registry.upsert"))?;
        let bucket = state.entry(protocol).or_default();

        if let Some(existing) = bucket.get_mut(&id) {
            let previous = std::mem::replace(&mut existing.filter, filter);
            drop(state);
            drop(previous);
            return Ok(Upsert::Replaced);
        }

        bucket.insert(
            id,
            Entry {
                observer: Box::new(Arc::downgrade(observer)),
                filter,
                registered_at: Utc::now(),
            },
        );
        Ok(Upsert::Inserted)
    }

    /// Removes the entry for (`protocol`, `observer`). Returns false if absent.
    pub(crate) fn remove(
        &self,
        protocol: ProtocolId,
        observer: ObserverId,
    ) -> Result<bool, RegistryError> {
        let mut state = self.state.write().map_err(|_| lock_err("registry.remove"))?;
        let Some(bucket) = state.get_mut(&protocol) else {
            return Ok(false);
        };
        let removed = bucket.remove(&observer);
        if bucket.is_empty() {
            state.remove(&protocol);
        }
        drop(state);
        Ok(removed.is_some())
    }

    /// Evaluates the outgoing filter against every entry of `P`.
    ///
    /// `outgoing` is the receiver of [`Filter::matches`]; an absent filter on
    /// either side matches.
    pub(crate) fn select<P>(&self, outgoing: Option<&Filter>) -> Result<Selection<P>, RegistryError>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let protocol = ProtocolId::of::<P>();
        let state = self.state.read().map_err(|_| lock_err("registry.select"))?;
        let Some(bucket) = state.get(&protocol) else {
            return Ok(Selection::default());
        };

        let mut selection = Selection {
            matched: Vec::with_capacity(bucket.len()),
            ..Selection::default()
        };
        for (id, entry) in bucket {
            let is_match = match (outgoing, entry.filter.as_ref()) {
                (Some(out), Some(stored)) => out.matches(stored),
                _ => true,
            };
            if !is_match {
                continue;
            }
            // Buckets are keyed by `ProtocolId::of::<P>()` of the stored `Weak<P>`.
            let Some(weak) = entry.observer.as_any().downcast_ref::<Weak<P>>() else {
                continue;
            };
            match weak.upgrade() {
                Some(observer) => selection.matched.push((*id, observer)),
                None => selection.stale += 1,
            }
        }
        Ok(selection)
    }

    /// Drops entries of `protocol` whose observer no longer exists.
    pub(crate) fn prune_stale(&self, protocol: ProtocolId) -> Result<usize, RegistryError> {
        let mut state = self.state.write().map_err(|_| lock_err("registry.prune"))?;
        let Some(bucket) = state.get_mut(&protocol) else {
            return Ok(0);
        };
        let dead: Vec<ObserverId> = bucket
            .iter()
            .filter(|(_, entry)| !entry.observer.is_alive())
            .map(|(id, _)| *id)
            .collect();
        let pruned: Vec<Entry> = dead.iter().filter_map(|id| bucket.remove(id)).collect();
        if bucket.is_empty() {
            state.remove(&protocol);
        }
        drop(state);
        Ok(pruned.len())
    }

    /// Snapshot of every entry registered under `protocol`.
    pub(crate) fn entries_for(
        &self,
        protocol: ProtocolId,
    ) -> Result<Vec<RegistrationInfo>, RegistryError> {
        let state = self.state.read().map_err(|_| lock_err("registry.entries"))?;
        Ok(state
            .get(&protocol)
            .map(|bucket| {
                bucket
                    .iter()
                    .map(|(id, entry)| RegistrationInfo {
                        observer: *id,
                        filter: entry.filter.clone(),
                        registered_at: entry.registered_at,
                        live: entry.observer.is_alive(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    /// The stored filter for (`protocol`, `observer`); `None` if not registered.
    pub(crate) fn filter_of(
        &self,
        protocol: ProtocolId,
        observer: ObserverId,
    ) -> Result<Option<Option<Filter>>, RegistryError> {
        let state = self.state.read().map_err(|_| lock_err("registry.filter_of"))?;
        Ok(state
            .get(&protocol)
            .and_then(|bucket| bucket.get(&observer))
            .map(|entry| entry.filter.clone()))
    }

    pub(crate) fn observer_count(&self, protocol: ProtocolId) -> Result<usize, RegistryError> {
        let state = self.state.read().map_err(|_| lock_err("registry.count"))?;
        Ok(state.get(&protocol).map_or(0, HashMap::len))
    }

    pub(crate) fn protocol_count(&self) -> Result<usize, RegistryError> {
        let state = self.state.read().map_err(|_| lock_err("registry.protocols"))?;
        Ok(state.len())
    }
}
