//! Notification center: registration and filtered broadcast.
//!
//! A center routes a message for protocol `P` to every observer registered
//! under `P` whose stored filter matches the outgoing filter. Dispatch is a
//! synchronous fan-out on the caller's thread:
//!
//! ```text
//! send(message, P, filter)
//!     │
//!     ├── read lock ── evaluate filters ── upgrade matched observers ── unlock
//!     │
//!     ├──► message(observer 1)   Err / panic → DeliveryFailure, continue
//!     ├──► message(observer 2)
//!     └──► message(observer N)
//!     │
//!     └── prune dropped observers (write lock, optional)
//! ```
//!
//! No lock is held while observer code runs, so delivery callbacks may
//! register, remove, or send through the same center. Removing an observer
//! during a broadcast does not affect deliveries already selected for it.

/// Process-wide default instance and its forwarding functions.
pub mod default;
/// Delivery invocation and broadcast reports.
pub mod dispatch;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::CenterConfig;
use crate::error::NotifyResult;
use crate::filter::Filter;
use crate::protocol::ProtocolId;
use crate::registry::{ObserverId, RegistrationInfo, RegistrationTable, Upsert};

pub use default::{init_default_center, remove_observer, send, send_optional, set_observer};
pub use dispatch::{BoxError, DeliveryFailure, DeliveryResult, DispatchReport, FailureKind};

/// Protocol-keyed many-to-many notification center.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use protocast::{Filter, NotificationCenter};
///
/// trait PriceListener: Send + Sync {
///     fn on_price(&self, symbol: &str, price: f64);
/// }
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl PriceListener for Counter {
///     fn on_price(&self, _symbol: &str, _price: f64) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let center = NotificationCenter::new();
/// let counter = Arc::new(Counter::default());
/// let listener: Arc<dyn PriceListener> = counter.clone();
/// center.set_observer(&listener, Some(Filter::from("ACME"))).unwrap();
///
/// let report = center
///     .send::<dyn PriceListener, _>(
///         |l| {
///             l.on_price("ACME", 12.5);
///             Ok(())
///         },
///         Some(&Filter::from("ACME")),
///     )
///     .unwrap();
///
/// assert_eq!(report.delivered, 1);
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub struct NotificationCenter {
    cfg: CenterConfig,
    table: RegistrationTable,
}

impl NotificationCenter {
    /// Creates a center with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_validated(CenterConfig::default())
    }

    /// Creates a center after validating `cfg`.
    pub fn with_config(cfg: CenterConfig) -> NotifyResult<Self> {
        cfg.validate()?;
        Ok(Self::from_validated(cfg))
    }

    pub(crate) fn from_validated(cfg: CenterConfig) -> Self {
        Self {
            cfg,
            table: RegistrationTable::new(),
        }
    }

    /// The configuration this center was built with.
    #[must_use]
    pub const fn config(&self) -> &CenterConfig {
        &self.cfg
    }

    /// Registers `observer` for protocol `P`.
    ///
    /// If the observer is already registered for `P`, only its filter is
    /// replaced. A `None` filter receives every message sent for `P`. The
    /// center keeps a non-owning reference; call
    /// [`remove_observer`](Self::remove_observer) before releasing an observer.
    pub fn set_observer<P>(&self, observer: &Arc<P>, filter: Option<Filter>) -> NotifyResult<()>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let protocol = ProtocolId::of::<P>();
        let id = ObserverId::of(observer);
        let filter_kind = filter.as_ref().map_or("none", Filter::variant_name);
        let outcome = self.table.upsert(observer, filter)?;
        debug!(
            center = %self.cfg.label,
            protocol = %protocol,
            observer = %id,
            filter = filter_kind,
            replaced = outcome == Upsert::Replaced,
            "observer registered"
        );
        Ok(())
    }

    /// Removes `observer` from protocol `P`.
    ///
    /// Returns whether an entry was removed; removing an observer that was
    /// never registered is not an error.
    pub fn remove_observer<P>(&self, observer: &Arc<P>) -> NotifyResult<bool>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let protocol = ProtocolId::of::<P>();
        let id = ObserverId::of(observer);
        let removed = self.table.remove(protocol, id)?;
        debug!(
            center = %self.cfg.label,
            protocol = %protocol,
            observer = %id,
            removed,
            "observer removed"
        );
        Ok(removed)
    }

    /// Broadcasts `message` to the observers of `P` matching `filter`.
    ///
    /// An entry matches when `filter` is `None`, its stored filter is `None`,
    /// or `filter.matches(stored)` holds. Observers are visited in no
    /// particular order.
    ///
    /// A failing or panicking delivery is recorded in the returned report and
    /// the broadcast continues; use [`DispatchReport::into_result`] to turn
    /// collected failures into an error.
    pub fn send<P, F>(&self, mut message: F, filter: Option<&Filter>) -> NotifyResult<DispatchReport>
    where
        P: ?Sized + Send + Sync + 'static,
        F: FnMut(&P) -> DeliveryResult,
    {
        let protocol = ProtocolId::of::<P>();
        let selection = self.table.select::<P>(filter)?;
        let mut report = DispatchReport::new(protocol);
        report.matched = selection.matched.len();
        report.stale = selection.stale;

        for (id, observer) in selection.matched {
            match dispatch::deliver(&mut message, &*observer, self.cfg.catch_panics) {
                Ok(()) => report.delivered += 1,
                Err((kind, reason)) => {
                    warn!(
                        center = %self.cfg.label,
                        protocol = %protocol,
                        observer = %id,
                        ?kind,
                        reason = %reason,
                        "delivery failed"
                    );
                    report.failures.push(DeliveryFailure {
                        observer: id,
                        kind,
                        reason,
                    });
                }
            }
        }

        if report.stale > 0 && self.cfg.prune_stale {
            match self.table.prune_stale(protocol) {
                Ok(pruned) => debug!(
                    center = %self.cfg.label,
                    protocol = %protocol,
                    pruned,
                    "pruned dropped observers"
                ),
                Err(e) => warn!(
                    center = %self.cfg.label,
                    protocol = %protocol,
                    error = %e,
                    "failed to prune dropped observers"
                ),
            }
        }

        trace!(
            center = %self.cfg.label,
            protocol = %protocol,
            matched = report.matched,
            delivered = report.delivered,
            failed = report.failures.len(),
            stale = report.stale,
            "broadcast complete"
        );
        Ok(report)
    }

    /// [`send`](Self::send) for a message that may be absent.
    ///
    /// A `None` message is suppressed: nothing is matched or delivered and
    /// the report has `suppressed` set.
    pub fn send_optional<P>(
        &self,
        message: Option<&mut dyn FnMut(&P) -> DeliveryResult>,
        filter: Option<&Filter>,
    ) -> NotifyResult<DispatchReport>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let Some(message) = message else {
            let protocol = ProtocolId::of::<P>();
            trace!(center = %self.cfg.label, protocol = %protocol, "message suppressed");
            return Ok(DispatchReport::suppressed(protocol));
        };
        self.send::<P, _>(message, filter)
    }

    /// Number of entries registered under `P`, including dropped observers
    /// not yet pruned.
    pub fn observer_count<P>(&self) -> NotifyResult<usize>
    where
        P: ?Sized + 'static,
    {
        Ok(self.table.observer_count(ProtocolId::of::<P>())?)
    }

    /// Returns true if `observer` is registered under `P`.
    pub fn is_observing<P>(&self, observer: &Arc<P>) -> NotifyResult<bool>
    where
        P: ?Sized + 'static,
    {
        Ok(self
            .table
            .filter_of(ProtocolId::of::<P>(), ObserverId::of(observer))?
            .is_some())
    }

    /// The filter `observer` is registered with under `P`.
    ///
    /// The outer `None` means "not registered", `Some(None)` a wildcard
    /// registration.
    pub fn registered_filter<P>(&self, observer: &Arc<P>) -> NotifyResult<Option<Option<Filter>>>
    where
        P: ?Sized + 'static,
    {
        Ok(self
            .table
            .filter_of(ProtocolId::of::<P>(), ObserverId::of(observer))?)
    }

    /// Snapshot of every entry registered under `P`.
    pub fn registrations<P>(&self) -> NotifyResult<Vec<RegistrationInfo>>
    where
        P: ?Sized + 'static,
    {
        Ok(self.table.entries_for(ProtocolId::of::<P>())?)
    }

    /// Number of protocols with at least one entry.
    pub fn protocol_count(&self) -> NotifyResult<usize> {
        Ok(self.table.protocol_count()?)
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("cfg", &self.cfg)
            .field("protocols", &self.table.protocol_count().ok())
            .finish()
    }
}
