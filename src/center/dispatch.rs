//! Per-observer delivery and broadcast reporting.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{NotifyError, NotifyResult};
use crate::protocol::ProtocolId;
use crate::registry::ObserverId;

/// Error type a delivery callback may return.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Return type of a delivery callback.
pub type DeliveryResult = Result<(), BoxError>;

/// Why a single delivery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The delivery callback returned an error.
    Error,
    /// The delivery callback panicked.
    Panic,
}

/// A failed delivery to one observer.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub observer: ObserverId,
    pub kind: FailureKind,
    pub reason: String,
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer {} ({:?}): {}", self.observer, self.kind, self.reason)
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Protocol the message was sent for.
    pub protocol: ProtocolId,
    /// True when the message was absent and nothing was attempted.
    pub suppressed: bool,
    /// Live observers whose filter matched.
    pub matched: usize,
    /// Deliveries that completed without error.
    pub delivered: usize,
    /// Matching entries whose observer had already been dropped.
    pub stale: usize,
    /// Per-observer failures, in delivery order.
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub(crate) fn new(protocol: ProtocolId) -> Self {
        Self {
            protocol,
            suppressed: false,
            matched: 0,
            delivered: 0,
            stale: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn suppressed(protocol: ProtocolId) -> Self {
        Self {
            suppressed: true,
            ..Self::new(protocol)
        }
    }

    /// Returns true if no delivery failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Re-surfaces collected failures as a [`NotifyError::Delivery`].
    pub fn into_result(self) -> NotifyResult<Self> {
        if self.failures.is_empty() {
            return Ok(self);
        }
        Err(NotifyError::Delivery {
            protocol: self.protocol,
            attempted: self.matched,
            failures: self.failures,
        })
    }
}

/// Invokes `message` with `observer` as receiver.
///
/// Returns the failure kind and reason when the callback errs or, with
/// `catch_panics`, panics.
pub(crate) fn deliver<P, F>(
    message: &mut F,
    observer: &P,
    catch_panics: bool,
) -> Result<(), (FailureKind, String)>
where
    P: ?Sized,
    F: FnMut(&P) -> DeliveryResult,
{
    if !catch_panics {
        return message(observer).map_err(|e| (FailureKind::Error, e.to_string()));
    }

    match panic::catch_unwind(AssertUnwindSafe(|| message(observer))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err((FailureKind::Error, e.to_string())),
        Err(payload) => Err((FailureKind::Panic, panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
