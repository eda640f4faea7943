//! Process-wide default center.
//!
//! The default instance is created on first use and lives for the rest of
//! the process. The free functions here are the default-center forms of the
//! instance operations and only forward to it.

use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::config::CenterConfig;
use crate::error::{NotifyResult, RegistryError};
use crate::filter::Filter;

use super::{DeliveryResult, DispatchReport, NotificationCenter};

static DEFAULT_CENTER: OnceLock<NotificationCenter> = OnceLock::new();

impl NotificationCenter {
    /// Returns the process-wide default center, creating it on first call.
    ///
    /// Safe to call concurrently; exactly one instance is ever constructed.
    #[must_use]
    pub fn default_center() -> &'static Self {
        DEFAULT_CENTER.get_or_init(Self::new)
    }
}

/// Configures the default center before its first use.
///
/// Fails with [`RegistryError::DefaultAlreadyInitialized`] if the default
/// center already exists, whether it was created by an earlier call to this
/// function or lazily by [`NotificationCenter::default_center`].
pub fn init_default_center(cfg: CenterConfig) -> NotifyResult<&'static NotificationCenter> {
    cfg.validate()?;
    let label = cfg.label.clone();
    let mut installed = false;
    let center = DEFAULT_CENTER.get_or_init(|| {
        installed = true;
        NotificationCenter::from_validated(cfg)
    });
    if !installed {
        return Err(RegistryError::DefaultAlreadyInitialized.into());
    }
    info!(center = %label, "default notification center configured");
    Ok(center)
}

/// [`NotificationCenter::set_observer`] on the default center.
pub fn set_observer<P>(observer: &Arc<P>, filter: Option<Filter>) -> NotifyResult<()>
where
    P: ?Sized + Send + Sync + 'static,
{
    NotificationCenter::default_center().set_observer(observer, filter)
}

/// [`NotificationCenter::remove_observer`] on the default center.
pub fn remove_observer<P>(observer: &Arc<P>) -> NotifyResult<bool>
where
    P: ?Sized + Send + Sync + 'static,
{
    NotificationCenter::default_center().remove_observer(observer)
}

/// [`NotificationCenter::send`] on the default center.
pub fn send<P, F>(message: F, filter: Option<&Filter>) -> NotifyResult<DispatchReport>
where
    P: ?Sized + Send + Sync + 'static,
    F: FnMut(&P) -> DeliveryResult,
{
    NotificationCenter::default_center().send::<P, F>(message, filter)
}

/// [`NotificationCenter::send_optional`] on the default center.
pub fn send_optional<P>(
    message: Option<&mut dyn FnMut(&P) -> DeliveryResult>,
    filter: Option<&Filter>,
) -> NotifyResult<DispatchReport>
where
    P: ?Sized + Send + Sync + 'static,
{
    NotificationCenter::default_center().send_optional::<P>(message, filter)
}
