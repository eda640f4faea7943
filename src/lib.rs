//! # protocast - protocol-keyed notification center
//!
//! protocast is a many-to-many publish/subscribe registry keyed by protocol
//! (a capability, expressed as a trait object type) rather than by a string
//! topic. Observers register interest in a protocol with an optional filter
//! value; senders broadcast a message to every observer whose filter matches.
//!
//! ## Core Concepts
//!
//! - **Protocol**: the receiver type `P`, usually `dyn SomeTrait`. Only an
//!   `Arc<P>` can be registered for `P`, so conformance is checked at compile time
//! - **Filter**: optional value attached to a registration or a send; absence
//!   matches everything
//! - **NotificationCenter**: the registration table plus filtered dispatch
//! - **Default center**: a process-wide instance created on first use
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use protocast::{Filter, NotificationCenter};
//!
//! trait Paint: Send + Sync {
//!     fn paint(&self, color: &str);
//! }
//!
//! struct Canvas;
//!
//! impl Paint for Canvas {
//!     fn paint(&self, _color: &str) {}
//! }
//!
//! let center = NotificationCenter::new();
//! let canvas: Arc<dyn Paint> = Arc::new(Canvas);
//! center.set_observer(&canvas, Some(Filter::from("red")))?;
//!
//! let report = center.send::<dyn Paint, _>(
//!     |p| {
//!         p.paint("red");
//!         Ok(())
//!     },
//!     Some(&Filter::from("red")),
//! )?;
//! assert_eq!(report.delivered, 1);
//!
//! center.remove_observer(&canvas)?;
//! # Ok::<(), protocast::NotifyError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod center;
pub mod config;
pub mod error;
pub mod filter;
pub mod protocol;
pub mod registry;

// Re-export primary types at crate root for convenience
pub use center::{
    init_default_center, remove_observer, send, send_optional, set_observer, BoxError, DeliveryFailure,
    DeliveryResult, DispatchReport, FailureKind, NotificationCenter,
};
pub use config::CenterConfig;
pub use error::{NotifyError, NotifyResult, RegistryError, ValidationError};
pub use filter::{Filter, FilterMatch, Identified, ObjectId, PatternFilter};
pub use protocol::ProtocolId;
pub use registry::{ObserverId, RegistrationInfo};
