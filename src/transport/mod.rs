//! Transport layer for control-plane communication.
//!
//! - [`ControlPlane`]: the remote operations the rest of the crate depends on
//! - [`RestTransport`]: REST over HTTPS against the OCM API (feature `rest`)
//!
//! Most callers never touch this module directly; [`Client`](crate::Client)
//! builds a transport from its URL and credentials. Implement
//! [`ControlPlane`] to route calls elsewhere and hand it to
//! [`Client::with_control_plane`](crate::Client::with_control_plane).

pub(crate) mod traits;

#[cfg(feature = "rest")]
pub(crate) mod rest;

pub use traits::{ControlPlane, PoolConfig, TransportStats};

#[cfg(feature = "rest")]
pub use rest::{RestTransport, RestTransportBuilder};
