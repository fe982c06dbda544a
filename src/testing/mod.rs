//! Testing utilities.
//!
//! - [`InMemoryControlPlane`]: A [`ControlPlane`](crate::ControlPlane) that
//!   keeps clusters, identity providers and labels in memory, with failure
//!   injection and a call log
//! - [`Operation`] / [`Call`]: Names and records of control-plane calls
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ocm_control::testing::{InMemoryControlPlane, Operation};
//! use ocm_control::{Client, Cluster, ClusterState, ErrorKind};
//!
//! let fake = Arc::new(InMemoryControlPlane::new());
//! fake.add_cluster(Cluster::new("c1", "mycluster", ClusterState::Ready));
//! fake.fail_once(Operation::CreateIdentityProvider, ErrorKind::Unavailable);
//!
//! let client = Client::with_control_plane(fake.clone());
//! // client.cluster("c1").create_admin().await ...
//! ```

mod in_memory;
mod operation;

pub use in_memory::InMemoryControlPlane;
pub use operation::{Call, Operation};
