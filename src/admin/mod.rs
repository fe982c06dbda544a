//! Cluster admin provisioning.
//!
//! [`AdminProvisioner`] runs the provisioning saga against a
//! [`ControlPlane`](crate::ControlPlane). Most callers reach it through
//! [`ClusterClient::create_admin`](crate::ClusterClient::create_admin).

mod credential;
mod password;
mod provision;
pub mod saga;

pub use credential::AdminCredential;
pub use password::generate_password;
pub use provision::{AdminProvisioner, CreateAdminRequest};
pub use saga::{Compensation, CompensationStack, ProvisionState};
