//! # ocm-control
//!
//! Cluster admin provisioning and IAM role links for OpenShift Cluster
//! Manager.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ocm_control::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder()
//!         .url("https://api.openshift.com")
//!         .credentials(BearerCredentialsConfig::new(std::env::var("OCM_TOKEN")?))
//!         .build()
//!         .await?;
//!
//!     // Provision a cluster admin with a generated password
//!     let credential = client.cluster("mycluster").create_admin().await?;
//!     println!("{}", credential.guidance());
//!
//!     // Link an OCM role to the organization
//!     client
//!         .organization("1a2b3c")
//!         .role_links()
//!         .link("arn:aws:iam::123456789012:role/ManagedOpenShift-OCM-Role")
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Key Concepts
//!
//! - **Client Hierarchy**: `Client` → `ClusterClient` / `OrganizationClient` / `AccountClient`
//! - **Rollback**: a failed admin provisioning run deletes what it created;
//!   when that fails too, the [`ProvisionError`] names the leftovers
//! - **One role per AWS account**: a scope links at most one role ARN per account
//!
//! ## Features
//!
//! - `rest` (default): Enable the REST control plane via reqwest
//! - `rustls` (default): Use rustls for TLS
//! - `native-tls`: Use native TLS (OpenSSL on Linux, Secure Transport on macOS)

#![cfg_attr(docsrs, feature(doc_cfg))]

// Core modules
pub mod admin;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;
pub mod validation;

// Transport layer
pub mod transport;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

#[cfg(feature = "rest")]
mod user_agent;

// Re-export main types at crate root for convenience
pub use admin::{AdminCredential, AdminProvisioner, CreateAdminRequest, ProvisionState};
pub use client::{AccountClient, Client, ClientBuilder, ClusterClient, OrganizationClient};
pub use error::{CompensationFailure, Error, ErrorKind, ProvisionError, ProvisionFailure};
pub use registry::{AccountLinkCheck, LabelSet, LinkOutcome, RoleCheck, RoleLinksClient};
pub use transport::ControlPlane;
pub use types::{Cluster, ClusterState, IdentityProvider, Label, LabelScope, RoleArn};

// Re-export auth types
pub use auth::{BearerCredentialsConfig, Credentials, CredentialsProvider};

// Re-export config types
pub use config::{AdminConfig, PasswordPolicy, TlsConfig};
