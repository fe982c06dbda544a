//! Configuration types.
//!
//! - [`AdminConfig`]: Fixed identifiers used by the admin provisioning saga
//! - [`PasswordPolicy`]: Shape of generated admin passwords
//! - [`TlsConfig`]: TLS settings for the REST transport

mod admin;
mod password;
mod tls;

pub use admin::{AdminConfig, CLUSTER_ADMINS_GROUP, CLUSTER_ADMIN_USERNAME, HTPASSWD_IDP_NAME};
pub use password::{PasswordPolicy, SAFE_ALPHABET};
pub use tls::TlsConfig;
