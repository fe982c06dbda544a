//! Prelude module for convenient imports.
//!
//! ```rust
//! use ocm_control::prelude::*;
//! ```

pub use crate::{
    admin::{AdminCredential, CreateAdminRequest},
    auth::{BearerCredentialsConfig, Credentials, CredentialsProvider},
    client::{AccountClient, Client, ClientBuilder, ClusterClient, OrganizationClient},
    config::{AdminConfig, PasswordPolicy, TlsConfig},
    error::{Error, ErrorKind, ProvisionError, Result},
    registry::{LinkOutcome, RoleLinksClient},
    transport::ControlPlane,
    types::{ClusterState, LabelScope, RoleArn},
};
