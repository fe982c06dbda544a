//! Client types for the OCM control plane.
//!
//! The SDK uses a hierarchical client structure:
//! - [`Client`]: Top-level client, owns the control-plane connection
//! - [`ClusterClient`]: Cluster-scoped operations (admin provisioning)
//! - [`OrganizationClient`] / [`AccountClient`]: Role-link registries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ocm_control::prelude::*;
//!
//! let client = Client::from_env().await?;
//!
//! let credential = client.cluster("mycluster").create_admin().await?;
//! println!("{}", credential.guidance());
//!
//! client
//!     .organization("1a2b3c")
//!     .role_links()
//!     .link("arn:aws:iam::123456789012:role/ManagedOpenShift-OCM-Role")
//!     .await?;
//! ```

mod builder;
mod inner;

pub use builder::{ClientBuilder, DEFAULT_TIMEOUT, HasCredentials, HasUrl, NoCredentials, NoUrl};

use std::sync::Arc;
use std::time::Duration;

use crate::Error;
use crate::admin::{AdminProvisioner, CreateAdminRequest};
use crate::auth::BearerCredentialsConfig;
use crate::config::AdminConfig;
use crate::registry::RoleLinksClient;
use crate::transport::ControlPlane;
use crate::types::LabelScope;

/// Environment variable holding the API URL.
pub const URL_ENV: &str = "OCM_URL";

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "OCM_TOKEN";

/// API URL used when [`URL_ENV`] is not set.
pub const DEFAULT_URL: &str = "https://api.openshift.com";

/// The OCM control client.
///
/// Create one with [`Client::builder()`] or [`Client::from_env()`], then
/// navigate to a cluster, organization or account.
///
/// ## Thread Safety
///
/// `Client` is `Clone` and thread-safe. Clones share the same connection
/// pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<inner::ClientInner>,
}

impl Client {
    /// Creates a new client builder.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ocm_control::{BearerCredentialsConfig, Client};
    ///
    /// let client = Client::builder()
    ///     .url("https://api.openshift.com")
    ///     .credentials(BearerCredentialsConfig::new(token))
    ///     .build()
    ///     .await?;
    /// ```
    pub fn builder() -> ClientBuilder<NoUrl, NoCredentials> {
        ClientBuilder::new()
    }

    /// Creates a client from `OCM_URL` and `OCM_TOKEN`.
    ///
    /// `OCM_URL` defaults to `https://api.openshift.com`. A missing or
    /// empty `OCM_TOKEN` is a `Configuration` error.
    pub async fn from_env() -> Result<Self, Error> {
        Self::from_vars(std::env::var(URL_ENV).ok(), std::env::var(TOKEN_ENV).ok()).await
    }

    async fn from_vars(url: Option<String>, token: Option<String>) -> Result<Self, Error> {
        let url = url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::configuration(format!("{} is not set", TOKEN_ENV)))?;

        Self::builder()
            .url(url)
            .credentials(BearerCredentialsConfig::new(token))
            .build()
            .await
    }

    /// Creates a client over an existing control plane.
    ///
    /// Used with [`InMemoryControlPlane`](crate::testing::InMemoryControlPlane)
    /// in tests, or with a custom [`ControlPlane`] implementation.
    pub fn with_control_plane(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self::from_inner(inner::ClientInner {
            url: None,
            control_plane,
            admin_config: AdminConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Returns a copy of this client using a different admin configuration.
    #[must_use]
    pub fn with_admin_config(&self, admin_config: AdminConfig) -> Self {
        Self::from_inner(inner::ClientInner {
            url: self.inner.url.clone(),
            control_plane: Arc::clone(&self.inner.control_plane),
            admin_config,
            timeout: self.inner.timeout,
        })
    }

    /// Returns a cluster-scoped client.
    ///
    /// `cluster_key` is the cluster ID or name. It is validated when an
    /// operation runs.
    pub fn cluster(&self, cluster_key: impl Into<String>) -> ClusterClient {
        ClusterClient {
            client: self.clone(),
            cluster_key: cluster_key.into(),
        }
    }

    /// Returns an organization-scoped client.
    pub fn organization(&self, organization_id: impl Into<String>) -> OrganizationClient {
        OrganizationClient {
            client: self.clone(),
            organization_id: organization_id.into(),
        }
    }

    /// Returns an account-scoped client.
    pub fn account(&self, account_id: impl Into<String>) -> AccountClient {
        AccountClient {
            client: self.clone(),
            account_id: account_id.into(),
        }
    }

    /// Returns the base URL, if the client was built from one.
    pub fn url(&self) -> Option<&str> {
        self.inner.url.as_deref()
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Returns the admin configuration.
    pub fn admin_config(&self) -> &AdminConfig {
        &self.inner.admin_config
    }

    /// Returns the control plane used by all scoped clients.
    pub fn control_plane(&self) -> &Arc<dyn ControlPlane> {
        &self.inner.control_plane
    }

    fn role_links(&self, scope: LabelScope) -> RoleLinksClient {
        RoleLinksClient::new(Arc::clone(&self.inner.control_plane), scope)
    }

    pub(crate) fn from_inner(inner: inner::ClientInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.inner.url)
            .field("stats", &self.inner.control_plane.stats())
            .finish_non_exhaustive()
    }
}

/// A cluster-scoped client.
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
    cluster_key: String,
}

impl ClusterClient {
    /// Provisions the cluster admin.
    ///
    /// Await the returned request to run it. A password is generated unless
    /// one is supplied with [`CreateAdminRequest::password`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let credential = client.cluster("mycluster").create_admin().await?;
    /// println!("{}", credential.login_command());
    /// ```
    pub fn create_admin(&self) -> CreateAdminRequest {
        let provisioner = AdminProvisioner::new(
            Arc::clone(&self.client.inner.control_plane),
            self.client.inner.admin_config.clone(),
        );
        CreateAdminRequest::new(provisioner, self.cluster_key.clone())
    }

    /// Returns the cluster ID or name this client targets.
    pub fn cluster_key(&self) -> &str {
        &self.cluster_key
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for ClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterClient")
            .field("cluster_key", &self.cluster_key)
            .finish_non_exhaustive()
    }
}

/// An organization-scoped client.
#[derive(Clone)]
pub struct OrganizationClient {
    client: Client,
    organization_id: String,
}

impl OrganizationClient {
    /// Returns the OCM role registry of this organization.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let links = client.organization("1a2b3c").role_links();
    /// for arn in links.list().await? {
    ///     println!("{}", arn);
    /// }
    /// ```
    pub fn role_links(&self) -> RoleLinksClient {
        self.client
            .role_links(LabelScope::organization(self.organization_id.clone()))
    }

    /// Returns the organization ID.
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for OrganizationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizationClient")
            .field("organization_id", &self.organization_id)
            .finish_non_exhaustive()
    }
}

/// An account-scoped client.
#[derive(Clone)]
pub struct AccountClient {
    client: Client,
    account_id: String,
}

impl AccountClient {
    /// Returns the user role registry of this account.
    pub fn role_links(&self) -> RoleLinksClient {
        self.client
            .role_links(LabelScope::account(self.account_id.clone()))
    }

    /// Returns the account ID.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for AccountClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountClient")
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}
