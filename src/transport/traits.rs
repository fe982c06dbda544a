//! Control-plane trait definition and common transport types.
//!
//! [`ControlPlane`] is the seam between the business logic (role-link
//! registry, admin provisioning saga) and the remote service. Implementations
//! return a value or a classified [`Error`] and never retry.

use std::time::Duration;

use crate::types::{Cluster, HtpasswdUser, IdentityProvider, Label, LabelScope, User};
use crate::Error;

// ============================================================================
// Transport Statistics
// ============================================================================

/// Request counters of a control-plane implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Total requests sent.
    pub requests_sent: u64,
    /// Requests that returned an error.
    pub requests_failed: u64,
}

// ============================================================================
// Control Plane Trait
// ============================================================================

/// Remote operations the registry and the provisioning saga depend on.
///
/// Implemented by [`RestTransport`](crate::transport::RestTransport) and by
/// [`InMemoryControlPlane`](crate::testing::InMemoryControlPlane). The trait
/// is object-safe; the client holds it as `Arc<dyn ControlPlane>`.
///
/// Every method maps remote failures to an [`ErrorKind`](crate::ErrorKind):
/// a missing resource is `NotFound`, missing rights are `Forbidden`, a
/// duplicate is `Conflict`.
#[async_trait::async_trait]
pub trait ControlPlane: Send + Sync {
    /// Fetches a cluster by ID or name.
    async fn get_cluster(&self, cluster_key: &str) -> Result<Cluster, Error>;

    /// Adds a user to a cluster group.
    async fn create_user(&self, cluster_id: &str, group: &str, user: &User)
    -> Result<User, Error>;

    /// Removes a user from a cluster group.
    async fn delete_user(&self, cluster_id: &str, group: &str, user_id: &str)
    -> Result<(), Error>;

    /// Lists the identity providers of a cluster.
    async fn get_identity_providers(&self, cluster_id: &str)
    -> Result<Vec<IdentityProvider>, Error>;

    /// Lists the entries of an HTPasswd identity provider.
    async fn list_htpasswd_users(
        &self,
        cluster_id: &str,
        idp_id: &str,
    ) -> Result<Vec<HtpasswdUser>, Error>;

    /// Creates an identity provider on a cluster.
    async fn create_identity_provider(
        &self,
        cluster_id: &str,
        idp: &IdentityProvider,
    ) -> Result<IdentityProvider, Error>;

    /// Adds an entry to an existing HTPasswd identity provider.
    async fn add_htpasswd_user(
        &self,
        cluster_id: &str,
        idp_id: &str,
        user: &HtpasswdUser,
    ) -> Result<(), Error>;

    /// Fetches a label. A missing label is `Err` with kind `NotFound`.
    async fn get_label(&self, scope: &LabelScope, key: &str) -> Result<Label, Error>;

    /// Creates a label.
    async fn add_label(&self, scope: &LabelScope, label: &Label) -> Result<Label, Error>;

    /// Replaces the value of an existing label.
    async fn update_label(&self, scope: &LabelScope, label: &Label) -> Result<Label, Error>;

    /// Deletes a label.
    async fn delete_label(&self, scope: &LabelScope, key: &str) -> Result<(), Error>;

    /// Returns request counters.
    fn stats(&self) -> TransportStats;
}

// ============================================================================
// Connection Pool Config
// ============================================================================

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum idle connections kept per host.
    pub max_idle_per_host: u32,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 4,
            idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl PoolConfig {
    /// Sets the maximum idle connections per host.
    #[must_use]
    pub fn with_max_idle_per_host(mut self, max: u32) -> Self {
        self.max_idle_per_host = max;
        self
    }

    /// Sets the idle connection timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the connection establishment timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
