//! Fixed identifiers used when provisioning the cluster admin.

use super::PasswordPolicy;

/// Username of the cluster administrator.
pub const CLUSTER_ADMIN_USERNAME: &str = "cluster-admin";

/// Group granting cluster-admin rights.
pub const CLUSTER_ADMINS_GROUP: &str = "cluster-admins";

/// Name of the HTPasswd identity provider created for the admin.
pub const HTPASSWD_IDP_NAME: &str = "htpasswd";

/// Identifiers and password policy used by the admin provisioning saga.
///
/// The defaults match what the service and its console expect; override
/// them only for environments that use different conventions.
///
/// ```rust
/// use ocm_control::AdminConfig;
///
/// let config = AdminConfig::default();
/// assert_eq!(config.username, "cluster-admin");
/// assert_eq!(config.group, "cluster-admins");
///
/// let custom = AdminConfig::builder().idp_name("admin-htpasswd").build();
/// assert_eq!(custom.idp_name, "admin-htpasswd");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct AdminConfig {
    /// Username of the administrator.
    #[builder(into, default = CLUSTER_ADMIN_USERNAME.to_string())]
    pub username: String,

    /// Group the administrator is added to.
    #[builder(into, default = CLUSTER_ADMINS_GROUP.to_string())]
    pub group: String,

    /// Name given to a newly created HTPasswd identity provider.
    #[builder(into, default = HTPASSWD_IDP_NAME.to_string())]
    pub idp_name: String,

    /// Policy for generated passwords.
    #[builder(default)]
    pub password_policy: PasswordPolicy,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
