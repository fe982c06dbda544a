//! Users and identity providers attached to a cluster.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A user that is a member of a cluster group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The username, which is also the user ID.
    pub id: String,
}

impl User {
    /// Creates a user with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Kind of identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityProviderType {
    /// Password file based provider.
    #[serde(rename = "HTPasswdIdentityProvider")]
    Htpasswd,
    /// GitHub OAuth provider.
    #[serde(rename = "GithubIdentityProvider")]
    Github,
    /// GitLab OAuth provider.
    #[serde(rename = "GitlabIdentityProvider")]
    Gitlab,
    /// Google OAuth provider.
    #[serde(rename = "GoogleIdentityProvider")]
    Google,
    /// LDAP provider.
    #[serde(rename = "LDAPIdentityProvider")]
    Ldap,
    /// OpenID Connect provider.
    #[serde(rename = "OpenIDIdentityProvider")]
    OpenId,
    /// A provider type this client does not know about.
    #[serde(other)]
    Other,
}

/// A `(username, password)` entry of an HTPasswd identity provider.
///
/// The password is only sent on creation; the service never returns it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtpasswdUser {
    /// Server-assigned entry ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The login name.
    pub username: String,
    /// The plaintext password, hashed by the service on receipt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl HtpasswdUser {
    /// Creates an entry to send to the service.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            password: Some(password.into()),
        }
    }
}

impl fmt::Debug for HtpasswdUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtpasswdUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Wire wrapper for the list of HTPasswd entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HtpasswdUserList {
    /// The entries.
    #[serde(default)]
    pub items: Vec<HtpasswdUser>,
}

/// HTPasswd specific identity provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HtpasswdSettings {
    /// Entries of the password file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<HtpasswdUserList>,
}

/// An identity provider configured on a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProvider {
    /// Server-assigned ID, absent when describing a provider to create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The provider name shown on the login page.
    pub name: String,
    /// The provider kind.
    #[serde(rename = "type")]
    pub kind: IdentityProviderType,
    /// How identities map to users (`claim`, `add`, `lookup`, `generate`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_method: Option<String>,
    /// HTPasswd settings, present for HTPasswd providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub htpasswd: Option<HtpasswdSettings>,
}

impl IdentityProvider {
    /// Describes a new HTPasswd provider holding the given entries.
    pub fn htpasswd(name: impl Into<String>, users: Vec<HtpasswdUser>) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: IdentityProviderType::Htpasswd,
            mapping_method: None,
            htpasswd: Some(HtpasswdSettings {
                users: Some(HtpasswdUserList { items: users }),
            }),
        }
    }

    /// Returns `true` for HTPasswd providers.
    pub fn is_htpasswd(&self) -> bool {
        self.kind == IdentityProviderType::Htpasswd
    }

    /// Returns the server-assigned ID, or an empty string for unsaved providers.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}
