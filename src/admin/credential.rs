//! Credentials returned by a successful provisioning run.

use std::fmt;

use zeroize::Zeroizing;

/// Login details for the newly provisioned cluster admin.
///
/// The password is wiped from memory when the credential is dropped and is
/// never printed by `Debug`.
///
/// ```rust,ignore
/// let credential = client.cluster("mycluster").create_admin().await?;
/// println!("{}", credential.guidance());
/// // or, for machine-readable output:
/// println!("{}", credential.to_output());
/// ```
pub struct AdminCredential {
    cluster: String,
    api_url: String,
    username: String,
    password: Zeroizing<String>,
    password_supplied: bool,
}

impl AdminCredential {
    pub(crate) fn new(
        cluster: impl Into<String>,
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: Zeroizing<String>,
        password_supplied: bool,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            api_url: api_url.into(),
            username: username.into(),
            password,
            password_supplied,
        }
    }

    /// The cluster key the admin was provisioned on.
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// The cluster API URL to log in against.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The admin username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The admin password, supplied or generated.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// `true` if the caller supplied the password rather than having it
    /// generated.
    pub fn password_supplied(&self) -> bool {
        self.password_supplied
    }

    /// Machine-readable output: `api_url`, `username` and, only for
    /// generated passwords, `password`.
    pub fn to_output(&self) -> serde_json::Value {
        let mut output = serde_json::json!({
            "api_url": self.api_url,
            "username": self.username,
        });
        if !self.password_supplied {
            output["password"] = serde_json::Value::String(self.password.to_string());
        }
        output
    }

    /// The `oc login` command for this credential.
    pub fn login_command(&self) -> String {
        format!(
            "oc login {} --username {} --password {}",
            self.api_url,
            self.username,
            self.password.as_str()
        )
    }

    /// Instructions for the operator.
    pub fn guidance(&self) -> String {
        let mut text = format!(
            "Admin account has been added to cluster '{}'.\n",
            self.cluster
        );
        if !self.password_supplied {
            text.push_str(
                "Please securely store this generated password. \
                 If you lose this password you can delete and recreate the cluster admin user.\n",
            );
        }
        text.push_str("To login, run the following command:\n\n   ");
        text.push_str(&self.login_command());
        text.push_str("\n\nIt may take several minutes for this access to become active.\n");
        text
    }
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential")
            .field("cluster", &self.cluster)
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("password_supplied", &self.password_supplied)
            .finish()
    }
}
