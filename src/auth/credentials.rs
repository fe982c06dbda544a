//! Credential types.

use std::{fmt, sync::Arc};

use super::CredentialsProvider;
use crate::Error;

/// A pre-issued access token.
///
/// The token is sent as `Authorization: Bearer <token>` on every request and
/// is never refreshed. Use a [`CredentialsProvider`] when tokens expire
/// during the lifetime of the client.
///
/// ```rust
/// use ocm_control::BearerCredentialsConfig;
///
/// let config = BearerCredentialsConfig::new("eyJhbGciOiJSUzI1NiIs...");
/// assert!(!format!("{:?}", config).contains("eyJ"));
/// ```
#[derive(Clone)]
pub struct BearerCredentialsConfig {
    token: Arc<str>,
}

impl BearerCredentialsConfig {
    /// Creates a new bearer credentials configuration.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }

    /// Returns the bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for BearerCredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerCredentialsConfig")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl<S: Into<String>> From<S> for BearerCredentialsConfig {
    fn from(token: S) -> Self {
        Self::new(token)
    }
}

/// Credentials used to authenticate API requests.
#[derive(Clone)]
pub enum Credentials {
    /// A fixed bearer token.
    Bearer(BearerCredentialsConfig),

    /// Tokens obtained from a provider on each request.
    Provider(Arc<dyn CredentialsProvider>),
}

impl Credentials {
    /// Returns `true` if this is a fixed bearer token.
    pub fn is_bearer(&self) -> bool {
        matches!(self, Credentials::Bearer(_))
    }

    /// Resolves the token to send with the next request.
    pub async fn token(&self) -> Result<String, Error> {
        match self {
            Credentials::Bearer(config) => {
                if config.token().is_empty() {
                    return Err(Error::unauthorized("bearer token is empty"));
                }
                Ok(config.token().to_string())
            }
            Credentials::Provider(provider) => provider.get_token().await,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Bearer(config) => f.debug_tuple("Bearer").field(config).finish(),
            Credentials::Provider(_) => f.debug_tuple("Provider").field(&"..").finish(),
        }
    }
}

impl From<BearerCredentialsConfig> for Credentials {
    fn from(config: BearerCredentialsConfig) -> Self {
        Credentials::Bearer(config)
    }
}

impl From<Arc<dyn CredentialsProvider>> for Credentials {
    fn from(provider: Arc<dyn CredentialsProvider>) -> Self {
        Credentials::Provider(provider)
    }
}
