//! Client builder with typestate pattern.

use std::{marker::PhantomData, sync::Arc, time::Duration};

use super::inner::ClientInner;
#[cfg(feature = "rest")]
use crate::transport::RestTransport;
use crate::{
    Client, Error,
    auth::Credentials,
    config::{AdminConfig, TlsConfig},
    transport::{ControlPlane, PoolConfig},
};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Marker type: URL not yet provided.
pub struct NoUrl;

/// Marker type: URL has been provided.
pub struct HasUrl;

/// Marker type: Credentials not yet provided.
pub struct NoCredentials;

/// Marker type: Credentials have been provided.
pub struct HasCredentials;

/// Builder for creating [`Client`] instances.
///
/// Uses the typestate pattern to ensure required configuration
/// (URL and credentials) is provided at compile time.
///
/// ## Required Configuration
///
/// - `url()`: The OCM API endpoint
/// - `credentials()`: Authentication credentials
///
/// ## Optional Configuration
///
/// - `tls_config()`: Custom TLS settings
/// - `timeout()`: Request timeout
/// - `pool_config()`: Connection pooling
/// - `admin_config()`: Identifiers used when provisioning cluster admins
///
/// ## Example
///
/// ```rust,ignore
/// use ocm_control::{BearerCredentialsConfig, Client};
///
/// let client = Client::builder()
///     .url("https://api.openshift.com")
///     .credentials(BearerCredentialsConfig::new(token))
///     .timeout(Duration::from_secs(10))
///     .build()
///     .await?;
/// ```
pub struct ClientBuilder<UrlState, CredentialsState> {
    url: Option<String>,
    credentials: Option<Credentials>,
    tls_config: TlsConfig,
    timeout: Option<Duration>,
    pool_config: PoolConfig,
    admin_config: AdminConfig,
    _url_state: PhantomData<UrlState>,
    _credentials_state: PhantomData<CredentialsState>,
}

impl ClientBuilder<NoUrl, NoCredentials> {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            url: None,
            credentials: None,
            tls_config: TlsConfig::default(),
            timeout: None,
            pool_config: PoolConfig::default(),
            admin_config: AdminConfig::default(),
            _url_state: PhantomData,
            _credentials_state: PhantomData,
        }
    }
}

impl Default for ClientBuilder<NoUrl, NoCredentials> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ClientBuilder<NoUrl, C> {
    /// Sets the OCM API URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let builder = Client::builder()
    ///     .url("https://api.stage.openshift.com");
    /// ```
    pub fn url(self, url: impl Into<String>) -> ClientBuilder<HasUrl, C> {
        ClientBuilder {
            url: Some(url.into()),
            credentials: self.credentials,
            tls_config: self.tls_config,
            timeout: self.timeout,
            pool_config: self.pool_config,
            admin_config: self.admin_config,
            _url_state: PhantomData,
            _credentials_state: PhantomData,
        }
    }
}

impl<U> ClientBuilder<U, NoCredentials> {
    /// Sets the authentication credentials.
    ///
    /// Accepts any type that can be converted into [`Credentials`]:
    /// - [`BearerCredentialsConfig`](crate::BearerCredentialsConfig)
    /// - `Arc<dyn CredentialsProvider>` for refreshing tokens
    pub fn credentials(
        self,
        credentials: impl Into<Credentials>,
    ) -> ClientBuilder<U, HasCredentials> {
        ClientBuilder {
            url: self.url,
            credentials: Some(credentials.into()),
            tls_config: self.tls_config,
            timeout: self.timeout,
            pool_config: self.pool_config,
            admin_config: self.admin_config,
            _url_state: PhantomData,
            _credentials_state: PhantomData,
        }
    }
}

impl<U, C> ClientBuilder<U, C> {
    /// Sets the TLS configuration.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ocm_control::TlsConfig;
    ///
    /// let builder = builder.tls_config(
    ///     TlsConfig::builder().ca_cert_file("/path/to/ca.crt").build()
    /// );
    /// ```
    #[must_use]
    pub fn tls_config(mut self, config: TlsConfig) -> Self {
        self.tls_config = config;
        self
    }

    /// Disables TLS certificate verification and allows HTTP connections.
    ///
    /// **WARNING**: This is insecure and should only be used for local development.
    /// Never use this in production.
    #[must_use]
    pub fn insecure(mut self) -> Self {
        self.tls_config.skip_verification = true;
        self
    }

    /// Sets the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection pool configuration.
    #[must_use]
    pub fn pool_config(mut self, config: PoolConfig) -> Self {
        self.pool_config = config;
        self
    }

    /// Sets the identifiers used by [`create_admin`](crate::ClusterClient::create_admin).
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ocm_control::AdminConfig;
    ///
    /// let builder = builder.admin_config(
    ///     AdminConfig::builder().username("break-glass").build()
    /// );
    /// ```
    #[must_use]
    pub fn admin_config(mut self, config: AdminConfig) -> Self {
        self.admin_config = config;
        self
    }
}

impl<U, C> ClientBuilder<U, C> {
    /// Creates the REST control plane for the given URL.
    #[cfg(feature = "rest")]
    fn create_control_plane(
        &self,
        url: url::Url,
        timeout: Duration,
    ) -> Result<Arc<dyn ControlPlane>, Error> {
        let rest = RestTransport::new(
            url,
            self.credentials.clone(),
            &self.tls_config,
            &self.pool_config,
            timeout,
        )?;
        Ok(Arc::new(rest))
    }

    #[cfg(not(feature = "rest"))]
    fn create_control_plane(
        &self,
        _url: url::Url,
        _timeout: Duration,
    ) -> Result<Arc<dyn ControlPlane>, Error> {
        Err(Error::configuration(
            "REST transport requested but 'rest' feature is not enabled",
        ))
    }
}

impl ClientBuilder<HasUrl, HasCredentials> {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if:
    /// - The URL is invalid
    /// - The URL is not HTTPS and `insecure()` was not set
    /// - The TLS configuration cannot be loaded
    ///
    /// No request is sent; connectivity and credentials are checked by the
    /// first operation.
    pub async fn build(self) -> Result<Client, Error> {
        let url = self
            .url
            .clone()
            .ok_or_else(|| Error::configuration("URL is required"))?;

        let parsed_url = url::Url::parse(&url)
            .map_err(|e| Error::configuration(format!("invalid URL: {}", e)))?;

        if parsed_url.scheme() != "https" && !self.tls_config.skip_verification {
            return Err(Error::configuration(
                "HTTPS is required. Use .insecure() for development with HTTP.",
            ));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let control_plane = self.create_control_plane(parsed_url, timeout)?;

        tracing::debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "client built");

        Ok(Client::from_inner(ClientInner {
            url: Some(url),
            control_plane,
            admin_config: self.admin_config,
            timeout,
        }))
    }
}
