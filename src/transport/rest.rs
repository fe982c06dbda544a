//! REST transport implementation using reqwest.
//!
//! Speaks the OCM clusters management (`/api/clusters_mgmt/v1`) and accounts
//! management (`/api/accounts_mgmt/v1`) APIs. Requests are sent once; the
//! caller decides whether a failure is worth another attempt.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::auth::Credentials;
use crate::config::TlsConfig;
use crate::error::ErrorKind;
use crate::transport::traits::{ControlPlane, PoolConfig, TransportStats};
use crate::types::{Cluster, HtpasswdUser, IdentityProvider, Label, LabelScope, User};
use crate::user_agent;
use crate::Error;

const CLUSTERS_MGMT: &str = "/api/clusters_mgmt/v1";
const ACCOUNTS_MGMT: &str = "/api/accounts_mgmt/v1";

/// Header carrying the server-side operation identifier.
const OPERATION_ID_HEADER: &str = "X-Operation-ID";

// ============================================================================
// REST Transport
// ============================================================================

/// REST transport using reqwest.
#[derive(Clone)]
pub struct RestTransport {
    client: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
    stats: Arc<RwLock<TransportStats>>,
}

impl std::fmt::Debug for RestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RestTransport {
    /// Creates a new REST transport builder.
    pub fn builder() -> RestTransportBuilder {
        RestTransportBuilder::new()
    }

    /// Creates a new REST transport with the given configuration.
    pub fn new(
        base_url: Url,
        credentials: Option<Credentials>,
        tls_config: &TlsConfig,
        pool_config: &PoolConfig,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client_builder = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(pool_config.connect_timeout)
            .pool_max_idle_per_host(pool_config.max_idle_per_host as usize)
            .pool_idle_timeout(pool_config.idle_timeout)
            .user_agent(user_agent::user_agent());

        let client = tls_config.apply(client_builder)?.build().map_err(|e| {
            Error::configuration(format!("failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url,
            credentials,
            stats: Arc::new(RwLock::new(TransportStats::default())),
        })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an API path below the base URL, keeping any path prefix
    /// the base URL carries (e.g. a proxy mounted at `https://host/ocm`).
    fn url(&self, path: &str) -> Result<Url, Error> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| Error::configuration(format!("invalid URL path {}: {}", path, e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// Sends a request and maps transport and status failures.
    async fn send(&self, mut request: RequestBuilder) -> Result<reqwest::Response, Error> {
        if let Some(ref credentials) = self.credentials {
            request = request.bearer_auth(credentials.token().await?);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.record(false);
                return Err(map_reqwest_error(e));
            }
        };

        let success = response.status().is_success();
        self.record(success);
        if success {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let operation_id = response
            .headers()
            .get(OPERATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        let mut error = map_status_error(status, &body);
        if let Some(id) = operation_id {
            error = error.with_request_id(id);
        }
        tracing::debug!(status, kind = %error.kind(), "request failed");
        Err(error)
    }

    fn record(&self, success: bool) {
        let mut stats = self.stats.write();
        stats.requests_sent += 1;
        if !success {
            stats.requests_failed += 1;
        }
    }

    async fn get<R>(&self, url: Url) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        tracing::debug!(method = "GET", url = %url, "sending request");
        let response = self.send(self.request(Method::GET, url)).await?;
        parse_json(response).await
    }

    async fn send_json<T, R>(&self, method: Method, url: Url, body: &T) -> Result<R, Error>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        tracing::debug!(method = %method, url = %url, "sending request");
        let request = self
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(body);
        let response = self.send(request).await?;
        parse_json(response).await
    }

    async fn send_json_no_content<T>(&self, method: Method, url: Url, body: &T) -> Result<(), Error>
    where
        T: Serialize,
    {
        tracing::debug!(method = %method, url = %url, "sending request");
        let request = self
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(body);
        self.send(request).await.map(|_| ())
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        tracing::debug!(method = "DELETE", url = %url, "sending request");
        self.send(self.request(Method::DELETE, url)).await.map(|_| ())
    }

    fn cluster_path(cluster_id: &str) -> String {
        format!("{}/clusters/{}", CLUSTERS_MGMT, urlencoding::encode(cluster_id))
    }

    fn labels_path(scope: &LabelScope) -> String {
        format!(
            "{}/{}/{}/labels",
            ACCOUNTS_MGMT,
            scope.collection(),
            urlencoding::encode(scope.id())
        )
    }

    fn label_path(scope: &LabelScope, key: &str) -> String {
        format!("{}/{}", Self::labels_path(scope), urlencoding::encode(key))
    }
}

async fn parse_json<R>(response: reqwest::Response) -> Result<R, Error>
where
    R: DeserializeOwned,
{
    response
        .json::<R>()
        .await
        .map_err(|e| Error::invalid_response(format!("failed to parse response: {}", e)))
}

// ============================================================================
// REST Transport Builder
// ============================================================================

/// Builder for [`RestTransport`].
pub struct RestTransportBuilder {
    base_url: Option<Url>,
    credentials: Option<Credentials>,
    tls_config: TlsConfig,
    pool_config: PoolConfig,
    timeout: Duration,
}

impl RestTransportBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            credentials: None,
            tls_config: TlsConfig::default(),
            pool_config: PoolConfig::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self, Error> {
        self.base_url = Some(
            Url::parse(url.as_ref())
                .map_err(|e| Error::configuration(format!("invalid base URL: {}", e)))?,
        );
        Ok(self)
    }

    /// Sets the credentials sent with every request.
    pub fn credentials(mut self, credentials: impl Into<Credentials>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Sets the TLS configuration.
    pub fn tls_config(mut self, config: TlsConfig) -> Self {
        self.tls_config = config;
        self
    }

    /// Sets the connection pool configuration.
    pub fn pool_config(mut self, config: PoolConfig) -> Self {
        self.pool_config = config;
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the REST transport.
    pub fn build(self) -> Result<RestTransport, Error> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::configuration("base URL is required"))?;

        RestTransport::new(
            base_url,
            self.credentials,
            &self.tls_config,
            &self.pool_config,
            self.timeout,
        )
    }
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    operation_id: Option<String>,
}

// ============================================================================
// ControlPlane Implementation
// ============================================================================

#[async_trait::async_trait]
impl ControlPlane for RestTransport {
    async fn get_cluster(&self, cluster_key: &str) -> Result<Cluster, Error> {
        let mut url = self.url(&format!("{}/clusters", CLUSTERS_MGMT))?;
        url.query_pairs_mut().append_pair(
            "search",
            &format!("id = '{0}' or name = '{0}'", cluster_key),
        );

        let list: ItemList<Cluster> = self.get(url).await?;
        let mut clusters = list.items.into_iter();
        match (clusters.next(), clusters.next()) {
            (Some(cluster), None) => Ok(cluster),
            (None, _) => Err(Error::not_found(format!(
                "cluster '{}' not found",
                cluster_key
            ))),
            (Some(_), Some(_)) => Err(Error::invalid_argument(format!(
                "more than one cluster matches '{}'",
                cluster_key
            ))),
        }
    }

    async fn create_user(
        &self,
        cluster_id: &str,
        group: &str,
        user: &User,
    ) -> Result<User, Error> {
        let url = self.url(&format!(
            "{}/groups/{}/users",
            Self::cluster_path(cluster_id),
            urlencoding::encode(group)
        ))?;
        self.send_json(Method::POST, url, user).await
    }

    async fn delete_user(&self, cluster_id: &str, group: &str, user_id: &str) -> Result<(), Error> {
        let url = self.url(&format!(
            "{}/groups/{}/users/{}",
            Self::cluster_path(cluster_id),
            urlencoding::encode(group),
            urlencoding::encode(user_id)
        ))?;
        self.delete(url).await
    }

    async fn get_identity_providers(&self, cluster_id: &str) -> Result<Vec<IdentityProvider>, Error> {
        let url = self.url(&format!(
            "{}/identity_providers",
            Self::cluster_path(cluster_id)
        ))?;
        let list: ItemList<IdentityProvider> = self.get(url).await?;
        Ok(list.items)
    }

    async fn list_htpasswd_users(
        &self,
        cluster_id: &str,
        idp_id: &str,
    ) -> Result<Vec<HtpasswdUser>, Error> {
        let url = self.url(&format!(
            "{}/identity_providers/{}/htpasswd_users",
            Self::cluster_path(cluster_id),
            urlencoding::encode(idp_id)
        ))?;
        let list: ItemList<HtpasswdUser> = self.get(url).await?;
        Ok(list.items)
    }

    async fn create_identity_provider(
        &self,
        cluster_id: &str,
        idp: &IdentityProvider,
    ) -> Result<IdentityProvider, Error> {
        let url = self.url(&format!(
            "{}/identity_providers",
            Self::cluster_path(cluster_id)
        ))?;
        self.send_json(Method::POST, url, idp).await
    }

    async fn add_htpasswd_user(
        &self,
        cluster_id: &str,
        idp_id: &str,
        user: &HtpasswdUser,
    ) -> Result<(), Error> {
        let url = self.url(&format!(
            "{}/identity_providers/{}/htpasswd_users",
            Self::cluster_path(cluster_id),
            urlencoding::encode(idp_id)
        ))?;
        self.send_json_no_content(Method::POST, url, user).await
    }

    async fn get_label(&self, scope: &LabelScope, key: &str) -> Result<Label, Error> {
        let url = self.url(&Self::label_path(scope, key))?;
        self.get(url).await
    }

    async fn add_label(&self, scope: &LabelScope, label: &Label) -> Result<Label, Error> {
        let url = self.url(&Self::labels_path(scope))?;
        self.send_json(Method::POST, url, label).await
    }

    async fn update_label(&self, scope: &LabelScope, label: &Label) -> Result<Label, Error> {
        let url = self.url(&Self::label_path(scope, &label.key))?;
        self.send_json(Method::PATCH, url, label).await
    }

    async fn delete_label(&self, scope: &LabelScope, key: &str) -> Result<(), Error> {
        let url = self.url(&Self::label_path(scope, key))?;
        self.delete(url).await
    }

    fn stats(&self) -> TransportStats {
        self.stats.read().clone()
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps reqwest errors to SDK errors.
fn map_reqwest_error(e: reqwest::Error) -> Error {
    let kind = if e.is_timeout() {
        ErrorKind::Timeout
    } else if e.is_connect() {
        ErrorKind::Connection
    } else if e.is_decode() {
        ErrorKind::InvalidResponse
    } else {
        ErrorKind::Transport
    };
    Error::new(kind, format!("HTTP request failed: {}", e)).with_source(e)
}

/// Maps an HTTP status and OCM error body to an SDK error.
fn map_status_error(status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<ApiError>(body).ok();

    let message = match parsed.as_ref().and_then(|e| e.reason.as_deref()) {
        Some(reason) => reason.to_string(),
        None if body.is_empty() => format!("HTTP {}", status),
        None => body.to_string(),
    };

    let kind = match ErrorKind::from_http_status(status) {
        ErrorKind::Unknown => ErrorKind::Transport,
        kind => kind,
    };
    let error = Error::new(kind, message);

    match parsed.and_then(|e| e.operation_id) {
        Some(id) => error.with_request_id(id),
        None => error,
    }
}

// ============================================================================
// Tests
// ============================================================================
