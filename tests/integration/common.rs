//! Common test harness for ocm-control integration tests.
//!
//! Provides a mock OCM API server and helpers to mount its endpoints.

use std::sync::{Arc, Once};

use anyhow::Result;
use ocm_control::testing::InMemoryControlPlane;
use ocm_control::{BearerCredentialsConfig, Client, Cluster, ClusterState};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const CLUSTER_ID: &str = "1a2b3c4d5e6f";
pub const CLUSTER_NAME: &str = "mycluster";
pub const API_URL: &str = "https://api.mycluster.example.com:6443";

pub const CLUSTERS: &str = "/api/clusters_mgmt/v1/clusters";

static TRACING: Once = Once::new();

/// Installs a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A mock OCM API server.
pub struct MockOcm {
    pub server: MockServer,
}

impl MockOcm {
    pub async fn start() -> Self {
        init_tracing();
        Self {
            server: MockServer::start().await,
        }
    }

    /// Builds a client against this server.
    pub async fn client(&self) -> Result<Client> {
        let client = Client::builder()
            .url(self.server.uri())
            .credentials(BearerCredentialsConfig::new(TOKEN))
            .insecure()
            .build()
            .await?;
        Ok(client)
    }

    pub fn cluster_path(&self, suffix: &str) -> String {
        format!("{}/{}{}", CLUSTERS, CLUSTER_ID, suffix)
    }

    /// Serves the cluster lookup for `CLUSTER_NAME` in the given state.
    pub async fn mount_cluster(&self, state: &str) {
        Mock::given(method("GET"))
            .and(path(CLUSTERS))
            .and(query_param(
                "search",
                format!("id = '{0}' or name = '{0}'", CLUSTER_NAME),
            ))
            .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": CLUSTER_ID,
                    "name": CLUSTER_NAME,
                    "state": state,
                    "api": { "url": API_URL }
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Serves the identity provider list.
    pub async fn mount_identity_providers(&self, items: Value) {
        Mock::given(method("GET"))
            .and(path(self.cluster_path("/identity_providers")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
            .mount(&self.server)
            .await;
    }

    /// Returns the requests received for a method and path.
    pub async fn requests_to(&self, verb: &str, target: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == target)
            .collect()
    }
}

/// A client over an in-memory control plane holding one ready cluster.
pub fn in_memory_client() -> (Arc<InMemoryControlPlane>, Client) {
    init_tracing();
    let fake = Arc::new(InMemoryControlPlane::new());
    fake.add_cluster(
        Cluster::new(CLUSTER_ID, CLUSTER_NAME, ClusterState::Ready).with_api_url(API_URL),
    );
    (fake.clone(), Client::with_control_plane(fake))
}
