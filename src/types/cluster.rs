//! Cluster descriptions returned by the clusters management API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a managed cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterState {
    /// The cluster is installed and accepting configuration changes.
    Ready,
    /// Installation is in progress.
    Installing,
    /// Waiting for installation to start.
    Pending,
    /// Validating the installation request.
    Validating,
    /// The cluster is in an error state.
    Error,
    /// The cluster is being removed.
    Uninstalling,
    /// The cluster is hibernating.
    Hibernating,
    /// The cluster is entering hibernation.
    PoweringDown,
    /// The cluster is leaving hibernation.
    Resuming,
    /// A state this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ClusterState {
    /// Returns the state name as reported by the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterState::Ready => "ready",
            ClusterState::Installing => "installing",
            ClusterState::Pending => "pending",
            ClusterState::Validating => "validating",
            ClusterState::Error => "error",
            ClusterState::Uninstalling => "uninstalling",
            ClusterState::Hibernating => "hibernating",
            ClusterState::PoweringDown => "powering_down",
            ClusterState::Resuming => "resuming",
            ClusterState::Unknown => "unknown",
        }
    }

    /// Returns `true` if the cluster accepts identity changes.
    pub fn is_ready(&self) -> bool {
        matches!(self, ClusterState::Ready)
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API endpoint details of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterApi {
    /// The Kubernetes API server URL.
    #[serde(default)]
    pub url: String,
}

/// A managed cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// The cluster ID.
    pub id: String,
    /// The cluster name.
    #[serde(default)]
    pub name: String,
    /// The lifecycle state.
    pub state: ClusterState,
    /// API endpoint details, absent until installation assigns them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ClusterApi>,
}

impl Cluster {
    /// Creates a cluster description.
    pub fn new(id: impl Into<String>, name: impl Into<String>, state: ClusterState) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state,
            api: None,
        }
    }

    /// Sets the API URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api = Some(ClusterApi { url: url.into() });
        self
    }

    /// Returns the API URL, or an empty string when not yet assigned.
    pub fn api_url(&self) -> &str {
        self.api.as_ref().map(|api| api.url.as_str()).unwrap_or_default()
    }
}
