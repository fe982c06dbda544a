//! Internal client state.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AdminConfig;
use crate::transport::ControlPlane;

pub(crate) struct ClientInner {
    /// The OCM API URL; `None` when a control plane was injected.
    pub url: Option<String>,

    /// Remote operations used by every scoped client.
    pub control_plane: Arc<dyn ControlPlane>,

    /// Identifiers used when provisioning cluster admins.
    pub admin_config: AdminConfig,

    /// Request timeout.
    pub timeout: Duration,
}
