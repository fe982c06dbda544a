//! TLS configuration for connections to the control-plane API.

use std::path::PathBuf;

#[cfg(feature = "rest")]
use crate::Error;

/// Configuration for TLS connections.
///
/// By default the system root certificates are used and server
/// certificates are validated. Staging and disconnected environments often
/// front the API with a private CA, which can be added here.
///
/// ```rust
/// use ocm_control::TlsConfig;
///
/// let config = TlsConfig::builder()
///     .ca_cert_file("/etc/pki/ca-trust/source/anchors/corp-ca.crt")
///     .build();
/// assert!(config.has_custom_ca());
/// ```
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct TlsConfig {
    /// Custom CA certificate file path.
    #[builder(into)]
    pub ca_cert_file: Option<PathBuf>,

    /// Custom CA certificate PEM data.
    #[builder(into)]
    pub ca_cert_pem: Option<String>,

    /// Whether to skip certificate verification.
    ///
    /// **WARNING**: only for local development against self-signed endpoints.
    #[builder(default = false)]
    pub skip_verification: bool,
}

impl TlsConfig {
    /// Creates an insecure TLS config that skips verification.
    pub fn insecure() -> Self {
        Self::builder().skip_verification(true).build()
    }

    /// Returns `true` if a custom CA is configured.
    pub fn has_custom_ca(&self) -> bool {
        self.ca_cert_file.is_some() || self.ca_cert_pem.is_some()
    }

    /// Applies these settings to an HTTP client builder.
    #[cfg(feature = "rest")]
    pub(crate) fn apply(
        &self,
        mut builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder, Error> {
        if self.skip_verification {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref path) = self.ca_cert_file {
            let pem = std::fs::read(path).map_err(|e| {
                Error::configuration(format!("failed to read CA certificate {:?}: {}", path, e))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                Error::configuration(format!("invalid CA certificate {:?}: {}", path, e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        if let Some(ref pem) = self.ca_cert_pem {
            let cert = reqwest::Certificate::from_pem(pem.as_bytes()).map_err(|e| {
                Error::configuration(format!("invalid CA certificate PEM: {}", e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = TlsConfig::default();
        assert!(config.ca_cert_file.is_none());
        assert!(!config.skip_verification);
        assert!(!config.has_custom_ca());
    }

    #[test]
    fn test_ca_cert_file() {
        let config = TlsConfig::builder().ca_cert_file("/path/to/ca.crt").build();
        assert!(config.has_custom_ca());
        assert_eq!(config.ca_cert_file, Some(PathBuf::from("/path/to/ca.crt")));
    }

    #[test]
    fn test_insecure() {
        assert!(TlsConfig::insecure().skip_verification);
    }

    #[cfg(feature = "rest")]
    #[test]
    fn test_apply_missing_ca_file_is_configuration_error() {
        let config = TlsConfig::builder()
            .ca_cert_file("/nonexistent/ca.crt")
            .build();
        let err = config.apply(reqwest::Client::builder()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }
}
