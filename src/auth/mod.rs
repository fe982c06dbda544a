//! Authentication for the OCM API.
//!
//! - [`BearerCredentialsConfig`]: A fixed access token
//! - [`CredentialsProvider`]: Trait for tokens fetched or refreshed elsewhere
//! - [`Credentials`]: Either of the above
//!
//! ```rust,ignore
//! use ocm_control::{BearerCredentialsConfig, Client};
//!
//! let client = Client::builder()
//!     .url("https://api.openshift.com")
//!     .credentials(BearerCredentialsConfig::new(std::env::var("OCM_TOKEN")?))
//!     .build()
//!     .await?;
//! ```

mod credentials;
mod provider;

pub use credentials::{BearerCredentialsConfig, Credentials};
pub use provider::{CredentialsFuture, CredentialsProvider};
