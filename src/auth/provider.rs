//! Credentials provider trait for tokens managed outside the client.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::Error;

/// Boxed future returned by [`CredentialsProvider::get_token`].
pub type CredentialsFuture<'a> = BoxFuture<'a, Result<String, Error>>;

/// Supplies access tokens on demand.
///
/// OCM access tokens are short-lived and are normally minted from an
/// offline token by an SSO service. Implement this trait to plug in such a
/// refresh flow; the REST transport calls [`get_token`](Self::get_token)
/// before every request.
///
/// ```rust
/// use ocm_control::CredentialsProvider;
///
/// struct EnvCredentialsProvider;
///
/// impl CredentialsProvider for EnvCredentialsProvider {
///     fn get_token(&self) -> ocm_control::auth::CredentialsFuture<'_> {
///         Box::pin(async {
///             std::env::var("OCM_TOKEN")
///                 .map_err(|_| ocm_control::Error::configuration("OCM_TOKEN not set"))
///         })
///     }
/// }
/// ```
pub trait CredentialsProvider: Send + Sync {
    /// Returns a future resolving to a bearer token valid for immediate use.
    fn get_token(&self) -> CredentialsFuture<'_>;
}

impl<T: CredentialsProvider + ?Sized> CredentialsProvider for Arc<T> {
    fn get_token(&self) -> CredentialsFuture<'_> {
        (**self).get_token()
    }
}

impl<T: CredentialsProvider + ?Sized> CredentialsProvider for Box<T> {
    fn get_token(&self) -> CredentialsFuture<'_> {
        (**self).get_token()
    }
}
