//! Error kind enumeration for categorizing control-plane errors.

/// Categorization of errors raised by the control-plane client, the
/// role-link registry and the admin provisioning saga.
///
/// ## Categories
///
/// | ErrorKind            | Origin        | Mutation happened? |
/// |----------------------|---------------|--------------------|
/// | `PreconditionFailed` | local check   | No                 |
/// | `InvalidArgument`    | local check   | No                 |
/// | `Conflict`           | local / 409   | No                 |
/// | `Forbidden`          | remote 403    | Depends on step    |
/// | `NotFound`           | remote 404    | Depends on step    |
/// | `Unavailable`        | remote 5xx    | Depends on step    |
///
/// The client never retries; [`is_retriable`](ErrorKind::is_retriable) is a
/// hint for callers that implement their own retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Authentication failed (missing, invalid or expired token).
    ///
    /// HTTP: 401 Unauthorized
    #[error("unauthorized")]
    Unauthorized,

    /// Valid credentials but insufficient permissions.
    ///
    /// HTTP: 403 Forbidden
    #[error("forbidden")]
    Forbidden,

    /// Requested resource was not found.
    ///
    /// HTTP: 404 Not Found
    #[error("not found")]
    NotFound,

    /// Invalid request argument: a malformed ARN, an empty identifier or an
    /// unusable password policy.
    ///
    /// HTTP: 400 Bad Request
    #[error("invalid argument")]
    InvalidArgument,

    /// The remote state does not allow the operation: the cluster is not
    /// ready, the admin user already exists, or a role is not linked.
    #[error("precondition failed")]
    PreconditionFailed,

    /// The operation would break a uniqueness invariant, or the remote
    /// service rejected a duplicate.
    ///
    /// HTTP: 409 Conflict
    #[error("conflict")]
    Conflict,

    /// Rate limit exceeded.
    ///
    /// HTTP: 429 Too Many Requests
    #[error("rate limited")]
    RateLimited,

    /// Service temporarily unavailable.
    ///
    /// HTTP: 502, 503
    #[error("service unavailable")]
    Unavailable,

    /// Request timed out.
    ///
    /// HTTP: 504 Gateway Timeout or client-side timeout
    #[error("timeout")]
    Timeout,

    /// Internal server error.
    ///
    /// HTTP: 500 Internal Server Error
    #[error("internal error")]
    Internal,

    /// Connection error (DNS, TLS handshake, network unreachable).
    #[error("connection error")]
    Connection,

    /// Transport layer error that doesn't fit a more specific category.
    #[error("transport error")]
    Transport,

    /// Response could not be parsed, or stored remote state is malformed.
    #[error("invalid response")]
    InvalidResponse,

    /// Configuration error (invalid URL, missing credentials).
    #[error("configuration error")]
    Configuration,

    /// Unknown or unexpected error.
    #[error("unknown error")]
    Unknown,
}

impl ErrorKind {
    /// Returns `true` if this error kind is generally safe to retry.
    ///
    /// ```rust
    /// use ocm_control::ErrorKind;
    ///
    /// assert!(ErrorKind::Timeout.is_retriable());
    /// assert!(!ErrorKind::Conflict.is_retriable());
    /// ```
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Unavailable
                | ErrorKind::Timeout
                | ErrorKind::RateLimited
                | ErrorKind::Connection
        )
    }

    /// Returns `true` if the error originated from the remote service rather
    /// than from a local check.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ErrorKind::Unauthorized
                | ErrorKind::Forbidden
                | ErrorKind::NotFound
                | ErrorKind::RateLimited
                | ErrorKind::Unavailable
                | ErrorKind::Timeout
                | ErrorKind::Internal
                | ErrorKind::Connection
                | ErrorKind::Transport
                | ErrorKind::InvalidResponse
        )
    }

    /// Maps an HTTP status code to an error kind.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::InvalidArgument,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            412 => ErrorKind::PreconditionFailed,
            429 => ErrorKind::RateLimited,
            500 => ErrorKind::Internal,
            502 | 503 => ErrorKind::Unavailable,
            504 => ErrorKind::Timeout,
            _ => ErrorKind::Unknown,
        }
    }
}
