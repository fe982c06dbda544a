//! Error type for the cluster admin provisioning saga.

use std::error::Error as StdError;
use std::fmt;

use super::{Error, ErrorKind};
use crate::admin::ProvisionState;
use crate::types::ClusterState;

/// The named reason a provisioning run failed.
///
/// Every variant names the cluster and the resource involved so an operator
/// can act manually when automatic rollback was not possible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ProvisionFailure {
    /// The cluster key is not a valid identifier or name.
    #[error("Cluster key '{cluster}' is not valid: it must contain only letters, digits, '-' or '_'")]
    InvalidClusterKey {
        /// The rejected cluster key.
        cluster: String,
    },

    /// The cluster could not be fetched.
    #[error("Failed to get cluster '{cluster}'")]
    ClusterLookupFailed {
        /// The cluster key.
        cluster: String,
    },

    /// The cluster is not in the `ready` state.
    #[error("Cluster '{cluster}' is not yet ready (current state: {state})")]
    ClusterNotReady {
        /// The cluster key.
        cluster: String,
        /// The state reported by the service.
        state: ClusterState,
    },

    /// The identity providers of the cluster could not be listed.
    #[error("Failed to get identity providers for cluster '{cluster}'")]
    IdentityProviderLookupFailed {
        /// The cluster key.
        cluster: String,
    },

    /// The admin user already exists on the cluster.
    #[error("Cluster '{cluster}' already has an admin user '{username}'")]
    AdminAlreadyExists {
        /// The cluster key.
        cluster: String,
        /// The admin username.
        username: String,
    },

    /// The random password could not be generated.
    #[error("Failed to generate a random password for user '{username}' of cluster '{cluster}'")]
    PasswordGenerationFailed {
        /// The cluster key.
        cluster: String,
        /// The admin username.
        username: String,
    },

    /// The admin user could not be created.
    #[error("Failed to add user '{username}' to group '{group}' of cluster '{cluster}'")]
    UserCreationFailed {
        /// The cluster key.
        cluster: String,
        /// The admin username.
        username: String,
        /// The group the user was being added to.
        group: String,
    },

    /// A new HTPasswd identity provider could not be created.
    #[error("Failed to add '{idp_name}' identity provider to cluster '{cluster}' as part of admin flow")]
    ProviderCreationFailed {
        /// The cluster key.
        cluster: String,
        /// The identity provider name.
        idp_name: String,
    },

    /// The admin entry could not be added to the existing HTPasswd provider.
    #[error("Failed to add user '{username}' to the HTPasswd identity provider '{idp_name}' of cluster '{cluster}'")]
    ProviderUpdateFailed {
        /// The cluster key.
        cluster: String,
        /// The admin username.
        username: String,
        /// The existing identity provider name.
        idp_name: String,
    },
}

/// A compensating action that itself failed.
///
/// The described resource is left behind on the remote service and must be
/// removed by hand.
#[derive(Debug)]
pub struct CompensationFailure {
    action: String,
    error: Error,
}

impl CompensationFailure {
    /// Creates a compensation failure for the described action.
    pub fn new(action: impl Into<String>, error: Error) -> Self {
        Self {
            action: action.into(),
            error,
        }
    }

    /// Describes the compensating action that failed.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The error returned by the compensating action.
    pub fn error(&self) -> &Error {
        &self.error
    }
}

impl fmt::Display for CompensationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.action, self.error)
    }
}

/// Error returned by the admin provisioning saga.
///
/// Carries the named [`ProvisionFailure`], the remote error that caused it,
/// the state the saga stopped in and any rollback failures. Rollback failures
/// are reported alongside the original cause, never in place of it.
///
/// ```rust,ignore
/// match client.cluster("mycluster").create_admin().await {
///     Ok(credential) => println!("{}", credential.guidance()),
///     Err(err) => {
///         eprintln!("{}", err);
///         if err.requires_manual_cleanup() {
///             for failure in err.compensation_failures() {
///                 eprintln!("  leftover: {}", failure.action());
///             }
///         }
///     }
/// }
/// ```
#[derive(Debug)]
pub struct ProvisionError {
    failure: ProvisionFailure,
    cause: Option<Error>,
    state: ProvisionState,
    compensation_failures: Vec<CompensationFailure>,
}

impl ProvisionError {
    /// Creates an error for a failure with no remote cause.
    pub fn new(failure: ProvisionFailure, state: ProvisionState) -> Self {
        Self {
            failure,
            cause: None,
            state,
            compensation_failures: Vec::new(),
        }
    }

    /// Attaches the remote error that caused the failure.
    #[must_use]
    pub fn with_cause(mut self, cause: Error) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Records the outcome of the rollback.
    #[must_use]
    pub(crate) fn with_rollback(
        mut self,
        state: ProvisionState,
        failures: Vec<CompensationFailure>,
    ) -> Self {
        self.state = state;
        self.compensation_failures = failures;
        self
    }

    /// Returns the named failure.
    pub fn failure(&self) -> &ProvisionFailure {
        &self.failure
    }

    /// Returns the remote error behind the failure, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_ref()
    }

    /// Returns the state the saga stopped in.
    pub fn state(&self) -> ProvisionState {
        self.state
    }

    /// Returns the compensating actions that failed during rollback.
    pub fn compensation_failures(&self) -> &[CompensationFailure] {
        &self.compensation_failures
    }

    /// Returns `true` if rollback left resources behind.
    pub fn requires_manual_cleanup(&self) -> bool {
        !self.compensation_failures.is_empty()
    }

    /// Returns the error category.
    ///
    /// Saga preconditions map to `PreconditionFailed`; remote failures keep
    /// the remote kind so `Forbidden` stays distinguishable.
    pub fn kind(&self) -> ErrorKind {
        match &self.failure {
            ProvisionFailure::InvalidClusterKey { .. } => ErrorKind::InvalidArgument,
            ProvisionFailure::ClusterNotReady { .. }
            | ProvisionFailure::AdminAlreadyExists { .. } => ErrorKind::PreconditionFailed,
            _ => self
                .cause
                .as_ref()
                .map(Error::kind)
                .unwrap_or(ErrorKind::Unknown),
        }
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.failure)?;
        if let Some(ref cause) = self.cause {
            write!(f, ": {}", cause)?;
        }
        for failure in &self.compensation_failures {
            write!(
                f,
                "\nWARNING: rollback incomplete, manual cleanup required: {}",
                failure
            )?;
        }
        Ok(())
    }
}

impl StdError for ProvisionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<ProvisionError> for Error {
    fn from(err: ProvisionError) -> Self {
        Error::new(err.kind(), err.to_string())
    }
}
