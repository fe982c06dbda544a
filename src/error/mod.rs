//! Error types for control-plane operations.
//!
//! Two error types are exposed:
//! - [`Error`]: general errors (remote failures, validation, invariant
//!   violations) returned by the client and the role-link registry
//! - [`ProvisionError`]: the admin provisioning saga's error, which carries
//!   the named [`ProvisionFailure`] and any rollback failures next to the
//!   original cause
//!
//! ## Key Invariant
//!
//! Local checks (`PreconditionFailed`, `InvalidArgument`, `Conflict`) are
//! raised before any remote mutation. A failed rollback never replaces the
//! error that triggered it.

mod core;
mod kind;
mod provision;

pub use core::Error;
pub use kind::ErrorKind;
pub use provision::{CompensationFailure, ProvisionError, ProvisionFailure};

/// A specialized `Result` type for control-plane operations.
pub type Result<T> = std::result::Result<T, Error>;
