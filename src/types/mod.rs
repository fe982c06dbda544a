//! Core types exchanged with the control-plane service.
//!
//! - [`Cluster`]: A managed cluster and its lifecycle state
//! - [`User`], [`IdentityProvider`], [`HtpasswdUser`]: Cluster identities
//! - [`Label`], [`LabelScope`]: Key/value annotations on accounts and organizations
//! - [`RoleArn`]: A parsed IAM role ARN

mod arn;
mod cluster;
mod identity;
mod label;

pub use arn::RoleArn;
pub use cluster::{Cluster, ClusterApi, ClusterState};
pub use identity::{
    HtpasswdSettings, HtpasswdUser, HtpasswdUserList, IdentityProvider, IdentityProviderType,
    User,
};
pub use label::{Label, LabelScope};
