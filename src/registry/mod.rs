//! Role-link registry.
//!
//! - [`LabelSet`]: a set of tokens encoded in one label value
//! - [`RoleLinksClient`]: links role ARNs to an account or organization,
//!   at most one per AWS account

mod label_set;
mod role_links;

pub use label_set::{LabelSet, DELIMITER};
pub use role_links::{
    role_label, AccountLinkCheck, LinkOutcome, RoleCheck, RoleLinksClient, OCM_ROLE_LABEL,
    USER_ROLE_LABEL,
};
