//! Names of the control-plane operations, for failure injection and call
//! inspection.

use std::fmt;

/// One method of [`ControlPlane`](crate::ControlPlane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetCluster,
    CreateUser,
    DeleteUser,
    GetIdentityProviders,
    ListHtpasswdUsers,
    CreateIdentityProvider,
    AddHtpasswdUser,
    GetLabel,
    AddLabel,
    UpdateLabel,
    DeleteLabel,
}

impl Operation {
    /// Returns `true` if the operation changes remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Operation::CreateUser
                | Operation::DeleteUser
                | Operation::CreateIdentityProvider
                | Operation::AddHtpasswdUser
                | Operation::AddLabel
                | Operation::UpdateLabel
                | Operation::DeleteLabel
        )
    }

    fn as_str(&self) -> &'static str {
        match self {
            Operation::GetCluster => "get_cluster",
            Operation::CreateUser => "create_user",
            Operation::DeleteUser => "delete_user",
            Operation::GetIdentityProviders => "get_identity_providers",
            Operation::ListHtpasswdUsers => "list_htpasswd_users",
            Operation::CreateIdentityProvider => "create_identity_provider",
            Operation::AddHtpasswdUser => "add_htpasswd_user",
            Operation::GetLabel => "get_label",
            Operation::AddLabel => "add_label",
            Operation::UpdateLabel => "update_label",
            Operation::DeleteLabel => "delete_label",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded call against the in-memory control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// The operation invoked.
    pub operation: Operation,
    /// The resource it targeted, e.g. `c1/cluster-admins/cluster-admin`.
    pub target: String,
    /// Whether the call returned `Ok`.
    pub succeeded: bool,
}
