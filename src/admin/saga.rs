//! Saga states and compensating actions.

use std::fmt;

use crate::error::CompensationFailure;
use crate::transport::ControlPlane;

/// Where a provisioning run is, or where it stopped.
///
/// ```text
/// Start ─► Checked ─► UserCreated ─► ProviderEnsured
///                          │
///                          └─► RollbackInProgress ─► RolledBack
///                                                 └─► RollbackFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionState {
    /// Nothing has been checked yet.
    Start,
    /// The cluster is ready and has no admin; nothing was mutated.
    Checked,
    /// The admin user exists in the admin group.
    UserCreated,
    /// The admin has an HTPasswd entry; provisioning succeeded.
    ProviderEnsured,
    /// Compensating actions are running.
    RollbackInProgress,
    /// Every compensating action succeeded.
    RolledBack,
    /// At least one compensating action failed.
    RollbackFailed,
}

impl ProvisionState {
    fn as_str(&self) -> &'static str {
        match self {
            ProvisionState::Start => "start",
            ProvisionState::Checked => "checked",
            ProvisionState::UserCreated => "user_created",
            ProvisionState::ProviderEnsured => "provider_ensured",
            ProvisionState::RollbackInProgress => "rollback_in_progress",
            ProvisionState::RolledBack => "rolled_back",
            ProvisionState::RollbackFailed => "rollback_failed",
        }
    }
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action that undoes a completed forward step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Remove a user created in a cluster group.
    DeleteUser {
        /// The cluster the user was created on.
        cluster_id: String,
        /// The group the user was added to.
        group: String,
        /// The user ID.
        user_id: String,
    },
}

impl Compensation {
    async fn run(&self, control_plane: &dyn ControlPlane) -> Result<(), crate::Error> {
        match self {
            Compensation::DeleteUser {
                cluster_id,
                group,
                user_id,
            } => control_plane.delete_user(cluster_id, group, user_id).await,
        }
    }
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compensation::DeleteUser {
                cluster_id,
                group,
                user_id,
            } => write!(
                f,
                "delete user '{}' from group '{}' of cluster '{}'",
                user_id, group, cluster_id
            ),
        }
    }
}

/// Compensating actions pushed as forward steps succeed.
///
/// On failure the stack is unwound newest-first. Every action runs even if
/// an earlier one failed; the failures are collected, not raised.
#[derive(Debug, Default)]
pub struct CompensationStack {
    actions: Vec<Compensation>,
}

impl CompensationStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the undo action of a step that just succeeded.
    pub fn push(&mut self, action: Compensation) {
        self.actions.push(action);
    }

    /// Returns the number of pending actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if no action is pending.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs all actions in reverse order and returns those that failed.
    pub async fn unwind(&mut self, control_plane: &dyn ControlPlane) -> Vec<CompensationFailure> {
        let mut failures = Vec::new();
        while let Some(action) = self.actions.pop() {
            match action.run(control_plane).await {
                Ok(()) => tracing::info!(action = %action, "compensation succeeded"),
                Err(err) => {
                    tracing::warn!(action = %action, error = %err, "compensation failed");
                    failures.push(CompensationFailure::new(action.to_string(), err));
                }
            }
        }
        failures
    }
}
