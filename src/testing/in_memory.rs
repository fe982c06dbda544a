//! In-memory control plane with failure injection.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use super::{Call, Operation};
use crate::transport::{ControlPlane, TransportStats};
use crate::types::{Cluster, HtpasswdUser, IdentityProvider, Label, LabelScope, User};
use crate::{Error, ErrorKind};

/// A control plane that keeps its state in memory.
///
/// Behaves like the remote service for the operations the crate uses:
/// duplicates are `Conflict`, missing resources are `NotFound`, listed
/// HTPasswd entries never carry passwords. Any operation can be made to
/// fail with [`fail_on`](Self::fail_on) or [`fail_once`](Self::fail_once);
/// an injected failure happens before the operation touches state.
///
/// ```rust
/// use ocm_control::testing::{InMemoryControlPlane, Operation};
/// use ocm_control::{ErrorKind, LabelScope};
///
/// let fake = InMemoryControlPlane::new();
/// fake.set_label(&LabelScope::organization("org1"), "sts_ocm_role", "arn:aws:iam::1:role/A");
/// fake.fail_on(Operation::UpdateLabel, ErrorKind::Forbidden);
///
/// assert!(fake.label(&LabelScope::organization("org1"), "sts_ocm_role").is_some());
/// assert!(fake.calls().is_empty());
/// ```
#[derive(Default)]
pub struct InMemoryControlPlane {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    clusters: BTreeMap<String, ClusterRecord>,
    labels: HashMap<(LabelScope, String), Label>,
    failures: HashMap<Operation, Failure>,
    calls: Vec<Call>,
    stats: TransportStats,
    next_id: u64,
}

struct ClusterRecord {
    cluster: Cluster,
    groups: BTreeMap<String, Vec<String>>,
    providers: Vec<StoredProvider>,
}

struct StoredProvider {
    provider: IdentityProvider,
    users: Vec<HtpasswdUser>,
}

#[derive(Clone, Copy)]
struct Failure {
    kind: ErrorKind,
    remaining: Option<usize>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn injected_failure(&mut self, operation: Operation, target: &str) -> Option<Error> {
        let failure = *self.failures.get(&operation)?;
        match failure.remaining {
            Some(n) if n <= 1 => {
                self.failures.remove(&operation);
            }
            Some(n) => {
                self.failures.insert(
                    operation,
                    Failure {
                        remaining: Some(n - 1),
                        ..failure
                    },
                );
            }
            None => {}
        }
        Some(Error::new(
            failure.kind,
            format!("injected {} failure for {}", operation, target),
        ))
    }

    fn cluster_mut(&mut self, cluster_id: &str) -> Result<&mut ClusterRecord, Error> {
        self.clusters
            .get_mut(cluster_id)
            .ok_or_else(|| Error::not_found(format!("cluster '{}' not found", cluster_id)))
    }
}

impl ClusterRecord {
    fn provider_mut(&mut self, idp_id: &str) -> Result<&mut StoredProvider, Error> {
        let cluster_id = self.cluster.id.clone();
        self.providers
            .iter_mut()
            .find(|p| p.provider.id() == idp_id)
            .ok_or_else(|| {
                Error::not_found(format!(
                    "identity provider '{}' not found on cluster '{}'",
                    idp_id, cluster_id
                ))
            })
    }
}

impl InMemoryControlPlane {
    /// Creates an empty control plane.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a cluster.
    pub fn add_cluster(&self, cluster: Cluster) {
        let mut state = self.state.lock();
        state.clusters.insert(
            cluster.id.clone(),
            ClusterRecord {
                cluster,
                groups: BTreeMap::new(),
                providers: Vec::new(),
            },
        );
    }

    /// Attaches an identity provider to a cluster and returns its ID.
    ///
    /// HTPasswd entries inside the provider's settings are stored as its
    /// users.
    pub fn add_identity_provider(
        &self,
        cluster_id: &str,
        mut provider: IdentityProvider,
    ) -> Result<String, Error> {
        let mut state = self.state.lock();
        let id = match provider.id.clone() {
            Some(id) => id,
            None => state.next_id("idp"),
        };
        provider.id = Some(id.clone());
        let users = take_users(&mut provider);
        state
            .cluster_mut(cluster_id)?
            .providers
            .push(StoredProvider { provider, users });
        Ok(id)
    }

    /// Sets a label value directly, bypassing the call log.
    pub fn set_label(&self, scope: &LabelScope, key: &str, value: &str) {
        let mut state = self.state.lock();
        state.labels.insert(
            (scope.clone(), key.to_string()),
            stamped(Label::new(key, value), None),
        );
    }

    /// Makes every call to `operation` fail with `kind`.
    pub fn fail_on(&self, operation: Operation, kind: ErrorKind) {
        self.state.lock().failures.insert(
            operation,
            Failure {
                kind,
                remaining: None,
            },
        );
    }

    /// Makes the next call to `operation` fail with `kind`.
    pub fn fail_once(&self, operation: Operation, kind: ErrorKind) {
        self.state.lock().failures.insert(
            operation,
            Failure {
                kind,
                remaining: Some(1),
            },
        );
    }

    /// Removes all injected failures.
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Returns every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Returns the number of calls made to `operation`.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Returns the number of successful calls that changed state.
    pub fn mutation_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation.is_mutation() && c.succeeded)
            .count()
    }

    /// Returns the members of a cluster group.
    pub fn group_members(&self, cluster_id: &str, group: &str) -> Vec<String> {
        self.state
            .lock()
            .clusters
            .get(cluster_id)
            .and_then(|c| c.groups.get(group).cloned())
            .unwrap_or_default()
    }

    /// Returns the identity providers of a cluster, without HTPasswd entries.
    pub fn identity_providers(&self, cluster_id: &str) -> Vec<IdentityProvider> {
        self.state
            .lock()
            .clusters
            .get(cluster_id)
            .map(|c| c.providers.iter().map(|p| p.provider.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns the HTPasswd entries of the provider named `idp_name`.
    pub fn htpasswd_entries(&self, cluster_id: &str, idp_name: &str) -> Vec<HtpasswdUser> {
        self.state
            .lock()
            .clusters
            .get(cluster_id)
            .and_then(|c| c.providers.iter().find(|p| p.provider.name == idp_name))
            .map(|p| p.users.clone())
            .unwrap_or_default()
    }

    /// Returns a label, if set.
    pub fn label(&self, scope: &LabelScope, key: &str) -> Option<Label> {
        self.state
            .lock()
            .labels
            .get(&(scope.clone(), key.to_string()))
            .cloned()
    }

    /// Runs one operation: checks injected failures, applies `f`, and
    /// records the call.
    fn call<T>(
        &self,
        operation: Operation,
        target: String,
        f: impl FnOnce(&mut State) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut state = self.state.lock();
        let result = match state.injected_failure(operation, &target) {
            Some(err) => Err(err),
            None => f(&mut *state),
        };

        state.stats.requests_sent += 1;
        if result.is_err() {
            state.stats.requests_failed += 1;
        }
        state.calls.push(Call {
            operation,
            target,
            succeeded: result.is_ok(),
        });
        result
    }
}

fn take_users(provider: &mut IdentityProvider) -> Vec<HtpasswdUser> {
    provider
        .htpasswd
        .as_mut()
        .and_then(|settings| settings.users.take())
        .map(|list| list.items)
        .unwrap_or_default()
}

fn stamped(mut label: Label, created_at: Option<chrono::DateTime<chrono::Utc>>) -> Label {
    let now = chrono::Utc::now();
    label.created_at = Some(created_at.unwrap_or(now));
    label.updated_at = Some(now);
    label
}

#[async_trait::async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn get_cluster(&self, cluster_key: &str) -> Result<Cluster, Error> {
        self.call(Operation::GetCluster, cluster_key.to_string(), |state| {
            state
                .clusters
                .values()
                .find(|c| c.cluster.id == cluster_key || c.cluster.name == cluster_key)
                .map(|c| c.cluster.clone())
                .ok_or_else(|| Error::not_found(format!("cluster '{}' not found", cluster_key)))
        })
    }

    async fn create_user(
        &self,
        cluster_id: &str,
        group: &str,
        user: &User,
    ) -> Result<User, Error> {
        let target = format!("{}/{}/{}", cluster_id, group, user.id);
        self.call(Operation::CreateUser, target, |state| {
            let record = state.cluster_mut(cluster_id)?;
            let members = record.groups.entry(group.to_string()).or_default();
            if members.contains(&user.id) {
                return Err(Error::conflict(format!(
                    "user '{}' already exists in group '{}' on cluster '{}'",
                    user.id, group, cluster_id
                )));
            }
            members.push(user.id.clone());
            Ok(user.clone())
        })
    }

    async fn delete_user(&self, cluster_id: &str, group: &str, user_id: &str) -> Result<(), Error> {
        let target = format!("{}/{}/{}", cluster_id, group, user_id);
        self.call(Operation::DeleteUser, target, |state| {
            let record = state.cluster_mut(cluster_id)?;
            let members = record.groups.entry(group.to_string()).or_default();
            let before = members.len();
            members.retain(|m| m != user_id);
            if members.len() == before {
                return Err(Error::not_found(format!(
                    "user '{}' not found in group '{}' on cluster '{}'",
                    user_id, group, cluster_id
                )));
            }
            Ok(())
        })
    }

    async fn get_identity_providers(&self, cluster_id: &str) -> Result<Vec<IdentityProvider>, Error> {
        self.call(
            Operation::GetIdentityProviders,
            cluster_id.to_string(),
            |state| {
                Ok(state
                    .cluster_mut(cluster_id)?
                    .providers
                    .iter()
                    .map(|p| p.provider.clone())
                    .collect())
            },
        )
    }

    async fn list_htpasswd_users(
        &self,
        cluster_id: &str,
        idp_id: &str,
    ) -> Result<Vec<HtpasswdUser>, Error> {
        let target = format!("{}/{}", cluster_id, idp_id);
        self.call(Operation::ListHtpasswdUsers, target, |state| {
            let provider = state.cluster_mut(cluster_id)?.provider_mut(idp_id)?;
            Ok(provider
                .users
                .iter()
                .map(|u| HtpasswdUser {
                    password: None,
                    ..u.clone()
                })
                .collect())
        })
    }

    async fn create_identity_provider(
        &self,
        cluster_id: &str,
        idp: &IdentityProvider,
    ) -> Result<IdentityProvider, Error> {
        let target = format!("{}/{}", cluster_id, idp.name);
        self.call(Operation::CreateIdentityProvider, target, |state| {
            let id = state.next_id("idp");
            let record = state.cluster_mut(cluster_id)?;
            if record.providers.iter().any(|p| p.provider.name == idp.name) {
                return Err(Error::conflict(format!(
                    "identity provider '{}' already exists on cluster '{}'",
                    idp.name, cluster_id
                )));
            }

            let mut provider = idp.clone();
            provider.id = Some(id);
            let users = take_users(&mut provider)
                .into_iter()
                .enumerate()
                .map(|(i, u)| HtpasswdUser {
                    id: Some(format!("user-{}", i + 1)),
                    ..u
                })
                .collect();
            record.providers.push(StoredProvider {
                provider: provider.clone(),
                users,
            });
            Ok(provider)
        })
    }

    async fn add_htpasswd_user(
        &self,
        cluster_id: &str,
        idp_id: &str,
        user: &HtpasswdUser,
    ) -> Result<(), Error> {
        let target = format!("{}/{}/{}", cluster_id, idp_id, user.username);
        self.call(Operation::AddHtpasswdUser, target, |state| {
            let id = state.next_id("user");
            let provider = state.cluster_mut(cluster_id)?.provider_mut(idp_id)?;
            if provider.users.iter().any(|u| u.username == user.username) {
                return Err(Error::conflict(format!(
                    "user '{}' already exists in identity provider '{}'",
                    user.username, idp_id
                )));
            }
            provider.users.push(HtpasswdUser {
                id: Some(id),
                ..user.clone()
            });
            Ok(())
        })
    }

    async fn get_label(&self, scope: &LabelScope, key: &str) -> Result<Label, Error> {
        let target = format!("{}/{}", scope, key);
        self.call(Operation::GetLabel, target, |state| {
            state
                .labels
                .get(&(scope.clone(), key.to_string()))
                .cloned()
                .ok_or_else(|| {
                    Error::not_found(format!("label '{}' not found on {}", key, scope))
                })
        })
    }

    async fn add_label(&self, scope: &LabelScope, label: &Label) -> Result<Label, Error> {
        let target = format!("{}/{}", scope, label.key);
        self.call(Operation::AddLabel, target, |state| {
            let key = (scope.clone(), label.key.clone());
            if state.labels.contains_key(&key) {
                return Err(Error::conflict(format!(
                    "label '{}' already exists on {}",
                    label.key, scope
                )));
            }
            let stored = stamped(label.clone(), None);
            state.labels.insert(key, stored.clone());
            Ok(stored)
        })
    }

    async fn update_label(&self, scope: &LabelScope, label: &Label) -> Result<Label, Error> {
        let target = format!("{}/{}", scope, label.key);
        self.call(Operation::UpdateLabel, target, |state| {
            let existing = state
                .labels
                .get_mut(&(scope.clone(), label.key.clone()))
                .ok_or_else(|| {
                    Error::not_found(format!("label '{}' not found on {}", label.key, scope))
                })?;
            *existing = stamped(label.clone(), existing.created_at);
            Ok(existing.clone())
        })
    }

    async fn delete_label(&self, scope: &LabelScope, key: &str) -> Result<(), Error> {
        let target = format!("{}/{}", scope, key);
        self.call(Operation::DeleteLabel, target, |state| {
            state
                .labels
                .remove(&(scope.clone(), key.to_string()))
                .map(|_| ())
                .ok_or_else(|| {
                    Error::not_found(format!("label '{}' not found on {}", key, scope))
                })
        })
    }

    fn stats(&self) -> TransportStats {
        self.state.lock().stats.clone()
    }
}
