//! The cluster admin provisioning saga.

use std::sync::Arc;

use zeroize::Zeroizing;

use super::saga::{Compensation, CompensationStack, ProvisionState};
use super::{generate_password, AdminCredential};
use crate::config::AdminConfig;
use crate::error::{ProvisionError, ProvisionFailure};
use crate::transport::ControlPlane;
use crate::types::{Cluster, HtpasswdUser, IdentityProvider, User};
use crate::validation::is_valid_cluster_key;
use crate::{Error, ErrorKind};

/// Provisions a cluster admin: a user in the admin group plus an HTPasswd
/// entry holding its password.
///
/// The run is a short saga:
///
/// 1. fetch the cluster and require it to be `ready`
/// 2. scan HTPasswd identity providers; fail if the admin already exists
/// 3. resolve the password (supplied, or generated)
/// 4. create the admin user (undo: delete it)
/// 5. add the admin entry to the existing HTPasswd provider, or create one
///
/// Steps 1 to 3 never mutate. If step 5 fails the created user is deleted
/// again; if that also fails the returned [`ProvisionError`] says so and
/// names what was left behind.
#[derive(Clone)]
pub struct AdminProvisioner {
    control_plane: Arc<dyn ControlPlane>,
    config: AdminConfig,
}

impl std::fmt::Debug for AdminProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminProvisioner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// An HTPasswd provider found during the pre-checks.
struct ExistingProvider {
    id: String,
    name: String,
}

/// State of one provisioning run.
struct Run<'a> {
    control_plane: &'a dyn ControlPlane,
    config: &'a AdminConfig,
    cluster_key: &'a str,
    state: ProvisionState,
    compensations: CompensationStack,
}

impl<'a> Run<'a> {
    fn advance(&mut self, next: ProvisionState) {
        tracing::debug!(
            cluster = self.cluster_key,
            from = %self.state,
            to = %next,
            "provisioning state changed"
        );
        self.state = next;
    }

    fn fail(&self, failure: ProvisionFailure) -> ProvisionError {
        ProvisionError::new(failure, self.state)
    }

    async fn fetch_ready_cluster(&self) -> Result<Cluster, ProvisionError> {
        if !is_valid_cluster_key(self.cluster_key) {
            return Err(self.fail(ProvisionFailure::InvalidClusterKey {
                cluster: self.cluster_key.to_string(),
            }));
        }

        let cluster = self
            .control_plane
            .get_cluster(self.cluster_key)
            .await
            .map_err(|err| {
                self.fail(ProvisionFailure::ClusterLookupFailed {
                    cluster: self.cluster_key.to_string(),
                })
                .with_cause(err)
            })?;

        if !cluster.state.is_ready() {
            return Err(self.fail(ProvisionFailure::ClusterNotReady {
                cluster: self.cluster_key.to_string(),
                state: cluster.state,
            }));
        }
        Ok(cluster)
    }

    /// Returns the first HTPasswd provider, failing if any provider already
    /// holds the admin.
    async fn find_htpasswd_provider(
        &self,
        cluster: &Cluster,
    ) -> Result<Option<ExistingProvider>, ProvisionError> {
        let lookup_failed = |err: Error| {
            self.fail(ProvisionFailure::IdentityProviderLookupFailed {
                cluster: self.cluster_key.to_string(),
            })
            .with_cause(err)
        };

        let providers = self
            .control_plane
            .get_identity_providers(&cluster.id)
            .await
            .map_err(lookup_failed)?;

        let mut first = None;
        for provider in providers.iter().filter(|p| p.is_htpasswd()) {
            let users = self
                .control_plane
                .list_htpasswd_users(&cluster.id, provider.id())
                .await
                .map_err(lookup_failed)?;

            if users.iter().any(|u| u.username == self.config.username) {
                return Err(self.fail(ProvisionFailure::AdminAlreadyExists {
                    cluster: self.cluster_key.to_string(),
                    username: self.config.username.clone(),
                }));
            }

            if first.is_none() {
                first = Some(ExistingProvider {
                    id: provider.id().to_string(),
                    name: provider.name.clone(),
                });
            }
        }
        Ok(first)
    }

    fn resolve_password(
        &self,
        supplied: Option<&str>,
    ) -> Result<(Zeroizing<String>, bool), ProvisionError> {
        if let Some(password) = supplied.filter(|p| !p.is_empty()) {
            tracing::debug!(cluster = self.cluster_key, "using supplied password");
            return Ok((Zeroizing::new(password.to_string()), true));
        }

        tracing::debug!(cluster = self.cluster_key, "generating random password");
        let password = generate_password(&self.config.password_policy).map_err(|err| {
            self.fail(ProvisionFailure::PasswordGenerationFailed {
                cluster: self.cluster_key.to_string(),
                username: self.config.username.clone(),
            })
            .with_cause(err)
        })?;
        Ok((password, false))
    }

    async fn create_user(&mut self, cluster: &Cluster) -> Result<(), ProvisionError> {
        let user = User::new(self.config.username.clone());
        if let Err(err) = self
            .control_plane
            .create_user(&cluster.id, &self.config.group, &user)
            .await
        {
            // A concurrent run created the user after our checks.
            let failure = if err.kind() == ErrorKind::Conflict {
                ProvisionFailure::AdminAlreadyExists {
                    cluster: self.cluster_key.to_string(),
                    username: self.config.username.clone(),
                }
            } else {
                ProvisionFailure::UserCreationFailed {
                    cluster: self.cluster_key.to_string(),
                    username: self.config.username.clone(),
                    group: self.config.group.clone(),
                }
            };
            return Err(self.fail(failure).with_cause(err));
        }

        self.compensations.push(Compensation::DeleteUser {
            cluster_id: cluster.id.clone(),
            group: self.config.group.clone(),
            user_id: user.id,
        });
        self.advance(ProvisionState::UserCreated);
        Ok(())
    }

    async fn ensure_provider(
        &mut self,
        cluster: &Cluster,
        existing: Option<ExistingProvider>,
        password: &str,
    ) -> Result<(), ProvisionError> {
        let entry = HtpasswdUser::new(self.config.username.clone(), password);

        let result = match existing {
            None => {
                tracing::debug!(
                    cluster_id = %cluster.id,
                    idp = %self.config.idp_name,
                    "creating HTPasswd identity provider"
                );
                let provider = IdentityProvider::htpasswd(self.config.idp_name.clone(), vec![entry]);
                self.control_plane
                    .create_identity_provider(&cluster.id, &provider)
                    .await
                    .map(|_| ())
                    .map_err(|err| {
                        (
                            ProvisionFailure::ProviderCreationFailed {
                                cluster: self.cluster_key.to_string(),
                                idp_name: self.config.idp_name.clone(),
                            },
                            err,
                        )
                    })
            }
            Some(provider) => {
                tracing::debug!(
                    cluster_id = %cluster.id,
                    idp = %provider.name,
                    "adding admin to existing HTPasswd identity provider"
                );
                self.control_plane
                    .add_htpasswd_user(&cluster.id, &provider.id, &entry)
                    .await
                    .map_err(|err| {
                        (
                            ProvisionFailure::ProviderUpdateFailed {
                                cluster: self.cluster_key.to_string(),
                                username: self.config.username.clone(),
                                idp_name: provider.name,
                            },
                            err,
                        )
                    })
            }
        };

        match result {
            Ok(()) => {
                self.advance(ProvisionState::ProviderEnsured);
                Ok(())
            }
            Err((failure, err)) => Err(self.roll_back(failure, err).await),
        }
    }

    async fn roll_back(&mut self, failure: ProvisionFailure, cause: Error) -> ProvisionError {
        tracing::warn!(
            cluster = self.cluster_key,
            error = %cause,
            "provisioning failed, rolling back"
        );
        let error = self.fail(failure).with_cause(cause);

        self.advance(ProvisionState::RollbackInProgress);
        let failures = self.compensations.unwind(self.control_plane).await;

        if failures.is_empty() {
            self.advance(ProvisionState::RolledBack);
        } else {
            self.advance(ProvisionState::RollbackFailed);
            for failure in &failures {
                tracing::warn!(
                    cluster = self.cluster_key,
                    action = failure.action(),
                    "manual cleanup required"
                );
            }
        }
        error.with_rollback(self.state, failures)
    }
}

impl AdminProvisioner {
    /// Creates a provisioner.
    pub fn new(control_plane: Arc<dyn ControlPlane>, config: AdminConfig) -> Self {
        Self {
            control_plane,
            config,
        }
    }

    /// Returns the admin configuration.
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Provisions the admin on the cluster with ID or name `cluster_key`.
    ///
    /// Uses `password` verbatim when given and non-empty; generates one from
    /// the configured [`PasswordPolicy`](crate::PasswordPolicy) otherwise.
    pub async fn provision(
        &self,
        cluster_key: &str,
        password: Option<&str>,
    ) -> Result<AdminCredential, ProvisionError> {
        let mut run = Run {
            control_plane: self.control_plane.as_ref(),
            config: &self.config,
            cluster_key,
            state: ProvisionState::Start,
            compensations: CompensationStack::new(),
        };

        let cluster = run.fetch_ready_cluster().await?;
        let existing = run.find_htpasswd_provider(&cluster).await?;
        run.advance(ProvisionState::Checked);

        let (password, supplied) = run.resolve_password(password)?;
        run.create_user(&cluster).await?;
        run.ensure_provider(&cluster, existing, &password).await?;

        tracing::info!(
            cluster = cluster_key,
            cluster_id = %cluster.id,
            username = %self.config.username,
            "cluster admin provisioned"
        );

        Ok(AdminCredential::new(
            cluster_key,
            cluster.api_url(),
            self.config.username.clone(),
            password,
            supplied,
        ))
    }
}

/// A pending admin provisioning run.
///
/// Created by [`ClusterClient::create_admin`](crate::ClusterClient::create_admin);
/// await it to run the saga.
///
/// ```rust,ignore
/// let credential = client.cluster("mycluster")
///     .create_admin()
///     .password("MasterKey123")
///     .await?;
/// ```
pub struct CreateAdminRequest {
    provisioner: AdminProvisioner,
    cluster_key: String,
    password: Option<Zeroizing<String>>,
}

impl CreateAdminRequest {
    pub(crate) fn new(provisioner: AdminProvisioner, cluster_key: String) -> Self {
        Self {
            provisioner,
            cluster_key,
            password: None,
        }
    }

    /// Uses the given password instead of generating one.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    async fn execute(self) -> Result<AdminCredential, ProvisionError> {
        self.provisioner
            .provision(
                &self.cluster_key,
                self.password.as_ref().map(|p| p.as_str()),
            )
            .await
    }
}

impl std::fmt::Debug for CreateAdminRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAdminRequest")
            .field("cluster_key", &self.cluster_key)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl std::future::IntoFuture for CreateAdminRequest {
    type Output = Result<AdminCredential, ProvisionError>;
    type IntoFuture =
        std::pin::Pin<Box<dyn std::future::Future<Output = Self::Output> + Send + 'static>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordPolicy;
    use crate::testing::{InMemoryControlPlane, Operation};
    use crate::types::ClusterState;

    const API_URL: &str = "https://api.mycluster.example.com:6443";

    fn setup(state: ClusterState) -> (Arc<InMemoryControlPlane>, AdminProvisioner) {
        let fake = Arc::new(InMemoryControlPlane::new());
        fake.add_cluster(Cluster::new("c1", "mycluster", state).with_api_url(API_URL));
        let provisioner = AdminProvisioner::new(fake.clone(), AdminConfig::default());
        (fake, provisioner)
    }

    #[tokio::test]
    async fn test_fresh_cluster_creates_provider() {
        let (fake, provisioner) = setup(ClusterState::Ready);

        let credential = provisioner.provision("mycluster", None).await.unwrap();
        assert_eq!(credential.api_url(), API_URL);
        assert_eq!(credential.username(), "cluster-admin");
        assert_eq!(credential.password().len(), 23);
        assert!(!credential.password_supplied());

        assert_eq!(fake.group_members("c1", "cluster-admins"), vec!["cluster-admin"]);
        let entries = fake.htpasswd_entries("c1", "htpasswd");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].username, "cluster-admin");
        assert_eq!(entries[0].password.as_deref(), Some(credential.password()));
    }

    #[tokio::test]
    async fn test_supplied_password_is_used_verbatim() {
        let (fake, provisioner) = setup(ClusterState::Ready);

        let credential = provisioner
            .provision("c1", Some("MasterKey123"))
            .await
            .unwrap();
        assert_eq!(credential.password(), "MasterKey123");
        assert!(credential.password_supplied());
        assert!(credential.to_output().get("password").is_none());
        assert_eq!(
            fake.htpasswd_entries("c1", "htpasswd")[0].password.as_deref(),
            Some("MasterKey123")
        );
    }

    #[tokio::test]
    async fn test_empty_supplied_password_is_generated() {
        let (_fake, provisioner) = setup(ClusterState::Ready);
        let credential = provisioner.provision("c1", Some("")).await.unwrap();
        assert!(!credential.password_supplied());
        assert_eq!(credential.password().len(), 23);
    }

    #[tokio::test]
    async fn test_not_ready_cluster_is_untouched() {
        let (fake, provisioner) = setup(ClusterState::Installing);

        let err = provisioner.provision("mycluster", None).await.unwrap_err();
        assert!(matches!(
            err.failure(),
            ProvisionFailure::ClusterNotReady { state: ClusterState::Installing, .. }
        ));
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert_eq!(err.state(), ProvisionState::Start);
        assert_eq!(fake.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_password_generation_failure_names_cluster() {
        let fake = Arc::new(InMemoryControlPlane::new());
        fake.add_cluster(Cluster::new("c1", "mycluster", ClusterState::Ready));
        let config = AdminConfig::builder()
            .password_policy(PasswordPolicy::new().with_length(0))
            .build();
        let provisioner = AdminProvisioner::new(fake.clone(), config);

        let err = provisioner.provision("mycluster", None).await.unwrap_err();
        assert!(matches!(
            err.failure(),
            ProvisionFailure::PasswordGenerationFailed { cluster, .. } if cluster == "mycluster"
        ));
        assert!(err.to_string().contains("of cluster 'mycluster'"));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(fake.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_cluster_key() {
        let (fake, provisioner) = setup(ClusterState::Ready);
        let err = provisioner.provision("bad key'", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_cluster() {
        let (_fake, provisioner) = setup(ClusterState::Ready);
        let err = provisioner.provision("ghost", None).await.unwrap_err();
        assert!(matches!(
            err.failure(),
            ProvisionFailure::ClusterLookupFailed { .. }
        ));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_existing_admin_is_rejected() {
        let (fake, provisioner) = setup(ClusterState::Ready);
        fake.add_identity_provider(
            "c1",
            IdentityProvider::htpasswd(
                "htpasswd",
                vec![HtpasswdUser::new("cluster-admin", "old-password")],
            ),
        )
        .unwrap();

        let err = provisioner.provision("c1", None).await.unwrap_err();
        assert!(matches!(
            err.failure(),
            ProvisionFailure::AdminAlreadyExists { .. }
        ));
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert_eq!(fake.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_existing_provider_gets_admin_appended() {
        let (fake, provisioner) = setup(ClusterState::Ready);
        fake.add_identity_provider(
            "c1",
            IdentityProvider::htpasswd("corp-htpasswd", vec![HtpasswdUser::new("other-user", "pw")]),
        )
        .unwrap();

        provisioner.provision("c1", None).await.unwrap();

        assert_eq!(fake.identity_providers("c1").len(), 1);
        let usernames: Vec<_> = fake
            .htpasswd_entries("c1", "corp-htpasswd")
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(usernames, vec!["other-user", "cluster-admin"]);
        assert_eq!(fake.call_count(Operation::CreateIdentityProvider), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_rolls_back_user() {
        let (fake, provisioner) = setup(ClusterState::Ready);
        fake.fail_on(Operation::CreateIdentityProvider, ErrorKind::Unavailable);

        let err = provisioner.provision("c1", None).await.unwrap_err();
        assert!(matches!(
            err.failure(),
            ProvisionFailure::ProviderCreationFailed { .. }
        ));
        assert_eq!(err.state(), ProvisionState::RolledBack);
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(!err.requires_manual_cleanup());
        assert!(fake.group_members("c1", "cluster-admins").is_empty());
        assert!(fake.identity_providers("c1").is_empty());
    }

    #[tokio::test]
    async fn test_rollback_failure_is_reported_alongside() {
        let (fake, provisioner) = setup(ClusterState::Ready);
        fake.add_identity_provider(
            "c1",
            IdentityProvider::htpasswd("htpasswd", vec![HtpasswdUser::new("other-user", "pw")]),
        )
        .unwrap();
        fake.fail_on(Operation::AddHtpasswdUser, ErrorKind::Forbidden);
        fake.fail_on(Operation::DeleteUser, ErrorKind::Unavailable);

        let err = provisioner.provision("c1", None).await.unwrap_err();
        assert!(matches!(
            err.failure(),
            ProvisionFailure::ProviderUpdateFailed { .. }
        ));
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.state(), ProvisionState::RollbackFailed);
        assert!(err.requires_manual_cleanup());

        let message = err.to_string();
        assert!(message.contains("manual cleanup required"));
        assert!(message.contains("delete user 'cluster-admin'"));
        assert!(message.contains("cluster 'c1'"));
        assert_eq!(fake.group_members("c1", "cluster-admins"), vec!["cluster-admin"]);
    }

    #[tokio::test]
    async fn test_user_creation_failure_needs_no_rollback() {
        let (fake, provisioner) = setup(ClusterState::Ready);
        fake.fail_on(Operation::CreateUser, ErrorKind::Forbidden);

        let err = provisioner.provision("c1", None).await.unwrap_err();
        assert!(matches!(
            err.failure(),
            ProvisionFailure::UserCreationFailed { .. }
        ));
        assert_eq!(err.state(), ProvisionState::Checked);
        assert_eq!(fake.call_count(Operation::DeleteUser), 0);
    }

    #[tokio::test]
    async fn test_conflict_on_create_user_is_admin_already_exists() {
        let (fake, provisioner) = setup(ClusterState::Ready);
        fake.create_user("c1", "cluster-admins", &User::new("cluster-admin"))
            .await
            .unwrap();

        let err = provisioner.provision("c1", None).await.unwrap_err();
        assert!(matches!(
            err.failure(),
            ProvisionFailure::AdminAlreadyExists { .. }
        ));
        assert_eq!(err.cause().map(Error::kind), Some(ErrorKind::Conflict));
        assert_eq!(fake.call_count(Operation::DeleteUser), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_aborts_before_mutation() {
        let (fake, provisioner) = setup(ClusterState::Ready);
        fake.fail_on(Operation::GetIdentityProviders, ErrorKind::Forbidden);

        let err = provisioner.provision("c1", None).await.unwrap_err();
        assert!(matches!(
            err.failure(),
            ProvisionFailure::IdentityProviderLookupFailed { .. }
        ));
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(fake.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_request_into_future() {
        let (fake, provisioner) = setup(ClusterState::Ready);
        let credential = CreateAdminRequest::new(provisioner, "c1".to_string())
            .password("MasterKey123")
            .await
            .unwrap();
        assert_eq!(credential.password(), "MasterKey123");
        assert_eq!(fake.group_members("c1", "cluster-admins").len(), 1);
    }
}
