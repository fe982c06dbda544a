//! Role ARNs linked to an account or organization.

use std::sync::Arc;

use super::LabelSet;
use crate::transport::ControlPlane;
use crate::types::{Label, LabelScope, RoleArn};
use crate::Error;

/// Label holding the OCM roles linked to an organization.
pub const OCM_ROLE_LABEL: &str = "sts_ocm_role";

/// Label holding the user roles linked to an account.
pub const USER_ROLE_LABEL: &str = "sts_user_role";

/// Returns the label key role links are stored under for `scope`.
pub fn role_label(scope: &LabelScope) -> &'static str {
    match scope {
        LabelScope::Account(_) => USER_ROLE_LABEL,
        LabelScope::Organization(_) => OCM_ROLE_LABEL,
    }
}

/// Result of a successful [`RoleLinksClient::link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The ARN was added to the set.
    Linked,
    /// The ARN was already present; nothing was written.
    AlreadyLinked,
}

impl LinkOutcome {
    /// Returns `true` if the label was written.
    pub fn is_linked(&self) -> bool {
        matches!(self, LinkOutcome::Linked)
    }
}

/// Whether a cloud account already has a role linked in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLinkCheck {
    /// `true` if a linked ARN belongs to the account.
    pub exists: bool,
    /// The full encoded label value, empty when the label is absent.
    pub value: String,
    /// The linked ARN belonging to the account, if any.
    pub matching_arn: Option<RoleArn>,
}

/// Whether a role may be created for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCheck {
    /// No role is linked for the account, or the linked role has the same
    /// name.
    Proceed,
    /// A role with a different name is already linked for the account.
    Taken {
        /// Name of the linked role.
        role_name: String,
        /// The linked ARN.
        arn: RoleArn,
    },
}

/// Registry of role ARNs linked to one account or organization.
///
/// The links are stored as a comma-joined [`LabelSet`] in a single label
/// (see [`role_label`]). Every operation re-reads the label before writing;
/// the registry keeps no state between calls and never retries.
///
/// Within a scope at most one ARN may belong to any AWS account: linking a
/// second role from the same account is rejected with
/// [`ErrorKind::Conflict`](crate::ErrorKind::Conflict).
///
/// ```rust,ignore
/// use ocm_control::registry::LinkOutcome;
///
/// let links = client.organization("1a2b3c").role_links();
/// let outcome = links.link("arn:aws:iam::123456789012:role/ManagedOpenShift-OCM-Role").await?;
/// assert_eq!(outcome, LinkOutcome::Linked);
///
/// for arn in links.list().await? {
///     println!("{} ({})", arn, arn.account_id());
/// }
/// ```
#[derive(Clone)]
pub struct RoleLinksClient {
    control_plane: Arc<dyn ControlPlane>,
    scope: LabelScope,
}

impl std::fmt::Debug for RoleLinksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleLinksClient")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// The stored label, decoded.
struct Stored {
    set: LabelSet,
    present: bool,
}

impl RoleLinksClient {
    /// Creates a registry for `scope`.
    pub fn new(control_plane: Arc<dyn ControlPlane>, scope: LabelScope) -> Self {
        Self {
            control_plane,
            scope,
        }
    }

    /// Returns the scope links are stored in.
    pub fn scope(&self) -> &LabelScope {
        &self.scope
    }

    /// Returns the label key links are stored under.
    pub fn label_key(&self) -> &'static str {
        role_label(&self.scope)
    }

    async fn read(&self) -> Result<Stored, Error> {
        match self
            .control_plane
            .get_label(&self.scope, self.label_key())
            .await
        {
            Ok(label) => Ok(Stored {
                set: LabelSet::decode(&label.value),
                present: true,
            }),
            Err(err) if err.is_not_found() => Ok(Stored {
                set: LabelSet::new(),
                present: false,
            }),
            Err(err) => Err(err.context(format!(
                "failed to read label '{}' on {}",
                self.label_key(),
                self.scope
            ))),
        }
    }

    /// Parses the stored tokens.
    fn arns(&self, set: &LabelSet) -> Result<Vec<RoleArn>, Error> {
        set.iter()
            .map(|token| {
                token.parse::<RoleArn>().map_err(|err| {
                    Error::invalid_response(format!(
                        "label '{}' on {} holds a malformed role ARN: {}",
                        self.label_key(),
                        self.scope,
                        err.message()
                    ))
                })
            })
            .collect()
    }

    async fn write(&self, set: &LabelSet, present: bool) -> Result<(), Error> {
        let key = self.label_key();
        let result = match (set.encode(), present) {
            (Some(value), true) => self
                .control_plane
                .update_label(&self.scope, &Label::new(key, value))
                .await
                .map(|_| ()),
            (Some(value), false) => self
                .control_plane
                .add_label(&self.scope, &Label::new(key, value))
                .await
                .map(|_| ()),
            (None, true) => self.control_plane.delete_label(&self.scope, key).await,
            (None, false) => Ok(()),
        };

        result.map_err(|err| {
            err.context(format!("failed to write label '{}' on {}", key, self.scope))
        })
    }

    /// Links a role ARN.
    ///
    /// Returns [`LinkOutcome::AlreadyLinked`] without writing when the ARN is
    /// already present. Fails with `InvalidArgument` for a malformed ARN and
    /// with `Conflict` when another ARN from the same AWS account is linked.
    pub async fn link(&self, role_arn: &str) -> Result<LinkOutcome, Error> {
        let candidate: RoleArn = role_arn.parse()?;
        let role_arn = candidate.to_string();
        let Stored { mut set, present } = self.read().await?;

        if set.contains(&role_arn) {
            tracing::debug!(scope = %self.scope, %role_arn, "role already linked");
            return Ok(LinkOutcome::AlreadyLinked);
        }

        if let Some(existing) = self
            .arns(&set)?
            .into_iter()
            .find(|arn| arn.same_account(&candidate))
        {
            return Err(Error::conflict(format!(
                "{} has role ARN '{}' linked; only one role can be linked per AWS account ({})",
                self.scope,
                existing,
                candidate.account_id()
            )));
        }

        set.insert(&role_arn);
        self.write(&set, present).await?;

        tracing::info!(scope = %self.scope, %role_arn, "linked role");
        Ok(LinkOutcome::Linked)
    }

    /// Unlinks a role ARN.
    ///
    /// Fails with `PreconditionFailed` when the ARN is not linked. Deletes
    /// the label when the last ARN is removed.
    pub async fn unlink(&self, role_arn: &str) -> Result<(), Error> {
        let Stored { mut set, present } = self.read().await?;

        if !set.remove(role_arn) {
            return Err(Error::precondition_failed(format!(
                "role ARN '{}' is not linked with {}",
                role_arn, self.scope
            )));
        }

        self.write(&set, present).await?;

        tracing::info!(
            scope = %self.scope,
            role_arn,
            remaining = set.len(),
            "unlinked role"
        );
        Ok(())
    }

    /// Returns the linked role ARNs in stored order; empty when none are
    /// linked.
    pub async fn list(&self) -> Result<Vec<RoleArn>, Error> {
        let stored = self.read().await?;
        self.arns(&stored.set)
    }

    /// Reports whether a role from `account_id` is linked.
    pub async fn check_account_exists(&self, account_id: &str) -> Result<AccountLinkCheck, Error> {
        let stored = self.read().await?;
        let matching_arn = self
            .arns(&stored.set)?
            .into_iter()
            .find(|arn| arn.account_id() == account_id);

        Ok(AccountLinkCheck {
            exists: matching_arn.is_some(),
            value: stored.set.to_string(),
            matching_arn,
        })
    }

    /// Decides whether a role named `role_name` may be created for
    /// `account_id`.
    pub async fn check_role_exists(
        &self,
        role_name: &str,
        account_id: &str,
    ) -> Result<RoleCheck, Error> {
        let check = self.check_account_exists(account_id).await?;
        let Some(arn) = check.matching_arn else {
            return Ok(RoleCheck::Proceed);
        };

        let linked_name = arn.role_name().unwrap_or_default().to_string();
        if linked_name == role_name {
            Ok(RoleCheck::Proceed)
        } else {
            Ok(RoleCheck::Taken {
                role_name: linked_name,
                arn,
            })
        }
    }
}
