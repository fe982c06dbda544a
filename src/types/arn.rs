//! Parsed AWS IAM role ARNs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::registry::DELIMITER;

/// An Amazon Resource Name identifying an IAM role.
///
/// Format: `arn:partition:service:region:account-id:resource`
///
/// The account-ID segment is what the role-link registry groups on: an
/// organization may link at most one role per AWS account.
///
/// ```rust
/// use ocm_control::RoleArn;
///
/// let arn: RoleArn = "arn:aws:iam::123456789012:role/ManagedOpenShift-OCM-Role"
///     .parse()
///     .unwrap();
/// assert_eq!(arn.account_id(), "123456789012");
/// assert_eq!(arn.role_name(), Some("ManagedOpenShift-OCM-Role"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleArn {
    partition: String,
    service: String,
    region: String,
    account_id: String,
    resource: String,
}

impl RoleArn {
    /// Returns the partition (e.g. `aws`, `aws-us-gov`).
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Returns the service namespace (`iam` for roles).
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the region, empty for global services such as IAM.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the AWS account ID that owns the role.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Returns the resource segment (e.g. `role/MyRole`).
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns everything after the first `/` of the resource, which for a
    /// role ARN is the (possibly path-qualified) role name.
    pub fn role_name(&self) -> Option<&str> {
        self.resource.split_once('/').map(|(_, name)| name)
    }

    /// Returns `true` if both ARNs belong to the same AWS account.
    pub fn same_account(&self, other: &RoleArn) -> bool {
        self.account_id == other.account_id
    }
}

impl fmt::Display for RoleArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

impl FromStr for RoleArn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| {
            Error::invalid_argument(format!("invalid role ARN '{}': {}", s, reason))
        };

        if s.contains(DELIMITER) {
            return Err(invalid("must not contain ','"));
        }
        if s.contains(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }

        let rest = s
            .strip_prefix("arn:")
            .ok_or_else(|| invalid("must start with 'arn:'"))?;

        let mut sections = rest.splitn(5, ':');
        let partition = sections.next().unwrap_or_default();
        let service = sections.next().ok_or_else(|| invalid("missing service"))?;
        let region = sections.next().ok_or_else(|| invalid("missing region"))?;
        let account_id = sections.next().ok_or_else(|| invalid("missing account ID"))?;
        let resource = sections.next().ok_or_else(|| invalid("missing resource"))?;

        if partition.is_empty() {
            return Err(invalid("partition cannot be empty"));
        }
        if service.is_empty() {
            return Err(invalid("service cannot be empty"));
        }
        if account_id.is_empty() {
            return Err(invalid("account ID cannot be empty"));
        }
        if resource.is_empty() {
            return Err(invalid("resource cannot be empty"));
        }

        Ok(Self {
            partition: partition.to_owned(),
            service: service.to_owned(),
            region: region.to_owned(),
            account_id: account_id.to_owned(),
            resource: resource.to_owned(),
        })
    }
}

impl TryFrom<String> for RoleArn {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoleArn> for String {
    fn from(arn: RoleArn) -> Self {
        arn.to_string()
    }
}
