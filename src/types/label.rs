//! Labels attached to accounts and organizations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The resource a label is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LabelScope {
    /// A user account (e.g. `acc_1a2b3c`).
    Account(String),
    /// An organization (e.g. `org_4d5e6f`).
    Organization(String),
}

impl LabelScope {
    /// Creates an account scope.
    pub fn account(id: impl Into<String>) -> Self {
        LabelScope::Account(id.into())
    }

    /// Creates an organization scope.
    pub fn organization(id: impl Into<String>) -> Self {
        LabelScope::Organization(id.into())
    }

    /// Returns the account or organization ID.
    pub fn id(&self) -> &str {
        match self {
            LabelScope::Account(id) | LabelScope::Organization(id) => id,
        }
    }

    /// Returns the scope kind as a lowercase noun.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LabelScope::Account(_) => "account",
            LabelScope::Organization(_) => "organization",
        }
    }

    /// Returns the collection path segment used by the accounts API.
    pub(crate) fn collection(&self) -> &'static str {
        match self {
            LabelScope::Account(_) => "accounts",
            LabelScope::Organization(_) => "organizations",
        }
    }
}

impl fmt::Display for LabelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind_name(), self.id())
    }
}

/// A key/value annotation stored by the accounts API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// The label key.
    pub key: String,
    /// The raw label value.
    #[serde(default)]
    pub value: String,
    /// Whether the label is internal to the service.
    #[serde(default)]
    pub internal: bool,
    /// When the label was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    /// When the label was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Label {
    /// Creates a label to send to the service.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            internal: false,
            created_at: None,
            updated_at: None,
        }
    }
}
