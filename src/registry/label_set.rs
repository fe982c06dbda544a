//! A set of tokens stored in a single label value.

use std::fmt;

/// Separator between tokens in the encoded label value.
pub const DELIMITER: char = ',';

/// An ordered set of string tokens encoded as one comma-joined label value.
///
/// The remote store only offers flat string labels, so multi-valued data is
/// kept as `a,b,c`. `LabelSet` owns that encoding:
///
/// - tokens are unique; the first occurrence wins on decode
/// - insertion order is kept
/// - surrounding whitespace and empty tokens are dropped
/// - an empty set encodes to `None`: the label should not exist at all
///
/// ```rust
/// use ocm_control::registry::LabelSet;
///
/// let mut set = LabelSet::decode("a,b,,a");
/// assert_eq!(set.len(), 2);
/// assert!(set.insert("c"));
/// assert_eq!(set.encode().as_deref(), Some("a,b,c"));
///
/// set.clear();
/// assert_eq!(set.encode(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    tokens: Vec<String>,
}

impl LabelSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a label value.
    pub fn decode(value: &str) -> Self {
        value.split(DELIMITER).collect()
    }

    /// Encodes the set, or returns `None` when it is empty.
    pub fn encode(&self) -> Option<String> {
        if self.tokens.is_empty() {
            return None;
        }
        Some(self.tokens.join(&DELIMITER.to_string()))
    }

    /// Adds a token. Returns `false` if it was already present.
    pub fn insert(&mut self, token: impl AsRef<str>) -> bool {
        let token = token.as_ref().trim();
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    /// Removes a token. Returns `false` if it was not present.
    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        self.tokens.len() != before
    }

    /// Returns `true` if `token` is in the set.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the set holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Removes every token.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Iterates over the tokens in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for token in iter {
            set.insert(token);
        }
        set
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(&DELIMITER.to_string()))
    }
}
