//! Policy for generated admin passwords.

use crate::Error;

/// Characters a generated password is drawn from.
///
/// Excludes look-alikes: `0`, `O`, `1`, `l` and `I`.
pub const SAFE_ALPHABET: &str = "abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Shape of generated passwords.
///
/// ## Default Values
///
/// - `length`: 23
/// - `alphabet`: [`SAFE_ALPHABET`]
/// - `separator`: `-`
/// - `separator_positions`: 5, 11, 17
///
/// The default yields passwords such as `aB3de-fGh4j-kMn5p-qRs6t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Total length, separators included.
    pub length: usize,

    /// Characters drawn for non-separator positions.
    pub alphabet: String,

    /// Character placed at each separator position.
    pub separator: char,

    /// Zero-based indexes holding the separator.
    pub separator_positions: Vec<usize>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: 23,
            alphabet: SAFE_ALPHABET.to_string(),
            separator: '-',
            separator_positions: vec![5, 11, 17],
        }
    }
}

impl PasswordPolicy {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total length.
    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Sets the alphabet.
    #[must_use]
    pub fn with_alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.alphabet = alphabet.into();
        self
    }

    /// Sets the separator character and its positions.
    #[must_use]
    pub fn with_separators(mut self, separator: char, positions: Vec<usize>) -> Self {
        self.separator = separator;
        self.separator_positions = positions;
        self
    }

    /// Checks that the policy can produce a password.
    ///
    /// The alphabet must be non-empty ASCII without the separator, at most
    /// 256 characters, and every separator position must fall inside the
    /// password.
    pub fn validate(&self) -> Result<(), Error> {
        if self.length == 0 {
            return Err(Error::invalid_argument("password length must be positive"));
        }
        if self.alphabet.is_empty() {
            return Err(Error::invalid_argument("password alphabet cannot be empty"));
        }
        if !self.alphabet.is_ascii() {
            return Err(Error::invalid_argument("password alphabet must be ASCII"));
        }
        if self.alphabet.len() > 256 {
            return Err(Error::invalid_argument(
                "password alphabet cannot exceed 256 characters",
            ));
        }
        if self.alphabet.contains(self.separator) {
            return Err(Error::invalid_argument(format!(
                "password alphabet cannot contain the separator '{}'",
                self.separator
            )));
        }
        if let Some(position) = self
            .separator_positions
            .iter()
            .find(|&&position| position >= self.length)
        {
            return Err(Error::invalid_argument(format!(
                "separator position {} is outside a password of length {}",
                position, self.length
            )));
        }
        Ok(())
    }

    /// Returns `true` if `index` holds a separator.
    pub fn is_separator_position(&self, index: usize) -> bool {
        self.separator_positions.contains(&index)
    }
}
