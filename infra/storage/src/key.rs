use crate::error::StorageError;
use std::borrow::Cow;
use std::fmt;

const MAX_KEY_LEN: usize = 128;

/// A validated storage key.
///
/// Keys are non-empty, at most 128 characters long and restricted to ASCII
/// alphanumerics, `-` and `_`, so a key always maps to a single file name
/// directly under the store root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(Cow<'static, str>);

impl StorageKey {
    /// Validates a key known at compile time.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidKey`] if the key breaks the naming rules.
    pub fn from_static(key: &'static str) -> Result<Self, StorageError> {
        validate(key)?;
        Ok(Self(Cow::Borrowed(key)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for StorageKey {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        validate(value)?;
        Ok(Self(Cow::Owned(value.to_owned())))
    }
}

impl TryFrom<String> for StorageKey {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        validate(&value)?;
        Ok(Self(Cow::Owned(value)))
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey {
            message: "EMPTY".into(),
            context: Some("Storage key cannot be empty".into()),
        });
    }

    if key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey {
            message: format!("{} characters", key.len()).into(),
            context: Some("Storage key is too long".into()),
        });
    }

    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(StorageError::InvalidKey {
            message: key.to_owned().into(),
            context: Some("Storage key contains illegal characters".into()),
        });
    }

    Ok(())
}
