use crate::{MockError, Result};
use std::fmt;

const PLACEHOLDER: &str = "<meth>";

/// Naming scheme for backup keys, e.g. `"saved method <meth>"`.
///
/// The pattern must contain `<meth>`, so the key embeds the method name and
/// distinct methods never share a key. Keys that contain a space can never be
/// mistaken for an ordinary method name declared by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPattern(String);

impl BackupPattern {
    /// Pattern used for objects hooked through slots
    pub const SAVED_METHOD: &'static str = "saved method <meth>";
    /// Pattern used for the test case's teardown
    pub const ORIGINAL: &'static str = "original <meth>";

    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains(PLACEHOLDER) {
            return Err(MockError::InvalidBackupPattern(pattern));
        }
        Ok(Self(pattern))
    }

    pub fn saved_method() -> Self {
        Self(Self::SAVED_METHOD.to_string())
    }

    pub fn original() -> Self {
        Self(Self::ORIGINAL.to_string())
    }

    pub fn key_for(&self, method: &str) -> String {
        self.0.replace(PLACEHOLDER, method)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BackupPattern {
    fn default() -> Self {
        Self::saved_method()
    }
}

impl fmt::Display for BackupPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
