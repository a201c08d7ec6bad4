//! Listing API access key value object.

use std::fmt;

/// Static API access key with masking.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    value: String,
}

impl ApiKey {
    /// Creates a key, rejecting blank input.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return None;
        }

        Some(Self { value })
    }

    /// Returns key as string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns masked key for display.
    #[must_use]
    pub fn masked(&self) -> String {
        if self.value.len() <= 10 {
            return "*".repeat(self.value.len());
        }

        let visible_prefix = &self.value[..4];
        let visible_suffix = &self.value[self.value.len() - 4..];
        format!("{visible_prefix}...{visible_suffix}")
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("value", &self.masked())
            .finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "Zx81kQ-lTq4pV0n2m9c7sYhJ3wE5rB6uA";

    #[test]
    fn test_blank_key_rejected() {
        assert!(ApiKey::new("   ").is_none());
        assert!(ApiKey::new("").is_none());
    }

    #[test]
    fn test_key_is_trimmed() {
        let key = ApiKey::new(format!("  {KEY}\n")).unwrap();
        assert_eq!(key.as_str(), KEY);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let key = ApiKey::new(KEY).unwrap();

        assert!(!format!("{key:?}").contains(KEY));
        assert!(!key.to_string().contains(KEY));
        assert!(key.masked().contains("..."));
    }

    #[test]
    fn test_short_key_fully_masked() {
        let key = ApiKey::new("abc").unwrap();
        assert_eq!(key.masked(), "***");
    }
}
