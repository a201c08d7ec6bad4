//! Remote image references and their cache identity.

use reqwest::Url;

/// Cache and deduplication key for an image.
/// Always the string form of the image's source URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(String);

impl ImageKey {
    /// Creates a key from any string-like input.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Creates the key identifying the image served at `url`.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self(url.as_str().to_string())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Lightweight handle identifying a remote image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    id: String,
    source_url: Url,
}

impl ImageRef {
    /// Creates a new reference.
    #[must_use]
    pub fn new(id: impl Into<String>, source_url: Url) -> Self {
        Self {
            id: id.into(),
            source_url,
        }
    }

    /// Returns the listing identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the URL the image bytes are served from.
    #[must_use]
    pub const fn source_url(&self) -> &Url {
        &self.source_url
    }

    /// Returns the cache key for this image.
    #[must_use]
    pub fn key(&self) -> ImageKey {
        ImageKey::from_url(&self.source_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_url_string() {
        let url = Url::parse("https://images.example.com/photo-1?w=1080").unwrap();
        let image = ImageRef::new("abc", url);

        assert_eq!(image.key().as_str(), "https://images.example.com/photo-1?w=1080");
    }

    #[test]
    fn test_same_url_same_key() {
        let url = Url::parse("https://images.example.com/photo-1").unwrap();
        let first = ImageRef::new("a", url.clone());
        let second = ImageRef::new("b", url);

        assert_eq!(first.key(), second.key());
        assert_ne!(first, second);
    }
}
