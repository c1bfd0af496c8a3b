//! Connection settings for the Trainingset API.
//!
//! The SDK reads no environment variables or files. Callers construct a
//! `ClientConfig` in code; tests override `base_url` to reach a local mock.

use std::fmt;

/// Production endpoint of the Trainingset API.
pub const DEFAULT_BASE_URL: &str = "https://api.trainingset.ai/api";

/// Header that carries the API key on every request.
pub const API_KEY_HEADER: &str = "user_key";

/// Immutable settings shared by every request a client builds.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another deployment. A trailing `/` is dropped so
    /// endpoint paths can always start with one.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production_url() {
        let config = ClientConfig::new("key");
        assert_eq!(config.base_url(), "https://api.trainingset.ai/api");
        assert_eq!(config.api_key(), "key");
    }

    #[test]
    fn base_url_override_strips_trailing_slash() {
        let config = ClientConfig::new("key").with_base_url("http://127.0.0.1:3000/");
        assert_eq!(config.base_url(), "http://127.0.0.1:3000");
    }

    #[test]
    fn debug_hides_api_key() {
        let config = ClientConfig::new("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
