use std::time::Duration;

use serde::Deserialize;

use crate::models::CoreError;

pub const DEFAULT_SEARCH_BASE_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

pub const ENV_SEARCH_ACCESS_KEY: &str = "PIXFINDER_SEARCH_ACCESS_KEY";
pub const ENV_SEARCH_BASE_URL: &str = "PIXFINDER_SEARCH_BASE_URL";
pub const ENV_LOGIN_URL: &str = "PIXFINDER_LOGIN_URL";
pub const ENV_SIGN_UP_URL: &str = "PIXFINDER_SIGN_UP_URL";

/// Endpoints and credentials for the remote collaborators.
///
/// The host passes a JSON document at startup; any of the `PIXFINDER_*`
/// environment variables override the matching field. The search access key
/// has no default and must come from one of the two.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub search_base_url: String,
    pub search_access_key: Option<String>,
    pub login_url: Option<String>,
    pub sign_up_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            search_access_key: None,
            login_url: None,
            sign_up_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
            .map_err(|error| CoreError::invalid_input(format!("invalid client config: {error}")))
    }

    /// Overlays values found through `lookup` (normally `std::env::var`).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty(ENV_SEARCH_ACCESS_KEY) {
            self.search_access_key = Some(key);
        }
        if let Some(url) = non_empty(ENV_SEARCH_BASE_URL) {
            self.search_base_url = url;
        }
        if let Some(url) = non_empty(ENV_LOGIN_URL) {
            self.login_url = Some(url);
        }
        if let Some(url) = non_empty(ENV_SIGN_UP_URL) {
            self.sign_up_url = Some(url);
        }
        self
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn require_search_access_key(&self) -> Result<&str, CoreError> {
        self.search_access_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                CoreError::invalid_input(format!(
                    "image search access key is not configured; set {ENV_SEARCH_ACCESS_KEY}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{ClientConfig, DEFAULT_SEARCH_BASE_URL, ENV_LOGIN_URL, ENV_SEARCH_ACCESS_KEY};
    use crate::models::CoreErrorKind;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ClientConfig::from_json("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.search_base_url, DEFAULT_SEARCH_BASE_URL);
    }

    #[test]
    fn partial_document_keeps_remaining_defaults() {
        let config =
            ClientConfig::from_json(r#"{"search_access_key":"abc","request_timeout_secs":3}"#)
                .unwrap();

        assert_eq!(config.search_access_key.as_deref(), Some("abc"));
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.search_base_url, DEFAULT_SEARCH_BASE_URL);
    }

    #[test]
    fn malformed_document_is_invalid_input() {
        let error = ClientConfig::from_json("{not json").unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    }

    #[test]
    fn overrides_replace_document_values_and_skip_blanks() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_SEARCH_ACCESS_KEY, "from-env"), (ENV_LOGIN_URL, "  ")]);
        let config = ClientConfig {
            search_access_key: Some("from-json".to_string()),
            login_url: Some("https://login.example".to_string()),
            ..ClientConfig::default()
        }
        .with_overrides(|name| env.get(name).map(|value| value.to_string()));

        assert_eq!(config.search_access_key.as_deref(), Some("from-env"));
        assert_eq!(config.login_url.as_deref(), Some("https://login.example"));
    }

    #[test]
    fn missing_access_key_is_reported() {
        let error = ClientConfig::default()
            .require_search_access_key()
            .unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    }
}
