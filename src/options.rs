//! Client configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;

/// Default API root, including the version segment.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
const ORGANIZATION_VAR: &str = "OPENAI_ORGANIZATION";

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Connection and authentication settings for the HTTP transport.
///
/// # Example
/// ```rust
/// use oaikit::options::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::new("sk-...")
///     .with_organization("org-123")
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(options.base_url, "https://api.openai.com/v1");
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API key sent as a bearer token
    pub api_key: SecretString,

    /// API root that endpoint paths are resolved against
    pub base_url: String,

    /// Value of the `OpenAI-Organization` header
    pub organization: Option<String>,

    /// Request timeout, covering the whole body for streaming calls
    pub timeout: Option<Duration>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ClientOptions {
    /// Create options with an API key and the default base URL.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            timeout: None,
            proxy: None,
            extra_headers: None,
        }
    }

    /// Load options from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_ORGANIZATION`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ClientError::Config(format!("{API_KEY_VAR} is not set")))?;

        let mut options = Self::new(api_key);
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|url| !url.is_empty()) {
            options.base_url = base_url;
        }
        options.organization = lookup(ORGANIZATION_VAR).filter(|org| !org.is_empty());
        Ok(options)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the organization header.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}
