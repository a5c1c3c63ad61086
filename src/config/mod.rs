//! Configuration module for the Document Library client.
//!
//! Provides the base URL of the library API, the optional API key and its
//! header name, the API version and transport timeouts.

use reqwest::header::HeaderName;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::errors::{DocumentLibraryError, DocumentLibraryResult};

/// Default header carrying the API key.
pub const DEFAULT_API_KEY_HEADER: &str = "Subscription-Key";

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "2019-09-01";

/// Query parameter carrying the API version.
pub const DEFAULT_API_VERSION_PARAMETER: &str = "api-version";

/// Default time allowed for the response headers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("integrations-document-library/", env!("CARGO_PKG_VERSION"));

/// Configuration for the Document Library client.
#[derive(Clone)]
pub struct DocumentLibraryConfig {
    /// Root of the library API. Always ends with `/`.
    pub base_url: Url,
    /// API key (stored securely).
    pub(crate) api_key: Option<SecretString>,
    /// Header carrying the API key.
    pub api_key_header: HeaderName,
    /// API version sent with every request.
    pub api_version: String,
    /// Query parameter carrying the API version.
    pub api_version_parameter: String,
    /// Time allowed for the response headers. Body reads are not bounded.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User agent.
    pub user_agent: String,
    /// Custom headers to include in requests.
    pub custom_headers: Vec<(String, String)>,
}

impl DocumentLibraryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> DocumentLibraryConfigBuilder {
        DocumentLibraryConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DOCUMENT_LIBRARY_BASE_URL` (required): root of the library API
    /// - `DOCUMENT_LIBRARY_API_KEY` (optional): API key
    /// - `DOCUMENT_LIBRARY_API_KEY_HEADER` (optional): header carrying the key
    /// - `DOCUMENT_LIBRARY_API_VERSION` (optional): API version
    /// - `DOCUMENT_LIBRARY_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> DocumentLibraryResult<Self> {
        let base_url = std::env::var("DOCUMENT_LIBRARY_BASE_URL").map_err(|_| {
            DocumentLibraryError::Configuration {
                message: "DOCUMENT_LIBRARY_BASE_URL environment variable not set".to_string(),
            }
        })?;

        let mut builder = DocumentLibraryConfigBuilder::new().base_url(base_url);

        if let Ok(api_key) = std::env::var("DOCUMENT_LIBRARY_API_KEY") {
            builder = builder.api_key(api_key);
        }

        if let Ok(header) = std::env::var("DOCUMENT_LIBRARY_API_KEY_HEADER") {
            builder = builder.api_key_header(header);
        }

        if let Ok(version) = std::env::var("DOCUMENT_LIBRARY_API_VERSION") {
            builder = builder.api_version(version);
        }

        if let Ok(timeout_str) = std::env::var("DOCUMENT_LIBRARY_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            }
        }

        builder.build()
    }

    /// Returns the API key (exposing the secret).
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.expose_secret().as_str())
    }

    /// Returns true if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Resolves a route relative to the base URL.
    pub fn endpoint_url(&self, path: &str) -> DocumentLibraryResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

impl std::fmt::Debug for DocumentLibraryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLibraryConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_header", &self.api_key_header)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Builder for `DocumentLibraryConfig`.
#[derive(Default)]
pub struct DocumentLibraryConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    api_key_header: Option<String>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    custom_headers: Vec<(String, String)>,
}

impl DocumentLibraryConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the header carrying the API key.
    pub fn api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = Some(header.into());
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sets the time allowed for the response headers.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> DocumentLibraryResult<DocumentLibraryConfig> {
        let raw_url = self.base_url.ok_or_else(|| DocumentLibraryError::Configuration {
            message: "Base URL is required".to_string(),
        })?;

        let mut base_url = Url::parse(&raw_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(DocumentLibraryError::Configuration {
                message: "Base URL must start with http:// or https://".to_string(),
            });
        }

        // Url::join replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        if let Some(key) = &self.api_key {
            if key.trim().is_empty() {
                return Err(DocumentLibraryError::Configuration {
                    message: "API key cannot be empty".to_string(),
                });
            }
        }

        let header = self
            .api_key_header
            .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string());
        let api_key_header = HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            DocumentLibraryError::Configuration {
                message: format!("Invalid API key header name: {header}"),
            }
        })?;

        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        if api_version.trim().is_empty() {
            return Err(DocumentLibraryError::Configuration {
                message: "API version cannot be empty".to_string(),
            });
        }

        Ok(DocumentLibraryConfig {
            base_url,
            api_key: self.api_key.map(SecretString::new),
            api_key_header,
            api_version,
            api_version_parameter: DEFAULT_API_VERSION_PARAMETER.to_string(),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            custom_headers: self.custom_headers,
        })
    }
}
