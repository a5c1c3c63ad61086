//! Authentication for the Document Library API.
//!
//! Two independent mechanisms can be combined:
//! - an API key sent in a configurable header (`Subscription-Key` by default)
//! - a bearer token obtained from a [`TokenProvider`]
//!
//! Token acquisition itself is left to the provider; the client only asks
//! for a token before each attempt.
//!
//! ```no_run
//! use integrations_document_library::auth::{StaticTokenProvider, TokenProvider};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = StaticTokenProvider::new("eyJhbGciOi...");
//! let token = provider.get_token(&CancellationToken::new()).await?;
//! assert!(!token.is_expired());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;

use crate::config::DocumentLibraryConfig;
use crate::errors::{DocumentLibraryError, DocumentLibraryResult};

/// Tokens this close to expiry are treated as expired.
pub const TOKEN_EXPIRY_BUFFER_SECONDS: i64 = 60;

/// A bearer token and its lifetime.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// The token string.
    pub access_token: SecretString,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Expiration time, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenInfo {
    /// Creates a bearer token without a known expiry.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            token_type: "Bearer".to_string(),
            expires_at: None,
        }
    }

    /// Sets the expiry.
    #[must_use]
    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if the token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |expires_at| {
            Utc::now() + Duration::seconds(TOKEN_EXPIRY_BUFFER_SECONDS) >= expires_at
        })
    }

    /// Builds the `Authorization` header value.
    pub(crate) fn header_value(&self) -> DocumentLibraryResult<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!(
            "{} {}",
            self.token_type,
            self.access_token.expose_secret()
        ))
        .map_err(|_| DocumentLibraryError::Authentication {
            message: "Access token contains characters not allowed in a header".to_string(),
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Supplies bearer tokens for API requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token that is valid for at least the next request.
    async fn get_token(&self, cancellation: &CancellationToken) -> DocumentLibraryResult<TokenInfo>;
}

/// A provider that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: TokenInfo,
}

impl StaticTokenProvider {
    /// Creates a provider for a fixed bearer token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            token: TokenInfo::bearer(access_token),
        }
    }

    /// Creates a provider from a token with metadata.
    pub fn from_token(token: TokenInfo) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self, _cancellation: &CancellationToken) -> DocumentLibraryResult<TokenInfo> {
        if self.token.is_expired() {
            return Err(DocumentLibraryError::Authentication {
                message: "Static access token has expired".to_string(),
            });
        }
        Ok(self.token.clone())
    }
}

/// Adds the API key header when a key is configured.
#[derive(Clone)]
pub struct ApiKeyAuth {
    header: HeaderName,
    key: Option<SecretString>,
}

impl ApiKeyAuth {
    /// Creates the authenticator from config.
    pub fn new(config: &DocumentLibraryConfig) -> Self {
        Self {
            header: config.api_key_header.clone(),
            key: config.api_key().map(|key| SecretString::new(key.to_string())),
        }
    }

    /// Inserts the key header into `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) -> DocumentLibraryResult<()> {
        let Some(key) = &self.key else {
            return Ok(());
        };

        let mut value = HeaderValue::from_str(key.expose_secret()).map_err(|_| {
            DocumentLibraryError::Configuration {
                message: "API key contains characters not allowed in a header".to_string(),
            }
        })?;
        value.set_sensitive(true);
        headers.insert(self.header.clone(), value);
        Ok(())
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("header", &self.header)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> DocumentLibraryConfig {
        let mut builder = DocumentLibraryConfig::builder().base_url("http://localhost");
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_api_key_header_added_when_configured() {
        let auth = ApiKeyAuth::new(&config(Some("key-123")));
        let mut headers = HeaderMap::new();
        auth.apply(&mut headers).unwrap();

        assert_eq!(headers.get("Subscription-Key").unwrap(), "key-123");
        assert!(headers.get("Subscription-Key").unwrap().is_sensitive());
    }

    #[test]
    fn test_api_key_header_absent_without_key() {
        let auth = ApiKeyAuth::new(&config(None));
        let mut headers = HeaderMap::new();
        auth.apply(&mut headers).unwrap();

        assert!(headers.is_empty());
    }

    #[test]
    fn test_token_expiry() {
        let fresh = TokenInfo::bearer("a").expires_at(Utc::now() + Duration::hours(1));
        let stale = TokenInfo::bearer("a").expires_at(Utc::now() + Duration::seconds(5));

        assert!(!fresh.is_expired());
        assert!(stale.is_expired());
        assert!(!TokenInfo::bearer("a").is_expired());
    }

    #[test]
    fn test_bearer_header_value() {
        let value = TokenInfo::bearer("abc").header_value().unwrap();
        assert_eq!(value, "Bearer abc");
        assert!(value.is_sensitive());
    }

    #[tokio::test]
    async fn test_static_provider_rejects_expired_token() {
        let provider = StaticTokenProvider::from_token(
            TokenInfo::bearer("old").expires_at(Utc::now() - Duration::minutes(1)),
        );

        let result = provider.get_token(&CancellationToken::new()).await;
        assert!(matches!(result, Err(DocumentLibraryError::Authentication { .. })));
    }

    #[test]
    fn test_static_provider_returns_token() {
        let provider = StaticTokenProvider::new("abc");
        let token = tokio_test::block_on(provider.get_token(&CancellationToken::new())).unwrap();

        assert_eq!(token.header_value().unwrap(), "Bearer abc");
    }
}
