//! Document Library API client.
//!
//! [`DocumentLibraryClient`] is cheap to clone; clones share the transport,
//! policies and configuration. Operations are grouped into the services
//! returned by [`libraries`](DocumentLibraryClient::libraries),
//! [`items`](DocumentLibraryClient::items) and
//! [`tags`](DocumentLibraryClient::tags).

mod executor;
mod interceptor;
mod operation;
mod request;

pub(crate) use executor::RequestExecutor;
pub use interceptor::RequestInterceptor;
pub use operation::Operation;
pub use request::RequestBuilder;

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::auth::TokenProvider;
use crate::config::{DocumentLibraryConfig, DocumentLibraryConfigBuilder};
use crate::errors::DocumentLibraryResult;
use crate::resilience::PolicyMap;
use crate::services::{ItemsService, LibrariesService, TagsService};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Tenant the call is made for, sent as the `tenantId` query parameter.
    pub tenant_id: Option<Uuid>,
    /// Token the caller can fire to abandon the call.
    pub cancellation: Option<CancellationToken>,
}

impl RequestOptions {
    /// Options with no tenant and no cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tenant.
    #[must_use]
    pub fn tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Sets the cancellation token.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub(crate) fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone().unwrap_or_default()
    }
}

/// The Document Library client.
#[derive(Debug, Clone)]
pub struct DocumentLibraryClient {
    executor: Arc<RequestExecutor>,
}

impl DocumentLibraryClient {
    /// Creates a client with the default transport and no policies.
    pub fn new(config: DocumentLibraryConfig) -> DocumentLibraryResult<Self> {
        Self::builder().config(config).build()
    }

    /// Creates a client configured from `DOCUMENT_LIBRARY_*` variables.
    pub fn from_env() -> DocumentLibraryResult<Self> {
        Self::new(DocumentLibraryConfig::from_env()?)
    }

    /// Creates a client builder.
    pub fn builder() -> DocumentLibraryClientBuilder {
        DocumentLibraryClientBuilder::new()
    }

    /// Library-level operations.
    pub fn libraries(&self) -> LibrariesService {
        LibrariesService::new(Arc::clone(&self.executor))
    }

    /// File and directory operations.
    pub fn items(&self) -> ItemsService {
        ItemsService::new(Arc::clone(&self.executor))
    }

    /// File tag operations.
    pub fn tags(&self) -> TagsService {
        TagsService::new(Arc::clone(&self.executor))
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &DocumentLibraryConfig {
        self.executor.config()
    }
}

/// Builder for the Document Library client.
#[derive(Default)]
pub struct DocumentLibraryClientBuilder {
    config: Option<DocumentLibraryConfig>,
    config_builder: DocumentLibraryConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    interceptor: Option<Arc<dyn RequestInterceptor>>,
    policies: PolicyMap,
}

impl DocumentLibraryClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a complete configuration, ignoring the individual setters.
    #[must_use]
    pub fn config(mut self, config: DocumentLibraryConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_key(api_key);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_version(api_version);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sends a header with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.header(name, value);
        self
    }

    /// Replaces the HTTP transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the bearer token provider.
    #[must_use]
    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the request interceptor.
    #[must_use]
    pub fn interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    /// Sets the per-operation policies.
    #[must_use]
    pub fn policies(mut self, policies: PolicyMap) -> Self {
        self.policies = policies;
        self
    }

    /// Builds the client.
    pub fn build(self) -> DocumentLibraryResult<DocumentLibraryClient> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_builder.build()?,
        };

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config)?),
        };

        let executor = RequestExecutor::new(
            config,
            transport,
            self.token_provider,
            self.interceptor,
            self.policies,
        )?;

        Ok(DocumentLibraryClient {
            executor: Arc::new(executor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DocumentLibraryError;

    #[test]
    fn test_builder_requires_base_url() {
        let result = DocumentLibraryClient::builder().api_key("key").build();
        assert!(matches!(result, Err(DocumentLibraryError::Configuration { .. })));
    }

    #[test]
    fn test_builder_with_setters() {
        let client = DocumentLibraryClient::builder()
            .base_url("https://docs.example.com/api")
            .api_version("2020-01-01")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(client.config().base_url.as_str(), "https://docs.example.com/api/");
        assert_eq!(client.config().api_version, "2020-01-01");
        assert_eq!(client.config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_request_options() {
        let tenant = Uuid::new_v4();
        let options = RequestOptions::new().tenant(tenant);

        assert_eq!(options.tenant_id, Some(tenant));
        assert!(!options.cancellation_token().is_cancelled());
    }
}
