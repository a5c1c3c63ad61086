//! Sends prepared requests through the configured policies.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, Instrument};

use super::{Operation, RequestBuilder, RequestInterceptor, RequestOptions};
use crate::auth::{ApiKeyAuth, TokenProvider};
use crate::config::DocumentLibraryConfig;
use crate::errors::{DocumentLibraryError, DocumentLibraryResult};
use crate::resilience::{PolicyContext, PolicyMap, SendThunk};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Shared state behind every service of one client.
pub(crate) struct RequestExecutor {
    config: DocumentLibraryConfig,
    default_headers: HeaderMap,
    api_key: ApiKeyAuth,
    transport: Arc<dyn HttpTransport>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    interceptor: Option<Arc<dyn RequestInterceptor>>,
    policies: PolicyMap,
}

impl RequestExecutor {
    pub(crate) fn new(
        config: DocumentLibraryConfig,
        transport: Arc<dyn HttpTransport>,
        token_provider: Option<Arc<dyn TokenProvider>>,
        interceptor: Option<Arc<dyn RequestInterceptor>>,
        policies: PolicyMap,
    ) -> DocumentLibraryResult<Self> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.custom_headers {
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                DocumentLibraryError::Configuration {
                    message: format!("Invalid header name: {name}"),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                DocumentLibraryError::Configuration {
                    message: format!("Invalid value for header {name}"),
                }
            })?;
            default_headers.append(header, value);
        }

        Ok(Self {
            api_key: ApiKeyAuth::new(&config),
            config,
            default_headers,
            transport,
            token_provider,
            interceptor,
            policies,
        })
    }

    pub(crate) fn config(&self) -> &DocumentLibraryConfig {
        &self.config
    }

    /// Builds, prepares and sends one call.
    ///
    /// The returned response has only its headers read. Cancelling the
    /// token at any point ends the call with
    /// [`DocumentLibraryError::Cancelled`].
    pub(crate) async fn execute(
        &self,
        operation: Operation,
        builder: RequestBuilder,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpResponse> {
        let cancellation = options.cancellation_token();
        if cancellation.is_cancelled() {
            return Err(DocumentLibraryError::Cancelled);
        }

        let request = self.prepare(operation, builder, options).await?;
        let span = debug_span!(
            "document_library.request",
            operation = operation.name(),
            method = %request.method,
            path = request.url.path(),
        );

        let dispatch = async {
            debug!("Sending request");
            let send = self.send_thunk(request, cancellation.clone());
            let response = match self.policies.get(operation) {
                Some(policy) => {
                    let context = PolicyContext::new(operation, cancellation.clone());
                    policy.execute(&context, send).await
                }
                None => send.send().await,
            }?;
            debug!(status = response.status.as_u16(), "Received response");
            Ok::<_, DocumentLibraryError>(response)
        }
        .instrument(span);

        tokio::select! {
            biased;
            () = cancellation.cancelled() => {
                debug!(operation = operation.name(), "Request cancelled");
                Err(DocumentLibraryError::Cancelled)
            }
            result = dispatch => result,
        }
    }

    async fn prepare(
        &self,
        operation: Operation,
        builder: RequestBuilder,
        options: &RequestOptions,
    ) -> DocumentLibraryResult<HttpRequest> {
        let mut request = builder
            .query("tenantId", options.tenant_id)
            .query(
                &self.config.api_version_parameter,
                Some(&self.config.api_version),
            )
            .build(&self.config.base_url)?;

        for (name, value) in &self.default_headers {
            request.headers.append(name.clone(), value.clone());
        }
        self.api_key.apply(&mut request.headers)?;

        if let Some(interceptor) = &self.interceptor {
            interceptor.intercept(operation, &mut request).await?;
        }

        Ok(request)
    }

    /// Each invocation sends a fresh copy of `request`, asking the token
    /// provider for a bearer token first.
    fn send_thunk(&self, request: HttpRequest, cancellation: CancellationToken) -> SendThunk {
        let transport = Arc::clone(&self.transport);
        let token_provider = self.token_provider.clone();

        SendThunk::new(move || {
            let transport = Arc::clone(&transport);
            let token_provider = token_provider.clone();
            let cancellation = cancellation.clone();
            let mut request = request.clone();

            Box::pin(async move {
                // A header set by the interceptor wins over the provider.
                if let Some(provider) = token_provider {
                    if !request.headers.contains_key(AUTHORIZATION) {
                        let token = provider.get_token(&cancellation).await?;
                        request.headers.insert(AUTHORIZATION, token.header_value()?);
                    }
                }
                transport.send(request).await
            })
        })
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .field("policies", &self.policies)
            .field("has_token_provider", &self.token_provider.is_some())
            .field("has_interceptor", &self.interceptor.is_some())
            .finish_non_exhaustive()
    }
}
