//! HTTP client wrapper

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::endpoint::validate_url;
use crate::error::{HttpError, NetworkError, Operation, RequestError};
use crate::request::{build_request, HttpOptions};
use crate::response::{decode, decode_into, Response};

/// Generic JSON requester
///
/// Each method is a single round trip: validate the URL, build the request,
/// send it, read the whole body. Cancelling `ctx` aborts the round trip at
/// any point. Non-2xx statuses are returned as-is, not as errors.
pub trait Requester: Send + Sync {
    /// GET `options.url`, decoding the body into `destination` when one is given
    fn get<R, B>(
        &self,
        ctx: &CancellationToken,
        destination: Option<&mut R>,
        options: HttpOptions<B>,
    ) -> impl Future<Output = Response<u16>> + Send
    where
        R: DeserializeOwned + Send,
        B: Serialize + Send + Sync;

    /// POST `options.body` as JSON, returning the status code and raw body
    fn post<B>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> impl Future<Output = Response<(u16, Vec<u8>)>> + Send
    where
        B: Serialize + Send + Sync;

    /// PUT `options.body` as JSON, returning the status code and raw body
    fn put<B>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> impl Future<Output = Response<(u16, Vec<u8>)>> + Send
    where
        B: Serialize + Send + Sync;

    /// DELETE, sending `options.body` as JSON if present, returning the status code and raw body
    fn delete<B>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> impl Future<Output = Response<(u16, Vec<u8>)>> + Send
    where
        B: Serialize + Send + Sync;
}

/// HTTP client wrapper
///
/// Cloning is cheap and every clone shares the same connection pool, so build
/// one and pass it around instead of creating a client per request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Create a new HTTP client builder
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create an HttpClient from a reqwest::Client
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self { inner: client }
    }

    /// GET request, decoding the JSON body into `destination` when one is given
    ///
    /// Returns the status code. If decoding fails the error still carries the
    /// status code, see [`RequestError::status`].
    #[instrument(skip_all, fields(url = %options.url))]
    pub async fn get<R, B>(
        &self,
        ctx: &CancellationToken,
        destination: Option<&mut R>,
        options: HttpOptions<B>,
    ) -> Response<u16>
    where
        R: DeserializeOwned,
        B: Serialize,
    {
        let (status, body) = self.round_trip(ctx, Operation::Get, &options).await?;

        if let Some(destination) = destination {
            decode_into(&body, destination)
                .map_err(|e| RequestError::new(Operation::Get, status, e))?;
        }

        Ok(status)
    }

    /// GET request, returning the status code and the body decoded as R
    #[instrument(skip_all, fields(url = %options.url))]
    pub async fn fetch<R, B>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> Response<(u16, R)>
    where
        R: DeserializeOwned,
        B: Serialize,
    {
        let (status, body) = self.round_trip(ctx, Operation::Get, &options).await?;
        let value = decode(&body).map_err(|e| RequestError::new(Operation::Get, status, e))?;
        Ok((status, value))
    }

    /// POST request with an optional JSON body, returning the status code and raw body
    #[instrument(skip_all, fields(url = %options.url))]
    pub async fn post<B: Serialize>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> Response<(u16, Vec<u8>)> {
        self.round_trip(ctx, Operation::Post, &options).await
    }

    /// PUT request with an optional JSON body, returning the status code and raw body
    #[instrument(skip_all, fields(url = %options.url))]
    pub async fn put<B: Serialize>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> Response<(u16, Vec<u8>)> {
        self.round_trip(ctx, Operation::Put, &options).await
    }

    /// DELETE request with an optional JSON body, returning the status code and raw body
    #[instrument(skip_all, fields(url = %options.url))]
    pub async fn delete<B: Serialize>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> Response<(u16, Vec<u8>)> {
        self.round_trip(ctx, Operation::Delete, &options).await
    }

    async fn round_trip<B: Serialize>(
        &self,
        ctx: &CancellationToken,
        operation: Operation,
        options: &HttpOptions<B>,
    ) -> Response<(u16, Vec<u8>)> {
        let url = validate_url(&options.url).map_err(|e| RequestError::new(operation, 0, e))?;
        let request = build_request(&self.inner, operation, url, options)
            .map_err(|e| RequestError::new(operation, 0, e))?;

        self.execute(ctx, request).await.map_err(|(status, err)| {
            tracing::warn!("Http {} error: {}", operation, err);
            RequestError::new(operation, status, err)
        })
    }

    /// Send `request` and read the whole body
    ///
    /// The status code is returned with read failures since it is already known.
    async fn execute(
        &self,
        ctx: &CancellationToken,
        request: reqwest::Request,
    ) -> Result<(u16, Vec<u8>), (u16, HttpError)> {
        tracing::debug!("Sending {} {}", request.method(), request.url());

        let response = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err((0, HttpError::Network(NetworkError::Cancelled))),
            result = self.inner.execute(request) => {
                result.map_err(|e| (0, HttpError::Network(e.into())))?
            }
        };
        let status = response.status().as_u16();

        let body = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err((status, HttpError::Read(NetworkError::Cancelled))),
            result = response.bytes() => result.map_err(|e| (status, HttpError::Read(e.into())))?,
        };

        tracing::debug!("Received {} with {} byte body", status, body.len());
        Ok((status, body.to_vec()))
    }
}

impl Requester for HttpClient {
    fn get<R, B>(
        &self,
        ctx: &CancellationToken,
        destination: Option<&mut R>,
        options: HttpOptions<B>,
    ) -> impl Future<Output = Response<u16>> + Send
    where
        R: DeserializeOwned + Send,
        B: Serialize + Send + Sync,
    {
        HttpClient::get(self, ctx, destination, options)
    }

    fn post<B>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> impl Future<Output = Response<(u16, Vec<u8>)>> + Send
    where
        B: Serialize + Send + Sync,
    {
        HttpClient::post(self, ctx, options)
    }

    fn put<B>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> impl Future<Output = Response<(u16, Vec<u8>)>> + Send
    where
        B: Serialize + Send + Sync,
    {
        HttpClient::put(self, ctx, options)
    }

    fn delete<B>(
        &self,
        ctx: &CancellationToken,
        options: HttpOptions<B>,
    ) -> impl Future<Output = Response<(u16, Vec<u8>)>> + Send
    where
        B: Serialize + Send + Sync,
    {
        HttpClient::delete(self, ctx, options)
    }
}

/// HTTP client builder for configuring proxy, TLS and timeout settings
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    accept_invalid_certs: bool,
    proxy: Option<ProxyConfig>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

#[derive(Debug)]
struct ProxyConfig {
    url: url::Url,
    matcher: Option<regex::Regex>,
}

impl HttpClientBuilder {
    /// Start from settings loaded out of a config file
    pub fn from_config(config: &ClientConfig) -> Result<Self, HttpError> {
        let mut builder = Self::default().danger_accept_invalid_certs(config.accept_invalid_certs);

        if let Some(url) = config.proxy.clone() {
            builder = match &config.proxy_matcher {
                Some(pattern) => builder.proxy_with_matcher(url, pattern)?,
                None => builder.proxy(url),
            };
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(builder)
    }

    /// Accept invalid TLS certificates
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set a proxy URL
    pub fn proxy(mut self, url: url::Url) -> Self {
        self.proxy = Some(ProxyConfig { url, matcher: None });
        self
    }

    /// Set a proxy URL with a host pattern matcher
    pub fn proxy_with_matcher(mut self, url: url::Url, pattern: &str) -> Result<Self, HttpError> {
        let matcher = regex::Regex::new(pattern)
            .map_err(|e| HttpError::Proxy(format!("Invalid proxy pattern: {}", e)))?;
        self.proxy = Some(ProxyConfig {
            url,
            matcher: Some(matcher),
        });
        Ok(self)
    }

    /// Default timeout for every request, `HttpOptions::timeout` takes precedence
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the `User-Agent` header sent with every request
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the HTTP client
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(proxy_config) = self.proxy {
            let proxy_url = proxy_config.url.to_string();
            let proxy = if let Some(matcher) = proxy_config.matcher {
                reqwest::Proxy::custom(move |url| {
                    if matcher.is_match(url.host_str().unwrap_or("")) {
                        Some(proxy_url.clone())
                    } else {
                        None
                    }
                })
            } else {
                reqwest::Proxy::all(&proxy_url).map_err(|e| HttpError::Proxy(e.to_string()))?
            };
            builder = builder.proxy(proxy);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(HttpClient { inner: client })
    }
}
