//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use fortuna_cache::{Error as FetchError, FetchOptions, Fetcher};

use crate::api::{AuthApi, OrdersApi, PaymentsApi};
use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fortuna API client.
///
/// Provides typed access to the auth, order, and payment endpoints.
///
/// # Example
///
/// ```no_run
/// use fortuna_client::FortunaClient;
///
/// # async fn example() -> fortuna_client::Result<()> {
/// let client = FortunaClient::builder()
///     .base_url("https://api.example.com")
///     .build()?;
///
/// client.auth().send_code("user@example.com").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FortunaClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Bearer token attached to authenticated requests.
    ///
    /// Mutable because the token is issued by login and dropped by
    /// logout over the client's lifetime. Never held across an await.
    pub(crate) auth_token: RwLock<Option<String>>,
}

impl FortunaClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Replace the bearer token used for authenticated requests.
    pub fn set_auth_token(&self, token: Option<String>) {
        *self.inner.auth_token.write() = token;
    }

    /// Get the current bearer token, if one is set.
    pub fn auth_token(&self) -> Option<String> {
        self.inner.auth_token.read().clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the orders API.
    pub fn orders(&self) -> OrdersApi {
        OrdersApi::new(self.clone())
    }

    /// Access the payments API.
    pub fn payments(&self) -> PaymentsApi {
        PaymentsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("api/{}", path))
            .map_err(Error::from)
    }

    /// Start a request with timeout and bearer token applied.
    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);
        if let Some(token) = self.auth_token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request, discarding the response body.
    pub(crate) async fn post_empty<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self.request(Method::POST, url).json(body).send().await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(())
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        // Try to parse an error response body
        match response.json::<ErrorResponse>().await {
            Ok(err) => {
                if status == 401 {
                    Error::Auth(err.message)
                } else {
                    Error::Api {
                        status,
                        message: err.message,
                    }
                }
            }
            Err(_) => Error::Api {
                status,
                message: format!("HTTP {}", status),
            },
        }
    }
}

/// Raw JSON fetch surface, so reads can go through the caching layer.
///
/// A non-success status maps to [`fortuna_cache::Error::Status`]; an
/// empty success body is `Value::Null` (an absent profile is a payload
/// shape, not an error).
#[async_trait]
impl Fetcher for FortunaClient {
    async fn fetch(
        &self,
        resource: &str,
        options: &FetchOptions,
    ) -> fortuna_cache::Result<serde_json::Value> {
        let url = self
            .url(resource)
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let method = Method::from_bytes(options.method.as_bytes())
            .map_err(|_| FetchError::Network(format!("invalid method: {}", options.method)))?;

        let mut builder = self.request(method, url);
        if let Some(query) = &options.query {
            builder = builder.query(query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        debug!(resource = %resource, method = %options.method, "raw fetch");
        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Builder for creating a [`FortunaClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_token: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set an initial authentication token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<FortunaClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("fortuna-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(FortunaClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                auth_token: RwLock::new(self.auth_token),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
