//! Shared request execution for every API client.
//!
//! [`ApiClient`] builds a request from a path, headers and a form body, always
//! injects the client identification header, POSTs it, and maps the response
//! status before any body is interpreted:
//!
//! - `400` → [`ApiError::Format`]
//! - `401` → [`ApiError::Token`]
//! - `403` → [`ApiError::Scope`]
//! - other non-2xx → [`ClientError::HttpStatus`]
//! - 2xx → JSON body decoded into [`ApiResponse`]
//!
//! Refusals inside a successful body are not inspected here; see
//! [`ExternalPayment`](crate::external::ExternalPayment).

use std::fmt::Display;
use std::time::Duration;

use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Client;
use url::Url;
use ymoney::{ApiError, ApiResponse, Params};

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::constants::{FORM_CONTENT_TYPE, MONEY_URL, SP_MONEY_URL, USER_AGENT, paths};
use crate::error::ClientError;

/// Base URLs of the primary API host and the OAuth host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Host serving `/api/*`. A path prefix, if any, is kept.
    pub money_url: Url,
    /// Host serving `/oauth/*`.
    pub sp_money_url: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            money_url: Url::parse(MONEY_URL).expect("valid primary host"),
            sp_money_url: Url::parse(SP_MONEY_URL).expect("valid OAuth host"),
        }
    }
}

impl Endpoints {
    /// Parses custom hosts, e.g. a sandbox or a local mock server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`] if either URL is invalid.
    pub fn try_new(money_url: &str, sp_money_url: &str) -> Result<Self, ClientError> {
        let money_url = Url::parse(money_url).map_err(|e| ClientError::UrlParse {
            context: "Failed to parse API host",
            source: e,
        })?;
        let sp_money_url = Url::parse(sp_money_url).map_err(|e| ClientError::UrlParse {
            context: "Failed to parse OAuth host",
            source: e,
        })?;
        Ok(Self {
            money_url,
            sp_money_url,
        })
    }

    /// Returns the full URL of an `/api/*` path.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`] if the path cannot be joined.
    pub fn api_url(&self, path: &str) -> Result<Url, ClientError> {
        as_directory(&self.money_url)
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::UrlParse {
                context: "Failed to construct API URL",
                source: e,
            })
    }

    /// Returns the full URL of an `/oauth/*` path.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`] if the path cannot be joined.
    pub fn oauth_url(&self, path: &str) -> Result<Url, ClientError> {
        as_directory(&self.sp_money_url)
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::UrlParse {
                context: "Failed to construct OAuth URL",
                source: e,
            })
    }

    /// Builds the OAuth authorization page URL the user must be sent to.
    ///
    /// Scope names are joined with spaces. No request is made.
    #[must_use]
    pub fn authorize_url<S: AsRef<str>>(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scope: &[S],
    ) -> Url {
        let mut url = as_directory(&self.sp_money_url);
        let path = format!(
            "{}{}",
            url.path(),
            paths::OAUTH_AUTHORIZE.trim_start_matches('/')
        );
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &join_scope(scope));
        url
    }
}

/// Returns `base` with a trailing `/` so relative joins keep its path prefix.
fn as_directory(base: &Url) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Joins scope names into the space-separated form the API expects.
pub(crate) fn join_scope<S: AsRef<str>>(scope: &[S]) -> String {
    scope
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Configuration for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API and OAuth hosts.
    pub endpoints: Endpoints,

    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,

    /// Value of the `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Optional pre-configured reqwest client.
    pub http_client: Option<Client>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout: None,
            user_agent: USER_AGENT.to_owned(),
            http_client: None,
        }
    }
}

impl ApiConfig {
    /// Sets the API and OAuth hosts.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the client identification header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

/// Executes API requests and maps status codes to errors.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
    user_agent: HeaderValue,
    timeout: Option<Duration>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(ApiConfig::default()).expect("default configuration is valid")
    }
}

impl ApiClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidHeader`] if the user agent is not a valid header value.
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let user_agent = HeaderValue::from_str(&config.user_agent)?;
        Ok(Self {
            client: config.http_client.unwrap_or_default(),
            endpoints: config.endpoints,
            user_agent,
            timeout: config.timeout,
        })
    }

    /// Returns the configured hosts.
    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// POSTs `body` to `path` on the primary host.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] for 400, 401 and 403, and another
    /// [`ClientError`] variant for transport or decoding failures.
    pub async fn send_request(
        &self,
        path: &'static str,
        headers: HeaderMap,
        body: &Params,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.endpoints.api_url(path)?;
        self.post_form(url, path, headers, body).await
    }

    /// POSTs a form body to an absolute URL and decodes the response.
    ///
    /// `context` names the call in tracing and error messages (e.g. `"/oauth/token"`).
    ///
    /// # Errors
    ///
    /// See [`send_request`](Self::send_request).
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "ymoney.api.post",
            skip_all,
            fields(
                path = context,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn post_form(
        &self,
        url: Url,
        context: &'static str,
        mut headers: HeaderMap,
        body: &Params,
    ) -> Result<ApiResponse, ClientError> {
        headers.insert(http::header::USER_AGENT, self.user_agent.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));

        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(body.iter())
            .finish();

        let mut req = self.client.post(url).headers(headers).body(encoded);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| ClientError::Http { context, source: e })?;

        let status = http_response.status();
        let result = if let Some(err) = ApiError::from_status(status.as_u16()) {
            Err(ClientError::Api(err))
        } else if status.is_success() {
            let bytes = http_response
                .bytes()
                .await
                .map_err(|e| ClientError::ResponseBodyRead { context, source: e })?;
            decode_envelope(&bytes)
                .map_err(|e| ClientError::JsonDeserialization { context, source: e })
        } else {
            let body = http_response
                .text()
                .await
                .map_err(|e| ClientError::ResponseBodyRead { context, source: e })?;
            Err(ClientError::HttpStatus {
                context,
                status,
                body,
            })
        };

        record_result_on_span(&result);

        result
    }
}

/// Decodes a successful body. Some endpoints (e.g. `/api/revoke`) answer with
/// an empty body, which decodes to an empty envelope.
fn decode_envelope(bytes: &[u8]) -> Result<ApiResponse, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiResponse::default());
    }
    serde_json::from_slice(bytes)
}

/// Builds the `Authorization: Bearer <token>` header map.
///
/// # Errors
///
/// Returns [`ClientError::InvalidHeader`] if the token contains invalid header characters.
pub fn bearer_headers(token: &str) -> Result<HeaderMap, ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
pub(crate) fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to Yandex.Money API failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
pub(crate) fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}

/// Client pointed at a mock server for both hosts.
#[cfg(test)]
pub(crate) fn mock_api(uri: &str) -> ApiClient {
    let endpoints = Endpoints::try_new(uri, uri).unwrap();
    ApiClient::new(ApiConfig::default().with_endpoints(endpoints)).unwrap()
}
