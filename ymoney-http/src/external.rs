//! Anonymous payments on behalf of a registered merchant application.
//!
//! An [`ExternalPayment`] client is identified by an instance id. The id is
//! either supplied up front (eagerly or through a deferred resolver) or
//! obtained from `/api/instance-id` using the application's client id and
//! memoized in an [`InstanceIdCache`].
//!
//! Unlike [`Wallet`](crate::wallet::Wallet), every response with
//! `status: "refused"` is turned into [`ApiError::Payment`](ymoney::ApiError::Payment).

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use http::HeaderMap;
use ymoney::{ApiResponse, Params};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::cache::{CachedInstanceId, InstanceIdCache};
use crate::client::ApiClient;
use crate::constants::paths;
use crate::error::ClientError;

type Resolver = Box<dyn Fn() -> String + Send>;

/// A caller-supplied instance id.
pub enum InstanceIdSource {
    /// A known instance id.
    Value(String),
    /// Produces the instance id on first use. Invoked until it first returns.
    Resolver(Resolver),
}

impl InstanceIdSource {
    /// Wraps a zero-argument resolver.
    pub fn deferred(resolve: impl Fn() -> String + Send + 'static) -> Self {
        Self::Resolver(Box::new(resolve))
    }
}

impl fmt::Debug for InstanceIdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(id) => f.debug_tuple("Value").field(id).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<String> for InstanceIdSource {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for InstanceIdSource {
    fn from(value: &str) -> Self {
        Self::Value(value.to_owned())
    }
}

/// Client for merchant-initiated payments.
///
/// # Example
///
/// ```no_run
/// use ymoney::Params;
/// use ymoney_http::ExternalPayment;
///
/// # async fn run() -> Result<(), ymoney_http::ClientError> {
/// let payment = ExternalPayment::from_client_id("CLIENT_ID");
/// let request = payment
///     .request(
///         &Params::new()
///             .with("pattern_id", "p2p")
///             .with("to", "410011161616877")
///             .with("amount_due", "10.00"),
///     )
///     .await?;
/// println!("request_id: {:?}", request.request_id);
/// # Ok(())
/// # }
/// ```
pub struct ExternalPayment {
    api: ApiClient,
    client_id: Option<String>,
    instance_id: Option<Mutex<InstanceIdSource>>,
    cache: Arc<InstanceIdCache>,
}

impl fmt::Debug for ExternalPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalPayment")
            .field("api", &self.api)
            .field("client_id", &self.client_id)
            .field("has_instance_id", &self.instance_id.is_some())
            .finish_non_exhaustive()
    }
}

impl ExternalPayment {
    /// Creates a client from a client id, an instance id, or both.
    ///
    /// An explicit instance id takes precedence over resolution by client id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingCredentials`] if both are `None`.
    pub fn try_new(
        client_id: Option<String>,
        instance_id: Option<InstanceIdSource>,
    ) -> Result<Self, ClientError> {
        if client_id.is_none() && instance_id.is_none() {
            return Err(ClientError::MissingCredentials);
        }
        Ok(Self {
            api: ApiClient::default(),
            client_id,
            instance_id: instance_id.map(Mutex::new),
            cache: InstanceIdCache::global(),
        })
    }

    /// Creates a client that resolves its instance id from `client_id`.
    #[must_use]
    pub fn from_client_id(client_id: impl Into<String>) -> Self {
        Self {
            api: ApiClient::default(),
            client_id: Some(client_id.into()),
            instance_id: None,
            cache: InstanceIdCache::global(),
        }
    }

    /// Creates a client with a known instance id.
    #[must_use]
    pub fn from_instance_id(instance_id: impl Into<String>) -> Self {
        Self {
            api: ApiClient::default(),
            client_id: None,
            instance_id: Some(Mutex::new(InstanceIdSource::Value(instance_id.into()))),
            cache: InstanceIdCache::global(),
        }
    }

    /// Creates a client whose instance id is produced by `resolve` on first use.
    #[must_use]
    pub fn from_instance_id_resolver(resolve: impl Fn() -> String + Send + 'static) -> Self {
        Self {
            api: ApiClient::default(),
            client_id: None,
            instance_id: Some(Mutex::new(InstanceIdSource::deferred(resolve))),
            cache: InstanceIdCache::global(),
        }
    }

    /// Uses a configured [`ApiClient`].
    #[must_use]
    pub fn with_api_client(mut self, api: ApiClient) -> Self {
        self.api = api;
        self
    }

    /// Uses `cache` instead of the process-wide cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<InstanceIdCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the client id, if one was given.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Returns the cache this client reads and fills.
    #[must_use]
    pub const fn cache(&self) -> &Arc<InstanceIdCache> {
        &self.cache
    }

    /// Clears the process-wide instance id cache.
    pub async fn zero_cache() {
        InstanceIdCache::global().clear().await;
    }

    /// Returns the instance id, resolving it on first use.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if `/api/instance-id` fails or refuses the client id
    /// - [`ClientError::InstanceIdUnavailable`] if the provider answered with
    ///   another non-success status, now or on an earlier call
    pub async fn instance_id(&self) -> Result<String, ClientError> {
        if let Some(slot) = &self.instance_id {
            return Ok(resolve_explicit(slot));
        }
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(ClientError::MissingCredentials)?;

        let entry = match self.cache.get(client_id).await {
            Some(entry) => entry,
            None => {
                #[cfg(feature = "telemetry")]
                tracing::info!(client_id, "ymoney.external.instance_id_cache_miss");

                let entry = self.fetch_instance_id(client_id).await?;
                self.cache.insert(client_id, entry.clone()).await;
                entry
            }
        };

        match entry {
            CachedInstanceId::Resolved(id) => Ok(id),
            CachedInstanceId::Unavailable => Err(ClientError::InstanceIdUnavailable {
                client_id: client_id.to_owned(),
            }),
        }
    }

    async fn fetch_instance_id(&self, client_id: &str) -> Result<CachedInstanceId, ClientError> {
        let body = Params::new().with("client_id", client_id);
        let resp = self.send(paths::INSTANCE_ID, &body).await?;
        let success = resp.is_success();
        Ok(match resp.instance_id {
            Some(id) if success => CachedInstanceId::Resolved(id),
            _ => CachedInstanceId::Unavailable,
        })
    }

    /// Creates a payment request. `instance_id` is added to a copy of `options`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors, refusals, or transport failures.
    pub async fn request(&self, options: &Params) -> Result<ApiResponse, ClientError> {
        let body = self.with_instance_id(options).await?;
        self.send(paths::REQUEST_EXTERNAL_PAYMENT, &body).await
    }

    /// Confirms a payment request. `instance_id` is added to a copy of `options`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors, refusals, or transport failures.
    pub async fn process(&self, options: &Params) -> Result<ApiResponse, ClientError> {
        let body = self.with_instance_id(options).await?;
        self.send(paths::PROCESS_EXTERNAL_PAYMENT, &body).await
    }

    async fn with_instance_id(&self, options: &Params) -> Result<Params, ClientError> {
        let mut body = options.clone();
        body.insert("instance_id", self.instance_id().await?);
        Ok(body)
    }

    /// Sends a request and turns a `"refused"` body into an error.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "ymoney.external.request", skip_all, fields(path = path))
    )]
    async fn send(&self, path: &'static str, body: &Params) -> Result<ApiResponse, ClientError> {
        let resp = self.api.send_request(path, HeaderMap::new(), body).await?;
        if let Some(refusal) = resp.refusal() {
            #[cfg(feature = "telemetry")]
            tracing::warn!(code = %refusal.code, "ymoney.external.refused");
            return Err(refusal.into());
        }
        Ok(resp)
    }
}

/// Returns the explicit instance id, running a deferred resolver once.
///
/// The resolver stays in the slot until it returns, so one that panics is
/// retried on the next call.
fn resolve_explicit(slot: &Mutex<InstanceIdSource>) -> String {
    let mut source = slot.lock().unwrap_or_else(PoisonError::into_inner);
    let id = match &*source {
        InstanceIdSource::Value(id) => return id.clone(),
        InstanceIdSource::Resolver(resolve) => resolve(),
    };
    *source = InstanceIdSource::Value(id.clone());
    id
}
