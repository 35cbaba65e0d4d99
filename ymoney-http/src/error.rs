//! Error types for the HTTP clients.

use http::StatusCode;
use http::header::InvalidHeaderValue;
use ymoney::{ApiError, PaymentError};

/// Errors that can occur while talking to the Yandex.Money API.
///
/// [`ClientError::Api`] carries the API-level taxonomy (status-code errors
/// and refusals). The remaining variants are transport or usage failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Status-code mapped error or provider refusal.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status without a dedicated [`ApiError`] kind.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },

    /// JSON deserialization error.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to read response body.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// A token or other value could not be used as a header.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    /// An external payment client was built with neither a client id nor an instance id.
    #[error("external payment requires an instance_id or a client_id")]
    MissingCredentials,

    /// Instance id registration previously returned a non-success status.
    #[error("instance id is unavailable for client_id '{client_id}'")]
    InstanceIdUnavailable {
        /// The client id whose resolution failed.
        client_id: String,
    },
}

impl From<PaymentError> for ClientError {
    fn from(value: PaymentError) -> Self {
        Self::Api(ApiError::Payment(value))
    }
}

impl ClientError {
    /// Returns the API-level error, if this is one.
    #[must_use]
    pub const fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the provider refusal, if this is one.
    #[must_use]
    pub const fn as_payment(&self) -> Option<&PaymentError> {
        match self {
            Self::Api(ApiError::Payment(err)) => Some(err),
            _ => None,
        }
    }
}
