//! Error types for the Yandex.Money API.
//!
//! Two layers are kept apart. [`ApiError::Format`], [`ApiError::Token`] and
//! [`ApiError::Scope`] come from the HTTP status code and carry no payload.
//! [`ApiError::Payment`] comes from a `"refused"` status inside an otherwise
//! successful response and carries the provider's error code.

use std::fmt;

use crate::codes::{self, ErrorCode};

/// Base error type for API failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP 400: the request was malformed.
    #[error("malformed request: check the request parameters (HTTP 400)")]
    Format,

    /// HTTP 401: the access token is missing, invalid, or expired.
    #[error("invalid or expired access token (HTTP 401)")]
    Token,

    /// HTTP 403: the token lacks the scope required for the operation.
    #[error("insufficient token scope for the requested operation (HTTP 403)")]
    Scope,

    /// The provider refused the operation.
    #[error("{0}")]
    Payment(#[from] PaymentError),
}

impl ApiError {
    /// Maps a status code to its typed error, if it has one.
    #[must_use]
    pub const fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::Format),
            401 => Some(Self::Token),
            403 => Some(Self::Scope),
            _ => None,
        }
    }
}

/// A refusal reported by the provider in the response body.
///
/// Displays as the explanation for its code, or as
/// [`FALLBACK_MESSAGE`](codes::FALLBACK_MESSAGE) when the code is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentError {
    /// The raw `error` value from the response.
    pub code: String,
}

impl PaymentError {
    /// Creates a payment error from a raw provider code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Returns the parsed code, or `None` if it is not in the table.
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::parse(&self.code)
    }

    /// Returns the human-readable message for this refusal.
    #[must_use]
    pub fn message(&self) -> &'static str {
        codes::describe(&self.code)
    }
}

impl From<ErrorCode> for PaymentError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code.as_str())
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for PaymentError {}

/// Errors from dynamic field access on [`ApiResponse`](crate::ApiResponse).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The name is not one of the documented response fields.
    #[error("'{0}' is not a known response field")]
    Unknown(String),

    /// The field is documented but was not present in this response.
    #[error("response field '{0}' is not present")]
    Absent(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::FALLBACK_MESSAGE;

    #[test]
    fn status_codes_map_to_kinds() {
        assert!(matches!(ApiError::from_status(400), Some(ApiError::Format)));
        assert!(matches!(ApiError::from_status(401), Some(ApiError::Token)));
        assert!(matches!(ApiError::from_status(403), Some(ApiError::Scope)));
        assert!(ApiError::from_status(404).is_none());
        assert!(ApiError::from_status(500).is_none());
        assert!(ApiError::from_status(200).is_none());
    }

    #[test]
    fn payment_error_displays_table_message() {
        let err = PaymentError::new("illegal_params");
        assert_eq!(err.to_string(), ErrorCode::IllegalParams.description());
        assert_eq!(err.error_code(), Some(ErrorCode::IllegalParams));
    }

    #[test]
    fn payment_error_unknown_code_uses_fallback() {
        let err = PaymentError::new("brand_new_code");
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);
        assert_eq!(err.error_code(), None);
        assert_eq!(err.code, "brand_new_code");
    }

    #[test]
    fn api_error_wraps_payment_message_verbatim() {
        let err = ApiError::from(PaymentError::from(ErrorCode::NotEnoughFunds));
        assert_eq!(err.to_string(), ErrorCode::NotEnoughFunds.description());
    }
}
