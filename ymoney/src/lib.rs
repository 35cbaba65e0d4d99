#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the Yandex.Money API.
//!
//! This crate holds the transport-independent parts of the SDK: the error
//! taxonomy, the provider's error-code table, the typed response envelope and
//! form parameters. The HTTP clients live in `ymoney-http`.
//!
//! # Modules
//!
//! - [`codes`] - Provider error codes and their explanations
//! - [`error`] - Status-code and refusal error types
//! - [`params`] - Form-encoded request parameters
//! - [`response`] - Typed response envelope

pub mod codes;
pub mod error;
pub mod params;
pub mod response;

pub use codes::ErrorCode;
pub use error::{ApiError, FieldError, PaymentError};
pub use params::Params;
pub use response::{ApiResponse, Status};
