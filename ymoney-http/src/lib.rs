#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP clients for the Yandex.Money API.
//!
//! Two client roles are provided:
//!
//! - **[`Wallet`]** - authenticated calls on behalf of a token-holding user,
//!   plus the OAuth helpers used to obtain and revoke tokens
//! - **[`ExternalPayment`]** - anonymous merchant payments identified by an
//!   application instance id, memoized in an [`InstanceIdCache`]
//!
//! Both build on [`ApiClient`], which POSTs form bodies and maps HTTP status
//! codes to the [`ymoney::ApiError`] taxonomy. Only [`ExternalPayment`] turns a
//! `"refused"` status into an error; wallet callers inspect the status
//! themselves.
//!
//! # Modules
//!
//! - [`cache`] - Instance id cache shared across external payment clients
//! - [`client`] - Request execution, configuration and hosts
//! - [`constants`] - Hosts, paths and header values
//! - [`error`] - Client error types
//! - [`external`] - Anonymous external payment client
//! - [`wallet`] - Authenticated wallet client
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for requests and cache misses

pub mod cache;
pub mod client;
pub mod constants;
pub mod error;
pub mod external;
pub mod wallet;

pub use cache::{CachedInstanceId, InstanceIdCache};
pub use client::{ApiClient, ApiConfig, Endpoints};
pub use error::ClientError;
pub use external::{ExternalPayment, InstanceIdSource};
pub use wallet::Wallet;
