//! Hosts, paths and header values used by the Yandex.Money API.

/// Primary API host.
pub const MONEY_URL: &str = "https://money.yandex.ru";

/// Secondary host serving the OAuth authorize and token endpoints.
pub const SP_MONEY_URL: &str = "https://sp-money.yandex.ru";

/// Client identification sent in the `User-Agent` header of every request.
pub const USER_AGENT: &str = "Yandex.Money.SDK/Rust";

/// Form body content type.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `grant_type` sent when exchanging an authorization code for a token.
pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";

/// Request paths, relative to the host root.
pub mod paths {
    /// Account status and balance.
    pub const ACCOUNT_INFO: &str = "/api/account-info";
    /// Auxiliary token with a reduced scope.
    pub const TOKEN_AUX: &str = "/api/token-aux";
    /// Operation history.
    pub const OPERATION_HISTORY: &str = "/api/operation-history";
    /// Details of a single operation.
    pub const OPERATION_DETAILS: &str = "/api/operation-details";
    /// Payment request (wallet).
    pub const REQUEST_PAYMENT: &str = "/api/request-payment";
    /// Payment confirmation (wallet).
    pub const PROCESS_PAYMENT: &str = "/api/process-payment";
    /// Accept an incoming protected transfer.
    pub const INCOMING_TRANSFER_ACCEPT: &str = "/api/incoming-transfer-accept";
    /// Reject an incoming protected transfer.
    pub const INCOMING_TRANSFER_REJECT: &str = "/api/incoming-transfer-reject";
    /// Token revocation.
    pub const REVOKE: &str = "/api/revoke";
    /// Instance id registration for external payments.
    pub const INSTANCE_ID: &str = "/api/instance-id";
    /// Payment request (external).
    pub const REQUEST_EXTERNAL_PAYMENT: &str = "/api/request-external-payment";
    /// Payment confirmation (external).
    pub const PROCESS_EXTERNAL_PAYMENT: &str = "/api/process-external-payment";
    /// OAuth authorization page, on the secondary host.
    pub const OAUTH_AUTHORIZE: &str = "/oauth/authorize";
    /// OAuth token exchange, on the secondary host.
    pub const OAUTH_TOKEN: &str = "/oauth/token";
}
