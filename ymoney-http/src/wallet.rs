//! Authenticated wallet client.
//!
//! Every [`Wallet`] call sends `Authorization: Bearer <access_token>`. A
//! `"refused"` status is returned as a normal [`ApiResponse`]; inspect
//! [`ApiResponse::status`] and [`ApiResponse::error`] yourself.
//!
//! The OAuth helpers ([`Wallet::build_obtain_token_url`],
//! [`Wallet::get_access_token`], [`Wallet::revoke_token`]) do not need an
//! access token and are associated functions.

use std::fmt;

use http::HeaderMap;
use url::Url;
use ymoney::{ApiResponse, Params};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::client::{ApiClient, Endpoints, bearer_headers, join_scope};
use crate::constants::{GRANT_TYPE_AUTHORIZATION_CODE, paths};
use crate::error::ClientError;

/// Client acting on behalf of a token-holding user.
///
/// # Example
///
/// ```no_run
/// use ymoney::Params;
/// use ymoney_http::Wallet;
///
/// # async fn run() -> Result<(), ymoney_http::ClientError> {
/// let wallet = Wallet::new("ACCESS_TOKEN");
/// let info = wallet.account_info().await?;
/// println!("balance: {:?}", info.balance);
///
/// let request = wallet
///     .request_payment(
///         &Params::new()
///             .with("pattern_id", "p2p")
///             .with("to", "410011161616877")
///             .with("amount_due", "0.02"),
///     )
///     .await?;
/// if request.is_refused() {
///     println!("refused: {:?}", request.error);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Wallet {
    api: ApiClient,
    access_token: String,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Creates a wallet client against the production hosts.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_api_client(ApiClient::default(), access_token)
    }

    /// Creates a wallet client using a configured [`ApiClient`].
    #[must_use]
    pub fn with_api_client(api: ApiClient, access_token: impl Into<String>) -> Self {
        Self {
            api,
            access_token: access_token.into(),
        }
    }

    /// Returns the underlying request executor.
    #[must_use]
    pub const fn api_client(&self) -> &ApiClient {
        &self.api
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "ymoney.wallet.request", skip_all, fields(path = path))
    )]
    async fn send_authenticated(
        &self,
        path: &'static str,
        body: &Params,
    ) -> Result<ApiResponse, ClientError> {
        let headers = bearer_headers(&self.access_token)?;
        self.api.send_request(path, headers, body).await
    }

    /// Returns account status and balance.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    pub async fn account_info(&self) -> Result<ApiResponse, ClientError> {
        self.send_authenticated(paths::ACCOUNT_INFO, &Params::new())
            .await
    }

    /// Issues an auxiliary token restricted to `scope`.
    ///
    /// The token is in the `aux_token` extra field of the response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    pub async fn get_aux_token<S: AsRef<str>>(
        &self,
        scope: &[S],
    ) -> Result<ApiResponse, ClientError> {
        let body = Params::new().with("scope", join_scope(scope));
        self.send_authenticated(paths::TOKEN_AUX, &body).await
    }

    /// Returns a page of operation history filtered by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    pub async fn operation_history(&self, options: &Params) -> Result<ApiResponse, ClientError> {
        self.send_authenticated(paths::OPERATION_HISTORY, options)
            .await
    }

    /// Returns details of a single operation.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    pub async fn operation_details(&self, operation_id: &str) -> Result<ApiResponse, ClientError> {
        let body = Params::new().with("operation_id", operation_id);
        self.send_authenticated(paths::OPERATION_DETAILS, &body)
            .await
    }

    /// Creates a payment request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    /// A refusal is returned as `Ok`.
    pub async fn request_payment(&self, options: &Params) -> Result<ApiResponse, ClientError> {
        self.send_authenticated(paths::REQUEST_PAYMENT, options)
            .await
    }

    /// Confirms a payment created by [`request_payment`](Self::request_payment).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    /// A refusal is returned as `Ok`.
    pub async fn process_payment(&self, options: &Params) -> Result<ApiResponse, ClientError> {
        self.send_authenticated(paths::PROCESS_PAYMENT, options)
            .await
    }

    /// Accepts an incoming protected transfer.
    ///
    /// `protection_code` is omitted from the request when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    /// A refusal is returned as `Ok`.
    pub async fn incoming_transfer_accept(
        &self,
        operation_id: &str,
        protection_code: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let body = Params::new()
            .with("operation_id", operation_id)
            .with_opt("protection_code", protection_code);
        self.send_authenticated(paths::INCOMING_TRANSFER_ACCEPT, &body)
            .await
    }

    /// Rejects an incoming protected transfer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    pub async fn incoming_transfer_reject(
        &self,
        operation_id: &str,
    ) -> Result<ApiResponse, ClientError> {
        let body = Params::new().with("operation_id", operation_id);
        self.send_authenticated(paths::INCOMING_TRANSFER_REJECT, &body)
            .await
    }

    /// Builds the production OAuth authorization URL.
    ///
    /// Use [`Endpoints::authorize_url`] for other hosts.
    #[must_use]
    pub fn build_obtain_token_url<S: AsRef<str>>(
        client_id: &str,
        redirect_uri: &str,
        scope: &[S],
    ) -> Url {
        Endpoints::default().authorize_url(client_id, redirect_uri, scope)
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// Only status codes are mapped to errors. An OAuth failure arrives as a
    /// successful response whose `error` field is set; the token is in the
    /// `access_token` extra field.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "ymoney.wallet.get_access_token", skip_all, fields(client_id = client_id))
    )]
    pub async fn get_access_token(
        api: &ApiClient,
        client_id: &str,
        code: &str,
        redirect_uri: &str,
        client_secret: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let url = api.endpoints().oauth_url(paths::OAUTH_TOKEN)?;
        let body = Params::new()
            .with("code", code)
            .with("client_id", client_id)
            .with("grant_type", GRANT_TYPE_AUTHORIZATION_CODE)
            .with("redirect_uri", redirect_uri)
            .with_opt("client_secret", client_secret);
        api.post_form(url, paths::OAUTH_TOKEN, HeaderMap::new(), &body)
            .await
    }

    /// Revokes `token`, and with `revoke_all` every token issued to the same
    /// user and application.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on status-code errors or transport failures.
    pub async fn revoke_token(
        api: &ApiClient,
        token: &str,
        revoke_all: bool,
    ) -> Result<ApiResponse, ClientError> {
        let headers = bearer_headers(token)?;
        let body = Params::new().with("revoke-all", revoke_all);
        api.send_request(paths::REVOKE, headers, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock_api;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use ymoney::{ApiError, Status};

    const ACCESS_TOKEN: &str = "410012345678901.ABCDEF";

    async fn mount(mock_server: &MockServer, endpoint: &str, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(header("Authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(mock_server)
            .await;
    }

    fn wallet(mock_server: &MockServer) -> Wallet {
        Wallet::with_api_client(mock_api(&mock_server.uri()), ACCESS_TOKEN)
    }

    #[tokio::test]
    async fn test_account_info_sends_bearer_token() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/api/account-info",
            json!({
                "account": "4100175017397",
                "balance": 1000.46,
                "currency": "643",
                "account_status": "named",
                "account_type": "personal",
                "cards_linked": [{"pan_fragment": "510000******9999", "type": "MasterCard"}]
            }),
        )
        .await;

        let info = wallet(&mock_server).account_info().await.unwrap();
        assert_eq!(info.account.as_deref(), Some("4100175017397"));
        assert_eq!(info.currency.as_deref(), Some("643"));
        let cards = info.cards_linked.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0]["type"], "MasterCard");
    }

    #[tokio::test]
    async fn test_get_aux_token_joins_scope() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token-aux"))
            .and(body_string("scope=account-info+operation-history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"aux_token": "some_aux_token"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let resp = wallet(&mock_server)
            .get_aux_token(&["account-info", "operation-history"])
            .await
            .unwrap();
        assert_eq!(resp.get_str("aux_token"), Some("some_aux_token"));
    }

    #[tokio::test]
    async fn test_operation_history_passes_options() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/operation-history"))
            .and(body_string("records=3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_record": "3",
                "operations": [{"operation_id": "1"}, {"operation_id": "2"}, {"operation_id": "3"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let resp = wallet(&mock_server)
            .operation_history(&Params::new().with("records", 3))
            .await
            .unwrap();
        assert_eq!(resp.operations.unwrap().len(), 3);
        assert_eq!(resp.next_record.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_operation_details() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/operation-details"))
            .and(body_string("operation_id=op-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success", "title": "Shop"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let resp = wallet(&mock_server).operation_details("op-42").await.unwrap();
        assert_eq!(resp.title.as_deref(), Some("Shop"));
    }

    #[tokio::test]
    async fn test_request_and_process_payment() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/api/request-payment",
            json!({"status": "success", "request_id": "test-p2p", "contract_amount": 0.02}),
        )
        .await;
        mount(
            &mock_server,
            "/api/process-payment",
            json!({"status": "success", "invoice_id": "1234"}),
        )
        .await;

        let wallet = wallet(&mock_server);
        let request = wallet
            .request_payment(
                &Params::new()
                    .with("pattern_id", "p2p")
                    .with("to", "410011161616877")
                    .with("amount_due", "0.02")
                    .with("test_payment", true)
                    .with("test_result", "success"),
            )
            .await
            .unwrap();
        assert!(request.is_success());
        assert_eq!(request.request_id.as_deref(), Some("test-p2p"));

        let process = wallet
            .process_payment(&Params::new().with("request_id", "test-p2p"))
            .await
            .unwrap();
        assert_eq!(process.status, Some(Status::Success));
        assert_eq!(process.invoice_id.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_refusal_is_not_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/incoming-transfer-accept"))
            .and(body_string("operation_id=some+id&protection_code=some+code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "refused",
                "error": "illegal_param_protection_code"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let resp = wallet(&mock_server)
            .incoming_transfer_accept("some id", Some("some code"))
            .await
            .unwrap();
        assert!(resp.is_refused());
        assert_eq!(resp.error.as_deref(), Some("illegal_param_protection_code"));
    }

    #[tokio::test]
    async fn test_transfer_accept_omits_missing_protection_code() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/incoming-transfer-accept"))
            .and(body_string("operation_id=op"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let resp = wallet(&mock_server)
            .incoming_transfer_accept("op", None)
            .await
            .unwrap();
        assert!(resp.is_success());
    }

    #[tokio::test]
    async fn test_transfer_reject() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/incoming-transfer-reject"))
            .and(body_string("operation_id=op"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let resp = wallet(&mock_server).incoming_transfer_reject("op").await.unwrap();
        assert!(resp.is_success());
    }

    #[tokio::test]
    async fn test_expired_token_is_token_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/account-info"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = wallet(&mock_server).account_info().await.unwrap_err();
        assert!(matches!(err, ClientError::Api(ApiError::Token)));
    }

    #[tokio::test]
    async fn test_missing_scope_is_scope_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/operation-history"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = wallet(&mock_server)
            .operation_history(&Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api(ApiError::Scope)));
    }

    #[test]
    fn test_build_obtain_token_url() {
        let url = Wallet::build_obtain_token_url("cid", "http://localhost/redirect", &["account-info"]);
        assert_eq!(
            url.as_str(),
            "https://sp-money.yandex.ru/oauth/authorize?client_id=cid&redirect_uri=http%3A%2F%2Flocalhost%2Fredirect&scope=account-info"
        );
    }

    #[tokio::test]
    async fn test_get_access_token_returns_oauth_error_in_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string(
                "client_id=client_id&client_secret=client_secret&code=code&grant_type=authorization_code&redirect_uri=redirect_uri",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "unauthorized_client"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = mock_api(&mock_server.uri());
        let resp = Wallet::get_access_token(&api, "client_id", "code", "redirect_uri", Some("client_secret"))
            .await
            .unwrap();
        assert_eq!(resp.error.as_deref(), Some("unauthorized_client"));
        assert!(resp.get("access_token").is_none());
    }

    #[tokio::test]
    async fn test_get_access_token_without_secret() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string(
                "client_id=cid&code=abc&grant_type=authorization_code&redirect_uri=http%3A%2F%2Flocalhost",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = mock_api(&mock_server.uri());
        let resp = Wallet::get_access_token(&api, "cid", "abc", "http://localhost", None)
            .await
            .unwrap();
        assert_eq!(resp.get_str("access_token"), Some("tok"));
    }

    #[tokio::test]
    async fn test_revoke_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/revoke"))
            .and(header("Authorization", "Bearer old-token"))
            .and(body_string("revoke-all=true"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = mock_api(&mock_server.uri());
        let resp = Wallet::revoke_token(&api, "old-token", true).await.unwrap();
        assert_eq!(resp.status, None);
    }

    #[test]
    fn test_debug_hides_token() {
        let wallet = Wallet::new(ACCESS_TOKEN);
        assert!(!format!("{wallet:?}").contains(ACCESS_TOKEN));
    }
}
