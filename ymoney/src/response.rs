//! Typed response envelope shared by every API operation.
//!
//! The provider answers with a flat JSON object whose `status` field is
//! `"success"`, `"refused"`, `"in_progress"` or another provider-defined
//! string, plus operation-specific fields. [`ApiResponse`] exposes the
//! documented fields as typed `Option`s and keeps everything else in
//! [`ApiResponse::extra`].

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{FieldError, PaymentError};

/// The `status` field of a response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    /// The operation succeeded.
    Success,
    /// The operation was refused; see the `error` field.
    Refused,
    /// The operation is still being processed.
    InProgress,
    /// Any other provider-defined status.
    Other(String),
}

impl Status {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Refused => "refused",
            Self::InProgress => "in_progress",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Self::Success,
            "refused" => Self::Refused,
            "in_progress" => Self::InProgress,
            _ => Self::Other(value),
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded API response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Operation status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Error code for refused operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 3-D Secure authentication page address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acs_uri: Option<String>,
    /// Parameters to post to [`acs_uri`](Self::acs_uri).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acs_params: Option<Value>,
    /// Available payment methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub money_source: Option<Value>,
    /// Suggested delay in milliseconds before retrying an `in_progress` call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry: Option<u64>,
    /// Invoice identifier of a completed external payment.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub invoice_id: Option<String>,
    /// Application instance identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// Payment request identifier.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_id: Option<String>,
    /// Amount the payer will be charged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_amount: Option<Decimal>,
    /// Payment title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Account balance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    /// Account number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Account currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Account identification status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_status: Option<String>,
    /// Account type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    /// Avatar image descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Value>,
    /// Additional services enabled for the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services_additional: Option<Value>,
    /// Linked bank cards, each usually `{"pan_fragment", "type"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards_linked: Option<Vec<Value>>,
    /// Balance breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_details: Option<Value>,
    /// Operation history page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<Value>>,
    /// Cursor for the next history page.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_record: Option<String>,
    /// Fields outside the documented set (`aux_token`, `access_token`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiResponse {
    /// Names accepted by [`field`](Self::field).
    pub const FIELDS: [&'static str; 22] = [
        "status",
        "error",
        "acs_uri",
        "acs_params",
        "money_source",
        "next_retry",
        "invoice_id",
        "instance_id",
        "request_id",
        "contract_amount",
        "title",
        "balance",
        "account",
        "currency",
        "account_status",
        "account_type",
        "avatar",
        "services_additional",
        "cards_linked",
        "balance_details",
        "operations",
        "next_record",
    ];

    /// Returns `true` if `status` is `"success"`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Some(Status::Success)
    }

    /// Returns `true` if `status` is `"refused"`.
    #[must_use]
    pub fn is_refused(&self) -> bool {
        self.status == Some(Status::Refused)
    }

    /// Returns the refusal carried by this response, if any.
    ///
    /// A refused response without an `error` code still yields an error; its
    /// message is the generic fallback.
    #[must_use]
    pub fn refusal(&self) -> Option<PaymentError> {
        self.is_refused()
            .then(|| PaymentError::new(self.error.clone().unwrap_or_default()))
    }

    /// Looks up a documented field by name.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Unknown`] for names outside [`FIELDS`](Self::FIELDS)
    /// and [`FieldError::Absent`] when the field was not in the response.
    pub fn field(&self, name: &str) -> Result<Value, FieldError> {
        let value = match name {
            "status" => json(self.status.as_ref()),
            "error" => json(self.error.as_ref()),
            "acs_uri" => json(self.acs_uri.as_ref()),
            "acs_params" => self.acs_params.clone(),
            "money_source" => self.money_source.clone(),
            "next_retry" => json(self.next_retry.as_ref()),
            "invoice_id" => json(self.invoice_id.as_ref()),
            "instance_id" => json(self.instance_id.as_ref()),
            "request_id" => json(self.request_id.as_ref()),
            "contract_amount" => json(self.contract_amount.as_ref()),
            "title" => json(self.title.as_ref()),
            "balance" => json(self.balance.as_ref()),
            "account" => json(self.account.as_ref()),
            "currency" => json(self.currency.as_ref()),
            "account_status" => json(self.account_status.as_ref()),
            "account_type" => json(self.account_type.as_ref()),
            "avatar" => self.avatar.clone(),
            "services_additional" => self.services_additional.clone(),
            "cards_linked" => json(self.cards_linked.as_ref()),
            "balance_details" => self.balance_details.clone(),
            "operations" => json(self.operations.as_ref()),
            "next_record" => json(self.next_record.as_ref()),
            _ => return Err(FieldError::Unknown(name.to_owned())),
        };
        value.ok_or_else(|| FieldError::Absent(name.to_owned()))
    }

    /// Returns an undocumented field, such as `aux_token` or `access_token`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Returns an undocumented field as a string slice.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

fn json<T: Serialize>(value: Option<&T>) -> Option<Value> {
    value.and_then(|v| serde_json::to_value(v).ok())
}

/// Accepts identifiers sent either as JSON strings or as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(
        Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
            Raw::Str(s) => s,
            Raw::Num(n) => n.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::ErrorCode;
    use serde_json::json;

    fn parse(value: Value) -> ApiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn success_with_numeric_request_id_and_string_amount() {
        let resp = parse(json!({"status": "success", "request_id": 1, "contract_amount": "100"}));
        assert!(resp.is_success());
        assert_eq!(resp.request_id.as_deref(), Some("1"));
        assert_eq!(resp.contract_amount, Some(Decimal::from(100)));
        assert!(resp.refusal().is_none());
    }

    #[test]
    fn numeric_amounts_are_decimals() {
        let resp = parse(json!({"account": "4100175017397", "balance": 1000.46, "currency": "643"}));
        assert_eq!(resp.balance, Some(Decimal::new(100_046, 2)));
        assert_eq!(resp.currency.as_deref(), Some("643"));
        assert_eq!(resp.status, None);
    }

    #[test]
    fn unknown_statuses_are_preserved() {
        let resp = parse(json!({"status": "hold_for_pickup"}));
        assert_eq!(resp.status, Some(Status::Other("hold_for_pickup".into())));
        assert_eq!(resp.field("status").unwrap(), json!("hold_for_pickup"));
        assert!(!resp.is_success());
        assert!(!resp.is_refused());
    }

    #[test]
    fn field_rejects_unlisted_names() {
        let resp = parse(json!({"status": "success", "aux_token": "tok"}));
        assert_eq!(
            resp.field("aux_token"),
            Err(FieldError::Unknown("aux_token".into()))
        );
        assert_eq!(resp.field("__dict__"), Err(FieldError::Unknown("__dict__".into())));
        assert_eq!(resp.get_str("aux_token"), Some("tok"));
    }

    #[test]
    fn field_reports_absent_documented_fields() {
        let resp = parse(json!({"status": "success"}));
        assert_eq!(resp.field("invoice_id"), Err(FieldError::Absent("invoice_id".into())));
        assert_eq!(resp.field("status").unwrap(), json!("success"));
    }

    #[test]
    fn every_listed_field_is_accessible() {
        let resp = ApiResponse::default();
        for name in ApiResponse::FIELDS {
            assert_eq!(resp.field(name), Err(FieldError::Absent(name.to_owned())));
        }
    }

    #[test]
    fn refusal_carries_code() {
        let resp = parse(json!({"status": "refused", "error": "illegal_params"}));
        let err = resp.refusal().unwrap();
        assert_eq!(err.error_code(), Some(ErrorCode::IllegalParams));
    }

    #[test]
    fn refusal_without_code_still_fails() {
        let resp = parse(json!({"status": "refused"}));
        assert_eq!(resp.refusal().unwrap().code, "");
    }

    #[test]
    fn history_page_is_typed() {
        let resp = parse(json!({
            "next_record": 3,
            "operations": [{"operation_id": "1"}, {"operation_id": "2"}]
        }));
        assert_eq!(resp.next_record.as_deref(), Some("3"));
        assert_eq!(resp.operations.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn linked_cards_accept_objects_and_strings() {
        let resp = parse(json!({
            "account": "4100175017397",
            "cards_linked": [
                {"pan_fragment": "510000******9999", "type": "MasterCard"},
                "5555********4444"
            ]
        }));
        let cards = resp.cards_linked.as_deref().unwrap();
        assert_eq!(cards[0]["pan_fragment"], "510000******9999");
        assert_eq!(cards[0]["type"], "MasterCard");
        assert_eq!(cards[1], "5555********4444");
        assert_eq!(
            resp.field("cards_linked").unwrap(),
            json!([{"pan_fragment": "510000******9999", "type": "MasterCard"}, "5555********4444"])
        );
    }
}
