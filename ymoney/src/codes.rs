//! Provider error codes and their human-readable descriptions.
//!
//! A refused operation carries a machine-readable `error` code in its
//! response body. [`ErrorCode`] enumerates the codes the provider documents
//! and maps each one to an explanatory message.

use std::fmt;
use std::str::FromStr;

/// Message used for codes missing from the table.
pub const FALLBACK_MESSAGE: &str =
    "В авторизации платежа отказано. Приложению следует провести новый платеж спустя некоторое время.";

/// Machine-readable error codes returned in refused responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The `client_id` does not exist or is blocked.
    IllegalParamClientId,
    /// No contract exists for the given `request_id`.
    ContractNotFound,
    /// The payer's balance is too low.
    NotEnoughFunds,
    /// An operation limit was exceeded.
    LimitExceeded,
    /// The requested `money_source` is unavailable for this payment.
    MoneySourceNotAvailable,
    /// `csc` is missing or invalid.
    IllegalParamCsc,
    /// Payment authorization was rejected.
    AuthorizationReject,
    /// The user's account is blocked.
    AccountBlocked,
    /// `ext_auth_success_uri` is missing or invalid.
    IllegalParamExtAuthSuccessUri,
    /// `ext_auth_fail_uri` is missing or invalid.
    IllegalParamExtAuthFailUri,
    /// `protection_code` is missing or invalid.
    IllegalParamProtectionCode,
    /// `operation_id` is missing, invalid, or already rejected.
    IllegalParamOperationId,
    /// The user must complete an external action before receiving transfers.
    ExtActionRequired,
    /// The transfer was already rejected.
    AlreadyRejected,
    /// `to` is invalid.
    IllegalParamTo,
    /// `amount` is invalid.
    IllegalParamAmount,
    /// `amount_due` is invalid.
    IllegalParamAmountDue,
    /// `message` is invalid.
    IllegalParamMessage,
    /// The payee account does not exist.
    PayeeNotFound,
    /// The shop refused the payment.
    PaymentRefused,
    /// Required payment parameters are missing or contradictory.
    IllegalParams,
    /// `request_id` is invalid or has no context.
    IllegalParamRequestId,
    /// `instance_id` is missing or invalid.
    IllegalParamInstanceId,
    /// `money_source_token` is missing, invalid, revoked, or expired.
    IllegalParamMoneySourceToken,
}

impl ErrorCode {
    /// Every known code, in table order.
    pub const ALL: [Self; 24] = [
        Self::IllegalParamClientId,
        Self::ContractNotFound,
        Self::NotEnoughFunds,
        Self::LimitExceeded,
        Self::MoneySourceNotAvailable,
        Self::IllegalParamCsc,
        Self::AuthorizationReject,
        Self::AccountBlocked,
        Self::IllegalParamExtAuthSuccessUri,
        Self::IllegalParamExtAuthFailUri,
        Self::IllegalParamProtectionCode,
        Self::IllegalParamOperationId,
        Self::ExtActionRequired,
        Self::AlreadyRejected,
        Self::IllegalParamTo,
        Self::IllegalParamAmount,
        Self::IllegalParamAmountDue,
        Self::IllegalParamMessage,
        Self::PayeeNotFound,
        Self::PaymentRefused,
        Self::IllegalParams,
        Self::IllegalParamRequestId,
        Self::IllegalParamInstanceId,
        Self::IllegalParamMoneySourceToken,
    ];

    /// Returns the wire representation of the code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IllegalParamClientId => "illegal_param_client_id",
            Self::ContractNotFound => "contract_not_found",
            Self::NotEnoughFunds => "not_enough_funds",
            Self::LimitExceeded => "limit_exceeded",
            Self::MoneySourceNotAvailable => "money_source_not_available",
            Self::IllegalParamCsc => "illegal_param_csc",
            Self::AuthorizationReject => "authorization_reject",
            Self::AccountBlocked => "account_blocked",
            Self::IllegalParamExtAuthSuccessUri => "illegal_param_ext_auth_success_uri",
            Self::IllegalParamExtAuthFailUri => "illegal_param_ext_auth_fail_uri",
            Self::IllegalParamProtectionCode => "illegal_param_protection_code",
            Self::IllegalParamOperationId => "illegal_param_operation_id",
            Self::ExtActionRequired => "ext_action_required",
            Self::AlreadyRejected => "already_rejected",
            Self::IllegalParamTo => "illegal_param_to",
            Self::IllegalParamAmount => "illegal_param_amount",
            Self::IllegalParamAmountDue => "illegal_param_amount_due",
            Self::IllegalParamMessage => "illegal_param_message",
            Self::PayeeNotFound => "payee_not_found",
            Self::PaymentRefused => "payment_refused",
            Self::IllegalParams => "illegal_params",
            Self::IllegalParamRequestId => "illegal_param_request_id",
            Self::IllegalParamInstanceId => "illegal_param_instance_id",
            Self::IllegalParamMoneySourceToken => "illegal_param_money_source_token",
        }
    }

    /// Returns the human-readable explanation for this code.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::IllegalParamClientId => {
                "Недопустимое значение параметра client_id (не существует или заблокирован).\
                 Дальнейшая работа приложения c данным client_id невозможна."
            }
            Self::ContractNotFound => "Отсутствует выставленный контракт с заданным request_id.",
            Self::NotEnoughFunds => {
                "Недостаточно средств на счете плательщика. \
                 Необходимо пополнить счет и провести новый платеж."
            }
            Self::LimitExceeded => {
                "Превышен один из лимитов на операции:\n\
                 на сумму операции для выданного токена авторизации;\n\
                 сумму, операции за период времени для выданного токена авторизации;\n\
                 ограничений Яндекс.Денег для различных видов операций."
            }
            Self::MoneySourceNotAvailable => {
                "Запрошенный метод платежа (money_source) недоступен для данного платежа."
            }
            Self::IllegalParamCsc => "Отсутствует или указано недопустимое значение параметра csc.",
            Self::AuthorizationReject => {
                "В авторизации платежа отказано. Возможные причины: истек срок действия банковской карты;\n\
                 банк-эмитент отклонил транзакцию по карте;\n\
                 превышен лимит для этого пользователя;\n\
                 транзакция с текущими параметрами запрещена для данного пользователя;\n\
                 пользователь не принял Соглашение об использовании сервиса «Яндекс.Деньги»."
            }
            Self::AccountBlocked => {
                "Счет пользователя заблокирован. Для разблокировки счета необходимо отправить \
                 пользователя по адресу, указанному в поле account_unblock_uri."
            }
            Self::IllegalParamExtAuthSuccessUri => {
                "Отсутствует или указано недопустимое значение параметра ext_auth_success_uri."
            }
            Self::IllegalParamExtAuthFailUri => {
                "Отсутствует или указано недопустимое значение параметра ext_auth_fail_uri."
            }
            Self::IllegalParamProtectionCode => {
                "Отсутствует или имеет недопустимое значение параметр protection_code."
            }
            Self::IllegalParamOperationId => {
                "Отсутствует или имеет недопустимое значение параметр operation_id. \
                 Перевод с таким operation_id не существует или уже отвергнут."
            }
            Self::ExtActionRequired => {
                "В настоящее время приём переводов невозможен. Для получения возможности \
                 приема переводов пользователю необходимо перейти на страницу по адресу \
                 ext_action_uri и следовать инструкции на данной странице. \
                 Это могут быть следующие действия:\n\
                 * ввести идентификационные данные\n\
                 * принять оферту\n\
                 * выполнить иные действия согласно инструкциям на странице\n"
            }
            Self::AlreadyRejected => "Перевод уже отвергнут.",
            Self::IllegalParamTo => "Недопустимое значение параметра to.",
            Self::IllegalParamAmount => "Недопустимое значение параметра amount.",
            Self::IllegalParamAmountDue => "Недопустимое значение параметра amount_due.",
            Self::IllegalParamMessage => "Недопустимое значение параметра message.",
            Self::PayeeNotFound => "Получатель не найден, указанный счет не существует.",
            Self::PaymentRefused => {
                "Магазин отказал в приеме платежа (например, \
                 пользователь пытался заплатить за товар, которого нет в магазине)."
            }
            Self::IllegalParams => {
                "Обязательные параметры платежа отсутствуют, \
                 имеют недопустимые значения или логические противоречия."
            }
            Self::IllegalParamRequestId => {
                "Неверное значение request_id или отсутствует контекст с заданным request_id"
            }
            Self::IllegalParamInstanceId => {
                "Отсутствует или указано недопустимое значение параметра instance_id."
            }
            Self::IllegalParamMoneySourceToken => {
                "Отсутствует или указано недопустимое значение \
                 параметра money_source_token, токен отозван или истек его срок действия."
            }
        }
    }

    /// Looks up a code by its wire representation.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`ErrorCode::from_str`] for codes outside the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(
    /// The unrecognized code.
    pub String,
);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownErrorCode(s.to_owned()))
    }
}

/// Returns the message for a raw provider code, falling back to
/// [`FALLBACK_MESSAGE`] for unknown codes.
#[must_use]
pub fn describe(code: &str) -> &'static str {
    ErrorCode::parse(code).map_or(FALLBACK_MESSAGE, |known| known.description())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_round_trips_through_parse() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
        }
    }

    #[test]
    fn describe_known_code() {
        assert_eq!(
            describe("illegal_params"),
            ErrorCode::IllegalParams.description()
        );
        assert!(describe("payee_not_found").starts_with("Получатель не найден"));
    }

    #[test]
    fn describe_unknown_code_falls_back() {
        assert_eq!(describe("something_new"), FALLBACK_MESSAGE);
        assert_eq!(describe(""), FALLBACK_MESSAGE);
    }

    #[test]
    fn from_str_rejects_unknown() {
        let err = "nope".parse::<ErrorCode>().unwrap_err();
        assert_eq!(err, UnknownErrorCode("nope".into()));
        assert_eq!(
            "already_rejected".parse::<ErrorCode>().unwrap(),
            ErrorCode::AlreadyRejected
        );
    }

    #[test]
    fn limit_exceeded_keeps_line_breaks() {
        let text = ErrorCode::LimitExceeded.description();
        assert_eq!(text.lines().count(), 4);
    }
}
