//! Gateway response normalization.
//!
//! The gateway's transaction representation depends on the payment provider and transaction
//! type: fields appear only when the provider produced them, numbers sometimes arrive as
//! numeric strings and card data is optional. Raw transactions are therefore handled as loose
//! JSON maps ([`RawTransaction`]) and translated field by field into [`Transaction`].
//!
//! Presence is preserved exactly: an optional output field is set if and only if its source
//! key is present in the raw transaction. A verbatim field sent as `null` is emitted as
//! `null`; an integer or timestamp field sent as `null` is rejected. No defaults are invented.
//!
//! # Examples
//!
//! ```
//! use braspag_rest::response::normalize_get_transaction_data;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "MerchantOrderId": "abc",
//!     "Payment": {"Status": 1, "PaymentId": "p1", "Provider": "Simulado", "Amount": "15700"}
//! });
//!
//! let envelope = normalize_get_transaction_data(&raw)?;
//! assert!(envelope.success);
//! assert_eq!(envelope.order_id.as_deref(), Some("abc"));
//! assert_eq!(envelope.transaction.status, 1);
//! assert_eq!(envelope.transaction.amount, Some(15700));
//! assert_eq!(envelope.transaction.voided_amount, None);
//! # Ok::<(), braspag_rest::BraspagError>(())
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

use crate::error::{BraspagError, Result};

/// Format of the gateway's `ReceivedDate` field.
pub const RECEIVED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Raw gateway transaction, as returned in the `Payment` field.
pub type RawTransaction = Map<String, Value>;

/// Field whose source may be absent, present as `null`, or present with a value.
///
/// `None` means the source field was absent and the output field is omitted. `Some(None)`
/// means it was sent as `null` and the output field serializes as `null`.
pub type Nullable<T> = Option<Option<T>>;

/// Normalized transaction record.
///
/// Integer and timestamp fields are `None` when the source field is absent and reject a
/// `null` source value. Verbatim fields are [`Nullable`] so that a source field sent as
/// `null` is still reported as present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Gateway transaction status code.
    pub status: i64,
    /// Gateway payment id (`PaymentId`).
    pub braspag_transaction_id: Option<String>,
    /// Acquirer transaction id (`AcquirerTransactionId`).
    pub acquirer_transaction_id: Option<String>,
    /// Authorization code (`AuthorizationCode`).
    pub authorization_code: Option<String>,
    /// Proof of sale (`ProofOfSale`).
    pub proof_of_sale: Option<String>,

    /// Amount in cents (`Amount`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Voided amount in cents (`VoidedAmount`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voided_amount: Option<i64>,
    /// Card number as masked by the gateway (`CreditCard.CardNumber`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub masked_credit_card_number: Nullable<String>,
    /// Card brand (`CreditCard.Brand`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub payment_method_name: Nullable<String>,
    /// Card holder name (`CreditCard.Holder`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub holder_name: Nullable<String>,
    /// Card expiration date, unparsed (`CreditCard.ExpirationDate`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub expiration_date: Nullable<String>,
    /// `ReturnCode`.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub return_code: Nullable<String>,
    /// `ReturnMessage`.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub return_message: Nullable<String>,
    /// `ReasonCode`.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub reason_code: Nullable<String>,
    /// `ReasonMessage`.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub reason_message: Nullable<String>,
    /// Acquirer return code (`ProviderReturnCode`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub acquirer_return_code: Nullable<String>,
    /// Acquirer return message (`ProviderReturnMessage`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub acquirer_return_message: Nullable<String>,
    /// Payment provider (`Provider`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub payment_method: Nullable<String>,
    /// Transaction type (`Type`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub transaction_type: Nullable<String>,
    /// Capture flag (`Capture`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub capture: Nullable<bool>,
    /// Authentication flag (`Authenticate`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub authenticate: Nullable<bool>,
    /// Installment count (`Installments`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<i64>,
    /// Country code (`Country`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub country: Nullable<String>,
    /// Service tax amount in cents (`ServiceTaxAmount`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tax_amount: Option<i64>,
    /// Moment the gateway received the transaction (`ReceivedDate`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDateTime>,
    /// Interest mode (`Interest`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub interest: Nullable<String>,
}

/// Successful "get transaction data" result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    /// Always `true`.
    pub success: bool,
    /// Merchant order id (`MerchantOrderId`).
    pub order_id: Option<String>,
    /// First transaction of the sale.
    pub transaction: Transaction,
}

/// Single error reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    /// Gateway error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

/// Business rejection returned to the caller.
///
/// The gateway reports errors either as a list or as a single object. Both shapes are kept
/// as distinct variants. Serialized, both carry `"success": false`:
///
/// - `Errors`: `{"success": false, "errors": [{"code": .., "message": ..}]}`
/// - `Error`: `{"success": false, "code": .., "message": ..}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorEnvelope {
    /// Built from an array error body.
    Errors(Vec<GatewayError>),
    /// Built from a single-object error body.
    Error(GatewayError),
}

impl ErrorEnvelope {
    /// Always `false`.
    #[must_use]
    pub const fn success(&self) -> bool {
        false
    }

    /// All reported errors, whatever the shape.
    #[must_use]
    pub fn errors(&self) -> &[GatewayError] {
        match self {
            Self::Errors(errors) => errors,
            Self::Error(error) => std::slice::from_ref(error),
        }
    }
}

impl Serialize for ErrorEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Errors(errors) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("errors", errors)?;
                map.end()
            }
            Self::Error(error) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("code", &error.code)?;
                map.serialize_entry("message", &error.message)?;
                map.end()
            }
        }
    }
}

/// Outcome of an operation that reached the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GatewayResponse<T> {
    /// The gateway accepted the request.
    Success(T),
    /// The gateway rejected the request for business reasons.
    Failure(ErrorEnvelope),
}

impl<T> GatewayResponse<T> {
    /// Returns true for [`GatewayResponse::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the success value, if any.
    #[must_use]
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error envelope, if any.
    #[must_use]
    pub fn failure(self) -> Option<ErrorEnvelope> {
        match self {
            Self::Success(_) => None,
            Self::Failure(envelope) => Some(envelope),
        }
    }
}

/// Decodes a raw response body as JSON.
///
/// # Errors
///
/// Returns [`BraspagError::InvalidResponse`] if the body is not valid JSON.
pub fn decode(body: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(body)?)
}

/// Normalizes a single transaction or a list of them.
///
/// The gateway returns a bare object for single-payment sales and an array for
/// multi-payment sales; a bare object is treated as a one-element list.
///
/// # Errors
///
/// Returns [`BraspagError::InvalidResponse`] if the value is neither an object nor an array
/// of objects, or a field cannot be coerced.
pub fn normalize_transactions(raw: &Value) -> Result<Vec<Transaction>> {
    match raw {
        Value::Object(transaction) => Ok(vec![normalize_transaction(transaction)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_object().ok_or_else(|| {
                    BraspagError::InvalidResponse(format!("transaction is not an object: {item}"))
                })
            })
            .map(|transaction| normalize_transaction(transaction?))
            .collect(),
        other => Err(BraspagError::InvalidResponse(format!(
            "expected a transaction object or list, got {other}"
        ))),
    }
}

/// Normalizes one raw transaction.
///
/// # Errors
///
/// Returns [`BraspagError::InvalidResponse`] if `Status` is missing or a present field has an
/// unexpected type.
pub fn normalize_transaction(raw: &RawTransaction) -> Result<Transaction> {
    let status = field(raw, "Status")
        .ok_or_else(|| BraspagError::InvalidResponse("transaction has no Status".to_owned()))
        .and_then(|value| integer("Status", value))?;

    let empty = Map::new();
    let card = match raw.get("CreditCard") {
        Some(Value::Object(card)) => card,
        _ => &empty,
    };

    Ok(Transaction {
        status,
        braspag_transaction_id: identifier(raw, "PaymentId")?,
        acquirer_transaction_id: identifier(raw, "AcquirerTransactionId")?,
        authorization_code: identifier(raw, "AuthorizationCode")?,
        proof_of_sale: identifier(raw, "ProofOfSale")?,
        amount: optional(raw, "Amount", integer)?,
        voided_amount: optional(raw, "VoidedAmount", integer)?,
        masked_credit_card_number: nullable(card, "CardNumber", text)?,
        payment_method_name: nullable(card, "Brand", text)?,
        holder_name: nullable(card, "Holder", text)?,
        expiration_date: nullable(card, "ExpirationDate", text)?,
        return_code: nullable(raw, "ReturnCode", text)?,
        return_message: nullable(raw, "ReturnMessage", text)?,
        reason_code: nullable(raw, "ReasonCode", text)?,
        reason_message: nullable(raw, "ReasonMessage", text)?,
        acquirer_return_code: nullable(raw, "ProviderReturnCode", text)?,
        acquirer_return_message: nullable(raw, "ProviderReturnMessage", text)?,
        payment_method: nullable(raw, "Provider", text)?,
        transaction_type: nullable(raw, "Type", text)?,
        capture: nullable(raw, "Capture", boolean)?,
        authenticate: nullable(raw, "Authenticate", boolean)?,
        installments: optional(raw, "Installments", integer)?,
        country: nullable(raw, "Country", text)?,
        service_tax_amount: optional(raw, "ServiceTaxAmount", integer)?,
        received_date: optional(raw, "ReceivedDate", timestamp)?,
        interest: nullable(raw, "Interest", text)?,
    })
}

/// Normalizes a "get transaction data" response.
///
/// Only the first transaction is kept when `Payment` holds several; callers needing every
/// payment of a split sale should use [`normalize_transactions`] on `Payment` directly.
///
/// # Errors
///
/// Returns [`BraspagError::InvalidResponse`] if the body is not an object, `Payment` is
/// missing or empty, or a transaction cannot be normalized.
pub fn normalize_get_transaction_data(raw: &Value) -> Result<TransactionEnvelope> {
    let sale = raw.as_object().ok_or_else(|| {
        BraspagError::InvalidResponse(format!("expected a sale object, got {raw}"))
    })?;

    let payment = field(sale, "Payment")
        .ok_or_else(|| BraspagError::InvalidResponse("sale has no Payment".to_owned()))?;

    let transaction = normalize_transactions(payment)?
        .into_iter()
        .next()
        .ok_or_else(|| BraspagError::InvalidResponse("sale has an empty Payment list".to_owned()))?;

    Ok(TransactionEnvelope {
        success: true,
        order_id: identifier(sale, "MerchantOrderId")?,
        transaction,
    })
}

/// Normalizes an error body, choosing the envelope variant from the body's shape.
///
/// An array maps to [`ErrorEnvelope::Errors`], an object to [`ErrorEnvelope::Error`].
///
/// # Errors
///
/// Returns [`BraspagError::InvalidResponse`] for any other shape or for entries without
/// `Code`/`Message`.
pub fn normalize_error(raw: &Value) -> Result<ErrorEnvelope> {
    match raw {
        Value::Array(_) => normalize_error_list(raw),
        Value::Object(_) => normalize_single_error(raw),
        other => Err(BraspagError::InvalidResponse(format!("unexpected error body: {other}"))),
    }
}

/// Normalizes an array error body into [`ErrorEnvelope::Errors`].
///
/// # Errors
///
/// Returns [`BraspagError::InvalidResponse`] if the body is not an array of error objects.
pub fn normalize_error_list(raw: &Value) -> Result<ErrorEnvelope> {
    let items = raw.as_array().ok_or_else(|| {
        BraspagError::InvalidResponse(format!("expected an error list, got {raw}"))
    })?;

    items.iter().map(gateway_error).collect::<Result<Vec<_>>>().map(ErrorEnvelope::Errors)
}

/// Normalizes a single-object error body into [`ErrorEnvelope::Error`].
///
/// # Errors
///
/// Returns [`BraspagError::InvalidResponse`] if the body is not an error object.
pub fn normalize_single_error(raw: &Value) -> Result<ErrorEnvelope> {
    if !raw.is_object() {
        return Err(BraspagError::InvalidResponse(format!("expected an error object, got {raw}")));
    }
    gateway_error(raw).map(ErrorEnvelope::Error)
}

fn gateway_error(raw: &Value) -> Result<GatewayError> {
    let entry = raw.as_object().ok_or_else(|| {
        BraspagError::InvalidResponse(format!("error entry is not an object: {raw}"))
    })?;

    let code = field(entry, "Code")
        .ok_or_else(|| BraspagError::InvalidResponse("error entry has no Code".to_owned()))
        .and_then(|value| integer("Code", value))?;
    let message = field(entry, "Message")
        .ok_or_else(|| BraspagError::InvalidResponse("error entry has no Message".to_owned()))
        .and_then(|value| text("Message", value))?;

    Ok(GatewayError { code, message })
}

/// Looks up a field, treating `null` as absent.
fn field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

/// Identifier copied as text, `None` when absent or `null`.
fn identifier(raw: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    field(raw, key).map(|value| text(key, value)).transpose()
}

/// Present field that must carry a value; `null` is handed to `convert` and rejected there.
fn optional<T>(
    raw: &Map<String, Value>,
    key: &str,
    convert: fn(&str, &Value) -> Result<T>,
) -> Result<Option<T>> {
    raw.get(key).map(|value| convert(key, value)).transpose()
}

fn nullable<T>(
    raw: &Map<String, Value>,
    key: &str,
    convert: fn(&str, &Value) -> Result<T>,
) -> Result<Nullable<T>> {
    match raw.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(value) => convert(key, value).map(|converted| Some(Some(converted))),
    }
}

/// Deserializes a [`Nullable`] field that is present in the input, keeping `null` as
/// `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Nullable<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Integer coercion: integral numbers, truncated floats and numeric strings.
#[allow(
    clippy::cast_possible_truncation,
    reason = "float amounts are truncated toward zero like the gateway's integer fields"
)]
fn integer(key: &str, value: &Value) -> Result<i64> {
    let parsed = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        BraspagError::InvalidResponse(format!("field {key} is not an integer: {value}"))
    })
}

/// Verbatim text; numbers and booleans keep their JSON textual form.
///
/// Objects and arrays have no text form and are rejected.
fn text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(BraspagError::InvalidResponse(format!("field {key} is not text: {other}"))),
    }
}

fn boolean(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => {
            Err(BraspagError::InvalidResponse(format!("field {key} is not a boolean: {other}")))
        }
    }
}

fn timestamp(key: &str, value: &Value) -> Result<NaiveDateTime> {
    let raw = value.as_str().ok_or_else(|| {
        BraspagError::InvalidResponse(format!("field {key} is not a date string: {value}"))
    })?;

    NaiveDateTime::parse_from_str(raw, RECEIVED_DATE_FORMAT).map_err(|e| {
        BraspagError::InvalidResponse(format!("field {key} has invalid date '{raw}': {e}"))
    })
}
