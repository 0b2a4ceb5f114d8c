//! Request and response bodies of the payment-intent-create function.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing amount, currency, or paymentMethod in request.";
pub const INVALID_AMOUNT_MESSAGE: &str = "Amount must be a finite number.";
pub const AMOUNT_TOO_LARGE_MESSAGE: &str = "Amount is too large.";
pub const INVALID_CURRENCY_MESSAGE: &str = "Currency must be a three-letter ISO 4217 code.";
pub const UNSUPPORTED_METHOD_MESSAGE: &str = "Unsupported payment method.";
pub const CASH_ACKNOWLEDGEMENT: &str =
    "Cash payment selected. No online payment is required; please pay on delivery.";

/// Largest number of significant digits kept for an amount.
const MAX_AMOUNT_DIGITS: usize = 28;

/// `amount` as sent by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    /// A JSON number, kept as its literal text.
    Number(String),
    Text(String),
    /// Any other JSON value.
    Other(String),
}

impl AmountInput {
    fn from_raw(raw: &RawValue) -> Self {
        let text = raw.get().trim();
        if text.starts_with('"') {
            match serde_json::from_str::<String>(text) {
                Ok(s) => AmountInput::Text(s),
                Err(_) => AmountInput::Other(text.to_string()),
            }
        } else if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
            AmountInput::Number(text.to_string())
        } else {
            AmountInput::Other(text.to_string())
        }
    }

    /// `0`, `""` and `false` count as absent.
    fn is_present(&self) -> bool {
        match self {
            AmountInput::Number(n) => NumericLiteral::parse(n).map_or(true, |lit| !lit.is_zero()),
            AmountInput::Text(s) => !s.is_empty(),
            AmountInput::Other(v) => v != "false",
        }
    }

    /// Exact decimal value.
    pub fn to_decimal(&self) -> Result<Decimal, AmountError> {
        match self {
            AmountInput::Number(n) => NumericLiteral::parse(n)?.to_decimal(),
            AmountInput::Text(s) => NumericLiteral::parse(s.trim())?.to_decimal(),
            AmountInput::Other(_) => Err(AmountError::NotANumber),
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("not a finite number")]
    NotANumber,

    #[error("out of range")]
    TooLarge,
}

/// A decimal literal: optional sign, digits with an optional fraction, and an
/// optional exponent. Nothing else, so `1_000`, `NaN` and `0x10` are refused.
#[derive(Debug, PartialEq, Eq)]
struct NumericLiteral {
    negative: bool,
    /// Significant digits, leading zeros removed. Empty for zero.
    digits: String,
    /// Position of the decimal point relative to the start of `digits`.
    point: i64,
}

impl NumericLiteral {
    fn parse(raw: &str) -> Result<Self, AmountError> {
        let (negative, rest) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };

        let (mantissa, exponent) = match rest.find(|c| c == 'e' || c == 'E') {
            Some(i) => (&rest[..i], Some(&rest[i + 1..])),
            None => (rest, None),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(AmountError::NotANumber);
        }

        let exponent = match exponent {
            Some(exp) => parse_exponent(exp)?,
            None => 0,
        };

        let combined = format!("{}{}", int_part, frac_part);
        let trimmed = combined.trim_start_matches('0');
        let leading_zeros = (combined.len() - trimmed.len()) as i64;

        Ok(Self {
            negative,
            digits: trimmed.trim_end_matches('0').to_string(),
            point: (int_part.len() as i64)
                .saturating_add(exponent)
                .saturating_sub(leading_zeros),
        })
    }

    fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Digits beyond the 28th decimal place are dropped. Values that small
    /// round to zero minor units anyway.
    fn to_decimal(&self) -> Result<Decimal, AmountError> {
        if self.is_zero() {
            return Ok(Decimal::ZERO);
        }
        if self.point > MAX_AMOUNT_DIGITS as i64 {
            return Err(AmountError::TooLarge);
        }

        let digits = self.digits.as_str();
        let text = if self.point <= 0 {
            let zeros = self.point.unsigned_abs() as usize;
            if zeros >= MAX_AMOUNT_DIGITS {
                return Ok(Decimal::ZERO);
            }
            let kept = digits.len().min(MAX_AMOUNT_DIGITS - zeros);
            format!("0.{}{}", "0".repeat(zeros), &digits[..kept])
        } else {
            let point = self.point as usize;
            if digits.len() <= point {
                format!("{}{}", digits, "0".repeat(point - digits.len()))
            } else {
                let fraction = &digits[point..digits.len().min(MAX_AMOUNT_DIGITS)];
                if fraction.is_empty() {
                    digits[..point].to_string()
                } else {
                    format!("{}.{}", &digits[..point], fraction)
                }
            }
        };

        let value = Decimal::from_str(&text).map_err(|_| AmountError::TooLarge)?;
        Ok(if self.negative { -value } else { value })
    }
}

/// Exponent digits, saturating instead of overflowing.
fn parse_exponent(raw: &str) -> Result<i64, AmountError> {
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::NotANumber);
    }

    let value = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Ok(if negative { -value } else { value })
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct PaymentRequestBody {
    #[serde(default)]
    amount: Option<Box<RawValue>>,
    #[serde(default)]
    #[validate(length(min = 1))]
    currency: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    payment_method: Option<String>,
}

/// A decoded and validated payment request.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    /// Major units, e.g. dollars.
    pub amount: Decimal,
    /// Upper-cased ISO 4217 code.
    pub currency: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    Cash,
}

impl PaymentMethod {
    /// Payment-method type name understood by the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported payment method: {0}")]
pub struct UnsupportedPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnsupportedPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(UnsupportedPaymentMethod(other.to_string())),
        }
    }
}

impl PaymentRequest {
    pub fn method(&self) -> Result<PaymentMethod, UnsupportedPaymentMethod> {
        self.payment_method.parse()
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Malformed request body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Missing required field")]
    Missing,

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(AmountInput),

    #[error("Amount out of range: {0:?}")]
    AmountTooLarge(AmountInput),

    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
}

impl RequestError {
    /// Message returned to the caller.
    pub fn client_message(&self) -> &'static str {
        match self {
            RequestError::Malformed(_) | RequestError::Invalid(_) | RequestError::Missing => {
                MISSING_FIELDS_MESSAGE
            }
            RequestError::InvalidAmount(_) => INVALID_AMOUNT_MESSAGE,
            RequestError::AmountTooLarge(_) => AMOUNT_TOO_LARGE_MESSAGE,
            RequestError::InvalidCurrency(_) => INVALID_CURRENCY_MESSAGE,
        }
    }
}

/// Decode and validate a raw request body in one step.
///
/// The payment method is not checked here; an unknown method is a separate,
/// later rejection.
pub fn validate_payment(body: &[u8]) -> Result<PaymentRequest, RequestError> {
    let raw: PaymentRequestBody = serde_json::from_slice(body)?;
    raw.validate()?;

    let (Some(amount_input), Some(currency), Some(payment_method)) = (
        raw.amount
            .as_deref()
            .map(AmountInput::from_raw)
            .filter(AmountInput::is_present),
        raw.currency,
        raw.payment_method,
    ) else {
        return Err(RequestError::Missing);
    };

    let amount = match amount_input.to_decimal() {
        Ok(amount) => amount,
        Err(AmountError::NotANumber) => return Err(RequestError::InvalidAmount(amount_input)),
        Err(AmountError::TooLarge) => return Err(RequestError::AmountTooLarge(amount_input)),
    };

    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RequestError::InvalidCurrency(currency));
    }

    Ok(PaymentRequest {
        amount,
        currency: currency.to_ascii_uppercase(),
        payment_method,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PaymentIntentResponse {
    pub fn card(client_secret: String) -> Self {
        Self {
            success: true,
            client_secret: Some(client_secret),
            message: None,
        }
    }

    pub fn cash() -> Self {
        Self {
            success: true,
            client_secret: None,
            message: Some(CASH_ACKNOWLEDGEMENT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn accepts_numeric_amount() {
        let request =
            validate_payment(br#"{"amount":10,"currency":"usd","paymentMethod":"card"}"#).unwrap();
        assert_eq!(request.amount, dec("10"));
        assert_eq!(request.currency, "USD");
        assert_eq!(request.method(), Ok(PaymentMethod::Card));
    }

    #[test]
    fn coerces_string_amount() {
        let request =
            validate_payment(br#"{"amount":" 19.99 ","currency":"EUR","paymentMethod":"card"}"#)
                .unwrap();
        assert_eq!(request.amount, dec("19.99"));
    }

    #[test]
    fn accepts_scientific_notation() {
        let request =
            validate_payment(br#"{"amount":"1.5e2","currency":"EUR","paymentMethod":"cash"}"#)
                .unwrap();
        assert_eq!(request.amount, dec("150"));
    }

    #[test]
    fn rejects_each_missing_field() {
        let bodies: [&[u8]; 4] = [
            br#"{"currency":"USD","paymentMethod":"card"}"#,
            br#"{"amount":10,"paymentMethod":"card"}"#,
            br#"{"amount":10,"currency":"USD"}"#,
            br#"{}"#,
        ];

        for body in bodies {
            let err = validate_payment(body).unwrap_err();
            assert!(matches!(err, RequestError::Missing));
            assert_eq!(err.client_message(), MISSING_FIELDS_MESSAGE);
        }
    }

    #[test]
    fn falsy_values_count_as_missing() {
        let bodies: [&[u8]; 4] = [
            br#"{"amount":0,"currency":"USD","paymentMethod":"card"}"#,
            br#"{"amount":"","currency":"USD","paymentMethod":"card"}"#,
            br#"{"amount":10,"currency":"","paymentMethod":"card"}"#,
            br#"{"amount":10,"currency":"USD","paymentMethod":null}"#,
        ];

        for body in bodies {
            let err = validate_payment(body).unwrap_err();
            assert_eq!(err.client_message(), MISSING_FIELDS_MESSAGE);
        }
    }

    #[test]
    fn string_zero_is_present() {
        let request =
            validate_payment(br#"{"amount":"0","currency":"USD","paymentMethod":"cash"}"#).unwrap();
        assert_eq!(request.amount, Decimal::ZERO);
    }

    #[test]
    fn rejects_non_numeric_amount() {
        for amount in [
            "abc", "Infinity", "NaN", "12abc", " ", "1_000", "1__0.5", "0x10", "1e", ".", "1.2.3",
            "--5", "1e5.5",
        ] {
            let body = format!(
                r#"{{"amount":"{}","currency":"USD","paymentMethod":"card"}}"#,
                amount
            );
            let err = validate_payment(body.as_bytes()).unwrap_err();
            assert!(
                matches!(err, RequestError::InvalidAmount(_)),
                "amount {:?} gave {:?}",
                amount,
                err
            );
            assert_eq!(err.client_message(), INVALID_AMOUNT_MESSAGE);
        }
    }

    #[test]
    fn rejects_non_numeric_json_values() {
        let err = validate_payment(br#"{"amount":true,"currency":"USD","paymentMethod":"card"}"#)
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidAmount(_)));

        let err = validate_payment(br#"{"amount":false,"currency":"USD","paymentMethod":"card"}"#)
            .unwrap_err();
        assert!(matches!(err, RequestError::Missing));
    }

    #[test]
    fn out_of_range_amounts_are_too_large() {
        let bodies: [&[u8]; 4] = [
            br#"{"amount":"1e30","currency":"USD","paymentMethod":"card"}"#,
            br#"{"amount":1e30,"currency":"USD","paymentMethod":"card"}"#,
            br#"{"amount":1e400,"currency":"USD","paymentMethod":"card"}"#,
            br#"{"amount":"1e99999999999999999999999","currency":"USD","paymentMethod":"card"}"#,
        ];

        for body in bodies {
            let err = validate_payment(body).unwrap_err();
            assert!(
                matches!(err, RequestError::AmountTooLarge(_)),
                "{} gave {:?}",
                String::from_utf8_lossy(body),
                err
            );
            assert_eq!(err.client_message(), AMOUNT_TOO_LARGE_MESSAGE);
        }
    }

    #[test]
    fn tiny_amounts_round_to_zero() {
        for amount in [r#""1e-30""#, "1e-30", r#""0.00000000000000000000000000000001""#] {
            let body = format!(
                r#"{{"amount":{},"currency":"USD","paymentMethod":"card"}}"#,
                amount
            );
            let request = validate_payment(body.as_bytes()).unwrap();
            assert_eq!(request.amount, Decimal::ZERO, "amount {}", amount);
        }
    }

    #[test]
    fn keeps_exact_value_of_long_literals() {
        let cases = [
            ("1.00000000000000000000000000000000001", "1"),
            ("123456789.123456789", "123456789.123456789"),
            ("0.05", "0.05"),
            ("-2.5e1", "-25"),
            ("1.", "1"),
            (".5", "0.5"),
            ("007", "7"),
        ];

        for (input, expected) in cases {
            let body = format!(
                r#"{{"amount":"{}","currency":"USD","paymentMethod":"card"}}"#,
                input
            );
            assert_eq!(
                validate_payment(body.as_bytes()).unwrap().amount,
                dec(expected),
                "amount {}",
                input
            );
        }
    }

    #[test]
    fn numeric_zero_literals_count_as_missing() {
        for amount in ["0.0", "-0", "0e10"] {
            let body = format!(
                r#"{{"amount":{},"currency":"USD","paymentMethod":"card"}}"#,
                amount
            );
            assert!(matches!(
                validate_payment(body.as_bytes()),
                Err(RequestError::Missing)
            ));
        }
    }

    #[test]
    fn rejects_malformed_currency() {
        for currency in ["US", "DOLLARS", "U$D"] {
            let body = format!(
                r#"{{"amount":10,"currency":"{}","paymentMethod":"card"}}"#,
                currency
            );
            assert!(matches!(
                validate_payment(body.as_bytes()),
                Err(RequestError::InvalidCurrency(_))
            ));
        }
    }

    #[test]
    fn rejects_malformed_bodies() {
        for body in [&b""[..], b"not json", b"\"card\""] {
            let err = validate_payment(body).unwrap_err();
            assert_eq!(err.client_message(), MISSING_FIELDS_MESSAGE);
        }
    }

    #[test]
    fn unknown_method_passes_validation_but_not_parsing() {
        let request =
            validate_payment(br#"{"amount":10,"currency":"USD","paymentMethod":"bogus"}"#).unwrap();
        assert_eq!(
            request.method(),
            Err(UnsupportedPaymentMethod("bogus".to_string()))
        );
    }

    #[test]
    fn payment_method_is_case_sensitive() {
        assert!("Card".parse::<PaymentMethod>().is_err());
        assert_eq!("cash".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
    }

    #[test]
    fn validation_is_repeatable() {
        let body = br#"{"amount":"19.99","currency":"EUR","paymentMethod":"card"}"#;
        assert_eq!(validate_payment(body).unwrap(), validate_payment(body).unwrap());

        let body = br#"{"amount":"abc","currency":"EUR","paymentMethod":"card"}"#;
        assert!(validate_payment(body).is_err());
        assert!(validate_payment(body).is_err());
    }

    #[test]
    fn responses_use_camel_case_and_omit_absent_fields() {
        let card = serde_json::to_value(PaymentIntentResponse::card("pi_1_secret_2".into())).unwrap();
        assert_eq!(
            card,
            serde_json::json!({ "success": true, "clientSecret": "pi_1_secret_2" })
        );

        let cash = serde_json::to_value(PaymentIntentResponse::cash()).unwrap();
        assert_eq!(cash["success"], true);
        assert_eq!(cash["message"], CASH_ACKNOWLEDGEMENT);
        assert!(cash.get("clientSecret").is_none());
    }
}
