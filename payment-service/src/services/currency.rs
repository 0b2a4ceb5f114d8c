//! Major-unit to minor-unit conversion for provider-facing amounts.
//!
//! Amounts are exact decimals, so `19.99` is 1999 cents and never 1998.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Currencies whose provider-facing amount is already in the base unit.
pub const ZERO_DECIMAL_CURRENCIES: [&str; 3] = ["JPY", "KRW", "VND"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Amount must not be negative.")]
    Negative,

    #[error("Amount is too large.")]
    TooLarge,
}

/// Active ISO 4217 codes, sorted.
pub const ISO_4217_CURRENCIES: [&str; 155] = [
    "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", "AWG", "AZN", "BAM", "BBD", "BDT",
    "BGN", "BHD", "BIF", "BMD", "BND", "BOB", "BRL", "BSD", "BTN", "BWP", "BYN", "BZD", "CAD",
    "CDF", "CHF", "CLP", "CNY", "COP", "CRC", "CUP", "CVE", "CZK", "DJF", "DKK", "DOP", "DZD",
    "EGP", "ERN", "ETB", "EUR", "FJD", "FKP", "GBP", "GEL", "GHS", "GIP", "GMD", "GNF", "GTQ",
    "GYD", "HKD", "HNL", "HTG", "HUF", "IDR", "ILS", "INR", "IQD", "IRR", "ISK", "JMD", "JOD",
    "JPY", "KES", "KGS", "KHR", "KMF", "KPW", "KRW", "KWD", "KYD", "KZT", "LAK", "LBP", "LKR",
    "LRD", "LSL", "LYD", "MAD", "MDL", "MGA", "MKD", "MMK", "MNT", "MOP", "MRU", "MUR", "MVR",
    "MWK", "MXN", "MYR", "MZN", "NAD", "NGN", "NIO", "NOK", "NPR", "NZD", "OMR", "PAB", "PEN",
    "PGK", "PHP", "PKR", "PLN", "PYG", "QAR", "RON", "RSD", "RUB", "RWF", "SAR", "SBD", "SCR",
    "SDG", "SEK", "SGD", "SHP", "SLE", "SOS", "SRD", "SSP", "STN", "SVC", "SYP", "SZL", "THB",
    "TJS", "TMT", "TND", "TOP", "TRY", "TTD", "TWD", "TZS", "UAH", "UGX", "USD", "UYU", "UZS",
    "VES", "VND", "VUV", "WST", "XAF", "XCD", "XOF", "XPF", "YER", "ZAR", "ZMW", "ZWL",
];

/// Canonical upper-case code when `currency` is a known ISO 4217 code.
pub fn known_currency(currency: &str) -> Option<&'static str> {
    let upper = currency.to_ascii_uppercase();
    ISO_4217_CURRENCIES
        .binary_search_by(|code| (**code).cmp(upper.as_str()))
        .ok()
        .map(|i| ISO_4217_CURRENCIES[i])
}

pub fn is_zero_decimal(currency: &str) -> bool {
    ZERO_DECIMAL_CURRENCIES
        .iter()
        .any(|code| code.eq_ignore_ascii_case(currency))
}

/// Convert `amount` (major units) into integer minor units for `currency`.
///
/// Rounds to the nearest integer, ties away from zero.
pub fn to_minor_units(amount: Decimal, currency: &str) -> Result<u64, CurrencyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CurrencyError::Negative);
    }

    let scaled = if is_zero_decimal(currency) {
        amount
    } else {
        amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(CurrencyError::TooLarge)?
    };

    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(CurrencyError::TooLarge)
}
