//! Money as the remote platform reports it: a decimal string plus a currency code.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Price amount in the platform's decimal string form (e.g. `"1500.00"`).
///
/// The amount is kept verbatim; it is only parsed when a numeric comparison or
/// display formatting is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

impl ValueObject for Money {}

impl Money {
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    /// Parsed amount, `None` when the string is not a finite decimal.
    pub fn value(&self) -> Option<f64> {
        parse_amount(&self.amount)
    }

    /// Display form used by the storefront: `$1,500 MXN`, `$99.5 MXN`.
    pub fn display(&self) -> String {
        let value = self.value().unwrap_or(0.0);
        format!("${} {}", group_thousands(value), self.currency_code)
    }
}

/// Parse a decimal amount string; rejects NaN/inf and blank input.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = (value.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if cents > 0 {
        let fraction = format!("{cents:02}");
        grouped.push('.');
        grouped.push_str(fraction.trim_end_matches('0'));
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}
