//! Mock INR currency conversion
//!
//! Rates are fixed at compile time and are not live market data.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::GatewayError;

/// Currency every amount is converted from
pub const SOURCE_CURRENCY: &str = "INR";

pub const INVALID_AMOUNT: &str = "Invalid amount: Must be a positive number.";
pub const INVALID_TARGET: &str = "Invalid target currency. Must be USD or EUR.";

/// Supported conversion targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Usd, Currency::Eur];

    /// Units of this currency per 1 INR
    #[must_use]
    pub fn rate(self) -> f64 {
        match self {
            Currency::Usd => 0.012,
            Currency::Eur => 0.011,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Exact, case-sensitive lookup by ISO code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A validated conversion request
///
/// `amount` keeps the caller's JSON number so it is echoed back unchanged
/// (`100` stays `100`, not `100.0`).
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: Number,
    pub target: Currency,
}

impl ConversionRequest {
    /// Build a request from a float amount; `None` for NaN or infinity
    #[must_use]
    pub fn new(amount: f64, target: Currency) -> Option<Self> {
        Number::from_f64(amount).map(|amount| Self { amount, target })
    }

    #[must_use]
    pub fn amount_value(&self) -> f64 {
        self.amount.as_f64().unwrap_or(f64::NAN)
    }

    /// Validate a raw JSON body.
    ///
    /// Both fields are always checked; the error names every field that failed.
    pub fn from_json(body: &Value) -> Result<Self, GatewayError> {
        let amount = body
            .get("amount")
            .and_then(Value::as_number)
            .filter(|amount| {
                amount
                    .as_f64()
                    .is_some_and(|value| value.is_finite() && value > 0.0)
            })
            .cloned();
        let target = body
            .get("target")
            .and_then(Value::as_str)
            .and_then(Currency::from_code);

        match (amount, target) {
            (Some(amount), Some(target)) => Ok(Self { amount, target }),
            (None, Some(_)) => Err(GatewayError::validation(INVALID_AMOUNT)),
            (Some(_), None) => Err(GatewayError::validation(INVALID_TARGET)),
            (None, None) => Err(GatewayError::validation(format!(
                "{INVALID_AMOUNT} {INVALID_TARGET}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub amount: Number,
    pub from: String,
    pub to: Currency,
    pub rate: f64,
    pub converted: f64,
}

/// Round to 4 decimal places, half away from zero
#[must_use]
pub fn round4(value: f64) -> f64 {
    let scaled = value * 10_000.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 10_000.0
}

#[must_use]
pub fn convert(request: &ConversionRequest) -> ConversionResponse {
    let rate = request.target.rate();
    ConversionResponse {
        amount: request.amount.clone(),
        from: SOURCE_CURRENCY.to_string(),
        to: request.target,
        rate,
        converted: round4(request.amount_value() * rate),
    }
}
