//! Ratios that stay defined when their denominator is zero

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text rendered for an undefined ratio
pub const UNDEFINED_DISPLAY: &str = "N/A";

/// A derived ratio such as click-through rate.
///
/// A zero (or non-finite) denominator yields [`Ratio::Undefined`] instead of
/// infinity or NaN. Serializes as a number, or `null` when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Ratio {
    Value(f64),
    Undefined,
}

impl Ratio {
    /// `numerator / denominator`, or `Undefined` when that is not a finite number
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            return Ratio::Undefined;
        }
        let value = numerator / denominator;
        if value.is_finite() {
            Ratio::Value(value)
        } else {
            Ratio::Undefined
        }
    }

    /// The ratio as a number, if defined
    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Value(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Ratio::Undefined)
    }

    /// Render as a percentage, e.g. `10.00%`
    pub fn display_percent(&self, decimals: usize) -> String {
        match self {
            Ratio::Value(v) => format!("{:.*}%", decimals, v * 100.0),
            Ratio::Undefined => UNDEFINED_DISPLAY.to_string(),
        }
    }

    /// Render as a currency amount, e.g. `$12.50`
    pub fn display_currency(&self) -> String {
        match self {
            Ratio::Value(v) => format!("${:.2}", v),
            Ratio::Undefined => UNDEFINED_DISPLAY.to_string(),
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Value(v) => match f.precision() {
                Some(precision) => write!(f, "{:.*}", precision, v),
                None => write!(f, "{}", v),
            },
            Ratio::Undefined => f.pad(UNDEFINED_DISPLAY),
        }
    }
}

impl From<Option<f64>> for Ratio {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Ratio::Value(v),
            _ => Ratio::Undefined,
        }
    }
}

impl From<Ratio> for Option<f64> {
    fn from(ratio: Ratio) -> Self {
        ratio.value()
    }
}
