//! Conversion between canonical millimetres and display units.
//!
//! Every length stored in the model is in millimetres. Values are divided by
//! the unit scale factor only when they leave the core (export records, names,
//! CLI output) and multiplied by it when user input enters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::MM_PER_INCH;
use crate::error::CamError;

/// Display/output unit of measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Millimeters,
    Inches,
}

impl Units {
    /// Number of canonical millimetres in one display unit.
    pub fn scale(&self) -> f64 {
        match self {
            Units::Millimeters => 1.0,
            Units::Inches => MM_PER_INCH,
        }
    }

    /// Convert a canonical millimetre value into this unit.
    #[inline]
    pub fn to_display(&self, value_mm: f64) -> f64 {
        value_mm / self.scale()
    }

    /// Convert a value in this unit into canonical millimetres.
    #[inline]
    pub fn to_canonical(&self, value: f64) -> f64 {
        value * self.scale()
    }

    /// Short unit suffix used in tool names.
    pub fn suffix(&self) -> &'static str {
        match self {
            Units::Millimeters => "mm",
            Units::Inches => "inch",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl FromStr for Units {
    type Err = CamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "metric" | "millimeters" => Ok(Units::Millimeters),
            "inch" | "in" | "inches" | "imperial" => Ok(Units::Inches),
            _ => Err(CamError::UnknownUnits {
                value: s.to_string(),
            }),
        }
    }
}
