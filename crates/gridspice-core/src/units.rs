//! Engineering unit prefixes for component values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// SI prefix attached to a component value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueUnit {
    #[default]
    One,
    Kilo,
    Milli,
    Micro,
    Nano,
    Pico,
}

impl ValueUnit {
    /// SPICE-style suffix appended to a numeric value.
    pub fn suffix(self) -> &'static str {
        match self {
            ValueUnit::One => "",
            ValueUnit::Kilo => "k",
            ValueUnit::Milli => "m",
            ValueUnit::Micro => "u",
            ValueUnit::Nano => "n",
            ValueUnit::Pico => "p",
        }
    }

    /// Multiplier the suffix stands for.
    pub fn scale(self) -> f64 {
        match self {
            ValueUnit::One => 1.0,
            ValueUnit::Kilo => 1e3,
            ValueUnit::Milli => 1e-3,
            ValueUnit::Micro => 1e-6,
            ValueUnit::Nano => 1e-9,
            ValueUnit::Pico => 1e-12,
        }
    }
}

impl fmt::Display for ValueUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Format a value and unit the way device lines write them (`47k`, `100n`).
pub fn format_value(value: u32, unit: ValueUnit) -> String {
    format!("{}{}", value, unit.suffix())
}
