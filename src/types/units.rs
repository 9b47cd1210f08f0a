// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display unit enums reported by the heater.

use std::fmt;

use serde::Serialize;

/// Temperature unit the heater display is configured for.
///
/// The unit only affects the built-in display; all temperatures on the
/// wire are Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TemperatureUnit {
    /// Degrees Celsius.
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
    /// Unrecognized wire value.
    Unknown(u8),
}

impl TemperatureUnit {
    /// Decodes a temperature unit from its wire byte.
    #[must_use]
    pub const fn from_wire(byte: u8) -> Self {
        match byte {
            0 => Self::Celsius,
            1 => Self::Fahrenheit,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw wire byte.
    #[must_use]
    pub const fn raw(&self) -> u8 {
        match self {
            Self::Celsius => 0,
            Self::Fahrenheit => 1,
            Self::Unknown(byte) => *byte,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Celsius => write!(f, "°C"),
            Self::Fahrenheit => write!(f, "°F"),
            Self::Unknown(byte) => write!(f, "Unknown (0x{byte:02X})"),
        }
    }
}

/// Altitude unit the heater display is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AltitudeUnit {
    /// Meters above sea level.
    Meters,
    /// Feet above sea level.
    Feet,
    /// Unrecognized wire value.
    Unknown(u8),
}

impl AltitudeUnit {
    /// Decodes an altitude unit from its wire byte.
    #[must_use]
    pub const fn from_wire(byte: u8) -> Self {
        match byte {
            0 => Self::Meters,
            1 => Self::Feet,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw wire byte.
    #[must_use]
    pub const fn raw(&self) -> u8 {
        match self {
            Self::Meters => 0,
            Self::Feet => 1,
            Self::Unknown(byte) => *byte,
        }
    }
}

impl fmt::Display for AltitudeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meters => write!(f, "m"),
            Self::Feet => write!(f, "ft"),
            Self::Unknown(byte) => write!(f, "Unknown (0x{byte:02X})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_unit_round_trip() {
        assert_eq!(TemperatureUnit::from_wire(0), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::from_wire(1), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::from_wire(9), TemperatureUnit::Unknown(9));
        assert_eq!(TemperatureUnit::Unknown(9).raw(), 9);
    }

    #[test]
    fn altitude_unit_round_trip() {
        assert_eq!(AltitudeUnit::from_wire(0), AltitudeUnit::Meters);
        assert_eq!(AltitudeUnit::from_wire(1), AltitudeUnit::Feet);
        assert_eq!(AltitudeUnit::from_wire(2), AltitudeUnit::Unknown(2));
    }
}
