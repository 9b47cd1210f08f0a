// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater mode enums decoded from status responses.
//!
//! Each enum carries an explicit `Unknown` variant holding the raw wire
//! byte. Firmware revisions differ in which values they emit, so an
//! unrecognized byte must decode to `Unknown` instead of invalidating the
//! whole snapshot.

use std::fmt;

use serde::Serialize;

/// What the heater is currently doing at the coarsest granularity.
///
/// Anything other than [`Idle`](Self::Idle) counts as "on".
///
/// # Examples
///
/// ```
/// use dieselheat_ble::types::OperatingMode;
///
/// assert_eq!(OperatingMode::from_wire(1), OperatingMode::Heating);
/// assert_eq!(OperatingMode::from_wire(3), OperatingMode::Unknown(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperatingMode {
    /// Heater is off.
    Idle,
    /// Heater is producing heat.
    Heating,
    /// Burner is shut down, fan still running to cool the chamber.
    Cooling,
    /// Fan runs without combustion.
    FanOnly,
    /// Unrecognized wire value.
    Unknown(u8),
}

impl OperatingMode {
    /// Decodes an operating mode from its wire byte.
    #[must_use]
    pub const fn from_wire(byte: u8) -> Self {
        match byte {
            0 => Self::Idle,
            1 => Self::Heating,
            2 => Self::Cooling,
            4 => Self::FanOnly,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw wire byte.
    #[must_use]
    pub const fn raw(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Heating => 1,
            Self::Cooling => 2,
            Self::FanOnly => 4,
            Self::Unknown(byte) => *byte,
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Off"),
            Self::Heating => write!(f, "Heating"),
            Self::Cooling => write!(f, "Cooling"),
            Self::FanOnly => write!(f, "Fan Only"),
            Self::Unknown(byte) => write!(f, "Unknown (0x{byte:02X})"),
        }
    }
}

/// How the heater interprets its setpoint.
///
/// In [`Level`](Self::Level) mode the setpoint byte is a power level 1-6,
/// in [`Temperature`](Self::Temperature) mode a target temperature, and in
/// [`Error`](Self::Error) mode a fault code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControlMode {
    /// Fixed power level control (1-6).
    Level,
    /// Thermostatic control towards a target temperature.
    Temperature,
    /// Device reports a fault; the setpoint byte carries the fault code.
    Error,
    /// Unrecognized wire value.
    Unknown(u8),
}

impl ControlMode {
    /// Decodes a control mode from its wire byte.
    #[must_use]
    pub const fn from_wire(byte: u8) -> Self {
        match byte {
            0 => Self::Level,
            1 => Self::Temperature,
            0xFF => Self::Error,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw wire byte.
    #[must_use]
    pub const fn raw(&self) -> u8 {
        match self {
            Self::Level => 0,
            Self::Temperature => 1,
            Self::Error => 0xFF,
            Self::Unknown(byte) => *byte,
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level => write!(f, "Level"),
            Self::Temperature => write!(f, "Temperature"),
            Self::Error => write!(f, "Error"),
            Self::Unknown(byte) => write!(f, "Unknown (0x{byte:02X})"),
        }
    }
}

/// Fine-grained combustion cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RunningState {
    /// Burner idle.
    Idle,
    /// Post-run cool down.
    Cooling,
    /// Glow plug energized for ignition.
    GlowPlug,
    /// Stable combustion.
    Heating,
    /// Warming up towards stable combustion.
    Preheating,
    /// Unrecognized wire value.
    Unknown(u8),
}

impl RunningState {
    /// Decodes a running state from its wire byte.
    #[must_use]
    pub const fn from_wire(byte: u8) -> Self {
        match byte {
            0 => Self::Idle,
            1 => Self::Cooling,
            3 => Self::GlowPlug,
            5 => Self::Heating,
            7 => Self::Preheating,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw wire byte.
    #[must_use]
    pub const fn raw(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Cooling => 1,
            Self::GlowPlug => 3,
            Self::Heating => 5,
            Self::Preheating => 7,
            Self::Unknown(byte) => *byte,
        }
    }
}

impl fmt::Display for RunningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Cooling => write!(f, "Cooling Down"),
            Self::GlowPlug => write!(f, "Glow Plug"),
            Self::Heating => write!(f, "Heating"),
            Self::Preheating => write!(f, "Preheating"),
            Self::Unknown(byte) => write!(f, "Unknown (0x{byte:02X})"),
        }
    }
}
