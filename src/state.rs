// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater state snapshot.

use serde::Serialize;

use crate::types::{AltitudeUnit, ControlMode, OperatingMode, RunningState, TemperatureUnit};

/// A decoded status snapshot of the heater.
///
/// Snapshots are immutable and replaced wholesale on every successful
/// poll. The meaning of [`level_or_target`](Self::level_or_target) depends
/// on [`control_mode`](Self::control_mode): a power level in level mode, a
/// target temperature in temperature mode, and a fault code in error mode.
/// The [`level`](Self::level), [`target_temperature`](Self::target_temperature)
/// and [`error_code`](Self::error_code) accessors apply that
/// disambiguation.
///
/// # Examples
///
/// ```
/// use dieselheat_ble::state::HeaterState;
/// use dieselheat_ble::types::{ControlMode, OperatingMode};
///
/// let state = HeaterState {
///     operating_mode: OperatingMode::Heating,
///     control_mode: ControlMode::Level,
///     level_or_target: 4,
///     ..HeaterState::default()
/// };
///
/// assert!(state.is_on());
/// assert_eq!(state.level(), Some(4));
/// assert_eq!(state.target_temperature(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaterState {
    /// Coarse operating mode.
    pub operating_mode: OperatingMode,
    /// Active control mode.
    pub control_mode: ControlMode,
    /// Level (1-6), target temperature, or fault code depending on
    /// `control_mode`.
    pub level_or_target: u8,
    /// Combustion cycle detail.
    pub running_state: RunningState,
    /// Automatic mode flag.
    pub auto_mode: bool,
    /// Supply voltage in whole volts.
    pub supply_voltage: u8,
    /// Display temperature unit.
    pub temperature_unit: TemperatureUnit,
    /// Ambient temperature in degrees Celsius.
    pub environment_temp: i16,
    /// Combustion chamber temperature in degrees Celsius.
    pub combustion_temp: u16,
    /// Display altitude unit.
    pub altitude_unit: AltitudeUnit,
    /// High altitude (plateau) compensation flag.
    pub high_altitude_mode: bool,
    /// Altitude reading.
    pub altitude: u16,
}

impl HeaterState {
    /// Returns true if the heater is running (any non-idle mode).
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.operating_mode != OperatingMode::Idle
    }

    /// Returns true if the heater is actively heating.
    #[must_use]
    pub fn is_heating(&self) -> bool {
        self.running_state == RunningState::Heating
    }

    /// Returns true if the heater reports a fault.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.control_mode == ControlMode::Error
    }

    /// Returns the fault code if the heater is in error state.
    #[must_use]
    pub fn error_code(&self) -> Option<u8> {
        if self.is_error() {
            Some(self.level_or_target)
        } else {
            None
        }
    }

    /// Returns the current power level if in level mode.
    #[must_use]
    pub fn level(&self) -> Option<u8> {
        if self.control_mode == ControlMode::Level && !self.is_error() {
            Some(self.level_or_target)
        } else {
            None
        }
    }

    /// Returns the target temperature if in temperature mode.
    #[must_use]
    pub fn target_temperature(&self) -> Option<u8> {
        if self.control_mode == ControlMode::Temperature {
            Some(self.level_or_target)
        } else {
            None
        }
    }
}

impl Default for HeaterState {
    fn default() -> Self {
        Self {
            operating_mode: OperatingMode::Idle,
            control_mode: ControlMode::Level,
            level_or_target: 0,
            running_state: RunningState::Idle,
            auto_mode: false,
            supply_voltage: 0,
            temperature_unit: TemperatureUnit::Celsius,
            environment_temp: 0,
            combustion_temp: 0,
            altitude_unit: AltitudeUnit::Meters,
            high_altitude_mode: false,
            altitude: 0,
        }
    }
}
