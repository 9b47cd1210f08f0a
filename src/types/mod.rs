// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for heater state and control.
//!
//! Wire enums decode single status bytes and keep unrecognized values as
//! `Unknown(raw)` instead of failing the parse. Setpoint types ensure
//! values are within the heater's physical range at construction time.
//!
//! # Types
//!
//! - [`OperatingMode`] - Off / Heating / Cooling / Fan Only
//! - [`ControlMode`] - Level / Temperature / Error
//! - [`RunningState`] - combustion cycle detail (glow plug, preheat, ...)
//! - [`TemperatureUnit`] / [`AltitudeUnit`] - display units
//! - [`Level`] - power level setpoint (1-6)
//! - [`TargetTemperature`] - thermostat setpoint (8-36 °C)

mod modes;
mod setpoint;
mod units;

pub use modes::{ControlMode, OperatingMode, RunningState};
pub use setpoint::{Level, TargetTemperature};
pub use units::{AltitudeUnit, TemperatureUnit};
