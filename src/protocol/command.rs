// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command frame construction.
//!
//! Every command is 8 bytes: the `BA AB` sync header, the fixed length
//! byte, a command type, a command code, a 16-bit big-endian parameter and
//! a trailing checksum. The heater has no absolute-set commands; level and
//! temperature changes are expressed as [`PressUp`](Command::PressUp) /
//! [`PressDown`](Command::PressDown) steps.

use std::fmt;

use super::{COMMAND_FRAME_LEN, COMMAND_HEADER, COMMAND_LENGTH, checksum};

/// Command type byte for status queries.
const TYPE_STATUS: u8 = 0xCC;

/// Command type byte for control (button press) commands.
const TYPE_CONTROL: u8 = 0xBB;

/// Builds a raw command frame from type, code and parameter.
///
/// All currently known commands carry a zero parameter; the two parameter
/// bytes exist in the frame layout and are kept for forward compatibility.
///
/// # Examples
///
/// ```
/// use dieselheat_ble::protocol::build_frame;
///
/// let frame = build_frame(0xCC, 0x00, 0);
/// assert_eq!(frame, [0xBA, 0xAB, 0x04, 0xCC, 0x00, 0x00, 0x00, 0x35]);
/// ```
#[must_use]
pub fn build_frame(cmd_type: u8, cmd_code: u8, param: u16) -> [u8; COMMAND_FRAME_LEN] {
    let [param_hi, param_lo] = param.to_be_bytes();
    let mut frame = [
        COMMAND_HEADER[0],
        COMMAND_HEADER[1],
        COMMAND_LENGTH,
        cmd_type,
        cmd_code,
        param_hi,
        param_lo,
        0,
    ];
    frame[7] = checksum(&frame[..7]);
    frame
}

/// A command the heater understands.
///
/// # Examples
///
/// ```
/// use dieselheat_ble::protocol::Command;
///
/// let frame = Command::TogglePower.encode();
/// assert_eq!(frame, [0xBA, 0xAB, 0x04, 0xBB, 0xA1, 0x00, 0x00, 0xC5]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Request a full status frame.
    QueryStatus,
    /// Toggle heater power.
    TogglePower,
    /// Step the active setpoint up by one.
    PressUp,
    /// Step the active setpoint down by one.
    PressDown,
    /// Switch to fan-only mode.
    FanMode,
    /// Switch the display to Celsius.
    UseCelsius,
    /// Switch the display to Fahrenheit.
    UseFahrenheit,
    /// Switch to fixed-level control.
    LevelMode,
    /// Switch to thermostatic control.
    TemperatureMode,
}

impl Command {
    const fn type_byte(self) -> u8 {
        match self {
            Self::QueryStatus => TYPE_STATUS,
            _ => TYPE_CONTROL,
        }
    }

    const fn code_byte(self) -> u8 {
        match self {
            Self::QueryStatus => 0x00,
            Self::TogglePower => 0xA1,
            Self::PressUp => 0xA2,
            Self::PressDown => 0xA3,
            Self::FanMode => 0xA4,
            Self::UseCelsius => 0xA7,
            Self::UseFahrenheit => 0xA8,
            Self::LevelMode => 0xAC,
            Self::TemperatureMode => 0xAD,
        }
    }

    /// Encodes the command as an 8-byte frame ready to write.
    #[must_use]
    pub fn encode(self) -> [u8; COMMAND_FRAME_LEN] {
        build_frame(self.type_byte(), self.code_byte(), 0)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QueryStatus => "QueryStatus",
            Self::TogglePower => "TogglePower",
            Self::PressUp => "PressUp",
            Self::PressDown => "PressDown",
            Self::FanMode => "FanMode",
            Self::UseCelsius => "UseCelsius",
            Self::UseFahrenheit => "UseFahrenheit",
            Self::LevelMode => "LevelMode",
            Self::TemperatureMode => "TemperatureMode",
        };
        write!(f, "{name}")
    }
}
