// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response frame parsing.
//!
//! Status responses are 21 bytes: the fixed `AB BA 11 CC` header, 16
//! payload bytes at fixed offsets, and a trailing checksum. Short or
//! misheaded frames are rejected; everything else parses best-effort.

use super::{RESPONSE_FRAME_LEN, RESPONSE_HEADER, checksum};
use crate::error::ParseError;
use crate::state::HeaterState;
use crate::types::{AltitudeUnit, ControlMode, OperatingMode, RunningState, TemperatureUnit};

/// Parses a 21-byte status response into a [`HeaterState`].
///
/// A checksum mismatch is logged but does not reject the frame: the
/// heaters are known to occasionally emit frames whose checksum byte does
/// not match the payload, and those frames are otherwise usable.
/// Unrecognized enum bytes decode to their `Unknown` variants for the same
/// reason.
///
/// # Errors
///
/// Returns [`ParseError::ShortFrame`] for inputs under 21 bytes and
/// [`ParseError::BadHeader`] when the frame does not open with
/// `AB BA 11 CC`.
///
/// # Examples
///
/// ```
/// use dieselheat_ble::protocol::parse_response;
///
/// let frame = [
///     0xAB, 0xBA, 0x11, 0xCC, // header
///     0x01, 0x00, 0x04, 0x05, // heating, level mode, level 4, burning
///     0x00, 0x13, 0x00, 0x3A, // manual, 19 V, celsius, 28 °C ambient
///     0x00, 0xC8, 0x00, 0x00, // 200 °C combustion, meters, plateau off
///     0x00, 0x64, 0x00, 0x00, // altitude 100
///     0xC5, // checksum
/// ];
/// let state = parse_response(&frame).unwrap();
/// assert_eq!(state.level(), Some(4));
/// assert_eq!(state.supply_voltage, 19);
/// ```
pub fn parse_response(data: &[u8]) -> Result<HeaterState, ParseError> {
    if data.len() < RESPONSE_FRAME_LEN {
        return Err(ParseError::ShortFrame {
            actual: data.len(),
            expected: RESPONSE_FRAME_LEN,
        });
    }

    if data[..4] != RESPONSE_HEADER {
        let mut found = [0u8; 4];
        found.copy_from_slice(&data[..4]);
        return Err(ParseError::BadHeader { found });
    }

    let expected = checksum(&data[..20]);
    if data[20] != expected {
        // Tolerated: some units ship frames with an inconsistent checksum.
        tracing::warn!(
            got = format_args!("{:02x}", data[20]),
            expected = format_args!("{expected:02x}"),
            "response checksum mismatch, parsing anyway"
        );
    }

    Ok(HeaterState {
        operating_mode: OperatingMode::from_wire(data[4]),
        control_mode: ControlMode::from_wire(data[5]),
        level_or_target: data[6],
        running_state: RunningState::from_wire(data[7]),
        auto_mode: data[8] == 1,
        supply_voltage: data[9],
        temperature_unit: TemperatureUnit::from_wire(data[10]),
        environment_temp: i16::from(data[11]) - 30,
        combustion_temp: u16::from_be_bytes([data[12], data[13]]),
        altitude_unit: AltitudeUnit::from_wire(data[14]),
        high_altitude_mode: data[15] == 1,
        altitude: u16::from_be_bytes([data[16], data[17]]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a valid frame from the given payload, appending the correct
    /// checksum.
    fn frame_with_payload(payload: [u8; 16]) -> [u8; RESPONSE_FRAME_LEN] {
        let mut frame = [0u8; RESPONSE_FRAME_LEN];
        frame[..4].copy_from_slice(&RESPONSE_HEADER);
        frame[4..20].copy_from_slice(&payload);
        frame[20] = checksum(&frame[..20]);
        frame
    }

    #[test]
    fn rejects_short_frames() {
        for len in 0..RESPONSE_FRAME_LEN {
            let data = vec![0u8; len];
            let err = parse_response(&data).unwrap_err();
            assert_eq!(
                err,
                ParseError::ShortFrame {
                    actual: len,
                    expected: RESPONSE_FRAME_LEN
                }
            );
        }
    }

    #[test]
    fn rejects_bad_header() {
        let mut frame = frame_with_payload([0; 16]);
        frame[0] = 0xBA;
        frame[1] = 0xAB;
        let err = parse_response(&frame).unwrap_err();
        assert_eq!(
            err,
            ParseError::BadHeader {
                found: [0xBA, 0xAB, 0x11, 0xCC]
            }
        );
    }

    #[test]
    fn tolerates_checksum_mismatch() {
        let mut frame = frame_with_payload([
            0x01, 0x00, 0x04, 0x05, 0x00, 0x13, 0x00, 0x3A, 0x00, 0xC8, 0x00, 0x00, 0x00, 0x64,
            0x00, 0x00,
        ]);
        frame[20] = frame[20].wrapping_add(1);

        let state = parse_response(&frame).unwrap();
        assert_eq!(state.level(), Some(4));
        assert_eq!(state.supply_voltage, 19);
    }

    #[test]
    fn decodes_full_status_frame() {
        let frame = frame_with_payload([
            0x01, 0x00, 0x04, 0x05, 0x00, 0x13, 0x00, 0x3A, 0x00, 0xC8, 0x00, 0x00, 0x00, 0x64,
            0x00, 0x00,
        ]);

        let state = parse_response(&frame).unwrap();
        assert_eq!(state.operating_mode, OperatingMode::Heating);
        assert_eq!(state.control_mode, ControlMode::Level);
        assert_eq!(state.level(), Some(4));
        assert_eq!(state.running_state, RunningState::Heating);
        assert!(!state.auto_mode);
        assert_eq!(state.supply_voltage, 19);
        assert_eq!(state.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(state.environment_temp, 0x3A - 30);
        assert_eq!(state.combustion_temp, 200);
        assert_eq!(state.altitude_unit, AltitudeUnit::Meters);
        assert!(!state.high_altitude_mode);
        assert_eq!(state.altitude, 100);
        assert!(state.is_on());
        assert!(state.is_heating());
    }

    #[test]
    fn unknown_enum_byte_does_not_invalidate_snapshot() {
        let frame = frame_with_payload([
            0x03, 0x00, 0x02, 0x05, 0x00, 0x0C, 0x00, 0x28, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ]);

        let state = parse_response(&frame).unwrap();
        assert_eq!(state.operating_mode, OperatingMode::Unknown(0x03));
        // Non-idle, even if unrecognized.
        assert!(state.is_on());
        assert_eq!(state.level(), Some(2));
    }

    #[test]
    fn environment_temp_can_go_negative() {
        // Raw byte 0x05 means 5 - 30 = -25 °C.
        let frame = frame_with_payload([
            0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ]);
        let state = parse_response(&frame).unwrap();
        assert_eq!(state.environment_temp, -25);
    }

    #[test]
    fn error_frame_exposes_fault_code() {
        let frame = frame_with_payload([
            0x01, 0xFF, 0x07, 0x00, 0x00, 0x0C, 0x00, 0x28, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ]);
        let state = parse_response(&frame).unwrap();
        assert!(state.is_error());
        assert_eq!(state.error_code(), Some(0x07));
        assert_eq!(state.level(), None);
        assert_eq!(state.target_temperature(), None);
    }

    #[test]
    fn extra_trailing_bytes_are_ignored() {
        let frame = frame_with_payload([0; 16]);
        let mut long = frame.to_vec();
        long.extend_from_slice(&[0xDE, 0xAD]);
        assert!(parse_response(&long).is_ok());
    }

    #[test]
    fn captured_heating_frame_decodes() {
        // AB BA 11 CC 01 00 04 05 00 13 00 3A 00 C8 00 00 00 64 00 00 + checksum
        let mut frame = [
            0xAB, 0xBA, 0x11, 0xCC, 0x01, 0x00, 0x04, 0x05, 0x00, 0x13, 0x00, 0x3A, 0x00, 0xC8,
            0x00, 0x00, 0x00, 0x64, 0x00, 0x00, 0x00,
        ];
        frame[20] = checksum(&frame[..20]);

        let state = parse_response(&frame).unwrap();
        assert_eq!(state.operating_mode, OperatingMode::Heating);
        assert_eq!(state.control_mode, ControlMode::Level);
        assert_eq!(state.level(), Some(4));
        assert_eq!(state.running_state, RunningState::Heating);
        assert_eq!(state.supply_voltage, 19);
        assert_eq!(state.environment_temp, 28);
        assert_eq!(state.combustion_temp, 200);
        assert_eq!(state.altitude, 100);
    }
}
