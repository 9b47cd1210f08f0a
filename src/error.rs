// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `dieselheat_ble` library.
//!
//! This module provides the error hierarchy for failures across the
//! library: value validation, transport communication, and response frame
//! parsing.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when talking
/// to a heater.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred on the wireless link.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response frame.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },
}

/// Errors related to the wireless transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// BLE operation failed.
    #[cfg(feature = "ble")]
    #[error("BLE error: {0}")]
    Ble(#[from] btleplug::Error),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No response arrived within the deadline.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The session is not connected and could not reconnect.
    #[error("not connected")]
    NotConnected,

    /// A required GATT characteristic was not found on the peer.
    #[error("characteristic {0} not found")]
    CharacteristicMissing(uuid::Uuid),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to parsing heater response frames.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The frame is shorter than a full 21-byte response.
    #[error("short response frame: {actual} bytes, need {expected}")]
    ShortFrame {
        /// Number of bytes actually received.
        actual: usize,
        /// Required response length.
        expected: usize,
    },

    /// The frame does not start with the fixed response header.
    #[error("bad response header: {found:02x?}")]
    BadHeader {
        /// The first four bytes of the rejected frame.
        found: [u8; 4],
    },

    /// Fault dictionary configuration could not be decoded.
    #[error("invalid fault table: {0}")]
    InvalidFaultTable(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
