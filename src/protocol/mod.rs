// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol for BLE diesel heaters.
//!
//! The heater speaks a fixed binary protocol over a GATT link with one
//! write characteristic and one notify characteristic: 8-byte command
//! frames out, 21-byte status frames back. This module provides the frame
//! codec ([`Command`], [`parse_response`]), the transport seam
//! ([`Transport`]), the single-flight exchange session
//! ([`HeaterSession`]), and the `btleplug`-backed transport
//! (`BleTransport`, feature `ble`).

mod command;
mod response;
mod session;

#[cfg(feature = "ble")]
mod ble;

pub use command::{Command, build_frame};
pub use response::parse_response;
pub use session::{HeaterSession, SessionConfig};

#[cfg(feature = "ble")]
pub use ble::{BleResolver, BleTransport};

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::{Uuid, uuid};

use crate::error::ProtocolError;

/// GATT service advertised by the heater.
pub const SERVICE_UUID: Uuid = uuid!("0000fff0-0000-1000-8000-00805f9b34fb");

/// Characteristic commands are written to.
pub const WRITE_CHARACTERISTIC_UUID: Uuid = uuid!("0000fff2-0000-1000-8000-00805f9b34fb");

/// Characteristic status responses are notified on.
pub const NOTIFY_CHARACTERISTIC_UUID: Uuid = uuid!("0000fff1-0000-1000-8000-00805f9b34fb");

/// Two-byte sync header opening every command frame.
pub const COMMAND_HEADER: [u8; 2] = [0xBA, 0xAB];

/// Fixed payload length byte of a command frame.
pub const COMMAND_LENGTH: u8 = 0x04;

/// Total size of a command frame.
pub const COMMAND_FRAME_LEN: usize = 8;

/// Four-byte header opening every response frame.
pub const RESPONSE_HEADER: [u8; 4] = [0xAB, 0xBA, 0x11, 0xCC];

/// Total size of a response frame.
pub const RESPONSE_FRAME_LEN: usize = 21;

/// Computes the frame checksum: sum of all bytes modulo 256.
///
/// # Examples
///
/// ```
/// use dieselheat_ble::protocol::checksum;
///
/// assert_eq!(checksum(&[0xBA, 0xAB, 0x04, 0xCC, 0x00, 0x00, 0x00]), 0x35);
/// ```
#[must_use]
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

/// Formats a frame as lowercase hex for log output.
pub(crate) fn hex(data: &[u8]) -> String {
    use std::fmt::Write;

    data.iter().fold(String::new(), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Events delivered by a [`Transport`] after a successful connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A notification frame arrived from the device.
    Notification(Vec<u8>),
    /// The transport lost the link without being asked to.
    Disconnected,
}

/// Trait for transports carrying heater frames.
///
/// A transport owns the platform link to one heater and reports inbound
/// traffic through the channel returned by [`connect`](Self::connect). The
/// channel closing (or an explicit [`LinkEvent::Disconnected`]) means the
/// link is gone; [`HeaterSession`] reconnects on the next request.
///
/// The provided `BleTransport` talks real hardware; tests implement this
/// trait with an in-memory mock.
#[async_trait]
pub trait Transport: Send {
    /// Handle to the underlying peer, swappable while the session lives.
    type Peer: Send;

    /// Opens the link and subscribes to inbound notifications.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the link cannot be established.
    async fn connect(&mut self) -> Result<mpsc::Receiver<LinkEvent>, ProtocolError>;

    /// Writes one command frame, without requiring a link-level ack.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the write fails.
    async fn write(&mut self, frame: &[u8]) -> Result<(), ProtocolError>;

    /// Tears the link down.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the platform reports a teardown failure;
    /// callers treat this as best-effort.
    async fn disconnect(&mut self) -> Result<(), ProtocolError>;

    /// Replaces the peer handle used by the next [`connect`](Self::connect).
    ///
    /// Platforms rotate the handle behind a stable device address; a live
    /// link is left untouched. Returns true if the handle actually
    /// changed.
    fn set_peer(&mut self, peer: Self::Peer) -> bool;
}
