// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory heater simulation shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use dieselheat_ble::protocol::{LinkEvent, RESPONSE_HEADER, Transport, checksum};
use dieselheat_ble::{PeerResolver, ProtocolError};

/// Wire bytes for the commands the simulator reacts to.
const TYPE_STATUS: u8 = 0xCC;
const TYPE_CONTROL: u8 = 0xBB;
const CODE_TOGGLE_POWER: u8 = 0xA1;
const CODE_UP: u8 = 0xA2;
const CODE_DOWN: u8 = 0xA3;
const CODE_FAN: u8 = 0xA4;
const CODE_CELSIUS: u8 = 0xA7;
const CODE_FAHRENHEIT: u8 = 0xA8;
const CODE_LEVEL_MODE: u8 = 0xAC;
const CODE_TEMP_MODE: u8 = 0xAD;

/// A scriptable heater with just enough behavior for the protocol flows.
#[derive(Debug)]
pub struct SimHeater {
    /// Wire byte for operating mode (0 = idle, 1 = heating).
    pub operating_mode: u8,
    /// Wire byte for control mode (0 = level, 1 = temperature).
    pub control_mode: u8,
    pub level: u8,
    pub target_temp: u8,
    pub temperature_unit: u8,
    /// When false the heater swallows every frame (response timeouts).
    pub respond: bool,
    /// Stop responding after this many presses, if set.
    pub mute_after_presses: Option<usize>,
    pub presses_up: usize,
    pub presses_down: usize,
    pub mode_switches: usize,
    pub power_toggles: usize,
}

impl Default for SimHeater {
    fn default() -> Self {
        Self {
            operating_mode: 1,
            control_mode: 0,
            level: 2,
            target_temp: 20,
            temperature_unit: 0,
            respond: true,
            mute_after_presses: None,
            presses_up: 0,
            presses_down: 0,
            mode_switches: 0,
            power_toggles: 0,
        }
    }
}

impl SimHeater {
    /// Builds the current 21-byte status frame.
    pub fn status_frame(&self) -> Vec<u8> {
        let value = if self.control_mode == 1 {
            self.target_temp
        } else {
            self.level
        };
        let mut frame = vec![0u8; 21];
        frame[..4].copy_from_slice(&RESPONSE_HEADER);
        frame[4] = self.operating_mode;
        frame[5] = self.control_mode;
        frame[6] = value;
        frame[7] = 5; // running state: heating
        frame[9] = 12; // supply voltage
        frame[10] = self.temperature_unit;
        frame[11] = 48; // 18 °C ambient
        frame[20] = checksum(&frame[..20]);
        frame
    }

    fn handle(&mut self, frame: &[u8]) -> Option<Vec<u8>> {
        let pressed = self.presses_up + self.presses_down;
        let muted = self.mute_after_presses.is_some_and(|limit| pressed >= limit);

        match (frame[3], frame[4]) {
            (TYPE_STATUS, _) => {}
            (TYPE_CONTROL, CODE_TOGGLE_POWER) => {
                self.power_toggles += 1;
                self.operating_mode = u8::from(self.operating_mode == 0);
            }
            (TYPE_CONTROL, CODE_UP) => {
                self.presses_up += 1;
                if self.control_mode == 1 {
                    self.target_temp += 1;
                } else {
                    self.level += 1;
                }
            }
            (TYPE_CONTROL, CODE_DOWN) => {
                self.presses_down += 1;
                if self.control_mode == 1 {
                    self.target_temp -= 1;
                } else {
                    self.level -= 1;
                }
            }
            (TYPE_CONTROL, CODE_FAN) => self.operating_mode = 4,
            (TYPE_CONTROL, CODE_CELSIUS) => self.temperature_unit = 0,
            (TYPE_CONTROL, CODE_FAHRENHEIT) => self.temperature_unit = 1,
            (TYPE_CONTROL, CODE_LEVEL_MODE) => {
                self.mode_switches += 1;
                self.control_mode = 0;
            }
            (TYPE_CONTROL, CODE_TEMP_MODE) => {
                self.mode_switches += 1;
                self.control_mode = 1;
            }
            _ => return None,
        }

        if self.respond && !muted {
            Some(self.status_frame())
        } else {
            None
        }
    }
}

/// Call log kept outside the transport so tests can inspect it after the
/// transport moved into the session.
#[derive(Debug, Default)]
pub struct Calls {
    pub connects: usize,
    pub writes: Vec<Vec<u8>>,
    pub peer_swaps: Vec<u32>,
}

/// Transport over a [`SimHeater`], with an externally drivable link.
pub struct MockTransport {
    pub heater: Arc<Mutex<SimHeater>>,
    pub calls: Arc<Mutex<Calls>>,
    /// Sender for the current link, for injecting unsolicited events.
    pub link: Arc<Mutex<Option<mpsc::Sender<LinkEvent>>>>,
    pub fail_connect: bool,
    peer: u32,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            heater: Arc::new(Mutex::new(SimHeater::default())),
            calls: Arc::new(Mutex::new(Calls::default())),
            link: Arc::new(Mutex::new(None)),
            fail_connect: false,
            peer: 0,
        }
    }

    /// Handles to the shared pieces, to keep after the transport moves
    /// into a session.
    pub fn handles(
        &self,
    ) -> (
        Arc<Mutex<SimHeater>>,
        Arc<Mutex<Calls>>,
        Arc<Mutex<Option<mpsc::Sender<LinkEvent>>>>,
    ) {
        (
            Arc::clone(&self.heater),
            Arc::clone(&self.calls),
            Arc::clone(&self.link),
        )
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Peer = u32;

    async fn connect(&mut self) -> Result<mpsc::Receiver<LinkEvent>, ProtocolError> {
        if self.fail_connect {
            return Err(ProtocolError::ConnectionFailed("simulated".to_string()));
        }
        self.calls.lock().connects += 1;
        let (tx, rx) = mpsc::channel(8);
        *self.link.lock() = Some(tx);
        Ok(rx)
    }

    async fn write(&mut self, frame: &[u8]) -> Result<(), ProtocolError> {
        self.calls.lock().writes.push(frame.to_vec());
        let reply = self.heater.lock().handle(frame);
        if let (Some(tx), Some(reply)) = (self.link.lock().clone(), reply) {
            let _ = tx.try_send(LinkEvent::Notification(reply));
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ProtocolError> {
        *self.link.lock() = None;
        Ok(())
    }

    fn set_peer(&mut self, peer: u32) -> bool {
        self.calls.lock().peer_swaps.push(peer);
        let changed = peer != self.peer;
        self.peer = peer;
        changed
    }
}

/// Resolver returning a scripted peer handle.
#[derive(Debug, Default)]
pub struct MockResolver {
    pub peer: Mutex<Option<u32>>,
}

impl MockResolver {
    pub fn with_peer(peer: u32) -> Self {
        Self {
            peer: Mutex::new(Some(peer)),
        }
    }
}

#[async_trait]
impl PeerResolver for MockResolver {
    type Peer = u32;

    async fn resolve(&self, _address: &str) -> Option<u32> {
        *self.peer.lock()
    }
}
