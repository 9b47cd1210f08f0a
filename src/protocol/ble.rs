// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BLE transport backed by `btleplug`.

use async_trait::async_trait;
use btleplug::api::{Central, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::{Adapter, Peripheral};
use futures::StreamExt;
use tokio::sync::mpsc;

use super::{LinkEvent, NOTIFY_CHARACTERISTIC_UUID, Transport, WRITE_CHARACTERISTIC_UUID};
use crate::coordinator::PeerResolver;
use crate::error::ProtocolError;

/// Capacity of the link event channel; the heater answers one frame per
/// command, so a small buffer is plenty.
const EVENT_CHANNEL_CAPACITY: usize = 8;

/// GATT transport to one heater.
///
/// Writes go to the `FFF2` characteristic without a link-level ack, status
/// frames arrive as notifications on `FFF1`. The notification stream
/// ending is reported as [`LinkEvent::Disconnected`].
///
/// # Examples
///
/// ```ignore
/// use btleplug::api::{Central, Manager as _, ScanFilter};
/// use btleplug::platform::Manager;
/// use dieselheat_ble::protocol::{BleTransport, HeaterSession};
///
/// let manager = Manager::new().await?;
/// let adapter = manager.adapters().await?.remove(0);
/// adapter.start_scan(ScanFilter::default()).await?;
/// // ... pick the heater peripheral from adapter.peripherals() ...
/// let session = HeaterSession::new(BleTransport::new(peripheral));
/// ```
#[derive(Debug)]
pub struct BleTransport {
    peripheral: Peripheral,
    /// Handle to switch to on the next connect, when the platform has
    /// rotated the peripheral behind the same address.
    pending_peer: Option<Peripheral>,
    write_char: Option<Characteristic>,
}

impl BleTransport {
    /// Creates a transport for the given peripheral.
    ///
    /// The link is not opened here; the session connects lazily on first
    /// use.
    #[must_use]
    pub fn new(peripheral: Peripheral) -> Self {
        Self {
            peripheral,
            pending_peer: None,
            write_char: None,
        }
    }

    /// Returns the peer address as reported by the platform.
    #[must_use]
    pub fn address(&self) -> String {
        self.peripheral.address().to_string()
    }
}

#[async_trait]
impl Transport for BleTransport {
    type Peer = Peripheral;

    async fn connect(&mut self) -> Result<mpsc::Receiver<LinkEvent>, ProtocolError> {
        if let Some(peer) = self.pending_peer.take() {
            self.peripheral = peer;
        }

        self.peripheral.connect().await?;
        self.peripheral.discover_services().await?;

        let characteristics = self.peripheral.characteristics();
        let write_char = characteristics
            .iter()
            .find(|c| c.uuid == WRITE_CHARACTERISTIC_UUID)
            .cloned()
            .ok_or(ProtocolError::CharacteristicMissing(
                WRITE_CHARACTERISTIC_UUID,
            ))?;
        let notify_char = characteristics
            .iter()
            .find(|c| c.uuid == NOTIFY_CHARACTERISTIC_UUID)
            .cloned()
            .ok_or(ProtocolError::CharacteristicMissing(
                NOTIFY_CHARACTERISTIC_UUID,
            ))?;

        self.peripheral.subscribe(&notify_char).await?;
        let mut notifications = self.peripheral.notifications().await?;
        self.write_char = Some(write_char);

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            while let Some(notification) = notifications.next().await {
                if notification.uuid != NOTIFY_CHARACTERISTIC_UUID {
                    continue;
                }
                if tx
                    .send(LinkEvent::Notification(notification.value))
                    .await
                    .is_err()
                {
                    // Session is gone, nothing left to notify.
                    return;
                }
            }
            let _ = tx.send(LinkEvent::Disconnected).await;
        });

        tracing::debug!(address = %self.peripheral.address(), "BLE link established");
        Ok(rx)
    }

    async fn write(&mut self, frame: &[u8]) -> Result<(), ProtocolError> {
        let characteristic = self.write_char.as_ref().ok_or(ProtocolError::NotConnected)?;
        self.peripheral
            .write(characteristic, frame, WriteType::WithoutResponse)
            .await?;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ProtocolError> {
        self.write_char = None;
        self.peripheral.disconnect().await?;
        Ok(())
    }

    fn set_peer(&mut self, peer: Peripheral) -> bool {
        let changed = peer.id() != self.peripheral.id();
        self.pending_peer = Some(peer);
        changed
    }
}

/// Resolves heater peripherals by address from a platform adapter.
///
/// The adapter's discovery cache is consulted passively; scanning is the
/// host platform's responsibility. On platforms that hide MAC addresses
/// (macOS), the reported address is a platform UUID and must be matched
/// accordingly.
#[derive(Debug)]
pub struct BleResolver {
    adapter: Adapter,
}

impl BleResolver {
    /// Creates a resolver over the given adapter.
    #[must_use]
    pub fn new(adapter: Adapter) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl PeerResolver for BleResolver {
    type Peer = Peripheral;

    async fn resolve(&self, address: &str) -> Option<Peripheral> {
        let peripherals = match self.adapter.peripherals().await {
            Ok(peripherals) => peripherals,
            Err(err) => {
                tracing::debug!(error = %err, "failed to enumerate peripherals");
                return None;
            }
        };

        peripherals
            .into_iter()
            .find(|peripheral| peripheral.address().to_string().eq_ignore_ascii_case(address))
    }
}
