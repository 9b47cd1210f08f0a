// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection session with single-flight request/response exchange.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify, mpsc};
use tokio::time::Instant;

use super::{Command, LinkEvent, Transport};
use crate::error::ProtocolError;

/// Configuration for a [`HeaterSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long to wait for the notification answering a command.
    pub response_timeout: Duration,
}

impl SessionConfig {
    /// Sets the response timeout.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(5),
        }
    }
}

/// State shared with the link event pump.
///
/// The pump mutates this without holding the session lock, so that an
/// unsolicited disconnect can never deadlock against a blocked exchange.
#[derive(Debug)]
struct Shared {
    /// Last captured notification frame; a single slot, overwritten.
    response: parking_lot::Mutex<Option<Vec<u8>>>,
    /// Wakes the exchange currently waiting for a response.
    notify: Notify,
    /// True while an exchange is waiting; notifications arriving outside
    /// an exchange are discarded.
    waiting: AtomicBool,
    /// Link liveness as last reported by the transport.
    link_up: AtomicBool,
    /// Incremented on every connect and disconnect so a pump left over
    /// from a previous link cannot touch the current one.
    generation: AtomicU64,
}

/// Session owning the wireless link to one heater.
///
/// The device accepts only one pending transaction, so the whole
/// connect-write-wait sequence runs under one async lock: concurrent
/// callers queue up first-come-first-served and never interleave frames.
/// The transport is connected lazily on first use and transparently
/// reconnected after a link loss.
///
/// # Examples
///
/// ```ignore
/// use dieselheat_ble::protocol::{BleTransport, Command, HeaterSession};
///
/// let session = HeaterSession::new(BleTransport::new(peripheral));
/// let frame = session.request(Command::QueryStatus).await?;
/// ```
#[derive(Debug)]
pub struct HeaterSession<T: Transport> {
    /// Transport behind the session lock; holding the lock IS the
    /// exclusive right to run an exchange.
    transport: Mutex<T>,
    shared: Arc<Shared>,
    config: SessionConfig,
}

impl<T: Transport> HeaterSession<T> {
    /// Creates a session with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Creates a session with a custom configuration.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Self {
            transport: Mutex::new(transport),
            shared: Arc::new(Shared {
                response: parking_lot::Mutex::new(None),
                notify: Notify::new(),
                waiting: AtomicBool::new(false),
                link_up: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
            config,
        }
    }

    /// Returns true if the link is currently up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.link_up.load(Ordering::Acquire)
    }

    /// Connects the transport if it is not already connected.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the link cannot be established. The
    /// session stays disconnected and may be retried.
    pub async fn connect(&self) -> Result<(), ProtocolError> {
        let mut transport = self.transport.lock().await;
        self.connect_locked(&mut transport).await
    }

    /// Replaces the peer handle used by future connects.
    ///
    /// Waits for any exchange in flight to finish, then swaps the handle.
    /// Returns true if the handle actually changed.
    pub async fn update_peer(&self, peer: T::Peer) -> bool {
        let mut transport = self.transport.lock().await;
        let changed = transport.set_peer(peer);
        if changed {
            tracing::debug!("peer handle updated");
        }
        changed
    }

    /// Sends a command without waiting for a response.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if connecting or writing fails.
    pub async fn send(&self, command: Command) -> Result<(), ProtocolError> {
        let mut transport = self.transport.lock().await;
        self.connect_locked(&mut transport).await?;
        self.write_locked(&mut transport, command).await
    }

    /// Sends a command and waits for the answering notification.
    ///
    /// Returns the raw response frame. At most one exchange is in flight
    /// at any time; concurrent callers wait for the lock.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] if no notification arrives
    /// within the configured deadline, or another `ProtocolError` if
    /// connecting or writing fails. The session remains usable after any
    /// failure.
    pub async fn request(&self, command: Command) -> Result<Vec<u8>, ProtocolError> {
        let mut transport = self.transport.lock().await;
        self.connect_locked(&mut transport).await?;

        // Drop whatever a previous exchange may have left behind.
        *self.shared.response.lock() = None;
        self.shared.waiting.store(true, Ordering::Release);

        let result = match self.write_locked(&mut transport, command).await {
            Ok(()) => self.wait_response().await,
            Err(err) => Err(err),
        };

        self.shared.waiting.store(false, Ordering::Release);
        result
    }

    /// Disconnects the transport, best-effort.
    ///
    /// Teardown errors are logged and swallowed; the session is marked
    /// disconnected regardless and reconnects on the next request.
    pub async fn disconnect(&self) {
        let mut transport = self.transport.lock().await;
        // Detach any pump still running for this link.
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
        self.shared.link_up.store(false, Ordering::Release);
        if let Err(err) = transport.disconnect().await {
            tracing::debug!(error = %err, "error during disconnect");
        }
    }

    async fn connect_locked(&self, transport: &mut T) -> Result<(), ProtocolError> {
        if self.shared.link_up.load(Ordering::Acquire) {
            return Ok(());
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let events = transport.connect().await.inspect_err(|err| {
            tracing::error!(error = %err, "failed to connect");
        })?;
        self.shared.link_up.store(true, Ordering::Release);
        spawn_pump(Arc::clone(&self.shared), events, generation);
        tracing::debug!("connected");
        Ok(())
    }

    async fn write_locked(&self, transport: &mut T, command: Command) -> Result<(), ProtocolError> {
        let frame = command.encode();
        tracing::debug!(%command, frame = %super::hex(&frame), "sending command");
        transport.write(&frame).await.inspect_err(|err| {
            tracing::error!(error = %err, "failed to send command");
            // Assume the link is gone; the next request reconnects.
            self.shared.link_up.store(false, Ordering::Release);
        })
    }

    async fn wait_response(&self) -> Result<Vec<u8>, ProtocolError> {
        // Safe: timeout in practical use will never exceed u64::MAX milliseconds
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = self.config.response_timeout.as_millis() as u64;
        let deadline = Instant::now() + self.config.response_timeout;

        loop {
            if let Some(frame) = self.shared.response.lock().take() {
                return Ok(frame);
            }
            // The loop absorbs permits left by notifications from earlier
            // exchanges: an empty slot means wait again.
            if tokio::time::timeout_at(deadline, self.shared.notify.notified())
                .await
                .is_err()
            {
                tracing::warn!(timeout_ms, "no response from heater");
                return Err(ProtocolError::Timeout(timeout_ms));
            }
        }
    }
}

/// Forwards link events into the shared session state.
///
/// Runs without the session lock; `generation` fences it off once the
/// session reconnects or shuts the link down.
fn spawn_pump(shared: Arc<Shared>, mut events: mpsc::Receiver<LinkEvent>, generation: u64) {
    tokio::spawn(async move {
        loop {
            let event = events.recv().await;
            if shared.generation.load(Ordering::Acquire) != generation {
                return;
            }
            match event {
                Some(LinkEvent::Notification(frame)) => {
                    if shared.waiting.load(Ordering::Acquire) {
                        tracing::debug!(frame = %super::hex(&frame), "received notification");
                        *shared.response.lock() = Some(frame);
                        shared.notify.notify_one();
                    } else {
                        tracing::debug!(
                            frame = %super::hex(&frame),
                            "notification with no exchange pending, discarded"
                        );
                    }
                }
                Some(LinkEvent::Disconnected) | None => {
                    shared.link_up.store(false, Ordering::Release);
                    tracing::debug!("link lost");
                    return;
                }
            }
        }
    });
}
