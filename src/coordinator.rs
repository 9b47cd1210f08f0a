// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling coordinator: authoritative state and high-level intents.
//!
//! The coordinator owns the published [`HeaterState`] snapshot, refreshes
//! it periodically through a [`HeaterSession`], and translates
//! target-value intents into the button-press sequences the heater
//! actually understands.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::protocol::{Command, HeaterSession, Transport, parse_response};
use crate::state::HeaterState;
use crate::types::{ControlMode, Level, TargetTemperature, TemperatureUnit};

/// Default polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Resolves the platform's current peer handle for a device address.
///
/// The device address is stable, but platforms may rotate the transport
/// handle behind it. The coordinator re-resolves on every refresh and
/// swaps a changed handle into the session. `BleResolver` implements this
/// over a `btleplug` adapter; platforms without handle rotation can use
/// [`FixedPeer`].
#[async_trait]
pub trait PeerResolver: Send + Sync {
    /// Peer handle type, matching the transport's.
    type Peer: Send;

    /// Returns the current handle for `address`, if the platform knows
    /// one.
    async fn resolve(&self, address: &str) -> Option<Self::Peer>;
}

/// Resolver for platforms whose peer handles never rotate.
pub struct FixedPeer<P>(std::marker::PhantomData<fn() -> P>);

impl<P> FixedPeer<P> {
    /// Creates the no-op resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self(std::marker::PhantomData)
    }
}

impl<P> Default for FixedPeer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for FixedPeer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FixedPeer")
    }
}

#[async_trait]
impl<P: Send> PeerResolver for FixedPeer<P> {
    type Peer = P;

    async fn resolve(&self, _address: &str) -> Option<P> {
        None
    }
}

/// Configuration for a [`HeaterCoordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Interval between scheduled refreshes.
    pub poll_interval: Duration,
}

impl CoordinatorConfig {
    /// Sets the polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Bookkeeping about the refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStatus {
    /// Whether the most recent refresh succeeded.
    pub last_refresh_ok: bool,
    /// Number of refresh failures since the last success.
    pub consecutive_failures: u32,
    /// When a refresh was last attempted.
    pub last_attempt: Option<DateTime<Utc>>,
    /// When a refresh last succeeded.
    pub last_success: Option<DateTime<Utc>>,
}

/// Coordinator for one heater.
///
/// Owns the authoritative state snapshot and the intent surface. All
/// traffic funnels through the session's exchange lock, so scheduled
/// refreshes and on-demand intents serialize first-come-first-served.
///
/// Intents return `bool`: a command that got an answer counts as
/// accepted, and the refresh forced afterwards keeps the snapshot
/// honest. A failed refresh never clears the previous snapshot.
///
/// # Examples
///
/// ```ignore
/// use dieselheat_ble::coordinator::HeaterCoordinator;
/// use dieselheat_ble::protocol::{BleResolver, BleTransport, HeaterSession};
/// use dieselheat_ble::types::Level;
///
/// let session = HeaterSession::new(BleTransport::new(peripheral));
/// let coordinator = HeaterCoordinator::new(session, BleResolver::new(adapter), address);
///
/// let state = coordinator.refresh().await?;
/// if state.is_on() {
///     coordinator.set_level(Level::new(4)?).await;
/// }
/// ```
#[derive(Debug)]
pub struct HeaterCoordinator<T: Transport, R: PeerResolver<Peer = T::Peer>> {
    session: HeaterSession<T>,
    resolver: R,
    address: String,
    state_tx: watch::Sender<Option<HeaterState>>,
    status: parking_lot::Mutex<RefreshStatus>,
    config: CoordinatorConfig,
}

impl<T, R> HeaterCoordinator<T, R>
where
    T: Transport,
    R: PeerResolver<Peer = T::Peer>,
{
    /// Creates a coordinator with the default configuration.
    pub fn new(session: HeaterSession<T>, resolver: R, address: impl Into<String>) -> Self {
        Self::with_config(session, resolver, address, CoordinatorConfig::default())
    }

    /// Creates a coordinator with a custom configuration.
    pub fn with_config(
        session: HeaterSession<T>,
        resolver: R,
        address: impl Into<String>,
        config: CoordinatorConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(None);
        Self {
            session,
            resolver,
            address: address.into(),
            state_tx,
            status: parking_lot::Mutex::new(RefreshStatus::default()),
            config,
        }
    }

    /// Returns the device address this coordinator polls.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the last successfully decoded snapshot, if any.
    #[must_use]
    pub fn current_state(&self) -> Option<HeaterState> {
        *self.state_tx.borrow()
    }

    /// Creates a watch receiver for snapshot updates.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<Option<HeaterState>> {
        self.state_tx.subscribe()
    }

    /// Returns refresh cycle bookkeeping.
    #[must_use]
    pub fn refresh_status(&self) -> RefreshStatus {
        self.status.lock().clone()
    }

    /// Polls the heater and replaces the published snapshot.
    ///
    /// Re-resolves the peer handle first, swapping a rotated handle into
    /// the session. On failure the previous snapshot stays published and
    /// the cycle is recorded as failed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` when the exchange fails and
    /// `Error::Parse` when the response frame is rejected.
    pub async fn refresh(&self) -> Result<HeaterState, Error> {
        if let Some(peer) = self.resolver.resolve(&self.address).await {
            self.session.update_peer(peer).await;
        }

        let attempted_at = Utc::now();
        let result = self.query_state().await;
        let mut status = self.status.lock();
        status.last_attempt = Some(attempted_at);
        match &result {
            Ok(state) => {
                status.last_refresh_ok = true;
                status.consecutive_failures = 0;
                status.last_success = Some(attempted_at);
                drop(status);
                self.state_tx.send_replace(Some(*state));
            }
            Err(err) => {
                status.last_refresh_ok = false;
                status.consecutive_failures = status.consecutive_failures.saturating_add(1);
                drop(status);
                tracing::warn!(address = %self.address, error = %err, "refresh failed");
            }
        }
        result
    }

    async fn query_state(&self) -> Result<HeaterState, Error> {
        let frame = self.session.request(Command::QueryStatus).await?;
        Ok(parse_response(&frame)?)
    }

    /// Toggles heater power.
    pub async fn toggle_power(&self) -> bool {
        self.command_then_refresh(Command::TogglePower).await
    }

    /// Switches the heater to fan-only mode.
    pub async fn set_fan_mode(&self) -> bool {
        self.command_then_refresh(Command::FanMode).await
    }

    /// Switches to fixed-level control.
    ///
    /// No-op success if the snapshot already shows level mode.
    pub async fn set_level_mode(&self) -> bool {
        if self
            .current_state()
            .is_some_and(|state| state.control_mode == ControlMode::Level)
        {
            return true;
        }
        self.command_then_refresh(Command::LevelMode).await
    }

    /// Switches to thermostatic control.
    ///
    /// No-op success if the snapshot already shows temperature mode.
    pub async fn set_temperature_mode(&self) -> bool {
        if self
            .current_state()
            .is_some_and(|state| state.control_mode == ControlMode::Temperature)
        {
            return true;
        }
        self.command_then_refresh(Command::TemperatureMode).await
    }

    /// Switches the heater display between Celsius and Fahrenheit.
    ///
    /// No-op success if the snapshot already shows `unit`; requests for
    /// `Unknown` units are rejected.
    pub async fn set_temperature_unit(&self, unit: TemperatureUnit) -> bool {
        let command = match unit {
            TemperatureUnit::Celsius => Command::UseCelsius,
            TemperatureUnit::Fahrenheit => Command::UseFahrenheit,
            TemperatureUnit::Unknown(byte) => {
                tracing::warn!(byte, "refusing to select unknown temperature unit");
                return false;
            }
        };
        if self
            .current_state()
            .is_some_and(|state| state.temperature_unit == unit)
        {
            return true;
        }
        self.command_then_refresh(command).await
    }

    /// Steps the active setpoint up by one.
    pub async fn press_up(&self) -> bool {
        self.command_then_refresh(Command::PressUp).await
    }

    /// Steps the active setpoint down by one.
    pub async fn press_down(&self) -> bool {
        self.command_then_refresh(Command::PressDown).await
    }

    /// Drives the heater to the given power level.
    ///
    /// The heater has no absolute-set command: the coordinator ensures
    /// level mode is active, reads the fresh snapshot, and sends one
    /// up/down press per step of difference. A press with no response
    /// aborts the sequence; presses already sent are not undone. The
    /// device is never asked to confirm the final value.
    pub async fn set_level(&self, target: Level) -> bool {
        let Some(state) = self.current_state() else {
            return false;
        };

        let current = match state.level() {
            Some(level) => level,
            None => {
                if !self.set_level_mode().await {
                    return false;
                }
                let Some(level) = self.current_state().and_then(|state| state.level()) else {
                    return false;
                };
                level
            }
        };

        self.converge(i16::from(target.value()) - i16::from(current))
            .await
    }

    /// Drives the heater to the given target temperature.
    ///
    /// Same stepping discipline as [`set_level`](Self::set_level), in
    /// temperature mode.
    pub async fn set_temperature(&self, target: TargetTemperature) -> bool {
        let Some(state) = self.current_state() else {
            return false;
        };

        let current = match state.target_temperature() {
            Some(temperature) => temperature,
            None => {
                if !self.set_temperature_mode().await {
                    return false;
                }
                let Some(temperature) = self
                    .current_state()
                    .and_then(|state| state.target_temperature())
                else {
                    return false;
                };
                temperature
            }
        };

        self.converge(i16::from(target.value()) - i16::from(current))
            .await
    }

    /// Disconnects from the heater, best-effort.
    pub async fn shutdown(&self) {
        self.session.disconnect().await;
    }

    async fn command_then_refresh(&self, command: Command) -> bool {
        match self.session.request(command).await {
            Ok(_) => {
                let _ = self.refresh().await;
                true
            }
            Err(err) => {
                tracing::warn!(%command, error = %err, "command failed");
                false
            }
        }
    }

    async fn converge(&self, delta: i16) -> bool {
        if delta == 0 {
            return true;
        }

        let command = if delta > 0 {
            Command::PressUp
        } else {
            Command::PressDown
        };
        for _ in 0..delta.unsigned_abs() {
            if let Err(err) = self.session.request(command).await {
                tracing::warn!(%command, error = %err, "press got no response, aborting");
                return false;
            }
        }

        let _ = self.refresh().await;
        true
    }
}

impl<T, R> HeaterCoordinator<T, R>
where
    T: Transport + 'static,
    R: PeerResolver<Peer = T::Peer> + 'static,
{
    /// Spawns a background task refreshing on the configured interval.
    ///
    /// The first refresh runs immediately. Failed cycles are recorded in
    /// [`refresh_status`](Self::refresh_status) and retried on the next
    /// tick. Aborting the returned handle stops polling; call
    /// [`shutdown`](Self::shutdown) separately to drop the link.
    pub fn spawn_polling(self: Arc<Self>) -> JoinHandle<()> {
        let coordinator = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(coordinator.config.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let _ = coordinator.refresh().await;
            }
        })
    }
}
