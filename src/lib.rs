// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `dieselheat_ble` - A Rust library to control BLE diesel parking heaters.
//!
//! Talks the fixed 8-byte-command / 21-byte-response protocol spoken by
//! the common Chinese diesel heater BLE controllers, keeps a live snapshot
//! of the heater's state, and translates coarse intents ("set level 4",
//! "set 22 °C") into the button-press sequences the device actually
//! understands.
//!
//! # Supported Features
//!
//! - **Status polling**: operating/control/running mode, setpoint, supply
//!   voltage, ambient and combustion temperature, altitude data
//! - **Power and mode control**: power toggle, fan-only, level and
//!   temperature control modes, display units
//! - **Setpoint convergence**: level (1-6) and target temperature
//!   (8-36 °C) driven by sequenced up/down presses
//! - **Fault reporting**: fault code exposure plus injected per-language
//!   descriptions
//!
//! The heater accepts a single outstanding command; [`HeaterSession`]
//! enforces that with one exchange lock around connect, write and the
//! wait for the answering notification. [`HeaterCoordinator`] owns the
//! published snapshot and the intent surface. Both are generic over
//! [`Transport`], so everything above the GATT link also runs against an
//! in-memory mock; the `ble` feature (default) provides the `btleplug`
//! transport.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use btleplug::api::{Central, Manager as _, ScanFilter};
//! use btleplug::platform::Manager;
//! use dieselheat_ble::protocol::{BleResolver, BleTransport, HeaterSession};
//! use dieselheat_ble::{HeaterCoordinator, Level, PeerResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = Manager::new().await?;
//!     let adapter = manager
//!         .adapters()
//!         .await?
//!         .into_iter()
//!         .next()
//!         .ok_or("no Bluetooth adapter")?;
//!     adapter.start_scan(ScanFilter::default()).await?;
//!
//!     let address = "AA:BB:CC:DD:EE:FF";
//!     let resolver = BleResolver::new(adapter.clone());
//!     let peripheral = resolver.resolve(address).await.ok_or("heater not found")?;
//!
//!     let session = HeaterSession::new(BleTransport::new(peripheral));
//!     let coordinator = Arc::new(HeaterCoordinator::new(session, resolver, address));
//!
//!     // Poll in the background and read the first snapshot.
//!     let poller = Arc::clone(&coordinator).spawn_polling();
//!     let state = coordinator.refresh().await?;
//!     println!("heater on: {}, supply {} V", state.is_on(), state.supply_voltage);
//!
//!     if !coordinator.set_level(Level::new(4)?).await {
//!         eprintln!("level change failed");
//!     }
//!
//!     poller.abort();
//!     coordinator.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Fault Descriptions
//!
//! ```
//! use dieselheat_ble::FaultDictionary;
//!
//! let faults = FaultDictionary::from_json(
//!     "en",
//!     r#"{"en": {"7": "Flameout"}, "de": {"7": "Flammenabriss"}}"#,
//! )
//! .unwrap();
//! assert_eq!(faults.describe_in("de", 7), Some("Flammenabriss"));
//! ```

pub mod coordinator;
pub mod error;
pub mod fault;
pub mod protocol;
pub mod state;
pub mod types;

pub use coordinator::{
    CoordinatorConfig, FixedPeer, HeaterCoordinator, PeerResolver, RefreshStatus,
};
pub use error::{Error, ParseError, ProtocolError, Result, ValueError};
pub use fault::FaultDictionary;
pub use protocol::{Command, HeaterSession, LinkEvent, SessionConfig, Transport};
pub use state::HeaterState;
pub use types::{
    AltitudeUnit, ControlMode, Level, OperatingMode, RunningState, TargetTemperature,
    TemperatureUnit,
};
