// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the single-flight exchange session.

mod common;

use std::sync::Arc;
use std::time::Duration;

use dieselheat_ble::ProtocolError;
use dieselheat_ble::protocol::{Command, HeaterSession, LinkEvent, SessionConfig};

use common::MockTransport;

#[tokio::test(start_paused = true)]
async fn exchanges_serialize_first_come_first_served() {
    let transport = MockTransport::new();
    let (heater, calls, link) = transport.handles();
    heater.lock().respond = false;
    let session = Arc::new(HeaterSession::new(transport));

    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.request(Command::QueryStatus).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let second = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.request(Command::PressUp).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    // The second exchange is parked on the session lock: only one frame
    // has gone out.
    assert_eq!(calls.lock().writes.len(), 1);
    assert_eq!(calls.lock().writes[0], Command::QueryStatus.encode());

    let tx = link.lock().clone().expect("link should be up");
    tx.send(LinkEvent::Notification(vec![0xAA; 21])).await.unwrap();
    let first_frame = first.await.unwrap().unwrap();
    assert_eq!(first_frame, vec![0xAA; 21]);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(calls.lock().writes.len(), 2);
    assert_eq!(calls.lock().writes[1], Command::PressUp.encode());

    tx.send(LinkEvent::Notification(vec![0xBB; 21])).await.unwrap();
    let second_frame = second.await.unwrap().unwrap();
    assert_eq!(second_frame, vec![0xBB; 21]);
}

#[tokio::test(start_paused = true)]
async fn timeout_leaves_session_usable() {
    let transport = MockTransport::new();
    let (heater, calls, _) = transport.handles();
    heater.lock().respond = false;
    let session = HeaterSession::with_config(
        transport,
        SessionConfig::default().with_response_timeout(Duration::from_millis(500)),
    );

    let err = session.request(Command::QueryStatus).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout(500)));

    heater.lock().respond = true;
    let frame = session.request(Command::QueryStatus).await.unwrap();
    assert_eq!(frame.len(), 21);
    assert_eq!(calls.lock().connects, 1);
}

#[tokio::test]
async fn unsolicited_disconnect_triggers_reconnect_on_next_request() {
    let transport = MockTransport::new();
    let (_, calls, link) = transport.handles();
    let session = HeaterSession::new(transport);

    session.request(Command::QueryStatus).await.unwrap();
    assert!(session.is_connected());
    assert_eq!(calls.lock().connects, 1);

    let tx = link.lock().clone().expect("link should be up");
    tx.send(LinkEvent::Disconnected).await.unwrap();
    tokio::task::yield_now().await;
    assert!(!session.is_connected());

    session.request(Command::QueryStatus).await.unwrap();
    assert!(session.is_connected());
    assert_eq!(calls.lock().connects, 2);
}

#[tokio::test(start_paused = true)]
async fn notification_without_waiter_is_discarded() {
    let transport = MockTransport::new();
    let (heater, _, link) = transport.handles();
    let session = HeaterSession::with_config(
        transport,
        SessionConfig::default().with_response_timeout(Duration::from_millis(500)),
    );

    session.request(Command::QueryStatus).await.unwrap();

    // A stray frame lands while nothing is waiting.
    let tx = link.lock().clone().expect("link should be up");
    tx.send(LinkEvent::Notification(vec![0x11; 21])).await.unwrap();
    tokio::task::yield_now().await;

    // The stray frame must not answer the next request.
    heater.lock().respond = false;
    let err = session.request(Command::QueryStatus).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout(_)));
}

#[tokio::test]
async fn connect_failure_is_reported_not_panicked() {
    let mut transport = MockTransport::new();
    transport.fail_connect = true;
    let session = HeaterSession::new(transport);

    let err = session.request(Command::QueryStatus).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionFailed(_)));
    assert!(!session.is_connected());
}
