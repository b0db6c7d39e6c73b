//! Presence tests
//!
//! Online/offline transitions through real connections: first-contact
//! auto-registration, clean and error-path disconnects, and the
//! any-connection-online semantics for multiple instrument
//! connections under one key.

use std::time::Duration;

use glint_core::Role;
use glint_store::RecordStore;
use glint_test_utils::{wait_for, TestHub, DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT};
use tokio::time::timeout;
use uuid::Uuid;

const QUIET: Duration = Duration::from_millis(300);

#[tokio::test]
async fn first_contact_auto_registers_and_flips_online() {
    let hub = TestHub::start().await;
    let key = Uuid::new_v4();

    assert!(hub.store().find_instrument(key).await.unwrap().is_none());

    let _instrument = hub.connect_instrument(key).await.unwrap();

    let store = hub.store().clone();
    let online = wait_for(
        || {
            let store = store.clone();
            async move {
                store
                    .find_instrument(key)
                    .await
                    .unwrap()
                    .map(|r| r.online)
                    .unwrap_or(false)
            }
        },
        DEFAULT_CHECK_INTERVAL,
        DEFAULT_TIMEOUT,
    )
    .await;
    assert!(online, "instrument was not auto-registered online");

    let record = hub.store().find_instrument(key).await.unwrap().unwrap();
    assert!(record.last_seen.is_some());
    assert!(!record.registered, "auto-registration must stay minimal");
}

#[tokio::test]
async fn clean_disconnect_broadcasts_offline_once() {
    let hub = TestHub::start().await;
    let key = Uuid::new_v4();

    let mut client = hub.connect_client(key).await.unwrap();
    let instrument = hub.connect_instrument(key).await.unwrap();

    assert_eq!(
        timeout(DEFAULT_TIMEOUT, client.next_message())
            .await
            .unwrap()
            .unwrap(),
        "online"
    );

    instrument.close().await.unwrap();

    assert_eq!(
        timeout(DEFAULT_TIMEOUT, client.next_message())
            .await
            .expect("no offline notice")
            .unwrap(),
        "offline"
    );
    assert!(
        timeout(QUIET, client.next_message()).await.is_err(),
        "offline must be broadcast exactly once"
    );

    let hub_ref = hub.hub().clone();
    let gone = wait_for(
        || {
            let hub = hub_ref.clone();
            async move { hub.connection_count(Role::Instrument) == 0 }
        },
        DEFAULT_CHECK_INTERVAL,
        DEFAULT_TIMEOUT,
    )
    .await;
    assert!(gone, "instrument handle still registered after disconnect");

    let record = hub.store().find_instrument(key).await.unwrap().unwrap();
    assert!(!record.online);
}

#[tokio::test]
async fn malformed_telemetry_tears_down_and_flips_offline() {
    let hub = TestHub::start().await;
    let key = Uuid::new_v4();

    let mut client = hub.connect_client(key).await.unwrap();
    let instrument = hub.connect_instrument(key).await.unwrap();

    assert_eq!(
        timeout(DEFAULT_TIMEOUT, client.next_message())
            .await
            .unwrap()
            .unwrap(),
        "online"
    );

    // any decode failure in the instrument loop is fatal
    instrument.send_raw("not json at all").await.unwrap();

    assert_eq!(
        timeout(DEFAULT_TIMEOUT, client.next_message())
            .await
            .expect("no offline notice after decode failure")
            .unwrap(),
        "offline"
    );

    let hub_ref = hub.hub().clone();
    let gone = wait_for(
        || {
            let hub = hub_ref.clone();
            async move { hub.connection_count(Role::Instrument) == 0 }
        },
        DEFAULT_CHECK_INTERVAL,
        DEFAULT_TIMEOUT,
    )
    .await;
    assert!(gone);
    assert!(!hub.store().find_instrument(key).await.unwrap().unwrap().online);
}

#[tokio::test]
async fn wrong_envelope_shape_is_fatal_too() {
    let hub = TestHub::start().await;
    let key = Uuid::new_v4();

    let mut client = hub.connect_client(key).await.unwrap();
    let instrument = hub.connect_instrument(key).await.unwrap();

    assert_eq!(
        timeout(DEFAULT_TIMEOUT, client.next_message())
            .await
            .unwrap()
            .unwrap(),
        "online"
    );

    instrument
        .send_raw(r#"{"data": 1, "extra": true}"#)
        .await
        .unwrap();

    assert_eq!(
        timeout(DEFAULT_TIMEOUT, client.next_message())
            .await
            .expect("no offline notice")
            .unwrap(),
        "offline"
    );
}

#[tokio::test]
async fn client_churn_never_touches_presence() {
    let hub = TestHub::start().await;
    let key = Uuid::new_v4();

    let mut observer = hub.connect_client(key).await.unwrap();
    let _instrument = hub.connect_instrument(key).await.unwrap();

    assert_eq!(
        timeout(DEFAULT_TIMEOUT, observer.next_message())
            .await
            .unwrap()
            .unwrap(),
        "online"
    );

    for _ in 0..3 {
        let extra = hub.connect_client(key).await.unwrap();
        extra.close().await.unwrap();
    }

    assert!(
        timeout(QUIET, observer.next_message()).await.is_err(),
        "client connects/disconnects must not produce status notices"
    );
    assert!(hub.store().find_instrument(key).await.unwrap().unwrap().online);
}

/// Presence is "any connection online": with two instrument
/// connections under one key, only the last teardown flips offline.
#[tokio::test]
async fn offline_waits_for_last_instrument_connection() {
    let hub = TestHub::start().await;
    let key = Uuid::new_v4();

    let mut client = hub.connect_client(key).await.unwrap();
    let first = hub.connect_instrument(key).await.unwrap();

    assert_eq!(
        timeout(DEFAULT_TIMEOUT, client.next_message())
            .await
            .unwrap()
            .unwrap(),
        "online"
    );

    let second = hub.connect_instrument(key).await.unwrap();
    // the second accept re-announces online
    assert_eq!(
        timeout(DEFAULT_TIMEOUT, client.next_message())
            .await
            .unwrap()
            .unwrap(),
        "online"
    );

    first.close().await.unwrap();
    assert!(
        timeout(QUIET, client.next_message()).await.is_err(),
        "offline must not be broadcast while a connection remains"
    );
    assert!(hub.store().find_instrument(key).await.unwrap().unwrap().online);

    second.close().await.unwrap();
    assert_eq!(
        timeout(DEFAULT_TIMEOUT, client.next_message())
            .await
            .expect("no offline notice after last disconnect")
            .unwrap(),
        "offline"
    );

    let store = hub.store().clone();
    let offline = wait_for(
        || {
            let store = store.clone();
            async move { !store.find_instrument(key).await.unwrap().unwrap().online }
        },
        DEFAULT_CHECK_INTERVAL,
        DEFAULT_TIMEOUT,
    )
    .await;
    assert!(offline);
}
