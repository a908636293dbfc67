//! End-to-end behavior of a started replica set seen from a client.

use std::time::Duration;

use replset_mock::constants::WRITE_CONCERN_FIELD;
use replset_mock::doc;
use replset_mock::ok_reply;
use replset_mock::Error;
use replset_mock::HarnessConfig;
use replset_mock::TopologyFixture;
use replset_mock::WireClient;
use serial_test::serial;

use crate::common::command_document;
use crate::common::discover_primary;
use crate::common::enable_logger;
use crate::common::start_fixture;
use crate::common::start_fixture_with_config;
use crate::common::write_concern;
use crate::CONFIG_PORT_BASE;
use crate::ISOLATION_PORT_BASE;
use crate::REPLICA_SET_PORT_BASE;
use crate::UNMATCHED_PORT_BASE;

/// Primary on :32000, secondary on :32001, arbiter on :32002, set "rs".
/// A create-collection call with `{ w: 2, wtimeout: 1000 }` completes and
/// the primary saw exactly that write concern.
#[tokio::test]
#[serial]
async fn test_canonical_create_collection_scenario() {
    enable_logger();
    let mut fixture = TopologyFixture::three_node("rs", "localhost", REPLICA_SET_PORT_BASE).unwrap();
    fixture
        .primary()
        .dispatcher()
        .on_write_concern_commands();
    fixture.start_all().await.unwrap();

    assert_eq!(
        fixture.replica_set_uri("test"),
        "mongodb://localhost:32000,localhost:32001,localhost:32002/test?replicaSet=rs"
    );

    let primary = discover_primary(&fixture).await.unwrap();
    assert_eq!(primary.as_deref(), Some("localhost:32000"));

    let mut client = WireClient::connect("localhost:32000").await.unwrap();
    let reply = client
        .command(doc! {
            "create" => "test_collection_methods",
            WRITE_CONCERN_FIELD => doc! { "w" => 2, "wtimeout" => 1000 },
        })
        .await
        .unwrap();

    assert_eq!(reply, ok_reply());
    let captured = fixture.capture().get().unwrap();
    assert_eq!(
        captured.get_document(WRITE_CONCERN_FIELD),
        Some(&doc! { "w" => 2, "wtimeout" => 1000 })
    );

    fixture.stop_all().await;
}

#[tokio::test]
async fn test_every_handshake_spelling_gets_the_handshake_reply() {
    enable_logger();
    let mut fixture = start_fixture("127.0.0.1", ISOLATION_PORT_BASE + 5).await.unwrap();
    fixture
        .on_command(fixture.primary().address(), |_| true, |_| doc! { "ok" => 0 })
        .unwrap();
    let expected = fixture.handshake_reply(fixture.primary().address()).unwrap();

    let mut client = WireClient::connect(fixture.primary().address()).await.unwrap();
    for handshake in [
        doc! { "ismaster" => 1 },
        doc! { "isMaster" => true },
        doc! { "hello" => 1, "helloOk" => true },
    ] {
        assert_eq!(client.command(handshake).await.unwrap(), expected);
    }
    assert!(!fixture.capture().is_set());

    fixture.stop_all().await;
}

#[tokio::test]
async fn test_destroyed_secondary_leaves_primary_serving_commands() {
    enable_logger();
    let mut fixture = start_fixture("127.0.0.1", ISOLATION_PORT_BASE).await.unwrap();

    let secondary = fixture.nodes()[1].server().unwrap();
    secondary.destroy().await;
    assert!(!secondary.is_running());
    assert!(matches!(secondary.receive().await, Err(Error::ConnectionClosed)));

    let mut client = WireClient::connect(fixture.primary().address()).await.unwrap();
    let reply = client.command(command_document("drop")).await.unwrap();
    assert_eq!(reply, ok_reply());
    assert_eq!(
        fixture.capture().get().unwrap().get_document(WRITE_CONCERN_FIELD),
        Some(&write_concern())
    );

    fixture.stop_all().await;
}

#[tokio::test]
async fn test_unmatched_command_times_out_while_node_keeps_serving() {
    enable_logger();
    let mut fixture = start_fixture("127.0.0.1", UNMATCHED_PORT_BASE).await.unwrap();
    let primary = fixture.primary().address().to_string();

    let mut client = WireClient::connect(&primary).await.unwrap();
    let result = client
        .command_with_timeout(doc! { "insert" => "test" }, Duration::from_millis(200))
        .await;
    assert!(matches!(result, Err(Error::Timeout(_))));
    assert!(!fixture.capture().is_set());

    // Secondaries have no command rules at all
    let mut secondary = WireClient::connect(fixture.nodes()[1].address()).await.unwrap();
    let result = secondary
        .command_with_timeout(command_document("create"), Duration::from_millis(200))
        .await;
    assert!(matches!(result, Err(Error::Timeout(_))));

    let mut fresh = WireClient::connect(&primary).await.unwrap();
    assert_eq!(fresh.command(command_document("create")).await.unwrap(), ok_reply());

    fixture.stop_all().await;
}

#[tokio::test]
async fn test_handshake_limits_follow_harness_config() {
    enable_logger();
    let mut config = HarnessConfig::default();
    config.handshake.max_wire_version = 6;
    config.client.request_timeout_in_ms = 300;
    let mut fixture = start_fixture_with_config("127.0.0.1", CONFIG_PORT_BASE, config.clone())
        .await
        .unwrap();

    let mut client = WireClient::connect_with_config(
        fixture.primary().address(),
        &config.client,
        config.server.max_frame_length,
    )
    .await
    .unwrap();
    let reply = client.is_master().await.unwrap();
    assert_eq!(reply.get_i64("maxWireVersion"), Some(6));

    match client.command(doc! { "insert" => "test" }).await {
        Err(Error::Timeout(elapsed)) => assert_eq!(elapsed, Duration::from_millis(300)),
        other => panic!("expected a timeout, got {other:?}"),
    }

    fixture.stop_all().await;
}

#[tokio::test]
async fn test_occupied_port_fails_start_with_bind_error() {
    enable_logger();
    let mut first = start_fixture("127.0.0.1", CONFIG_PORT_BASE + 5).await.unwrap();

    let result = start_fixture("127.0.0.1", CONFIG_PORT_BASE + 5).await;
    assert!(matches!(result, Err(Error::Bind { .. })));

    let mut client = WireClient::connect(first.primary().address()).await.unwrap();
    assert!(client.is_master().await.is_ok());

    first.stop_all().await;
}
