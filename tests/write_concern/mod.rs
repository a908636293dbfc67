//! For every write-concern command: a driver-shaped command sent to the
//! primary gets its minimal success reply, and the captured document carries
//! exactly the write concern that was sent.
//!
//! Each case:
//! 1. Starts the canonical primary/secondary/arbiter set on its own ports.
//! 2. Discovers the primary through handshakes on every member.
//! 3. Sends the command with `{ w: 2, wtimeout: 1000 }`.
//! 4. Checks the reply and the captured `writeConcern`.

use replset_mock::constants::WRITE_CONCERN_FIELD;
use replset_mock::cursor_reply;
use replset_mock::default_reply;
use replset_mock::doc;
use replset_mock::WireClient;

use crate::common::command_document;
use crate::common::discover_primary;
use crate::common::enable_logger;
use crate::common::start_fixture;
use crate::common::write_concern;
use crate::WRITE_CONCERN_PORT_BASE;

async fn assert_write_concern_passes_through(
    command: &str,
    case: u16,
) {
    enable_logger();
    let base_port = WRITE_CONCERN_PORT_BASE + case * 10;
    let mut fixture = start_fixture("127.0.0.1", base_port).await.unwrap();

    let primary = discover_primary(&fixture).await.unwrap().expect("a member claims primary");
    assert_eq!(primary, fixture.primary().address());
    assert!(!fixture.capture().is_set(), "handshakes are never captured");

    let mut client = WireClient::connect(&primary).await.unwrap();
    let reply = client.command(command_document(command)).await.unwrap();

    assert_eq!(reply, default_reply(command));
    let captured = fixture.capture().get().expect("command captured");
    assert!(captured.is_truthy(command));
    assert_eq!(captured.get_document(WRITE_CONCERN_FIELD), Some(&write_concern()));

    fixture.stop_all().await;
}

#[tokio::test]
async fn test_write_concern_passes_through_aggregate() {
    assert_write_concern_passes_through("aggregate", 0).await;
}

#[tokio::test]
async fn test_write_concern_passes_through_create() {
    assert_write_concern_passes_through("create", 1).await;
}

#[tokio::test]
async fn test_write_concern_passes_through_create_indexes() {
    assert_write_concern_passes_through("createIndexes", 2).await;
}

#[tokio::test]
async fn test_write_concern_passes_through_drop() {
    assert_write_concern_passes_through("drop", 3).await;
}

#[tokio::test]
async fn test_write_concern_passes_through_drop_database() {
    assert_write_concern_passes_through("dropDatabase", 4).await;
}

#[tokio::test]
async fn test_write_concern_passes_through_drop_indexes() {
    assert_write_concern_passes_through("dropIndexes", 5).await;
}

#[tokio::test]
async fn test_write_concern_passes_through_map_reduce() {
    assert_write_concern_passes_through("mapreduce", 6).await;
}

#[tokio::test]
async fn test_write_concern_passes_through_create_user() {
    assert_write_concern_passes_through("createUser", 7).await;
}

#[tokio::test]
async fn test_write_concern_passes_through_drop_user() {
    assert_write_concern_passes_through("dropUser", 8).await;
}

#[tokio::test]
async fn test_write_concern_passes_through_find_and_modify() {
    assert_write_concern_passes_through("findandmodify", 9).await;
}

/// A driver lists collections before `create`; that lookup is answered with
/// an empty cursor and never overwrites the capture.
#[tokio::test]
async fn test_list_collections_lookup_is_answered_but_not_captured() {
    enable_logger();
    let mut fixture = start_fixture("127.0.0.1", WRITE_CONCERN_PORT_BASE + 100).await.unwrap();
    let mut client = WireClient::connect(fixture.primary().address()).await.unwrap();

    let create = command_document("create");
    client.command(create.clone()).await.unwrap();

    let lookup = doc! {
        "listCollections" => 1,
        "filter" => doc! { "name" => "test_collection_methods" },
        "$db" => "test",
    };
    let reply = client.command(lookup).await.unwrap();

    assert_eq!(reply, cursor_reply("test.$cmd.listCollections", vec![]));
    assert_eq!(fixture.capture().get(), Some(create));

    fixture.stop_all().await;
}
