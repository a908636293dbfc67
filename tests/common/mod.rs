use replset_mock::constants::WRITE_CONCERN_FIELD;
use replset_mock::doc;
use replset_mock::Document;
use replset_mock::HarnessConfig;
use replset_mock::NodeSpec;
use replset_mock::Result;
use replset_mock::TopologyFixture;
use replset_mock::WireClient;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// The write concern every case sends and expects to see captured.
pub fn write_concern() -> Document {
    doc! { "w" => 2, "wtimeout" => 1000 }
}

/// Canonical set on `host` with the primary answering write-concern
/// commands, already started.
pub async fn start_fixture(
    host: &str,
    base_port: u16,
) -> Result<TopologyFixture> {
    start_fixture_with_config(host, base_port, HarnessConfig::default()).await
}

pub async fn start_fixture_with_config(
    host: &str,
    base_port: u16,
    config: HarnessConfig,
) -> Result<TopologyFixture> {
    let mut fixture = TopologyFixture::builder("rs")
        .nodes(NodeSpec::three_node(host, base_port)?)
        .config(config)
        .build()?;
    fixture.primary().dispatcher().on_write_concern_commands();
    fixture.start_all().await?;
    Ok(fixture)
}

/// Asks every member for its role, as a driver does during discovery, and
/// returns the address of the one claiming primary.
pub async fn discover_primary(fixture: &TopologyFixture) -> Result<Option<String>> {
    let mut primary = None;
    for node in fixture.nodes() {
        let mut client = WireClient::connect(node.address()).await?;
        let reply = client.is_master().await?;
        if reply.get_bool("ismaster") == Some(true) {
            primary = reply.get_str("me").map(str::to_string);
        }
    }
    Ok(primary)
}

/// The command document a driver sends for `command`, with the shared
/// write concern attached.
pub fn command_document(command: &str) -> Document {
    let mut document = match command {
        "aggregate" => doc! {
            "aggregate" => "test",
            "pipeline" => vec![
                doc! { "$match" => Document::new() },
                doc! { "$out" => "readConcernCollectionAggregate1Output" },
            ],
            "cursor" => Document::new(),
            "$db" => "test",
        },
        "create" => doc! { "create" => "test_collection_methods", "$db" => "test" },
        "createIndexes" => doc! {
            "createIndexes" => "indexOptionDefault",
            "indexes" => vec![doc! { "key" => doc! { "a" => 1 }, "name" => "a_1" }],
            "$db" => "test",
        },
        "drop" => doc! { "drop" => "indexOptionDefault", "$db" => "test" },
        "dropDatabase" => doc! { "dropDatabase" => 1, "$db" => "test" },
        "dropIndexes" => doc! { "dropIndexes" => "test", "index" => "*", "$db" => "test" },
        "mapreduce" => doc! {
            "mapreduce" => "test",
            "map" => "function() { emit(this.user_id, 1); }",
            "reduce" => "function(k, vals) { return 1; }",
            "out" => doc! { "replace" => "tempCollection" },
            "$db" => "test",
        },
        "createUser" => doc! {
            "createUser" => "kay:kay",
            "pwd" => "abc123",
            "roles" => vec!["root"],
            "$db" => "admin",
        },
        "dropUser" => doc! { "dropUser" => "kay:kay", "$db" => "admin" },
        "findandmodify" => doc! {
            "findandmodify" => "test",
            "query" => doc! { "a" => 1 },
            "update" => doc! { "$set" => doc! { "b" => 1 } },
            "new" => true,
            "$db" => "test",
        },
        other => doc! { other => 1, "$db" => "test" },
    };
    document.insert(WRITE_CONCERN_FIELD, write_concern());
    document
}
