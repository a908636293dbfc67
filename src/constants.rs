// -
// Handshake

/// Fields that identify a role-discovery request. Any one of them, when
/// truthy, makes the request a handshake.
pub const HANDSHAKE_FIELDS: [&str; 3] = ["ismaster", "isMaster", "hello"];

pub const HANDSHAKE_PRIMARY_FLAG: &str = "ismaster";
pub const HANDSHAKE_SECONDARY_FLAG: &str = "secondary";
pub const HANDSHAKE_ARBITER_FLAG: &str = "arbiterOnly";

pub const DEFAULT_SET_VERSION: i32 = 1;
pub const DEFAULT_MAX_BSON_OBJECT_SIZE: i32 = 16_777_216;
pub const DEFAULT_MAX_MESSAGE_SIZE_BYTES: i32 = 48_000_000;
pub const DEFAULT_MAX_WRITE_BATCH_SIZE: i32 = 1000;
pub const DEFAULT_MAX_WIRE_VERSION: i32 = 5;
pub const DEFAULT_MIN_WIRE_VERSION: i32 = 0;

// -
// Commands

pub const OK_FIELD: &str = "ok";
pub const WRITE_CONCERN_FIELD: &str = "writeConcern";

/// Command keys whose write concern must reach the wire untouched.
pub const WRITE_CONCERN_COMMANDS: [&str; 10] = [
    "aggregate",
    "create",
    "createIndexes",
    "drop",
    "dropDatabase",
    "dropIndexes",
    "mapreduce",
    "createUser",
    "dropUser",
    "findandmodify",
];

/// Sent by drivers ahead of `create`; answered with an empty cursor.
pub const LIST_COLLECTIONS_COMMAND: &str = "listCollections";

// -
// Transport

pub const DEFAULT_MAX_FRAME_LENGTH: usize = DEFAULT_MAX_MESSAGE_SIZE_BYTES as usize;
/// Deepest value nesting accepted when decoding a document
pub const MAX_DOCUMENT_DEPTH: usize = 100;
pub const DEFAULT_REQUEST_QUEUE_CAPACITY: usize = 16;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;

// -
// Binary defaults

pub const DEFAULT_SET_NAME: &str = "rs";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_BASE_PORT: u16 = 32000;
