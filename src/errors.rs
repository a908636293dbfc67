//! Mock Harness Error Hierarchy
//!
//! Setup failures (bind, topology, settings) surface to the caller.
//! Connection and protocol failures end only the node loop or connection
//! that hit them.

use std::time::Duration;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Listening address unavailable at start
    #[error("Failed to bind mock server on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid topology description (no primary, duplicate addresses, ...)
    #[error("Invalid topology config: {0}")]
    Config(String),

    /// Harness settings could not be loaded or failed validation
    #[error(transparent)]
    Settings(#[from] config::ConfigError),

    /// Server destroyed, or the peer dropped the connection
    #[error("Connection closed")]
    ConnectionClosed,

    /// Malformed frames or unexpected correlation ids
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Reply attempted with a request that is no longer pending on this node
    #[error("Request {request_id} is not the pending request of node {node}")]
    StaleRequest { node: String, request_id: u32 },

    /// Client side only: no reply within the caller's deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Failed to decode message: {0}")]
    Decode(#[source] bincode::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[source] bincode::Error),

    /// Length prefix or socket level failures
    #[error("Frame error: {0}")]
    Frame(#[from] std::io::Error),

    #[error("Reply to {response_to} does not answer request {request_id}")]
    UnexpectedResponse { request_id: u32, response_to: u32 },
}

impl Error {
    /// True for the errors that end a node loop during normal teardown.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Error::ConnectionClosed)
    }
}
