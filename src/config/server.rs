use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_MAX_FRAME_LENGTH;
use crate::constants::DEFAULT_REQUEST_QUEUE_CAPACITY;
use crate::Error;
use crate::Result;

/// Per-node listener parameters.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Largest accepted frame in bytes; larger frames drop the connection
    #[serde(default = "default_max_frame_length")]
    pub max_frame_length: usize,

    /// Requests buffered between connection tasks and the node loop
    #[serde(default = "default_request_queue_capacity")]
    pub request_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_frame_length: default_max_frame_length(),
            request_queue_capacity: default_request_queue_capacity(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_length < 1024 {
            return Err(Error::Settings(ConfigError::Message(format!(
                "max_frame_length {} too small, minimum 1024 bytes",
                self.max_frame_length
            ))));
        }

        if self.request_queue_capacity == 0 {
            return Err(Error::Settings(ConfigError::Message(
                "request_queue_capacity must be at least 1".into(),
            )));
        }

        Ok(())
    }
}

fn default_max_frame_length() -> usize {
    DEFAULT_MAX_FRAME_LENGTH
}
fn default_request_queue_capacity() -> usize {
    DEFAULT_REQUEST_QUEUE_CAPACITY
}
