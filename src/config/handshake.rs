use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_MAX_BSON_OBJECT_SIZE;
use crate::constants::DEFAULT_MAX_MESSAGE_SIZE_BYTES;
use crate::constants::DEFAULT_MAX_WIRE_VERSION;
use crate::constants::DEFAULT_MAX_WRITE_BATCH_SIZE;
use crate::constants::DEFAULT_MIN_WIRE_VERSION;
use crate::constants::DEFAULT_SET_VERSION;
use crate::Error;
use crate::Result;

/// Values every node of a fixture advertises in its handshake reply.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HandshakeConfig {
    #[serde(default = "default_set_version")]
    pub set_version: i32,

    #[serde(default = "default_max_bson_object_size")]
    pub max_bson_object_size: i32,

    #[serde(default = "default_max_message_size_bytes")]
    pub max_message_size_bytes: i32,

    #[serde(default = "default_max_write_batch_size")]
    pub max_write_batch_size: i32,

    #[serde(default = "default_max_wire_version")]
    pub max_wire_version: i32,

    #[serde(default = "default_min_wire_version")]
    pub min_wire_version: i32,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            set_version: default_set_version(),
            max_bson_object_size: default_max_bson_object_size(),
            max_message_size_bytes: default_max_message_size_bytes(),
            max_write_batch_size: default_max_write_batch_size(),
            max_wire_version: default_max_wire_version(),
            min_wire_version: default_min_wire_version(),
        }
    }
}

impl HandshakeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_wire_version > self.max_wire_version {
            return Err(Error::Settings(ConfigError::Message(format!(
                "min_wire_version {} exceeds max_wire_version {}",
                self.min_wire_version, self.max_wire_version
            ))));
        }

        for (name, value) in [
            ("max_bson_object_size", self.max_bson_object_size),
            ("max_message_size_bytes", self.max_message_size_bytes),
            ("max_write_batch_size", self.max_write_batch_size),
        ] {
            if value <= 0 {
                return Err(Error::Settings(ConfigError::Message(format!(
                    "{name} must be positive, got {value}"
                ))));
            }
        }

        Ok(())
    }
}

fn default_set_version() -> i32 {
    DEFAULT_SET_VERSION
}
fn default_max_bson_object_size() -> i32 {
    DEFAULT_MAX_BSON_OBJECT_SIZE
}
fn default_max_message_size_bytes() -> i32 {
    DEFAULT_MAX_MESSAGE_SIZE_BYTES
}
fn default_max_write_batch_size() -> i32 {
    DEFAULT_MAX_WRITE_BATCH_SIZE
}
fn default_max_wire_version() -> i32 {
    DEFAULT_MAX_WIRE_VERSION
}
fn default_min_wire_version() -> i32 {
    DEFAULT_MIN_WIRE_VERSION
}
