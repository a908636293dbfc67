use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_BASE_PORT;
use crate::constants::DEFAULT_HOST;
use crate::constants::DEFAULT_SET_NAME;
use crate::Error;
use crate::NodeSpec;
use crate::Result;

/// Replica set layout for the `replset-mock` binary.
///
/// With no explicit `members`, the canonical primary/secondary/arbiter set
/// is laid out on `host` at `base_port`, `base_port + 1` and
/// `base_port + 2`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TopologyConfig {
    #[serde(default = "default_set_name")]
    pub set_name: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_base_port")]
    pub base_port: u16,

    #[serde(default)]
    pub members: Vec<NodeSpec>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            set_name: default_set_name(),
            host: default_host(),
            base_port: default_base_port(),
            members: vec![],
        }
    }
}

impl TopologyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.set_name.is_empty() {
            return Err(Error::Settings(ConfigError::Message(
                "set_name cannot be empty".into(),
            )));
        }

        if self.members.is_empty() {
            if self.host.is_empty() {
                return Err(Error::Settings(ConfigError::Message(
                    "host cannot be empty".into(),
                )));
            }
            if self.base_port == 0 || self.base_port > u16::MAX - 2 {
                return Err(Error::Settings(ConfigError::Message(format!(
                    "base_port {} cannot host three consecutive members",
                    self.base_port
                ))));
            }
        }

        Ok(())
    }

    /// Members to build the fixture from.
    pub fn node_specs(&self) -> Result<Vec<NodeSpec>> {
        if !self.members.is_empty() {
            return Ok(self.members.clone());
        }
        NodeSpec::three_node(&self.host, self.base_port)
    }
}

fn default_set_name() -> String {
    DEFAULT_SET_NAME.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_base_port() -> u16 {
    DEFAULT_BASE_PORT
}
