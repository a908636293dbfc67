//! Configuration for the mock harness.
//!
//! Sources are merged with priority (later wins):
//! 1. Default values (hardcoded)
//! 2. File named by `MOCK_CONFIG_PATH`
//! 3. Environment variables prefixed `MOCK__` (e.g.
//!    `MOCK__HANDSHAKE__MAX_WIRE_VERSION=6`)

mod client;
mod handshake;
mod server;
mod topology;

pub use client::*;
pub use handshake::*;
pub use server::*;
pub use topology::*;


use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

pub const CONFIG_PATH_ENV: &str = "MOCK_CONFIG_PATH";
const ENV_PREFIX: &str = "MOCK";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HarnessConfig {
    /// Limits and versions advertised in handshake replies
    #[serde(default)]
    pub handshake: HandshakeConfig,
    /// Listener and framing parameters of every mock node
    #[serde(default)]
    pub server: ServerConfig,
    /// Deadlines used by the bundled wire client
    #[serde(default)]
    pub client: ClientConfig,
    /// Replica set served by the `replset-mock` binary
    #[serde(default)]
    pub topology: TopologyConfig,
}

impl HarnessConfig {
    /// Loads defaults, then the optional file, then the environment.
    ///
    /// Validation is deferred to [`HarnessConfig::validate`].
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(Self::environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies a file on top of the current values; environment variables
    /// still take precedence.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Consumes and validates every section.
    pub fn validate(self) -> Result<Self> {
        self.handshake.validate()?;
        self.server.validate()?;
        self.client.validate()?;
        self.topology.validate()?;
        Ok(self)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .ignore_empty(true)
            .try_parsing(true)
    }
}
