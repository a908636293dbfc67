//! A replica set of mock nodes sharing one [`HandshakeMetadata`].
//!
//! ## Example
//! ```rust,no_run
//! # async fn run() -> replset_mock::Result<()> {
//! use replset_mock::{has_command, ok_reply, NodeSpec, TopologyFixture};
//!
//! let mut fixture = TopologyFixture::build("rs", NodeSpec::three_node("localhost", 32000)?)?;
//! fixture.on_command("localhost:32000", has_command("create"), |_| ok_reply())?;
//! fixture.start_all().await?;
//!
//! // ... drive the client under test against fixture.replica_set_uri("test") ...
//!
//! let captured = fixture.capture().get();
//! fixture.stop_all().await;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use super::split_address;
use super::HandshakeMetadata;
use super::NodeDescriptor;
use super::NodeRole;
use super::NodeSpec;
use crate::CaptureSlot;
use crate::Dispatcher;
use crate::Document;
use crate::Error;
use crate::HarnessConfig;
use crate::Lifecycle;
use crate::MockServer;
use crate::Result;

/// One member of a fixture: what it advertises, how it routes commands and,
/// once started, its server.
#[derive(Debug)]
pub struct FixtureNode {
    descriptor: NodeDescriptor,
    dispatcher: Dispatcher,
    server: Option<MockServer>,
}

impl FixtureNode {
    pub fn address(&self) -> &str {
        &self.descriptor.me
    }

    pub fn role(&self) -> NodeRole {
        self.descriptor.role
    }

    pub fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// `None` until [`TopologyFixture::start_all`] succeeds.
    pub fn server(&self) -> Option<&MockServer> {
        self.server.as_ref()
    }
}

#[derive(Debug)]
pub struct TopologyFixture {
    metadata: Arc<HandshakeMetadata>,
    nodes: Vec<FixtureNode>,
    /// Index of the single primary in `nodes`
    primary: usize,
    capture: CaptureSlot,
    config: HarnessConfig,
    lifecycle: Lifecycle,
}

/// Fluent construction of a [`TopologyFixture`].
pub struct TopologyFixtureBuilder {
    set_name: String,
    specs: Vec<NodeSpec>,
    config: HarnessConfig,
    capture: Option<CaptureSlot>,
}

impl TopologyFixtureBuilder {
    pub fn new(set_name: impl Into<String>) -> Self {
        Self {
            set_name: set_name.into(),
            specs: Vec::new(),
            config: HarnessConfig::default(),
            capture: None,
        }
    }

    pub fn node(
        mut self,
        spec: NodeSpec,
    ) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn nodes(
        mut self,
        specs: impl IntoIterator<Item = NodeSpec>,
    ) -> Self {
        self.specs.extend(specs);
        self
    }

    pub fn config(
        mut self,
        config: HarnessConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Slot every node's dispatcher writes to; a fresh one by default.
    pub fn capture(
        mut self,
        capture: CaptureSlot,
    ) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Validates the topology and derives the shared metadata.
    ///
    /// # Errors
    /// [`Error::Config`] when the set name is empty, no node or more than one
    /// node is primary, an address is not `host:port`, or two nodes share an
    /// address.
    pub fn build(self) -> Result<TopologyFixture> {
        if self.set_name.is_empty() {
            return Err(Error::Config("set name cannot be empty".into()));
        }

        let mut seen = HashSet::new();
        for spec in &self.specs {
            split_address(&spec.address)?;
            if !seen.insert(spec.address.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate node address {} in topology",
                    spec.address
                )));
            }
        }

        let primaries: Vec<(usize, &str)> = self
            .specs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.role.is_primary())
            .map(|(index, s)| (index, s.address.as_str()))
            .collect();
        let (primary_index, primary) = match primaries.as_slice() {
            [(index, address)] => (*index, address.to_string()),
            [] => return Err(Error::Config("topology has no primary".into())),
            many => {
                let addresses: Vec<&str> = many.iter().map(|(_, address)| *address).collect();
                return Err(Error::Config(format!(
                    "topology has {} primaries: {}",
                    many.len(),
                    addresses.join(", ")
                )));
            }
        };

        let metadata = Arc::new(HandshakeMetadata::new(
            &self.set_name,
            &self.specs,
            &self.config.handshake,
        ));
        let capture = self.capture.unwrap_or_default();
        let nodes = self
            .specs
            .iter()
            .map(|spec| FixtureNode {
                descriptor: NodeDescriptor::new(spec, &primary),
                dispatcher: Dispatcher::new(capture.clone()),
                server: None,
            })
            .collect();

        Ok(TopologyFixture {
            metadata,
            nodes,
            primary: primary_index,
            capture,
            config: self.config,
            lifecycle: Lifecycle::new(),
        })
    }
}

impl TopologyFixture {
    pub fn builder(set_name: impl Into<String>) -> TopologyFixtureBuilder {
        TopologyFixtureBuilder::new(set_name)
    }

    /// Shorthand for a builder with default config and a fresh capture slot.
    pub fn build(
        set_name: impl Into<String>,
        specs: impl IntoIterator<Item = NodeSpec>,
    ) -> Result<Self> {
        Self::builder(set_name).nodes(specs).build()
    }

    /// Canonical primary/secondary/arbiter set on consecutive ports.
    pub fn three_node(
        set_name: impl Into<String>,
        host: &str,
        base_port: u16,
    ) -> Result<Self> {
        Self::build(set_name, NodeSpec::three_node(host, base_port)?)
    }

    pub fn set_name(&self) -> &str {
        &self.metadata.set_name
    }

    pub fn metadata(&self) -> &HandshakeMetadata {
        &self.metadata
    }

    pub fn capture(&self) -> &CaptureSlot {
        &self.capture
    }

    pub fn nodes(&self) -> &[FixtureNode] {
        &self.nodes
    }

    pub fn node(
        &self,
        address: &str,
    ) -> Option<&FixtureNode> {
        self.nodes.iter().find(|n| n.address() == address)
    }

    pub fn primary(&self) -> &FixtureNode {
        &self.nodes[self.primary]
    }

    /// Handshake reply `address` gives, with its role flags.
    pub fn handshake_reply(
        &self,
        address: &str,
    ) -> Option<Document> {
        self.node(address)
            .map(|node| self.metadata.handshake_reply(node.descriptor()))
    }

    /// Registers a capturing rule on the node at `address`.
    ///
    /// Rules may be added before or after [`TopologyFixture::start_all`].
    pub fn on_command<P, R>(
        &self,
        address: &str,
        predicate: P,
        responder: R,
    ) -> Result<()>
    where
        P: Fn(&Document) -> bool + Send + Sync + 'static,
        R: Fn(&Document) -> Document + Send + Sync + 'static,
    {
        self.dispatcher(address)?.on_command(predicate, responder);
        Ok(())
    }

    pub fn dispatcher(
        &self,
        address: &str,
    ) -> Result<&Dispatcher> {
        self.node(address)
            .map(FixtureNode::dispatcher)
            .ok_or_else(|| Error::Config(format!("no node at {address} in topology")))
    }

    /// `mongodb://h1,h2,h3/<database>?replicaSet=<set name>`
    pub fn replica_set_uri(
        &self,
        database: &str,
    ) -> String {
        let hosts: Vec<&str> = self.nodes.iter().map(FixtureNode::address).collect();
        format!(
            "mongodb://{}/{database}?replicaSet={}",
            hosts.join(","),
            self.metadata.set_name
        )
    }

    /// Binds every node in order, then installs handshake replies and spawns
    /// one loop per node.
    ///
    /// # Errors
    /// - [`Error::Bind`] if any address is unavailable; nodes already bound
    ///   are destroyed first
    /// - [`Error::Config`] if the fixture was already started
    pub async fn start_all(&mut self) -> Result<()> {
        if self.lifecycle.is_started() {
            return Err(Error::Config(format!(
                "topology {} already started",
                self.metadata.set_name
            )));
        }

        let mut servers = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let (host, port) = split_address(node.address())?;
            let started =
                MockServer::start_with_token(port, &host, &self.config.server, self.lifecycle.node_token())
                    .await;
            match started {
                Ok(server) => servers.push(server),
                Err(e) => {
                    for server in &servers {
                        server.destroy().await;
                    }
                    return Err(e);
                }
            }
        }

        for (node, server) in self.nodes.iter_mut().zip(servers) {
            node.dispatcher
                .install_handshake(self.metadata.handshake_reply(&node.descriptor));
            self.lifecycle
                .spawn_node_loop(server.clone(), node.dispatcher.clone());
            node.server = Some(server);
        }
        self.lifecycle.mark_started();

        info!(
            set_name = %self.metadata.set_name,
            nodes = self.nodes.len(),
            "topology started"
        );
        Ok(())
    }

    /// Destroys every node and waits for their loops. Idempotent.
    pub async fn stop_all(&mut self) {
        let servers = self.nodes.iter().filter_map(FixtureNode::server);
        self.lifecycle.shutdown(servers).await;
        info!(set_name = %self.metadata.set_name, "topology stopped");
    }
}
