use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Primary,
    Secondary,
    Arbiter,
}

impl NodeRole {
    pub fn is_primary(&self) -> bool {
        matches!(self, NodeRole::Primary)
    }

    pub fn is_secondary(&self) -> bool {
        matches!(self, NodeRole::Secondary)
    }

    pub fn is_arbiter_only(&self) -> bool {
        matches!(self, NodeRole::Arbiter)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Primary => "primary",
            NodeRole::Secondary => "secondary",
            NodeRole::Arbiter => "arbiter",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(NodeRole::Primary),
            "secondary" => Ok(NodeRole::Secondary),
            "arbiter" => Ok(NodeRole::Arbiter),
            other => Err(Error::Config(format!("unknown node role: {other}"))),
        }
    }
}

/// One member of a topology as described by the test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// `host:port`
    pub address: String,
    pub role: NodeRole,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl NodeSpec {
    pub fn new(
        address: impl Into<String>,
        role: NodeRole,
    ) -> Self {
        Self {
            address: address.into(),
            role,
            tags: BTreeMap::new(),
        }
    }

    pub fn primary(address: impl Into<String>) -> Self {
        Self::new(address, NodeRole::Primary)
    }

    pub fn secondary(address: impl Into<String>) -> Self {
        Self::new(address, NodeRole::Secondary)
    }

    pub fn arbiter(address: impl Into<String>) -> Self {
        Self::new(address, NodeRole::Arbiter)
    }

    pub fn with_tag(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Primary (`loc: ny`), secondary (`loc: sf`) and arbiter on
    /// consecutive ports.
    ///
    /// # Errors
    /// [`Error::Config`] when `base_port + 2` is past the last port.
    pub fn three_node(
        host: &str,
        base_port: u16,
    ) -> crate::Result<Vec<NodeSpec>> {
        let last_port = base_port.checked_add(2).ok_or_else(|| {
            Error::Config(format!(
                "base port {base_port} leaves no room for three consecutive members"
            ))
        })?;
        Ok(vec![
            NodeSpec::primary(format!("{host}:{base_port}")).with_tag("loc", "ny"),
            NodeSpec::secondary(format!("{host}:{}", base_port + 1)).with_tag("loc", "sf"),
            NodeSpec::arbiter(format!("{host}:{last_port}")),
        ])
    }
}

/// What a node says about itself in its handshake reply.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    pub role: NodeRole,
    /// This node's own address (`me`)
    pub me: String,
    /// Address this node reports as primary
    pub primary: String,
    pub tags: BTreeMap<String, String>,
}

impl NodeDescriptor {
    pub(crate) fn new(
        spec: &NodeSpec,
        primary: &str,
    ) -> Self {
        Self {
            role: spec.role,
            me: spec.address.clone(),
            primary: primary.to_string(),
            tags: spec.tags.clone(),
        }
    }
}

/// Splits `host:port`, accepting bracketed IPv6 hosts.
pub(crate) fn split_address(address: &str) -> crate::Result<(String, u16)> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| Error::Config(format!("address {address} is not host:port")))?;
    if host.is_empty() {
        return Err(Error::Config(format!("address {address} has no host")));
    }
    let port = port
        .parse::<u16>()
        .map_err(|e| Error::Config(format!("address {address} has an invalid port: {e}")))?;
    Ok((host.to_string(), port))
}
