use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use super::NodeDescriptor;
use super::NodeSpec;
use crate::constants::HANDSHAKE_ARBITER_FLAG;
use crate::constants::HANDSHAKE_PRIMARY_FLAG;
use crate::constants::HANDSHAKE_SECONDARY_FLAG;
use crate::constants::OK_FIELD;
use crate::doc;
use crate::Document;
use crate::HandshakeConfig;
use crate::ObjectId;
use crate::Value;

/// Replica set facts shared by every node of a fixture.
///
/// Built once per fixture; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HandshakeMetadata {
    pub set_name: String,
    pub set_version: i32,
    pub election_id: ObjectId,
    pub max_bson_object_size: i32,
    pub max_message_size_bytes: i32,
    pub max_write_batch_size: i32,
    /// Milliseconds since the Unix epoch, taken at build time
    pub local_time: i64,
    pub max_wire_version: i32,
    pub min_wire_version: i32,
    /// Every member, in fixture order
    pub hosts: Vec<String>,
    /// Arbiter members only
    pub arbiters: Vec<String>,
}

impl HandshakeMetadata {
    pub fn new(
        set_name: &str,
        specs: &[NodeSpec],
        config: &HandshakeConfig,
    ) -> Self {
        let local_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();

        Self {
            set_name: set_name.to_string(),
            set_version: config.set_version,
            election_id: ObjectId::new(),
            max_bson_object_size: config.max_bson_object_size,
            max_message_size_bytes: config.max_message_size_bytes,
            max_write_batch_size: config.max_write_batch_size,
            local_time,
            max_wire_version: config.max_wire_version,
            min_wire_version: config.min_wire_version,
            hosts: specs.iter().map(|s| s.address.clone()).collect(),
            arbiters: specs
                .iter()
                .filter(|s| s.role.is_arbiter_only())
                .map(|s| s.address.clone())
                .collect(),
        }
    }

    /// Fields common to every node's handshake reply.
    pub fn to_document(&self) -> Document {
        doc! {
            "setName" => self.set_name.as_str(),
            "setVersion" => self.set_version,
            "electionId" => self.election_id,
            "maxBsonObjectSize" => self.max_bson_object_size,
            "maxMessageSizeBytes" => self.max_message_size_bytes,
            "maxWriteBatchSize" => self.max_write_batch_size,
            "localTime" => Value::DateTime(self.local_time),
            "maxWireVersion" => self.max_wire_version,
            "minWireVersion" => self.min_wire_version,
            OK_FIELD => 1,
            "hosts" => self.hosts.clone(),
            "arbiters" => self.arbiters.clone(),
        }
    }

    /// Shared fields plus the node's role flags, `me`, `primary` and tags.
    ///
    /// `arbiterOnly` appears only on arbiters and `tags` only when the node
    /// has some.
    pub fn handshake_reply(
        &self,
        node: &NodeDescriptor,
    ) -> Document {
        let mut reply = self.to_document();
        reply.insert(HANDSHAKE_PRIMARY_FLAG, node.role.is_primary());
        reply.insert(HANDSHAKE_SECONDARY_FLAG, node.role.is_secondary());
        if node.role.is_arbiter_only() {
            reply.insert(HANDSHAKE_ARBITER_FLAG, true);
        }
        reply.insert("me", node.me.as_str());
        reply.insert("primary", node.primary.as_str());
        if !node.tags.is_empty() {
            reply.insert("tags", Document::from(node.tags.clone()));
        }
        reply
    }
}
