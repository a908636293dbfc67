use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::network::Message;
use crate::Document;

/// An inbound command and the sink its reply must go to.
///
/// A `Request` is consumed by [`crate::MockServer::reply`], so it can be
/// answered at most once. Dropping it unanswered leaves the client waiting
/// and frees the connection to read its next frame.
#[derive(Debug)]
pub struct Request {
    pub(crate) node: SocketAddr,
    pub(crate) sequence: u64,
    request_id: u32,
    peer: SocketAddr,
    document: Document,
    pub(crate) reply_tx: oneshot::Sender<Message>,
}

impl Request {
    pub(crate) fn new(
        node: SocketAddr,
        peer: SocketAddr,
        message: Message,
        reply_tx: oneshot::Sender<Message>,
    ) -> Self {
        Self {
            node,
            sequence: 0,
            request_id: message.request_id,
            peer,
            document: message.body,
            reply_tx,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Id chosen by the client; echoed back as `response_to`.
    pub fn request_id(&self) -> u32 {
        self.request_id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}
