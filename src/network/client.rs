//! Minimal client used to drive mock nodes from tests.
//!
//! It speaks the harness frame format, keeps one request in flight, and
//! owns the only timeout in the system: a command the node leaves
//! unanswered surfaces here as [`Error::Timeout`].

use std::time::Duration;

use futures::SinkExt;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::debug;

use super::Message;
use super::WireCodec;
use crate::constants::DEFAULT_MAX_FRAME_LENGTH;
use crate::doc;
use crate::ClientConfig;
use crate::Document;
use crate::Error;
use crate::ProtocolError;
use crate::Result;

pub struct WireClient {
    address: String,
    framed: Framed<TcpStream, WireCodec>,
    next_request_id: u32,
    request_timeout: Duration,
}

impl WireClient {
    pub async fn connect(address: &str) -> Result<Self> {
        Self::connect_with_config(address, &ClientConfig::default(), DEFAULT_MAX_FRAME_LENGTH).await
    }

    pub async fn connect_with_config(
        address: &str,
        config: &ClientConfig,
        max_frame_length: usize,
    ) -> Result<Self> {
        let connect_timeout = config.connect_timeout();
        let stream = timeout(connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| Error::Timeout(connect_timeout))??;
        stream.set_nodelay(true)?;

        debug!(%address, "wire client connected");
        Ok(Self {
            address: address.to_string(),
            framed: Framed::new(stream, WireCodec::new(max_frame_length)),
            next_request_id: 0,
            request_timeout: config.request_timeout(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Sends `body` and waits for its reply within the configured timeout.
    pub async fn command(
        &mut self,
        body: Document,
    ) -> Result<Document> {
        self.command_with_timeout(body, self.request_timeout).await
    }

    pub async fn command_with_timeout(
        &mut self,
        body: Document,
        duration: Duration,
    ) -> Result<Document> {
        self.next_request_id = self.next_request_id.wrapping_add(1);
        let request_id = self.next_request_id;

        self.framed
            .send(Message {
                request_id,
                response_to: 0,
                body,
            })
            .await?;

        let reply = timeout(duration, self.framed.next())
            .await
            .map_err(|_| Error::Timeout(duration))?;

        match reply {
            Some(Ok(message)) if message.response_to == request_id => Ok(message.body),
            Some(Ok(message)) => Err(ProtocolError::UnexpectedResponse {
                request_id,
                response_to: message.response_to,
            }
            .into()),
            Some(Err(e)) => Err(e.into()),
            None => Err(Error::ConnectionClosed),
        }
    }

    /// Role discovery, as a driver does on every new connection.
    pub async fn is_master(&mut self) -> Result<Document> {
        self.command(doc! { "ismaster" => 1 }).await
    }
}
