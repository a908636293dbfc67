//! A mock database node listening on one address.
//!
//! ## Lifecycle
//! - [`MockServer::start`] binds and spawns the acceptor.
//! - [`MockServer::receive`] suspends until some connection delivers a
//!   command.
//! - [`MockServer::reply`] answers the request returned by the latest
//!   `receive`.
//! - [`MockServer::destroy`] cancels everything, fails pending receives with
//!   [`Error::ConnectionClosed`] and returns once the address is released.
//!
//! ## Example
//! ```rust,no_run
//! # async fn run() -> replset_mock::Result<()> {
//! use replset_mock::{doc, MockServer};
//!
//! let server = MockServer::start(32000, "localhost").await?;
//! let request = server.receive().await?;
//! if request.document().is_truthy("ismaster") {
//!     server.reply(request, doc! { "ok" => 1, "ismaster" => true })?;
//! }
//! server.destroy().await;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::info_span;
use tracing::warn;
use tracing::Instrument;

use super::connection::Acceptor;
use super::Request;
use crate::network::Message;
use crate::Document;
use crate::Error;
use crate::Result;
use crate::ServerConfig;

/// Cheap to clone; clones share the same node.
#[derive(Clone)]
pub struct MockServer {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    /// `host:port` as requested, with the bound port filled in
    address: String,
    local_addr: SocketAddr,
    running: AtomicBool,
    shutdown: CancellationToken,
    inbox: tokio::sync::Mutex<mpsc::Receiver<Request>>,
    /// Sequence of the one request that may currently be answered
    pending: Mutex<Option<u64>>,
    next_sequence: AtomicU64,
    next_response_id: AtomicU32,
    acceptor: Mutex<Option<JoinHandle<()>>>,
}

impl MockServer {
    pub async fn start(
        port: u16,
        host: &str,
    ) -> Result<Self> {
        Self::start_with_config(port, host, &ServerConfig::default()).await
    }

    pub async fn start_with_config(
        port: u16,
        host: &str,
        config: &ServerConfig,
    ) -> Result<Self> {
        Self::start_with_token(port, host, config, CancellationToken::new()).await
    }

    /// Starts a node whose shutdown is also triggered by `shutdown`, so a
    /// fixture can stop all of its nodes with one parent token.
    pub(crate) async fn start_with_token(
        port: u16,
        host: &str,
        config: &ServerConfig,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        let requested = format!("{host}:{port}");
        let listener = TcpListener::bind(&requested)
            .await
            .map_err(|source| Error::Bind {
                address: requested.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        let address = format!("{host}:{}", local_addr.port());

        let (inbox_tx, inbox_rx) = mpsc::channel(config.request_queue_capacity);

        let acceptor = Acceptor {
            listener,
            node: local_addr,
            inbox: inbox_tx,
            shutdown: shutdown.clone(),
            max_frame_length: config.max_frame_length,
        };
        let span = info_span!("mock_server", node = %address);
        let handle = tokio::spawn(
            async move {
                if let Err(e) = acceptor.run().await {
                    warn!("acceptor stopped with error: {e}");
                }
            }
            .instrument(span),
        );

        info!(%address, %local_addr, "mock server started");

        Ok(Self {
            inner: Arc::new(ServerInner {
                address,
                local_addr,
                running: AtomicBool::new(true),
                shutdown,
                inbox: tokio::sync::Mutex::new(inbox_rx),
                pending: Mutex::new(None),
                next_sequence: AtomicU64::new(1),
                next_response_id: AtomicU32::new(1),
                acceptor: Mutex::new(Some(handle)),
            }),
        })
    }

    pub fn address(&self) -> &str {
        &self.inner.address
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire) && !self.inner.shutdown.is_cancelled()
    }

    /// Waits for the next inbound command, in arrival order.
    ///
    /// # Errors
    /// [`Error::ConnectionClosed`] once the server is destroyed, including
    /// for a call already suspended when `destroy` runs.
    pub async fn receive(&self) -> Result<Request> {
        if !self.is_running() {
            return Err(Error::ConnectionClosed);
        }

        let mut inbox = self.inner.inbox.lock().await;
        let mut request = tokio::select! {
            biased;
            _ = self.inner.shutdown.cancelled() => return Err(Error::ConnectionClosed),
            request = inbox.recv() => request.ok_or(Error::ConnectionClosed)?,
        };

        let sequence = self.inner.next_sequence.fetch_add(1, Ordering::SeqCst);
        request.sequence = sequence;
        *self.inner.pending.lock() = Some(sequence);

        debug!(
            node = %self.inner.address,
            request_id = request.request_id(),
            peer = %request.peer(),
            "request received"
        );
        Ok(request)
    }

    /// Answers `request` with `document`.
    ///
    /// # Errors
    /// - [`Error::StaleRequest`] if `request` did not come from the latest
    ///   `receive` on this server
    /// - [`Error::ConnectionClosed`] if the server is destroyed or the client
    ///   connection is gone
    pub fn reply(
        &self,
        request: Request,
        document: Document,
    ) -> Result<()> {
        if !self.is_running() {
            return Err(Error::ConnectionClosed);
        }

        {
            let mut pending = self.inner.pending.lock();
            if request.node != self.inner.local_addr || *pending != Some(request.sequence) {
                return Err(Error::StaleRequest {
                    node: self.inner.address.clone(),
                    request_id: request.request_id(),
                });
            }
            *pending = None;
        }

        let response_to = request.request_id();
        let message = Message {
            request_id: self.inner.next_response_id.fetch_add(1, Ordering::SeqCst),
            response_to,
            body: document,
        };
        request.reply_tx.send(message).map_err(|_| Error::ConnectionClosed)?;

        debug!(node = %self.inner.address, response_to, "reply sent");
        Ok(())
    }

    /// Stops accepting, closes every connection and fails in-flight
    /// receives. Safe to call any number of times.
    pub async fn destroy(&self) {
        if !self.inner.running.swap(false, Ordering::AcqRel) {
            debug!(node = %self.inner.address, "mock server already destroyed");
            return;
        }

        self.inner.shutdown.cancel();
        self.inner.pending.lock().take();

        let acceptor = self.inner.acceptor.lock().take();
        if let Some(handle) = acceptor {
            if let Err(e) = handle.await {
                warn!(node = %self.inner.address, "acceptor task failed: {e}");
            }
        }

        info!(node = %self.inner.address, "mock server destroyed");
    }
}

impl Drop for ServerInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for MockServer {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("MockServer")
            .field("address", &self.inner.address)
            .field("local_addr", &self.inner.local_addr)
            .field("running", &self.is_running())
            .finish()
    }
}
