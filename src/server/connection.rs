use std::net::SocketAddr;

use futures::SinkExt;
use futures::StreamExt;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info_span;
use tracing::warn;
use tracing::Instrument;

use super::Request;
use crate::network::Message;
use crate::network::WireCodec;
use crate::Result;

pub(super) struct Acceptor {
    pub(super) listener: TcpListener,
    pub(super) node: SocketAddr,
    pub(super) inbox: mpsc::Sender<Request>,
    pub(super) shutdown: CancellationToken,
    pub(super) max_frame_length: usize,
}

impl Acceptor {
    /// Accepts until shutdown, then waits for every connection task so the
    /// listening socket is released when this returns.
    pub(super) async fn run(self) -> Result<()> {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!("acceptor stopping");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            warn!(%peer, "failed to set TCP_NODELAY: {e}");
                        }
                        let span = info_span!("connection", %peer);
                        connections.spawn(
                            serve_connection(
                                stream,
                                peer,
                                self.node,
                                self.inbox.clone(),
                                self.shutdown.clone(),
                                self.max_frame_length,
                            )
                            .instrument(span),
                        );
                    }
                    Err(e) => warn!("accept failed: {e}"),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        drop(self.listener);
        while connections.join_next().await.is_some() {}
        Ok(())
    }
}

/// Reads one frame, hands it to the node loop and waits for the answer
/// before reading the next: a connection never has two requests in flight.
///
/// The socket is still watched while a request is pending. A peer that hangs
/// up ends the task, which drops the reply channel so a late
/// [`MockServer::reply`](super::MockServer::reply) fails with
/// `ConnectionClosed`. One frame sent ahead is held until the pending reply
/// is written.
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    node: SocketAddr,
    inbox: mpsc::Sender<Request>,
    shutdown: CancellationToken,
    max_frame_length: usize,
) {
    let mut framed = Framed::new(stream, WireCodec::new(max_frame_length));
    let mut queued: Option<Message> = None;

    loop {
        let message = match queued.take() {
            Some(message) => message,
            None => tokio::select! {
                biased;
                _ = shutdown.cancelled() => return,
                next = framed.next() => match next {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        warn!("dropping connection on malformed frame: {e}");
                        return;
                    }
                    None => {
                        debug!("connection closed by peer");
                        return;
                    }
                },
            },
        };

        let request_id = message.request_id;
        let (reply_tx, mut reply_rx) = oneshot::channel();
        let request = Request::new(node, peer, message, reply_tx);

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return,
            sent = inbox.send(request) => {
                if sent.is_err() {
                    debug!("node inbox closed");
                    return;
                }
            }
        }

        let reply = loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return,
                reply = &mut reply_rx => break reply,
                next = framed.next(), if queued.is_none() => match next {
                    Some(Ok(message)) => queued = Some(message),
                    Some(Err(e)) => {
                        warn!(request_id, "dropping connection on malformed frame: {e}");
                        return;
                    }
                    None => {
                        debug!(request_id, "connection closed by peer with a request pending");
                        return;
                    }
                },
            }
        };

        match reply {
            Ok(message) => {
                if let Err(e) = framed.send(message).await {
                    warn!(request_id, "failed to write reply: {e}");
                    return;
                }
            }
            Err(_) => debug!(request_id, "request dropped without reply"),
        }
    }
}
