//! Startup and cooperative shutdown of node loops.
//!
//! Each node runs one loop task: `receive → dispatch → reply`. A loop ends
//! on its first error, which is logged and never propagated, so one node
//! going away leaves the others and the test untouched.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info_span;
use tracing::warn;
use tracing::Instrument;

use crate::Dispatcher;
use crate::MockServer;
use crate::Result;

/// Serves `server` with `dispatcher` until the server is destroyed.
///
/// Requests no rule matches are dropped and the loop moves on to the next
/// `receive`; only the client that sent them is left waiting.
pub async fn run_node_loop(
    server: MockServer,
    dispatcher: Dispatcher,
) -> Result<()> {
    loop {
        let request = server.receive().await?;
        match dispatcher.dispatch(request.document()) {
            Some(reply) => server.reply(request, reply)?,
            None => debug!(
                request_id = request.request_id(),
                "no rule matched; leaving request unanswered"
            ),
        }
    }
}

/// Owns the fixture-wide shutdown token and the node loop handles.
#[derive(Debug, Default)]
pub struct Lifecycle {
    shutdown: CancellationToken,
    loops: Vec<JoinHandle<()>>,
    started: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for one node; cancelled with the fixture, but cancelling it
    /// leaves sibling nodes running.
    pub fn node_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }

    pub fn spawn_node_loop(
        &mut self,
        server: MockServer,
        dispatcher: Dispatcher,
    ) {
        let span = info_span!("node_loop", node = %server.address());
        let handle = tokio::spawn(
            async move {
                match run_node_loop(server, dispatcher).await {
                    Err(e) if e.is_connection_closed() => debug!("node loop stopped: {e}"),
                    Err(e) => warn!("node loop stopped on error: {e}"),
                    Ok(()) => {}
                }
            }
            .instrument(span),
        );
        self.loops.push(handle);
    }

    /// Destroys every server, then waits for every loop to exit.
    pub async fn shutdown<'a>(
        &mut self,
        servers: impl IntoIterator<Item = &'a MockServer>,
    ) {
        for server in servers {
            server.destroy().await;
        }
        self.shutdown.cancel();

        for handle in self.loops.drain(..) {
            if let Err(e) = handle.await {
                warn!("node loop task failed: {e}");
            }
        }
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
