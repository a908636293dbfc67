//! Helpers shared by the unit tests.
//!
//! Mock nodes started here bind ephemeral ports on 127.0.0.1 so tests can
//! run in parallel without colliding.

use std::net::TcpListener as StdTcpListener;

use crate::MockServer;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

pub(crate) async fn start_ephemeral_server() -> MockServer {
    MockServer::start(0, "127.0.0.1")
        .await
        .expect("should bind an ephemeral port")
}

/// Finds `count` distinct free ports by binding and releasing them.
pub(crate) fn free_ports(count: usize) -> Vec<u16> {
    let listeners: Vec<StdTcpListener> = (0..count)
        .map(|_| StdTcpListener::bind("127.0.0.1:0").expect("should bind an ephemeral port"))
        .collect();
    listeners
        .iter()
        .map(|l| l.local_addr().expect("bound listener has an address").port())
        .collect()
}
