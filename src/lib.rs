//! Mock replica-set harness.
//!
//! Stands up TCP endpoints that impersonate the members of a replica set
//! (primary, secondary, arbiter), answers role-discovery handshakes the way
//! a real set would, and routes every other command through per-node rules
//! that record what the client under test actually sent.

mod config;
pub mod constants;
mod dispatch;
mod document;
mod errors;
mod lifecycle;
mod network;
mod server;
mod topology;

pub use config::*;
pub use dispatch::*;
pub use document::*;
pub use errors::*;
pub use lifecycle::*;
pub use network::*;
pub use server::*;
pub use topology::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
