mod connection;
mod mock_server;
mod request;

pub use mock_server::*;
pub use request::*;
