//! Byte-stream transport for the OpenShowVar protocol.
//!
//! This is the lowest layer of the workspace. It knows nothing about frames:
//! it writes request bytes and hands back whatever the controller replied with.
//!
//! - [`Transport`] is the send/receive contract the framing layer consumes
//! - [`StreamTransport`] adapts any `Read + Write` stream to that contract
//! - [`TcpTransport`] dials controllers and binds listeners over TCP

pub mod config;
pub mod error;
pub mod stream;
pub mod tcp;
pub mod traits;

pub use config::{TransportConfig, DEFAULT_CONNECT_TIMEOUT};
pub use error::{Result, TransportError};
pub use stream::StreamTransport;
pub use tcp::{TcpTransport, DEFAULT_PORT};
pub use traits::Transport;
