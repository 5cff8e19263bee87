//! Connection management for the OpenShowVar protocol.
//!
//! This is the "just works" layer. Connect to a controller, read and write
//! variables by name, disconnect. One request, one response, no retries.
//!
//! The [`emulator`] module serves the controller side of the protocol from an
//! in-memory variable table, for tests and offline tooling.

pub mod client;
pub mod config;
pub mod emulator;
pub mod error;
pub mod exchange;

pub use client::{connect, connect_with_config, Client, TcpClient};
pub use config::{ClientConfig, DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_RECEIVE_BUFFER_SIZE};
pub use emulator::{ControllerEmulator, EmulatorHandle, VariableTable};
pub use error::{ClientError, Result};
pub use exchange::{exchange, send_request};
