use std::time::Duration;

/// Default timeout for establishing a TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Socket-level configuration applied when a transport is opened.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum time to wait for the TCP handshake. `None` blocks indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Read timeout for blocking receives.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking sends.
    pub write_timeout: Option<Duration>,
    /// Set `TCP_NODELAY` on connected sockets.
    pub nodelay: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: None,
            write_timeout: None,
            nodelay: true,
        }
    }
}
