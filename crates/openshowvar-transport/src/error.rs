/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to resolve the address to any socket address.
    #[error("failed to resolve {0}")]
    Resolve(String),

    /// Failed to connect to the specified address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream before any response data arrived.
    #[error("connection closed by peer")]
    ConnectionClosed,
}

impl TransportError {
    /// The underlying I/O error, if this failure carries one.
    pub fn io_source(&self) -> Option<&std::io::Error> {
        match self {
            TransportError::Connect { source, .. } | TransportError::Bind { source, .. } => {
                Some(source)
            }
            TransportError::Accept(err) | TransportError::Io(err) => Some(err),
            TransportError::Resolve(_) | TransportError::ConnectionClosed => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
