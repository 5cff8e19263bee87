use openshowvar_frame::{RESPONSE_PREFIX_SIZE, STATUS_TRAILER_SIZE};
use openshowvar_transport::TransportConfig;

/// Size of a single receive. Large enough for every value observed on real
/// controllers.
pub const DEFAULT_RECEIVE_BUFFER_SIZE: usize = 1024;

/// Largest response the client will assemble: full prefix, the longest
/// value a 16-bit length can declare, and the status trailer.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize =
    RESPONSE_PREFIX_SIZE + u16::MAX as usize + STATUS_TRAILER_SIZE;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Socket options applied on connect.
    pub transport: TransportConfig,
    /// Bytes requested per receive call.
    pub receive_buffer_size: usize,
    /// Cap on a reassembled response. A frame declaring more than this is
    /// still read to its end so the connection stays in step, but only the
    /// first `max_response_size` bytes are kept and the call fails with
    /// `TruncatedResponse`.
    pub max_response_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        }
    }
}
