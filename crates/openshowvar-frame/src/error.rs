/// Errors that can occur while building or parsing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The caller supplied an empty name, or a write without a value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A name, value or payload does not fit in a 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The response is shorter than the fixed 7-byte prefix.
    #[error("invalid response length ({len} bytes, need at least 7)")]
    InvalidResponseLength { len: usize },

    /// The response declares a longer value than it carries.
    #[error("truncated response (value length {declared}, {available} bytes available)")]
    TruncatedResponse { declared: usize, available: usize },

    /// The controller could not resolve the requested variable.
    #[error("variable not found in response")]
    VariableNotFound,

    /// A request frame could not be parsed (controller side).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
