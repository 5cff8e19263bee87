/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error, propagated unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] openshowvar_transport::TransportError),

    /// Frame-level error: bad input, malformed response, unknown variable.
    #[error("frame error: {0}")]
    Frame(#[from] openshowvar_frame::FrameError),
}

impl ClientError {
    /// Whether the controller reported the variable as unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClientError::Frame(openshowvar_frame::FrameError::VariableNotFound)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
