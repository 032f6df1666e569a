use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Client capability not available: {0}")]
    NotAvailable(String),

    #[error("Client operation failed: {0}")]
    OperationFailed(String),

    /// Credential rejection from the identity backend. The message is the
    /// backend's own wording; the core surfaces it to callers unchanged.
    #[error("{message}")]
    InvalidCredentials { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
