use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value (bad filter string, zero buffer size).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required client handle was not supplied to the config builder.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
