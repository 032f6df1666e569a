use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The identity backend rejected the credentials. The message is the
    /// backend's own wording, surfaced unchanged.
    #[error("{message}")]
    Credentials { message: String },

    #[error("Session retrieval failed: {0}")]
    SessionRetrieval(String),

    #[error("Profile fetch failed: {0}")]
    ProfileFetch(String),

    #[error("Sign-out failed: {0}")]
    SignOutFailed(String),

    #[error("Session state is already initialized")]
    AlreadyInitialized,
}

pub type Result<T> = std::result::Result<T, AuthError>;
