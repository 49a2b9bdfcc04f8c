use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// No Discord installation could be located and no override was given.
    #[error("No Discord installation found: {0}")]
    NotFound(String),

    /// The OS refused to spawn the client executable.
    #[error("Failed to launch Discord: {0}")]
    LaunchFailed(String),

    /// A live client process survived past the shutdown deadline.
    /// The store must not be touched while this condition holds.
    #[error("Discord did not stop within {0:?}; close it manually and retry")]
    StopTimeout(std::time::Duration),

    /// Another process holds the credential store open.
    #[error("Credential store is locked by another process: {0}")]
    StoreLocked(String),

    /// The store files are missing, torn, or in an unrecognized format.
    /// Never retried with a write; requires user intervention.
    #[error("Credential store is unreadable: {0}")]
    StoreUnreadable(String),

    /// The store holds no credential; the user likely never completed login.
    #[error("No credential found in the store. Log in to Discord first, then capture again.")]
    NoCredentialFound,

    /// The target profile has never completed a capture.
    #[error("Profile '{0}' has no saved token. Capture one first.")]
    NoSavedToken(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
