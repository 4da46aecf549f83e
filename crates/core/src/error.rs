//! Error types for s3ops-core
//!
//! Every manager operation returns [`Result`], so callers can branch on the
//! kind of failure instead of reading logs. The CLI maps each kind to an
//! exit code.

use thiserror::Error;

/// Result type alias for s3ops-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for s3ops-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid local path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Caller supplied an argument the operation cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication or authorization failure
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Bucket or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport failure: the request never got a usable reply
    #[error("Network error: {0}")]
    Network(String),

    /// Bucket already exists, bucket not empty, etc.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The service answered, but not with a success status
    #[error("Service error (status {status}, code {code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::InvalidArgument(_) => 2, // UsageError
            Error::Config(_) | Error::InvalidUrl(_) => 2,           // UsageError
            Error::TomlParse(_) => 2,                                // UsageError
            Error::Network(_) => 3,                                  // NetworkError
            Error::Auth(_) => 4,                                     // AuthError
            Error::NotFound(_) => 5,                                 // NotFound
            Error::Conflict(_) => 6,                                 // Conflict
            _ => 1,                                                  // GeneralError
        }
    }

    /// Whether this error means the target resource does not exist
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
