//! Unified error types.

use thiserror::Error;

/// The error type returned by trowel's fallible operations.
///
/// Application-level failures (404, an expired confirmation link, a bad
/// password) are expressed as [`Response`](crate::Response) values, not as
/// `Error`s. This type surfaces boot and infrastructure failures: a route
/// pattern that cannot compile, a middleware name nobody registered, an
/// unreadable config file, a port that will not bind.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    #[error("invalid route `{pattern}`: {reason}")]
    InvalidRoute { pattern: String, reason: String },

    #[error("middleware `{0}` is not registered")]
    UnknownMiddleware(String),

    #[error("config: {0}")]
    Config(String),

    #[error("service `{0}` is not bound in the container")]
    MissingService(&'static str),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Why a signed token was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum TokenError {
    /// Not of the form `<payload>.<signature>`, not valid base64, or a
    /// payload without a parseable `::` timestamp.
    #[error("malformed token")]
    Malformed,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,
}
