//! Unified error type.

use thiserror::Error;

/// The error type returned by waypost's fallible operations.
///
/// Request-level failures (404, 405, 500) are never `Error`s: they are
/// rendered into a [`Response`](crate::Response) by the dispatcher. This type
/// surfaces startup misuse and infrastructure failures, both of which should
/// abort the process before it accepts traffic.
#[derive(Debug, Error)]
pub enum Error {
    /// Registration-time misuse: bad pattern, empty method set, template
    /// source without an engine.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A template failed to compile or render.
    #[error("template error: {0}")]
    Template(String),

    /// The TOML configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Binding, accepting, or reading files.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
