//! Error types for the I/O subsystem.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI backend error: {0}")]
    Backend(String),

    #[error("no such MIDI port: {0}")]
    PortNotFound(String),

    #[error("failed to connect to port '{0}': {1}")]
    Connect(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    ConfigParse(String),
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::Backend(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
