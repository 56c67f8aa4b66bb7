//! Error types for MIDI message construction.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("empty MIDI message")]
    EmptyMessage,
}

pub type Result<T> = std::result::Result<T, Error>;
