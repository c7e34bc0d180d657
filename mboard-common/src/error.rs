//! Errors shared by the storage and config layers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Root folder or config file I/O
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Row addressed by id does not exist (or vanished mid-request)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write, e.g. a registered email
    #[error("Already exists: {0}")]
    Conflict(String),
}
