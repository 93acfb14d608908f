//! Error types for parallel-runner.
//!
//! These cover misuse of the runner itself. Job errors are data and live in
//! the job's own result slot; they never become an [`Error`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
