//! Error types for the geokern kernel

use thiserror::Error;

/// Main error type for the kernel
#[derive(Debug, Error)]
pub enum Error {
    #[error("buffer layout error: {0}")]
    BufferLayout(String),

    #[error("config error: {0}")]
    Config(String),
}
