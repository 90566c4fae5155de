//! Error types for rendering.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering the texture.
#[derive(Error, Debug)]
pub enum Error {
    /// The canvas could not be allocated.
    #[error("Failed to allocate {width}x{height} canvas")]
    Allocation {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The PNG could not be encoded or written.
    #[error("Failed to write `{}`: {source}", .path.display())]
    Write {
        /// Destination file.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// Invalid settings.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
