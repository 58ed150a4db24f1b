//! Error types for HTML document serialization.

use thiserror::Error;

/// Result type alias for quarto-html-dom operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while writing a document back out.
///
/// Parsing never fails: html5ever recovers from malformed markup the way
/// browsers do, so only the output side has failure modes.
#[derive(Error, Debug)]
pub enum Error {
    /// The destination writer failed.
    #[error("Failed to write HTML: {0}")]
    Io(#[from] std::io::Error),

    /// The serializer produced bytes that are not valid UTF-8.
    #[error("Serialized HTML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
