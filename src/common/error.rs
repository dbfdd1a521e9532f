//! # Error Types
//!
//! Every failure of the codec is reported as a distinct [`StegoError`] variant so
//! callers can react to it (pick a bigger image, shorten the message, retry with
//! another password). Nothing here is retried automatically and no variant is
//! fatal to the process.

use thiserror::Error;

/// Errors that can occur while hiding or recovering a message.
#[derive(Error, Debug)]
pub enum StegoError {
    /// The input image could not be decoded or is not a supported raster.
    #[error("invalid input image: {0}")]
    Input(String),

    /// The frame does not fit into the pixel buffer.
    #[error("message too long for this image: need {needed} bits, have {available}")]
    CapacityExceeded { needed: usize, available: usize },

    /// The end marker was never found while scanning the image.
    #[error("no hidden message found")]
    NoHiddenMessage,

    /// The extracted text has no metadata separator.
    #[error("invalid message format")]
    InvalidFrameFormat,

    /// The metadata record could not be parsed into the fixed shape.
    #[error("invalid metadata format: {0}")]
    InvalidMetadata(String),

    /// Decryption produced implausible output, or no password was supplied
    /// for an encrypted frame.
    #[error("incorrect password")]
    IncorrectPassword,

    /// The text cannot be represented as single-byte code units.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The password does not satisfy the encode-side strength policy.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// A cipher primitive could not be set up.
    #[error("cryptographic failure: {0}")]
    Crypto(String),

    /// Writing the output PNG failed.
    #[error("failed to write output image: {0}")]
    Output(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StegoError>;
