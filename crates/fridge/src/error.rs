use std::io;

use thiserror::Error;

/// Errors surfaced by [`Fridge`](crate::Fridge) and its builder.
#[derive(Debug, Error)]
pub enum FridgeError {
    /// Bad combination of constructor arguments (neither or both of
    /// path/stream).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The document decoded fine but its root is not a JSON object.
    #[error("root type must be an object, found {found}")]
    InvalidFormat { found: &'static str },

    /// Non-blank content that is not valid JSON. Only raised when
    /// [`DecodeOptions::strict`](crate::DecodeOptions) is set.
    #[error("malformed document: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("operation on a closed fridge")]
    Closed,
}

pub type Result<T> = std::result::Result<T, FridgeError>;
