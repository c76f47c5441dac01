// Error types shared by every module of the crate

use std::io;
use std::string::FromUtf8Error;

/// Errors that can occur while generating, encoding or using keys.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid key size: must be between {min} and {max} bits, got {actual}")]
    InvalidKeySize {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Key blob truncated while reading {field}: need {needed} bytes, {available} left")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Key blob has {0} unexpected trailing bytes")]
    TrailingBytes(usize),

    #[error("Key component {0} is negative")]
    NegativeComponent(&'static str),

    #[error("Value of {0} bytes does not fit a 32-bit length field")]
    ValueTooLarge(usize),

    #[error("Modulus must be non-zero")]
    InvalidModulus,

    #[error("Ciphertext is negative")]
    NegativeCiphertext,

    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("Invalid UTF-8 plaintext: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Envelope error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid key identifier {0:?}")]
    InvalidIdentifier(String),

    #[error("No key stored for {0}")]
    KeyNotFound(String),

    #[error("Private key is not registered for {0}")]
    UnknownIdentity(String),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
