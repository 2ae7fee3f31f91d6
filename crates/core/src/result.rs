//! Core results and error types

use thiserror::Error;

/// Core error type encompassing all core module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid hexadecimal in seed.
    #[error("invalid hexadecimal in seed")]
    InvalidSeedHex,

    /// Invalid seed length.
    #[error("invalid seed length: expected 64 hex chars, got {0}")]
    InvalidSeedLength(usize),

    /// The fresh-name pool ran out of identifiers.
    #[error("name pool exhausted after {0} draws")]
    NamePoolExhausted(usize),

    /// An oracle subprocess could not be spawned or its scratch dir created.
    #[error("oracle io error: {0}")]
    OracleIo(#[from] std::io::Error),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
