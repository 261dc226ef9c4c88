use std::io;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("ERR - Io: {0}")]
    Io(#[from] io::Error),

    #[error("ERR - Transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ERR - Protocol: {0}")]
    Protocol(String),

    #[error("ERR - Default branch not found in advertisement")]
    DefaultBranchNotFound,

    #[error("ERR - Corrupt pack: {0}")]
    CorruptPack(String),

    #[error("ERR - Pack checksum mismatch")]
    ChecksumMismatch,

    #[error("ERR - Unsupported: {0}")]
    Unsupported(String),

    #[error("ERR - Size mismatch: declared {declared} bytes, got {actual}")]
    SizeMismatch { declared: i64, actual: i64 },

    #[error("ERR - Corrupt delta: {0}")]
    CorruptDelta(String),

    #[error("ERR - Missing delta base: {0}")]
    MissingBase(String),

    #[error("ERR - Corrupt object: {0}")]
    CorruptObject(String),

    #[error("ERR - Size encoding exceeds 60-bit shift")]
    VarintOverflow,

    #[error("ERR - Invalid arguments: {0}")]
    InvalidArgs(String),
}
