//! Errors raised while parsing or decoding fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("wrong prefix: expected {expected}, found {found}")]
    WrongPrefix { expected: String, found: String },

    #[error("checksum mismatch")]
    InvalidChecksum,

    #[error("invalid address length {0}")]
    InvalidAddressLength(usize),

    #[error("node type {0} is not supported")]
    InvalidNodeType(u8),

    #[error("unknown key algorithm tag {0}")]
    UnknownKeyAlgorithm(u8),

    #[error("invalid public key: {0}")]
    InvalidPubKey(String),
}
