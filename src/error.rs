use thiserror::Error;

use crate::path::ChildIndex;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// `IL` of the master HMAC is zero or not below the curve order.
    #[error("seed produces an invalid master key")]
    InvalidSeed,

    #[error("child key at index {index} is invalid")]
    InvalidChildKey { index: ChildIndex },

    #[error("hardened index {index} cannot be derived from a public key")]
    HardenedPublicDerivation { index: ChildIndex },

    #[error("derivation depth would exceed 255")]
    DepthOverflow,

    #[error("zero has no modular inverse")]
    InvalidOperand,

    #[error("Malformed input: {0}")]
    MalformedInput(#[from] FormatError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid base58 character '{0}'")]
    InvalidCharacter(char),

    #[error("checksum mismatch")]
    InvalidChecksum,

    #[error("invalid length: {0} bytes")]
    InvalidLength(usize),

    #[error("unknown version bytes {0:02x?}")]
    UnknownVersion([u8; 4]),

    #[error("root key with non-zero parent fingerprint or index")]
    InvalidRootMetadata,

    #[error("invalid key data")]
    InvalidKeyData,

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("index {0} is out of range")]
    IndexOutOfRange(u32),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
