//! Hierarchical deterministic keys (BIP32) over secp256k1.
//!
//! ```no_run
//! use hd_keytree::{ExtendedPrivateKey, Network};
//!
//! # fn main() -> Result<(), hd_keytree::Error> {
//! let master = ExtendedPrivateKey::from_seed(&[0x5a; 64])?;
//! let account = master.derive_path(&"m/44'/0'/0'".parse()?)?;
//! let receive = account.public_key().derive_child(0u32)?.derive_child(7u32)?;
//! println!("{}", receive.to_base58(Network::Mainnet));
//! # Ok(())
//! # }
//! ```
//!
//! Field and group arithmetic is implemented here, in variable time.

pub mod base58;
pub mod bip32;
pub mod encoding;
pub mod error;
pub mod field;
pub mod network;
pub mod path;
pub mod point;
pub mod serialization;

pub use crypto_bigint::U256;

pub use bip32::{Ancestor, ExtendedPrivateKey, ExtendedPublicKey};
pub use error::{Error, FormatError, Result};
pub use field::{FieldElement, Scalar};
pub use network::Network;
pub use path::{ChildIndex, DerivationPath};
pub use point::{AffinePoint, Point};
pub use serialization::{ExtendedKeyPayload, KeyKind, KeyMaterial, Version};
