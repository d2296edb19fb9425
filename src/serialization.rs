//! The 78-byte extended key payload and its Base58Check form (`xprv…`, `xpub…`).
//!
//! Layout: version (4) ‖ depth (1) ‖ parent fingerprint (4) ‖ child
//! number (4) ‖ chain code (32) ‖ key data (33). Private key data is
//! `0x00 ‖ ser256(k)`, public key data is the compressed point.

use zeroize::Zeroizing;

use crate::base58;
use crate::bip32::{ExtendedPrivateKey, ExtendedPublicKey};
use crate::encoding::COMPRESSED_LEN;
use crate::error::FormatError;
use crate::field::Scalar;
use crate::network::Network;
use crate::path::ChildIndex;
use crate::point::AffinePoint;

pub const PAYLOAD_LEN: usize = 78;

const MAINNET_PRIVATE: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];
const MAINNET_PUBLIC: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
const TESTNET_PRIVATE: [u8; 4] = [0x04, 0x35, 0x83, 0x94];
const TESTNET_PUBLIC: [u8; 4] = [0x04, 0x35, 0x87, 0xCF];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Private,
    Public,
}

/// The four version bytes, fixed by network and key kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Version {
    pub network: Network,
    pub kind: KeyKind,
}

impl Version {
    pub const fn new(network: Network, kind: KeyKind) -> Self {
        Self { network, kind }
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        match (self.network, self.kind) {
            (Network::Mainnet, KeyKind::Private) => MAINNET_PRIVATE,
            (Network::Mainnet, KeyKind::Public) => MAINNET_PUBLIC,
            (Network::Testnet, KeyKind::Private) => TESTNET_PRIVATE,
            (Network::Testnet, KeyKind::Public) => TESTNET_PUBLIC,
        }
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Result<Self, FormatError> {
        let (network, kind) = match bytes {
            MAINNET_PRIVATE => (Network::Mainnet, KeyKind::Private),
            MAINNET_PUBLIC => (Network::Mainnet, KeyKind::Public),
            TESTNET_PRIVATE => (Network::Testnet, KeyKind::Private),
            TESTNET_PUBLIC => (Network::Testnet, KeyKind::Public),
            _ => return Err(FormatError::UnknownVersion(bytes)),
        };
        Ok(Self { network, kind })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyMaterial {
    Private(Scalar),
    Public(AffinePoint),
}

impl KeyMaterial {
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Private(_) => KeyKind::Private,
            Self::Public(_) => KeyKind::Public,
        }
    }

    fn to_bytes(&self) -> Zeroizing<[u8; COMPRESSED_LEN]> {
        let mut out = Zeroizing::new([0u8; COMPRESSED_LEN]);
        match self {
            Self::Private(k) => out[1..].copy_from_slice(&*Zeroizing::new(k.to_be_bytes())),
            Self::Public(point) => out.copy_from_slice(&point.to_compressed()),
        }
        out
    }

    fn from_bytes(kind: KeyKind, bytes: &[u8]) -> Result<Self, FormatError> {
        match kind {
            KeyKind::Private => {
                if bytes.len() != COMPRESSED_LEN {
                    return Err(FormatError::InvalidLength(bytes.len()));
                }
                if bytes[0] != 0x00 {
                    return Err(FormatError::InvalidKeyData);
                }
                let mut k = Zeroizing::new([0u8; 32]);
                k.copy_from_slice(&bytes[1..]);
                Scalar::from_be_bytes(&k)
                    .filter(|k| !k.is_zero())
                    .map(Self::Private)
                    .ok_or(FormatError::InvalidKeyData)
            }
            KeyKind::Public => AffinePoint::from_compressed(bytes).map(Self::Public),
        }
    }
}

/// Decoded fields of a serialized extended key.
///
/// Decoding yields this value, not a node: the ancestors of a decoded
/// key are unknown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedKeyPayload {
    pub network: Network,
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub index: ChildIndex,
    pub chain_code: [u8; 32],
    pub key: KeyMaterial,
}

impl ExtendedKeyPayload {
    pub fn version(&self) -> Version {
        Version::new(self.network, self.key.kind())
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; PAYLOAD_LEN]> {
        let mut out = Zeroizing::new([0u8; PAYLOAD_LEN]);
        out[0..4].copy_from_slice(&self.version().to_bytes());
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint);
        out[9..13].copy_from_slice(&self.index.raw().to_be_bytes());
        out[13..45].copy_from_slice(&self.chain_code);
        out[45..].copy_from_slice(&*self.key.to_bytes());
        out
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() != PAYLOAD_LEN {
            return Err(FormatError::InvalidLength(data.len()));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&data[0..4]);
        let version = Version::from_bytes(version)?;

        let depth = data[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let mut raw_index = [0u8; 4];
        raw_index.copy_from_slice(&data[9..13]);
        let index = ChildIndex::from_raw(u32::from_be_bytes(raw_index));

        if depth == 0 && (parent_fingerprint != [0u8; 4] || index.raw() != 0) {
            return Err(FormatError::InvalidRootMetadata);
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);
        let key = KeyMaterial::from_bytes(version.kind, &data[45..])?;

        Ok(Self {
            network: version.network,
            depth,
            parent_fingerprint,
            index,
            chain_code,
            key,
        })
    }

    pub fn to_base58(&self) -> String {
        base58::encode_check(&*self.to_bytes())
    }

    pub fn from_base58(s: &str) -> Result<Self, FormatError> {
        let data = Zeroizing::new(base58::decode_check(s)?);
        Self::from_bytes(&data)
    }
}

impl ExtendedPrivateKey {
    pub fn to_payload(&self, network: Network) -> ExtendedKeyPayload {
        ExtendedKeyPayload {
            network,
            depth: self.depth(),
            parent_fingerprint: self.parent_fingerprint(),
            index: self.index(),
            chain_code: *self.chain_code(),
            key: KeyMaterial::Private(self.secret_scalar().clone()),
        }
    }

    /// `xprv…` on mainnet, `tprv…` on testnet.
    pub fn to_base58(&self, network: Network) -> String {
        self.to_payload(network).to_base58()
    }
}

impl ExtendedPublicKey {
    pub fn to_payload(&self, network: Network) -> ExtendedKeyPayload {
        ExtendedKeyPayload {
            network,
            depth: self.depth(),
            parent_fingerprint: self.parent_fingerprint(),
            index: self.index(),
            chain_code: *self.chain_code(),
            key: KeyMaterial::Public(*self.point()),
        }
    }

    /// `xpub…` on mainnet, `tpub…` on testnet.
    pub fn to_base58(&self, network: Network) -> String {
        self.to_payload(network).to_base58()
    }
}
