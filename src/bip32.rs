//! BIP32 extended keys and child key derivation.
//!
//! Nodes are immutable and shared through `Arc`. A child keeps a
//! read-only handle on its parent, used only to compute the parent
//! fingerprint when the child is serialized.

use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha512;
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::encoding;
use crate::error::{Error, Result};
use crate::field::Scalar;
use crate::path::{ChildIndex, DerivationPath};
use crate::point::{AffinePoint, Point};

type HmacSha512 = Hmac<Sha512>;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// HMAC-SHA512 output split into `(IL, IR)`.
fn hmac_split(key: &[u8], data: &[u8]) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>) {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    let mut res = mac.finalize().into_bytes();

    let mut il = Zeroizing::new([0u8; 32]);
    let mut ir = Zeroizing::new([0u8; 32]);
    il.copy_from_slice(&res[..32]);
    ir.copy_from_slice(&res[32..]);
    res.as_mut_slice().zeroize();

    (il, ir)
}

fn public_point(secret: &Scalar) -> Option<AffinePoint> {
    Point::mul_generator(secret.as_uint()).to_affine()
}

struct PrivateNode {
    parent: Option<ExtendedPrivateKey>,
    depth: u8,
    index: ChildIndex,
    secret: Scalar,
    chain_code: [u8; 32],
    point: AffinePoint,
}

impl Drop for PrivateNode {
    fn drop(&mut self) {
        self.chain_code.zeroize();
    }
}

/// Extended private key: a secret scalar in `(0, n)` plus chain code.
///
/// Cloning is cheap and shares the node.
#[derive(Clone)]
pub struct ExtendedPrivateKey(Arc<PrivateNode>);

impl ExtendedPrivateKey {
    /// Master key from a seed of any length (conventionally the 64-byte
    /// BIP39 seed).
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let (il, ir) = hmac_split(MASTER_HMAC_KEY, seed);
        let master = Self::master_from_split(&il, &ir)?;

        debug!(
            fingerprint = %hex::encode(master.fingerprint()),
            "derived master key"
        );
        Ok(master)
    }

    fn master_from_split(il: &[u8; 32], ir: &[u8; 32]) -> Result<Self> {
        let Some(secret) = Scalar::from_be_bytes(il).filter(|k| !k.is_zero()) else {
            warn!("seed yields a master key outside (0, n)");
            return Err(Error::InvalidSeed);
        };
        let point = public_point(&secret).ok_or(Error::InvalidSeed)?;

        Ok(Self(Arc::new(PrivateNode {
            parent: None,
            depth: 0,
            index: ChildIndex::Normal(0),
            secret,
            chain_code: *ir,
            point,
        })))
    }

    /// CKDpriv. Hardened indices mix in the secret scalar, normal ones
    /// the compressed public point.
    ///
    /// An invalid child is reported, not skipped; moving on to the next
    /// index is left to the caller.
    pub fn derive_child(&self, index: impl Into<ChildIndex>) -> Result<Self> {
        let index = index.into();
        let node = &self.0;

        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if index.is_hardened() {
            let secret = Zeroizing::new(node.secret.to_be_bytes());
            data.push(0x00);
            data.extend_from_slice(&*secret);
        } else {
            data.extend_from_slice(&node.point.to_compressed());
        }
        data.extend_from_slice(&index.raw().to_be_bytes());

        let (il, ir) = hmac_split(&node.chain_code, &data);
        let child = self.child_from_split(index, &il, &ir)?;

        debug!(
            depth = child.depth(),
            index = %index,
            fingerprint = %hex::encode(child.fingerprint()),
            "derived private child"
        );
        Ok(child)
    }

    fn child_from_split(&self, index: ChildIndex, il: &[u8; 32], ir: &[u8; 32]) -> Result<Self> {
        let node = &self.0;

        let Some(tweak) = Scalar::from_be_bytes(il) else {
            warn!(%index, "IL is not below the curve order");
            return Err(Error::InvalidChildKey { index });
        };
        let secret = &tweak + &node.secret;
        if secret.is_zero() {
            warn!(%index, "child scalar is zero");
            return Err(Error::InvalidChildKey { index });
        }
        let Some(depth) = node.depth.checked_add(1) else {
            warn!(%index, "parent is already at depth 255");
            return Err(Error::DepthOverflow);
        };
        let point = public_point(&secret).ok_or(Error::InvalidChildKey { index })?;

        Ok(Self(Arc::new(PrivateNode {
            parent: Some(self.clone()),
            depth,
            index,
            secret,
            chain_code: *ir,
            point,
        })))
    }

    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self> {
        path.iter()
            .try_fold(self.clone(), |key, &index| key.derive_child(index))
    }

    /// The public view of this node. Its ancestor is this node's private
    /// parent, so serialization still fingerprints the right key.
    pub fn public_key(&self) -> ExtendedPublicKey {
        let node = &self.0;
        let ancestor = match &node.parent {
            None => Ancestor::Root,
            Some(parent) => Ancestor::Private(parent.clone()),
        };

        ExtendedPublicKey(Arc::new(PublicNode {
            ancestor,
            depth: node.depth,
            index: node.index,
            point: node.point,
            chain_code: node.chain_code,
        }))
    }

    /// CKDpriv followed by the public view of the child.
    pub fn derive_public_child(&self, index: impl Into<ChildIndex>) -> Result<ExtendedPublicKey> {
        self.derive_child(index).map(|child| child.public_key())
    }

    pub fn depth(&self) -> u8 {
        self.0.depth
    }

    pub fn index(&self) -> ChildIndex {
        self.0.index
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.0.chain_code
    }

    pub fn secret_scalar(&self) -> &Scalar {
        &self.0.secret
    }

    pub fn public_point(&self) -> &AffinePoint {
        &self.0.point
    }

    pub fn parent(&self) -> Option<&ExtendedPrivateKey> {
        self.0.parent.as_ref()
    }

    pub fn identifier(&self) -> [u8; 20] {
        encoding::identifier(&self.0.point)
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        encoding::fingerprint(&self.0.point)
    }

    /// All zeros for a master key.
    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.0
            .parent
            .as_ref()
            .map_or([0u8; 4], |parent| parent.fingerprint())
    }
}

impl fmt::Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivateKey")
            .field("depth", &self.depth())
            .field("index", &self.index())
            .field("fingerprint", &hex::encode(self.fingerprint()))
            .finish_non_exhaustive()
    }
}

/// What a public node was derived from.
#[derive(Clone, Debug)]
pub enum Ancestor {
    Root,
    /// Parent known only as a private node (public view of a private child).
    Private(ExtendedPrivateKey),
    /// Parent reached by public derivation.
    Public(ExtendedPublicKey),
}

impl Ancestor {
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        match self {
            Self::Root => [0u8; 4],
            Self::Private(parent) => parent.fingerprint(),
            Self::Public(parent) => parent.fingerprint(),
        }
    }
}

struct PublicNode {
    ancestor: Ancestor,
    depth: u8,
    index: ChildIndex,
    point: AffinePoint,
    chain_code: [u8; 32],
}

#[derive(Clone)]
pub struct ExtendedPublicKey(Arc<PublicNode>);

impl ExtendedPublicKey {
    /// CKDpub: `point(IL) + K_par`. Only normal indices are possible.
    pub fn derive_child(&self, index: impl Into<ChildIndex>) -> Result<Self> {
        let index = index.into();
        if index.is_hardened() {
            warn!(%index, "hardened derivation requested from a public key");
            return Err(Error::HardenedPublicDerivation { index });
        }
        let node = &self.0;

        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&node.point.to_compressed());
        data.extend_from_slice(&index.raw().to_be_bytes());

        let (il, ir) = hmac_split(&node.chain_code, &data);
        let child = self.child_from_split(index, &il, &ir)?;

        debug!(
            depth = child.depth(),
            index = %index,
            fingerprint = %hex::encode(child.fingerprint()),
            "derived public child"
        );
        Ok(child)
    }

    fn child_from_split(&self, index: ChildIndex, il: &[u8; 32], ir: &[u8; 32]) -> Result<Self> {
        let node = &self.0;

        let Some(tweak) = Scalar::from_be_bytes(il) else {
            warn!(%index, "IL is not below the curve order");
            return Err(Error::InvalidChildKey { index });
        };
        let Some(point) = (Point::mul_generator(tweak.as_uint()) + Point::from(node.point)).to_affine() else {
            warn!(%index, "child point is the identity");
            return Err(Error::InvalidChildKey { index });
        };
        let Some(depth) = node.depth.checked_add(1) else {
            warn!(%index, "parent is already at depth 255");
            return Err(Error::DepthOverflow);
        };

        Ok(Self(Arc::new(PublicNode {
            ancestor: Ancestor::Public(self.clone()),
            depth,
            index,
            point,
            chain_code: *ir,
        })))
    }

    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self> {
        path.iter()
            .try_fold(self.clone(), |key, &index| key.derive_child(index))
    }

    pub fn depth(&self) -> u8 {
        self.0.depth
    }

    pub fn index(&self) -> ChildIndex {
        self.0.index
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.0.chain_code
    }

    pub fn point(&self) -> &AffinePoint {
        &self.0.point
    }

    pub fn ancestor(&self) -> &Ancestor {
        &self.0.ancestor
    }

    pub fn identifier(&self) -> [u8; 20] {
        encoding::identifier(&self.0.point)
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        encoding::fingerprint(&self.0.point)
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.0.ancestor.fingerprint()
    }
}

impl fmt::Debug for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPublicKey")
            .field("depth", &self.depth())
            .field("index", &self.index())
            .field("point", &hex::encode(self.0.point.to_compressed()))
            .finish_non_exhaustive()
    }
}
