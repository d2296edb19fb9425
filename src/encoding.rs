//! Public key encodings: compressed SEC1 points and HASH160 identifiers.

use sha2::Digest;

use crate::error::FormatError;
use crate::field::FieldElement;
use crate::point::AffinePoint;

pub const COMPRESSED_LEN: usize = 33;

impl AffinePoint {
    /// `0x02`/`0x03` parity prefix followed by `x`, zero-padded to 32 bytes.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let mut out = [0u8; COMPRESSED_LEN];
        out[0] = if self.y().is_even() { 0x02 } else { 0x03 };
        out[1..].copy_from_slice(&self.x().to_be_bytes());
        out
    }

    pub fn from_compressed(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() != COMPRESSED_LEN {
            return Err(FormatError::InvalidLength(bytes.len()));
        }
        let want_even = match bytes[0] {
            0x02 => true,
            0x03 => false,
            _ => return Err(FormatError::InvalidKeyData),
        };

        let mut x_bytes = [0u8; 32];
        x_bytes.copy_from_slice(&bytes[1..]);
        let x = FieldElement::from_be_bytes(&x_bytes).ok_or(FormatError::InvalidKeyData)?;

        let rhs = x.square() * x + FieldElement::from_u64(7);
        let y = rhs.sqrt().ok_or(FormatError::InvalidKeyData)?;
        let y = if y.is_even() == want_even { y } else { -y };

        AffinePoint::new(x, y).ok_or(FormatError::InvalidKeyData)
    }
}

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let h1 = sha2::Sha256::digest(data);
    let h2 = ripemd::Ripemd160::digest(h1);

    let mut out = [0u8; 20];
    out.copy_from_slice(&h2);
    out
}

pub fn identifier(point: &AffinePoint) -> [u8; 20] {
    hash160(&point.to_compressed())
}

pub fn fingerprint(point: &AffinePoint) -> [u8; 4] {
    let id = identifier(point);
    [id[0], id[1], id[2], id[3]]
}
