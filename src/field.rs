//! Modular arithmetic over the secp256k1 field prime and group order.
//!
//! [`Modulus`] carries the generic operations; [`FieldElement`] and
//! [`Scalar`] are canonical-range wrappers bound to `p` and `n`.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crypto_bigint::{Encoding, Limb, U256};
use zeroize::Zeroize;

use crate::error::{Error, Result};

const TOP_BIT: U256 = U256::ONE.shl_vartime(255);

pub(crate) const fn is_even(a: &U256) -> bool {
    a.as_words()[0] & 1 == 0
}

/// An odd modulus above `2^255`.
///
/// Both secp256k1 moduli qualify. The bound lets a 512-bit product be
/// folded with `2^256 ≡ 2^256 - m`, and oddness is what the binary
/// inverse relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Modulus {
    value: U256,
    /// `2^256 - value`
    complement: U256,
}

impl Modulus {
    pub const fn new(value: U256) -> Self {
        assert!(value.bits_vartime() == 256, "modulus must exceed 2^255");
        assert!(!is_even(&value), "modulus must be odd");
        Self {
            value,
            complement: U256::ZERO.wrapping_sub(&value),
        }
    }

    pub const fn value(&self) -> &U256 {
        &self.value
    }

    /// Reduces any 256-bit value. One subtraction suffices since `2m > 2^256`.
    pub fn reduce(&self, a: &U256) -> U256 {
        if *a >= self.value {
            a.wrapping_sub(&self.value)
        } else {
            *a
        }
    }

    pub fn add(&self, a: &U256, b: &U256) -> U256 {
        a.add_mod(b, &self.value)
    }

    pub fn sub(&self, a: &U256, b: &U256) -> U256 {
        a.sub_mod(b, &self.value)
    }

    pub fn neg(&self, a: &U256) -> U256 {
        a.neg_mod(&self.value)
    }

    pub fn mul(&self, a: &U256, b: &U256) -> U256 {
        let (lo, hi) = a.mul_wide(b);
        self.reduce_wide(lo, hi)
    }

    fn reduce_wide(&self, mut lo: U256, mut hi: U256) -> U256 {
        while hi != U256::ZERO {
            let (folded_lo, folded_hi) = hi.mul_wide(&self.complement);
            let (sum, carry) = folded_lo.adc(&lo, Limb::ZERO);
            lo = sum;
            hi = folded_hi.wrapping_add(&U256::from_word(carry.0));
        }
        self.reduce(&lo)
    }

    pub fn pow(&self, base: &U256, exp: &U256) -> U256 {
        let mut acc = U256::ONE;
        for i in (0..exp.bits_vartime()).rev() {
            acc = self.mul(&acc, &acc);
            if exp.bit_vartime(i) {
                acc = self.mul(&acc, base);
            }
        }
        acc
    }

    /// Modular inverse by the binary extended Euclidean algorithm.
    ///
    /// Maintains `x1·a ≡ u` and `x2·a ≡ v` while driving `u` or `v` to one.
    /// Fails when `a` shares a factor with the modulus, zero included.
    pub fn inv(&self, a: &U256) -> Result<U256> {
        let a = self.reduce(a);
        if a == U256::ZERO {
            return Err(Error::InvalidOperand);
        }

        let mut u = a;
        let mut v = self.value;
        let mut x1 = U256::ONE;
        let mut x2 = U256::ZERO;

        while u != U256::ONE && v != U256::ONE {
            while is_even(&u) {
                u = u.shr_vartime(1);
                x1 = self.half(&x1);
            }
            while is_even(&v) {
                v = v.shr_vartime(1);
                x2 = self.half(&x2);
            }
            if u >= v {
                u = u.wrapping_sub(&v);
                x1 = self.sub(&x1, &x2);
            } else {
                v = v.wrapping_sub(&u);
                x2 = self.sub(&x2, &x1);
            }
            // u == v before the subtraction: gcd(a, m) = u > 1
            if u == U256::ZERO || v == U256::ZERO {
                return Err(Error::InvalidOperand);
            }
        }

        Ok(if u == U256::ONE { x1 } else { x2 })
    }

    fn half(&self, a: &U256) -> U256 {
        if is_even(a) {
            a.shr_vartime(1)
        } else {
            let (sum, carry) = a.adc(&self.value, Limb::ZERO);
            let halved = sum.shr_vartime(1);
            if carry.0 != 0 { halved | TOP_BIT } else { halved }
        }
    }
}

/// Field prime `p = 2^256 - 2^32 - 977`.
pub const FIELD_PRIME: Modulus = Modulus::new(U256::from_be_hex(
    "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F",
));

/// Order `n` of the secp256k1 group.
pub const CURVE_ORDER: Modulus = Modulus::new(U256::from_be_hex(
    "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
));

/// Element of GF(p), always in `[0, p)`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldElement(U256);

impl FieldElement {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const ONE: Self = Self(U256::ONE);

    /// Only for literals already known to be below `p`.
    pub(crate) const fn from_canonical(value: U256) -> Self {
        Self(value)
    }

    pub const fn from_u64(value: u64) -> Self {
        Self(U256::from_u64(value))
    }

    /// `None` when `value ≥ p`.
    pub fn from_uint(value: U256) -> Option<Self> {
        (value < *FIELD_PRIME.value()).then_some(Self(value))
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Option<Self> {
        Self::from_uint(U256::from_be_slice(bytes))
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    pub const fn as_uint(&self) -> &U256 {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == U256::ZERO
    }

    pub const fn is_even(&self) -> bool {
        is_even(&self.0)
    }

    pub fn square(&self) -> Self {
        *self * *self
    }

    pub fn invert(&self) -> Result<Self> {
        FIELD_PRIME.inv(&self.0).map(Self)
    }

    pub fn pow(&self, exp: &U256) -> Self {
        Self(FIELD_PRIME.pow(&self.0, exp))
    }

    /// Square root, if one exists. `p ≡ 3 (mod 4)`, so `a^((p+1)/4)` is
    /// a root exactly when `a` is a quadratic residue.
    pub fn sqrt(&self) -> Option<Self> {
        let exp = FIELD_PRIME.value().wrapping_add(&U256::ONE).shr_vartime(2);
        let root = self.pow(&exp);
        (root.square() == *self).then_some(root)
    }
}

impl Add for FieldElement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(FIELD_PRIME.add(&self.0, &rhs.0))
    }
}

impl Sub for FieldElement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(FIELD_PRIME.sub(&self.0, &rhs.0))
    }
}

impl Mul for FieldElement {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(FIELD_PRIME.mul(&self.0, &rhs.0))
    }
}

impl Neg for FieldElement {
    type Output = Self;

    fn neg(self) -> Self {
        Self(FIELD_PRIME.neg(&self.0))
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement(0x{:x})", self.0)
    }
}

/// Integer modulo the group order, always in `[0, n)`.
///
/// Holds private key material: wiped on drop, redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Scalar(U256);

impl Scalar {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const ONE: Self = Self(U256::ONE);

    /// `None` when `value ≥ n`.
    pub fn from_uint(value: U256) -> Option<Self> {
        (value < *CURVE_ORDER.value()).then_some(Self(value))
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Option<Self> {
        Self::from_uint(U256::from_be_slice(bytes))
    }

    /// Reduces an arbitrary 256-bit value mod `n`.
    pub fn reduce(value: &U256) -> Self {
        Self(CURVE_ORDER.reduce(value))
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    pub const fn as_uint(&self) -> &U256 {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == U256::ZERO
    }
}

impl Add for &Scalar {
    type Output = Scalar;

    fn add(self, rhs: Self) -> Scalar {
        Scalar(CURVE_ORDER.add(&self.0, &rhs.0))
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for Scalar {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Scalar(..)")
    }
}
