//! The secp256k1 group `y² = x³ + 7` over GF(p), in affine coordinates.
//!
//! All operations here branch on their operands and are therefore
//! variable-time.

use std::ops::{Add, Neg};

use crypto_bigint::U256;

use crate::field::FieldElement;

const CURVE_B: FieldElement = FieldElement::from_u64(7);

/// A point on the curve other than the identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AffinePoint {
    x: FieldElement,
    y: FieldElement,
}

impl AffinePoint {
    pub const GENERATOR: Self = Self {
        x: FieldElement::from_canonical(U256::from_be_hex(
            "79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798",
        )),
        y: FieldElement::from_canonical(U256::from_be_hex(
            "483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8",
        )),
    };

    /// `None` unless `(x, y)` satisfies the curve equation.
    pub fn new(x: FieldElement, y: FieldElement) -> Option<Self> {
        let point = Self { x, y };
        point.is_on_curve().then_some(point)
    }

    pub fn x(&self) -> &FieldElement {
        &self.x
    }

    pub fn y(&self) -> &FieldElement {
        &self.y
    }

    pub fn is_on_curve(&self) -> bool {
        self.y.square() == self.x.square() * self.x + CURVE_B
    }

    pub fn negate(&self) -> Self {
        Self { x: self.x, y: -self.y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Point {
    Infinity,
    Affine(AffinePoint),
}

impl Point {
    pub const GENERATOR: Self = Self::Affine(AffinePoint::GENERATOR);

    pub fn is_infinity(&self) -> bool {
        matches!(self, Self::Infinity)
    }

    pub fn to_affine(&self) -> Option<AffinePoint> {
        match self {
            Self::Infinity => None,
            Self::Affine(point) => Some(*point),
        }
    }

    pub fn negate(&self) -> Self {
        match self {
            Self::Infinity => Self::Infinity,
            Self::Affine(point) => Self::Affine(point.negate()),
        }
    }

    pub fn double(&self) -> Self {
        *self + *self
    }

    /// Group law. The identity and `p + (-p)` are handled before any
    /// inversion, so a zero denominator is never inverted.
    fn sum(self, other: Self) -> Self {
        let (p, q) = match (self, other) {
            (Self::Infinity, _) => return other,
            (_, Self::Infinity) => return self,
            (Self::Affine(p), Self::Affine(q)) => (p, q),
        };

        let slope = if p.x == q.x {
            if p.y != q.y {
                // q = -p
                return Self::Infinity;
            }
            if p.y.is_zero() {
                // vertical tangent; secp256k1 has no such point
                return Self::Infinity;
            }
            let three_x2 = FieldElement::from_u64(3) * p.x.square();
            let Ok(denominator) = (p.y + p.y).invert() else {
                return Self::Infinity;
            };
            three_x2 * denominator
        } else {
            let Ok(denominator) = (p.x - q.x).invert() else {
                return Self::Infinity;
            };
            (p.y - q.y) * denominator
        };

        let x = slope.square() - p.x - q.x;
        let y = -(slope * (x - p.x) + p.y);

        Self::Affine(AffinePoint { x, y })
    }

    /// Double-and-add from the most significant bit of `k`.
    ///
    /// `k` is not reduced first. Because the group has order `n`, a
    /// value at or above `n` lands on the same point as `k mod n`.
    pub fn mul(&self, k: &U256) -> Self {
        let mut acc = Self::Infinity;
        for i in (0..k.bits_vartime()).rev() {
            acc = acc.double();
            if k.bit_vartime(i) {
                acc = acc + *self;
            }
        }
        acc
    }

    /// `k·G`
    pub fn mul_generator(k: &U256) -> Self {
        Self::GENERATOR.mul(k)
    }
}

impl From<AffinePoint> for Point {
    fn from(point: AffinePoint) -> Self {
        Self::Affine(point)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.sum(rhs)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{CURVE_ORDER, Scalar};
    use rand::{RngCore, SeedableRng, rngs::StdRng};

    fn doubled_generator() -> Point {
        let x = FieldElement::from_uint(U256::from_be_hex(
            "C6047F9441ED7D6D3045406E95C07CD85C778E4B8CEF3CA7ABAC09B95C709EE5",
        ))
        .unwrap();
        let y = FieldElement::from_uint(U256::from_be_hex(
            "1AE168FEA63DC339A3C58419466CEAEEF7F632653266D0E1236431A950CFE52A",
        ))
        .unwrap();
        Point::Affine(AffinePoint::new(x, y).unwrap())
    }

    fn random_scalar(rng: &mut StdRng) -> Scalar {
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if let Some(k) = Scalar::from_be_bytes(&bytes) {
                return k;
            }
        }
    }

    #[test]
    fn test_generator_is_on_curve() {
        assert!(AffinePoint::GENERATOR.is_on_curve());
        assert!(AffinePoint::new(FieldElement::ONE, FieldElement::ONE).is_none());
    }

    #[test]
    fn test_multiply_small_scalars() {
        assert_eq!(Point::mul_generator(&U256::ONE), Point::GENERATOR);
        assert_eq!(Point::mul_generator(&U256::from_u64(2)), doubled_generator());
        assert_eq!(Point::GENERATOR.double(), doubled_generator());
        assert_eq!(Point::mul_generator(&U256::ZERO), Point::Infinity);

        let three_g = Point::mul_generator(&U256::from_u64(3));
        assert_eq!(three_g, doubled_generator() + Point::GENERATOR);
        assert_eq!(three_g, Point::GENERATOR + doubled_generator());
    }

    #[test]
    fn test_identity_and_negation() {
        let mut rng = StdRng::seed_from_u64(1);
        let points = [
            Point::GENERATOR,
            doubled_generator(),
            Point::mul_generator(random_scalar(&mut rng).as_uint()),
        ];

        for p in points {
            assert_eq!(p + Point::Infinity, p);
            assert_eq!(Point::Infinity + p, p);
            assert_eq!(p + p.negate(), Point::Infinity);
            assert_eq!(p.negate() + p, Point::Infinity);
            assert_ne!(p, Point::Infinity);
        }
        assert_eq!(Point::Infinity.double(), Point::Infinity);
        assert_eq!(-Point::Infinity, Point::Infinity);
    }

    #[test]
    fn test_group_order() {
        let n = *CURVE_ORDER.value();
        assert_eq!(Point::mul_generator(&n), Point::Infinity);

        let n_minus_one = n.wrapping_sub(&U256::ONE);
        assert_eq!(Point::mul_generator(&n_minus_one), -Point::GENERATOR);
    }

    #[test]
    fn test_unreduced_scalar_matches_reduced() {
        // n + 2 is not a canonical scalar but is still below 2^256
        let n_plus_two = CURVE_ORDER.value().wrapping_add(&U256::from_u64(2));
        assert!(Scalar::from_uint(n_plus_two).is_none());
        assert_eq!(Point::mul_generator(&n_plus_two), doubled_generator());
    }

    #[test]
    fn test_scalar_multiplication_is_homomorphic() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..3 {
            let k1 = random_scalar(&mut rng);
            let k2 = random_scalar(&mut rng);
            let sum = &k1 + &k2;

            let lhs = Point::mul_generator(sum.as_uint());
            let rhs = Point::mul_generator(k1.as_uint()) + Point::mul_generator(k2.as_uint());
            assert_eq!(lhs, rhs);
        }

        let p = doubled_generator();
        let k1 = Scalar::from_uint(U256::from_u64(1_000_003)).unwrap();
        let k2 = Scalar::from_uint(CURVE_ORDER.value().wrapping_sub(&U256::from_u64(3))).unwrap();
        let sum = &k1 + &k2;
        assert_eq!(p.mul(sum.as_uint()), p.mul(k1.as_uint()) + p.mul(k2.as_uint()));
    }

    #[test]
    fn test_matches_k256() -> anyhow::Result<()> {
        use k256::elliptic_curve::sec1::ToEncodedPoint;

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..4 {
            let k = random_scalar(&mut rng);
            let ours = Point::mul_generator(k.as_uint()).to_affine().unwrap();

            let reference = k256::SecretKey::from_slice(&k.to_be_bytes())?.public_key();
            let encoded = reference.to_encoded_point(false);
            assert_eq!(encoded.x().unwrap().as_slice(), ours.x().to_be_bytes().as_slice());
            assert_eq!(encoded.y().unwrap().as_slice(), ours.y().to_be_bytes().as_slice());
        }
        Ok(())
    }
}
