//! Short Weierstrass curve arithmetic over the NIST prime fields
//!
//! Points are kept in homogeneous projective coordinates and combined with
//! the complete addition law for a = -3 curves (Renes, Costello, Batina
//! 2016, algorithm 4). The same formula covers P + Q, P + P and the
//! identity, so there are no special cases to branch on.
//!
//! Scalar multiplication is a Montgomery ladder over a fixed number of
//! steps (the bit length of the group order). Each step does exactly one
//! addition and one doubling, and the two ladder points are exchanged with
//! a masked limb swap, so neither the operation sequence nor any branch
//! depends on the scalar bits. Field arithmetic goes through `BigUint`,
//! whose running time still varies with operand magnitude (see
//! [`crate::bigint`]).

use std::sync::OnceLock;

use clap::ValueEnum;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bigint::{conditional_swap, limb_width, mod_add, mod_mul, mod_pow, mod_sub, to_fixed_bytes};
use crate::error::{KexError, Result};

/// SEC1 tag for an uncompressed point
pub const UNCOMPRESSED_TAG: u8 = 0x04;

/// P-256 field prime
const P256_P: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// P-256 curve coefficient b
const P256_B: [u8; 32] = [
    0x5a, 0xc6, 0x35, 0xd8, 0xaa, 0x3a, 0x93, 0xe7, 0xb3, 0xeb, 0xbd, 0x55, 0x76, 0x98, 0x86, 0xbc,
    0x65, 0x1d, 0x06, 0xb0, 0xcc, 0x53, 0xb0, 0xf6, 0x3b, 0xce, 0x3c, 0x3e, 0x27, 0xd2, 0x60, 0x4b,
];

/// P-256 base point order
const P256_N: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc, 0x63, 0x25, 0x51,
];

/// P-256 base point x
const P256_GX: [u8; 32] = [
    0x6b, 0x17, 0xd1, 0xf2, 0xe1, 0x2c, 0x42, 0x47, 0xf8, 0xbc, 0xe6, 0xe5, 0x63, 0xa4, 0x40, 0xf2,
    0x77, 0x03, 0x7d, 0x81, 0x2d, 0xeb, 0x33, 0xa0, 0xf4, 0xa1, 0x39, 0x45, 0xd8, 0x98, 0xc2, 0x96,
];

/// P-256 base point y
const P256_GY: [u8; 32] = [
    0x4f, 0xe3, 0x42, 0xe2, 0xfe, 0x1a, 0x7f, 0x9b, 0x8e, 0xe7, 0xeb, 0x4a, 0x7c, 0x0f, 0x9e, 0x16,
    0x2b, 0xce, 0x33, 0x57, 0x6b, 0x31, 0x5e, 0xce, 0xcb, 0xb6, 0x40, 0x68, 0x37, 0xbf, 0x51, 0xf5,
];

/// P-384 field prime
const P384_P: [u8; 48] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
];

/// P-384 curve coefficient b
const P384_B: [u8; 48] = [
    0xb3, 0x31, 0x2f, 0xa7, 0xe2, 0x3e, 0xe7, 0xe4, 0x98, 0x8e, 0x05, 0x6b, 0xe3, 0xf8, 0x2d, 0x19,
    0x18, 0x1d, 0x9c, 0x6e, 0xfe, 0x81, 0x41, 0x12, 0x03, 0x14, 0x08, 0x8f, 0x50, 0x13, 0x87, 0x5a,
    0xc6, 0x56, 0x39, 0x8d, 0x8a, 0x2e, 0xd1, 0x9d, 0x2a, 0x85, 0xc8, 0xed, 0xd3, 0xec, 0x2a, 0xef,
];

/// P-384 base point order
const P384_N: [u8; 48] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xc7, 0x63, 0x4d, 0x81, 0xf4, 0x37, 0x2d, 0xdf,
    0x58, 0x1a, 0x0d, 0xb2, 0x48, 0xb0, 0xa7, 0x7a, 0xec, 0xec, 0x19, 0x6a, 0xcc, 0xc5, 0x29, 0x73,
];

/// P-384 base point x
const P384_GX: [u8; 48] = [
    0xaa, 0x87, 0xca, 0x22, 0xbe, 0x8b, 0x05, 0x37, 0x8e, 0xb1, 0xc7, 0x1e, 0xf3, 0x20, 0xad, 0x74,
    0x6e, 0x1d, 0x3b, 0x62, 0x8b, 0xa7, 0x9b, 0x98, 0x59, 0xf7, 0x41, 0xe0, 0x82, 0x54, 0x2a, 0x38,
    0x55, 0x02, 0xf2, 0x5d, 0xbf, 0x55, 0x29, 0x6c, 0x3a, 0x54, 0x5e, 0x38, 0x72, 0x76, 0x0a, 0xb7,
];

/// P-384 base point y
const P384_GY: [u8; 48] = [
    0x36, 0x17, 0xde, 0x4a, 0x96, 0x26, 0x2c, 0x6f, 0x5d, 0x9e, 0x98, 0xbf, 0x92, 0x92, 0xdc, 0x29,
    0xf8, 0xf4, 0x1d, 0xbd, 0x28, 0x9a, 0x14, 0x7c, 0xe9, 0xda, 0x31, 0x13, 0xb5, 0xf0, 0xb8, 0xc0,
    0x0a, 0x60, 0xb1, 0xce, 0x1d, 0x7e, 0x81, 0x9d, 0x7a, 0x43, 0x1d, 0x7c, 0x90, 0xea, 0x0e, 0x5f,
];


/// Named curves with built-in domain parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum CurveId {
    /// NIST P-256
    #[value(name = "secp256r1")]
    Secp256r1,
    /// NIST P-384
    #[value(name = "secp384r1")]
    Secp384r1,
}

impl CurveId {
    pub const ALL: [CurveId; 2] = [CurveId::Secp256r1, CurveId::Secp384r1];

    pub fn name(self) -> &'static str {
        match self {
            CurveId::Secp256r1 => "secp256r1",
            CurveId::Secp384r1 => "secp384r1",
        }
    }

    pub fn oid(self) -> &'static [u64] {
        match self {
            CurveId::Secp256r1 => &[1, 2, 840, 10045, 3, 1, 7],
            CurveId::Secp384r1 => &[1, 3, 132, 0, 34],
        }
    }

    pub fn from_oid(arcs: &[u64]) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.oid() == arcs)
    }

    /// Domain parameters, built on first use
    pub fn curve(self) -> &'static Curve {
        static SECP256R1: OnceLock<Curve> = OnceLock::new();
        static SECP384R1: OnceLock<Curve> = OnceLock::new();

        match self {
            CurveId::Secp256r1 => SECP256R1
                .get_or_init(|| Curve::new(self, &P256_P, &P256_B, &P256_N, &P256_GX, &P256_GY)),
            CurveId::Secp384r1 => SECP384R1
                .get_or_init(|| Curve::new(self, &P384_P, &P384_B, &P384_N, &P384_GX, &P384_GY)),
        }
    }
}

impl std::fmt::Display for CurveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Point in homogeneous projective coordinates; Z = 0 is the identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectivePoint {
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

impl ProjectivePoint {
    pub fn identity() -> Self {
        Self {
            x: BigUint::zero(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    /// Coordinate-wise masked swap, see [`crate::bigint`]
    fn conditional_swap(a: &mut Self, b: &mut Self, choice: u64, width: usize) {
        conditional_swap(&mut a.x, &mut b.x, choice, width);
        conditional_swap(&mut a.y, &mut b.y, choice, width);
        conditional_swap(&mut a.z, &mut b.z, choice, width);
    }
}

impl From<&AffinePoint> for ProjectivePoint {
    fn from(point: &AffinePoint) -> Self {
        Self {
            x: point.x.clone(),
            y: point.y.clone(),
            z: BigUint::one(),
        }
    }
}

/// Finite point with reduced coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinePoint {
    pub x: BigUint,
    pub y: BigUint,
}

/// y^2 = x^3 - 3x + b over GF(p), prime order n, cofactor 1
#[derive(Debug, Clone)]
pub struct Curve {
    id: CurveId,
    p: BigUint,
    b: BigUint,
    n: BigUint,
    generator: AffinePoint,
    field_len: usize,
}

impl Curve {
    fn new(id: CurveId, p: &[u8], b: &[u8], n: &[u8], gx: &[u8], gy: &[u8]) -> Self {
        Self {
            id,
            p: BigUint::from_bytes_be(p),
            b: BigUint::from_bytes_be(b),
            n: BigUint::from_bytes_be(n),
            generator: AffinePoint {
                x: BigUint::from_bytes_be(gx),
                y: BigUint::from_bytes_be(gy),
            },
            field_len: p.len(),
        }
    }

    pub fn id(&self) -> CurveId {
        self.id
    }

    pub fn field_prime(&self) -> &BigUint {
        &self.p
    }

    pub fn order(&self) -> &BigUint {
        &self.n
    }

    pub fn cofactor(&self) -> u32 {
        1
    }

    /// Bytes per field element (and per private scalar)
    pub fn field_len(&self) -> usize {
        self.field_len
    }

    /// Length of an uncompressed SEC1 point
    pub fn point_len(&self) -> usize {
        1 + 2 * self.field_len
    }

    pub fn generator(&self) -> ProjectivePoint {
        ProjectivePoint::from(&self.generator)
    }

    /// Complete addition; also correct for doubling and the identity.
    pub fn add(&self, lhs: &ProjectivePoint, rhs: &ProjectivePoint) -> ProjectivePoint {
        let p = &self.p;
        let fadd = |a: &BigUint, b: &BigUint| mod_add(a, b, p);
        let fsub = |a: &BigUint, b: &BigUint| mod_sub(a, b, p);
        let fmul = |a: &BigUint, b: &BigUint| mod_mul(a, b, p);
        let triple = |a: &BigUint| fadd(&fadd(a, a), a);

        let xx = fmul(&lhs.x, &rhs.x);
        let yy = fmul(&lhs.y, &rhs.y);
        let zz = fmul(&lhs.z, &rhs.z);
        let xy_pairs = fsub(&fmul(&fadd(&lhs.x, &lhs.y), &fadd(&rhs.x, &rhs.y)), &fadd(&xx, &yy));
        let yz_pairs = fsub(&fmul(&fadd(&lhs.y, &lhs.z), &fadd(&rhs.y, &rhs.z)), &fadd(&yy, &zz));
        let xz_pairs = fsub(&fmul(&fadd(&lhs.x, &lhs.z), &fadd(&rhs.x, &rhs.z)), &fadd(&xx, &zz));

        let bzz3 = triple(&fsub(&xz_pairs, &fmul(&self.b, &zz)));
        let yy_minus = fsub(&yy, &bzz3);
        let yy_plus = fadd(&yy, &bzz3);

        let zz3 = triple(&zz);
        let bxz3 = triple(&fsub(&fmul(&self.b, &xz_pairs), &fadd(&zz3, &xx)));
        let xx3_minus_zz3 = fsub(&triple(&xx), &zz3);

        ProjectivePoint {
            x: fsub(&fmul(&yy_plus, &xy_pairs), &fmul(&yz_pairs, &bxz3)),
            y: fadd(&fmul(&yy_plus, &yy_minus), &fmul(&xx3_minus_zz3, &bxz3)),
            z: fadd(&fmul(&yy_minus, &yz_pairs), &fmul(&xy_pairs, &xx3_minus_zz3)),
        }
    }

    pub fn double(&self, point: &ProjectivePoint) -> ProjectivePoint {
        self.add(point, point)
    }

    pub fn negate(&self, point: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint {
            x: point.x.clone(),
            y: mod_sub(&BigUint::zero(), &point.y, &self.p),
            z: point.z.clone(),
        }
    }

    /// `scalar * point` by Montgomery ladder; `scalar` is taken mod n.
    pub fn scalar_mul(&self, scalar: &BigUint, point: &ProjectivePoint) -> ProjectivePoint {
        let k = scalar % &self.n;
        let width = limb_width(&self.p);
        let mut r0 = ProjectivePoint::identity();
        let mut r1 = ProjectivePoint {
            x: &point.x % &self.p,
            y: &point.y % &self.p,
            z: &point.z % &self.p,
        };

        // Invariant: r1 = r0 + point
        for i in (0..self.n.bits()).rev() {
            let bit = u64::from(k.bit(i));
            ProjectivePoint::conditional_swap(&mut r0, &mut r1, bit, width);
            r1 = self.add(&r0, &r1);
            r0 = self.double(&r0);
            ProjectivePoint::conditional_swap(&mut r0, &mut r1, bit, width);
        }

        r0
    }

    pub fn mul_generator(&self, scalar: &BigUint) -> ProjectivePoint {
        self.scalar_mul(scalar, &self.generator())
    }

    /// Affine form, or `None` for the identity
    pub fn to_affine(&self, point: &ProjectivePoint) -> Result<Option<AffinePoint>> {
        if point.is_identity() {
            return Ok(None);
        }
        // Fermat inversion keeps the ladder-based exponentiation
        let z_inv = mod_pow(&point.z, &(&self.p - 2u32), &self.p)?;
        Ok(Some(AffinePoint {
            x: mod_mul(&point.x, &z_inv, &self.p),
            y: mod_mul(&point.y, &z_inv, &self.p),
        }))
    }

    pub fn is_on_curve(&self, point: &AffinePoint) -> bool {
        let p = &self.p;
        if point.x >= *p || point.y >= *p {
            return false;
        }
        let lhs = mod_mul(&point.y, &point.y, p);
        let x3 = mod_mul(&mod_mul(&point.x, &point.x, p), &point.x, p);
        let three_x = mod_mul(&BigUint::from(3u32), &point.x, p);
        let rhs = mod_add(&mod_sub(&x3, &three_x, p), &self.b, p);
        lhs == rhs
    }

    /// SEC1 uncompressed encoding `0x04 || X || Y`
    pub fn encode_point(&self, point: &AffinePoint) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.point_len());
        out.push(UNCOMPRESSED_TAG);
        out.extend(to_fixed_bytes(&point.x, self.field_len)?);
        out.extend(to_fixed_bytes(&point.y, self.field_len)?);
        Ok(out)
    }

    /// Parses an uncompressed point and checks it lies on the curve.
    pub fn decode_point(&self, bytes: &[u8]) -> Result<AffinePoint> {
        if bytes.len() != self.point_len() || bytes[0] != UNCOMPRESSED_TAG {
            return Err(KexError::format(format!(
                "expected {}-byte uncompressed {} point",
                self.point_len(),
                self.id
            )));
        }
        let (x, y) = bytes[1..].split_at(self.field_len);
        let point = AffinePoint {
            x: BigUint::from_bytes_be(x),
            y: BigUint::from_bytes_be(y),
        };
        if !self.is_on_curve(&point) {
            return Err(KexError::format(format!("point is not on {}", self.id)));
        }
        Ok(point)
    }
}
