//! Modular arithmetic on arbitrary-precision unsigned integers
//!
//! `BigUint` supplies storage, comparison, `bits()` and the schoolbook
//! add/sub/mul/div. Everything modular lives here:
//!
//! - [`mod_pow`] is a Montgomery ladder. It always runs
//!   `max(bits(exponent), bits(modulus))` steps and every step performs one
//!   multiplication and one squaring, whatever the exponent bits are. The
//!   ladder registers are exchanged with a masked limb swap, so no branch
//!   depends on an exponent bit.
//! - [`mod_inverse`] is the extended Euclidean algorithm.
//! - [`random_in_range`] samples uniformly from a half-open range using a
//!   caller-supplied cryptographic RNG.
//!
//! A zero modulus or divisor is a [`KexError::DomainFault`].
//!
//! Limits: `BigUint` multiplication and remainder are not constant time.
//! Their cost follows the number of significant limbs of the operands, so
//! an intermediate value with leading zero limbs runs measurably faster and
//! allocates less. The ladder hides which bit was processed, not the
//! magnitudes of the values it passes through.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::error::{KexError, Result};

/// Division with remainder
pub fn div_rem(dividend: &BigUint, divisor: &BigUint) -> Result<(BigUint, BigUint)> {
    if divisor.is_zero() {
        return Err(KexError::DomainFault("division by zero"));
    }
    Ok((dividend / divisor, dividend % divisor))
}

/// `value mod modulus`
pub fn reduce(value: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    Ok(div_rem(value, modulus)?.1)
}

/// `(a + b) mod m` for already reduced operands
pub fn mod_add(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    let sum = a + b;
    if &sum >= m { sum - m } else { sum }
}

/// `(a - b) mod m` for already reduced operands
pub fn mod_sub(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    if a >= b { a - b } else { m - (b - a) }
}

/// `(a * b) mod m` for a non-zero modulus
pub fn mod_mul(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    (a * b) % m
}

/// Number of 64-bit limbs needed for values below `modulus`
pub(crate) fn limb_width(modulus: &BigUint) -> usize {
    modulus.bits().div_ceil(64) as usize
}

/// Little-endian limbs zero-padded to at least `width` entries
fn to_limbs(value: &BigUint, width: usize) -> Vec<u64> {
    let mut limbs = value.to_u64_digits();
    if limbs.len() < width {
        limbs.resize(width, 0);
    }
    limbs
}

fn from_limbs(limbs: &[u64]) -> BigUint {
    let digits: Vec<u32> = limbs
        .iter()
        .flat_map(|&limb| [limb as u32, (limb >> 32) as u32])
        .collect();
    BigUint::new(digits)
}

/// Exchanges the limbs of `a` and `b` when `choice` is 1, leaves them when 0.
#[inline]
fn swap_limbs(a: &mut [u64], b: &mut [u64], choice: u64) {
    let mask = 0u64.wrapping_sub(choice);
    for (x, y) in a.iter_mut().zip(b.iter_mut()) {
        let t = mask & (*x ^ *y);
        *x ^= t;
        *y ^= t;
    }
}

/// Swaps `a` and `b` when `choice` is 1 without branching on it.
///
/// Both values are spread over `width` limbs (more if either is larger),
/// masked and rebuilt, so the same work happens for either choice.
pub(crate) fn conditional_swap(a: &mut BigUint, b: &mut BigUint, choice: u64, width: usize) {
    let mut x = to_limbs(a, width);
    let mut y = to_limbs(b, width);
    let len = x.len().max(y.len());
    x.resize(len, 0);
    y.resize(len, 0);

    swap_limbs(&mut x, &mut y, choice & 1);

    *a = from_limbs(&x);
    *b = from_limbs(&y);
}

/// Modular exponentiation: `base^exponent mod modulus`
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(KexError::DomainFault("modulus is zero"));
    }
    if modulus.is_one() {
        return Ok(BigUint::zero());
    }

    let steps = exponent.bits().max(modulus.bits());
    let limbs = limb_width(modulus);
    let mut r0 = BigUint::one();
    let mut r1 = base % modulus;

    // Invariant: r1 = r0 * base
    for i in (0..steps).rev() {
        let bit = u64::from(exponent.bit(i));
        conditional_swap(&mut r0, &mut r1, bit, limbs);
        r1 = mod_mul(&r0, &r1, modulus);
        r0 = mod_mul(&r0, &r0, modulus);
        conditional_swap(&mut r0, &mut r1, bit, limbs);
    }

    Ok(r0)
}

/// Modular inverse via the extended Euclidean algorithm
pub fn mod_inverse(value: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(KexError::DomainFault("modulus is zero"));
    }

    let m = BigInt::from(modulus.clone());
    let mut old_r = BigInt::from(value % modulus);
    let mut r = m.clone();
    let mut old_s = BigInt::one();
    let mut s = BigInt::zero();

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return Err(KexError::DomainFault("value is not invertible"));
    }

    // normalise into [0, m) before dropping the sign
    let inverse = ((old_s % &m) + &m) % &m;
    let (_, magnitude) = inverse.into_parts();
    Ok(magnitude)
}

/// Uniform sample from `[low, high)`
pub fn random_in_range<R: RngCore + CryptoRng>(
    rng: &mut R,
    low: &BigUint,
    high: &BigUint,
) -> Result<BigUint> {
    if low >= high {
        return Err(KexError::DomainFault("empty sampling range"));
    }
    Ok(rng.gen_biguint_range(low, high))
}

/// Random integer with exactly `bits` bits (top bit forced)
pub fn random_with_bits<R: RngCore + CryptoRng>(rng: &mut R, bits: u64) -> Result<BigUint> {
    if bits == 0 {
        return Err(KexError::DomainFault("zero bit length"));
    }
    let mut value = rng.gen_biguint(bits);
    value |= BigUint::one() << (bits - 1);
    Ok(value)
}

/// Bytes needed to hold `bits` bits
pub fn byte_len(bits: u64) -> usize {
    bits.div_ceil(8) as usize
}

/// Big-endian encoding left-padded with zeros to exactly `len` bytes
pub fn to_fixed_bytes(value: &BigUint, len: usize) -> Result<Vec<u8>> {
    if value.is_zero() {
        return Ok(vec![0u8; len]);
    }
    let bytes = value.to_bytes_be();
    if bytes.len() > len {
        return Err(KexError::DomainFault("value does not fit the requested width"));
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}
