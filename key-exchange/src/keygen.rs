//! Key-pair derivation for both schemes
//!
//! Private scalars are drawn from `[1, q)` (DH) or `[1, n)` (EC) with the
//! caller's RNG. Encodings have a fixed width taken from the parameters,
//! never from the sampled value, so leading zero bytes survive.

use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use tracing::instrument;
use zeroize::Zeroizing;

use crate::bigint::{mod_pow, random_in_range, to_fixed_bytes};
use crate::ec::{Curve, ProjectivePoint};
use crate::error::{KexError, Result};
use crate::params::{DhParameters, EcParameters};

/// Encoded private scalar and public value
#[derive(Debug, Clone)]
pub struct KeyPair {
    private_key: Zeroizing<Vec<u8>>,
    public_key: Vec<u8>,
}

impl KeyPair {
    pub fn new(private_key: Vec<u8>, public_key: Vec<u8>) -> Self {
        Self {
            private_key: Zeroizing::new(private_key),
            public_key,
        }
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

/// Parses a fixed-width private scalar and checks `1 <= x < bound`.
fn decode_scalar(bytes: &[u8], expected_len: usize, bound: &BigUint) -> Result<BigUint> {
    if bytes.len() != expected_len {
        return Err(KexError::format(format!(
            "private key must be {expected_len} bytes, got {}",
            bytes.len()
        )));
    }
    let x = BigUint::from_bytes_be(bytes);
    if x < BigUint::one() || &x >= bound {
        return Err(KexError::format("private scalar out of range"));
    }
    Ok(x)
}

// --- classic Diffie-Hellman ---

#[instrument(level = "debug", skip_all, fields(bits = params.p.bits()))]
pub fn generate_dh_key_pair<R: RngCore + CryptoRng>(
    params: &DhParameters,
    rng: &mut R,
) -> Result<KeyPair> {
    let x = random_in_range(rng, &BigUint::one(), &params.q)?;
    dh_key_pair_from_scalar(params, &x)
}

/// y = g^x mod p for a given x in [1, q)
pub fn dh_key_pair_from_scalar(params: &DhParameters, x: &BigUint) -> Result<KeyPair> {
    if x < &BigUint::one() || x >= &params.q {
        return Err(KexError::DomainFault("private scalar outside [1, q)"));
    }
    let y = mod_pow(&params.g, x, &params.p)?;
    Ok(KeyPair::new(
        to_fixed_bytes(x, params.private_key_len())?,
        to_fixed_bytes(&y, params.public_key_len())?,
    ))
}

pub fn dh_public_from_private(params: &DhParameters, private_key: &[u8]) -> Result<Vec<u8>> {
    let x = decode_scalar(private_key, params.private_key_len(), &params.q)?;
    let y = mod_pow(&params.g, &x, &params.p)?;
    to_fixed_bytes(&y, params.public_key_len())
}

/// peer^x mod p after checking the peer value lies in the order-q subgroup
pub fn dh_shared_secret(
    params: &DhParameters,
    private_key: &[u8],
    peer_public: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let x = decode_scalar(private_key, params.private_key_len(), &params.q)?;

    let peer = BigUint::from_bytes_be(peer_public);
    let p_minus_1 = &params.p - 1u32;
    if peer < BigUint::from(2u32) || peer >= p_minus_1 {
        return Err(KexError::invalid("peer public value must lie in [2, p-2]"));
    }
    if mod_pow(&peer, &params.q, &params.p)? != BigUint::one() {
        return Err(KexError::invalid("peer public value is not in the order-q subgroup"));
    }

    let secret = mod_pow(&peer, &x, &params.p)?;
    Ok(Zeroizing::new(to_fixed_bytes(&secret, params.public_key_len())?))
}

// --- elliptic-curve Diffie-Hellman ---

#[instrument(level = "debug", skip_all, fields(curve = %params.curve))]
pub fn generate_ec_key_pair<R: RngCore + CryptoRng>(
    params: &EcParameters,
    rng: &mut R,
) -> Result<KeyPair> {
    let curve = params.curve();
    let x = random_in_range(rng, &BigUint::one(), curve.order())?;
    ec_key_pair_from_scalar(params, &x)
}

fn ec_public_point(curve: &Curve, x: &BigUint) -> Result<Vec<u8>> {
    let point = curve
        .to_affine(&curve.mul_generator(x))?
        .ok_or(KexError::DomainFault("public point is the identity"))?;
    curve.encode_point(&point)
}

/// Y = x * G for a given x in [1, n)
pub fn ec_key_pair_from_scalar(params: &EcParameters, x: &BigUint) -> Result<KeyPair> {
    let curve = params.curve();
    if x < &BigUint::one() || x >= curve.order() {
        return Err(KexError::DomainFault("private scalar outside [1, n)"));
    }
    Ok(KeyPair::new(
        to_fixed_bytes(x, curve.field_len())?,
        ec_public_point(curve, x)?,
    ))
}

pub fn ec_public_from_private(params: &EcParameters, private_key: &[u8]) -> Result<Vec<u8>> {
    let curve = params.curve();
    let x = decode_scalar(private_key, curve.field_len(), curve.order())?;
    ec_public_point(curve, &x)
}

/// X coordinate of x * Peer
pub fn ec_shared_secret(
    params: &EcParameters,
    private_key: &[u8],
    peer_public: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let curve = params.curve();
    let x = decode_scalar(private_key, curve.field_len(), curve.order())?;
    let peer = curve.decode_point(peer_public)?;

    let shared = curve
        .to_affine(&curve.scalar_mul(&x, &ProjectivePoint::from(&peer)))?
        .ok_or_else(|| KexError::invalid("shared point is the identity"))?;
    Ok(Zeroizing::new(to_fixed_bytes(&shared.x, curve.field_len())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::ec::CurveId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn toy_group() -> DhParameters {
        DhParameters {
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(2u32),
        }
    }

    #[test]
    fn test_dh_fixed_scalar() {
        // 2^6 mod 23 = 18
        let pair = dh_key_pair_from_scalar(&toy_group(), &BigUint::from(6u32)).unwrap();
        assert_eq!(pair.private_key(), &[6]);
        assert_eq!(pair.public_key(), &[18]);

        let again = dh_key_pair_from_scalar(&toy_group(), &BigUint::from(6u32)).unwrap();
        assert_eq!(again.public_key(), pair.public_key());
    }

    #[test]
    fn test_dh_scalar_bounds() {
        let group = toy_group();
        assert!(dh_key_pair_from_scalar(&group, &BigUint::from(0u32)).is_err());
        assert!(dh_key_pair_from_scalar(&group, &BigUint::from(11u32)).is_err());
        assert!(dh_key_pair_from_scalar(&group, &BigUint::from(10u32)).is_ok());
    }

    #[test]
    fn test_dh_key_lengths_and_leading_zeros() {
        let mut rng = StdRng::seed_from_u64(8);
        let params = DhParameters::generate(128, &SearchConfig::default(), &mut rng).unwrap();

        for _ in 0..10 {
            let pair = generate_dh_key_pair(&params, &mut rng).unwrap();
            assert_eq!(pair.private_key().len(), 16);
            assert_eq!(pair.public_key().len(), 16);
        }

        let small = dh_key_pair_from_scalar(&params, &BigUint::from(3u32)).unwrap();
        assert_eq!(small.private_key().len(), 16);
        assert_eq!(&small.private_key()[..15], &[0u8; 15]);
        assert_eq!(small.private_key()[15], 3);
    }

    #[test]
    fn test_dh_exchange() {
        let mut rng = StdRng::seed_from_u64(12);
        let params = DhParameters::generate(96, &SearchConfig::default(), &mut rng).unwrap();

        let alice = generate_dh_key_pair(&params, &mut rng).unwrap();
        let bob = generate_dh_key_pair(&params, &mut rng).unwrap();

        let alice_secret = dh_shared_secret(&params, alice.private_key(), bob.public_key()).unwrap();
        let bob_secret = dh_shared_secret(&params, bob.private_key(), alice.public_key()).unwrap();
        assert_eq!(*alice_secret, *bob_secret);

        assert_eq!(
            dh_public_from_private(&params, alice.private_key()).unwrap(),
            alice.public_key()
        );
    }

    #[test]
    fn test_dh_rejects_bad_peer() {
        let group = toy_group();
        let pair = dh_key_pair_from_scalar(&group, &BigUint::from(4u32)).unwrap();

        // 1 and p-1 are outside the range, 5 has order 22
        for peer in [1u8, 22, 5] {
            let result = dh_shared_secret(&group, pair.private_key(), &[peer]);
            assert!(matches!(result, Err(KexError::InvalidParameters(_))), "peer {peer}");
        }
        assert!(dh_shared_secret(&group, &[0, 4], &[18]).is_err());
    }

    #[test]
    fn test_ec_key_lengths() {
        let mut rng = StdRng::seed_from_u64(13);
        let p256 = EcParameters::named(CurveId::Secp256r1);
        let pair = generate_ec_key_pair(&p256, &mut rng).unwrap();
        assert_eq!(pair.private_key().len(), 32);
        assert_eq!(pair.public_key().len(), 65);
        assert_eq!(pair.public_key()[0], 0x04);

        let p384 = EcParameters::named(CurveId::Secp384r1);
        let pair = generate_ec_key_pair(&p384, &mut rng).unwrap();
        assert_eq!(pair.private_key().len(), 48);
        assert_eq!(pair.public_key().len(), 97);
    }

    #[test]
    fn test_ec_fixed_scalar() {
        let params = EcParameters::named(CurveId::Secp256r1);
        let x = BigUint::from_bytes_be(
            &hex::decode("c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721").unwrap(),
        );
        let pair = ec_key_pair_from_scalar(&params, &x).unwrap();
        assert_eq!(
            hex::encode(pair.public_key()),
            "0460fed4ba255a9d31c961eb74c6356d68c049b8923b61fa6ce669622e60f29fb6\
             7903fe1008b8bc99a41ae9e95628bc64f2f1b20c2d7e9f5177a3c294d4462299"
        );
        assert_eq!(ec_public_from_private(&params, pair.private_key()).unwrap(), pair.public_key());
    }

    #[test]
    fn test_ec_exchange() {
        let mut rng = StdRng::seed_from_u64(14);
        let params = EcParameters::default();

        let alice = generate_ec_key_pair(&params, &mut rng).unwrap();
        let bob = generate_ec_key_pair(&params, &mut rng).unwrap();

        let alice_secret = ec_shared_secret(&params, alice.private_key(), bob.public_key()).unwrap();
        let bob_secret = ec_shared_secret(&params, bob.private_key(), alice.public_key()).unwrap();
        assert_eq!(*alice_secret, *bob_secret);
        assert_eq!(alice_secret.len(), 32);
    }

    #[test]
    fn test_ec_rejects_bad_input() {
        let params = EcParameters::default();
        let mut rng = StdRng::seed_from_u64(15);
        let pair = generate_ec_key_pair(&params, &mut rng).unwrap();

        let mut bad_peer = pair.public_key().to_vec();
        bad_peer[10] ^= 0xff;
        assert!(ec_shared_secret(&params, pair.private_key(), &bad_peer).is_err());

        assert!(ec_public_from_private(&params, &[0u8; 32]).is_err());
        assert!(ec_public_from_private(&params, &[1u8; 31]).is_err());
    }
}
