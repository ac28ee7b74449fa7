//! Domain parameters and their DER form
//!
//! DH: `SEQUENCE { INTEGER p, INTEGER q, INTEGER g }`
//! EC: the named curve's `OBJECT IDENTIFIER` on its own

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::bigint::{byte_len, mod_pow};
use crate::config::SearchConfig;
use crate::der::{DerReader, encode_integer, encode_oid, encode_sequence};
use crate::ec::{Curve, CurveId};
use crate::error::{KexError, Result};
use crate::primality::is_probable_prime;
use crate::safe_prime::generate_dh_parameters;

/// Prime p, subprime q dividing p - 1, and g of order q
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhParameters {
    pub p: BigUint,
    pub q: BigUint,
    pub g: BigUint,
}

impl DhParameters {
    /// Fresh safe-prime group with a `bits`-bit modulus
    pub fn generate<R: RngCore + CryptoRng>(
        bits: u64,
        config: &SearchConfig,
        rng: &mut R,
    ) -> Result<Self> {
        generate_dh_parameters(bits, config, rng)
    }

    pub fn to_der(&self) -> Vec<u8> {
        encode_sequence(&[
            encode_integer(&self.p),
            encode_integer(&self.q),
            encode_integer(&self.g),
        ])
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let mut outer = DerReader::new(der);
        let mut seq = outer.read_sequence()?;
        let p = seq.read_integer()?;
        let q = seq.read_integer()?;
        let g = seq.read_integer()?;
        seq.finish()?;
        outer.finish()?;
        Ok(Self { p, q, g })
    }

    /// Bytes in an encoded private exponent: ceil(bits(q) / 8)
    pub fn private_key_len(&self) -> usize {
        byte_len(self.q.bits())
    }

    /// Bytes in an encoded public value: ceil(bits(p) / 8)
    pub fn public_key_len(&self) -> usize {
        byte_len(self.p.bits())
    }

    /// Checks the group invariants: p and q prime, q | p - 1, 1 < g < p and g^q = 1.
    pub fn validate<R: RngCore + CryptoRng>(&self, rounds: usize, rng: &mut R) -> Result<()> {
        let one = BigUint::one();

        if self.p <= BigUint::from(3u32) || !self.p.bit(0) {
            return Err(KexError::invalid("p must be an odd prime greater than 3"));
        }
        if self.q <= one || self.q >= self.p {
            return Err(KexError::invalid("q out of range"));
        }
        if !((&self.p - &one) % &self.q).is_zero() {
            return Err(KexError::invalid("q does not divide p - 1"));
        }
        if self.g <= one || self.g >= self.p {
            return Err(KexError::invalid("g must satisfy 1 < g < p"));
        }
        if !is_probable_prime(&self.q, rounds, rng) {
            return Err(KexError::invalid("q is not prime"));
        }
        if !is_probable_prime(&self.p, rounds, rng) {
            return Err(KexError::invalid("p is not prime"));
        }
        if mod_pow(&self.g, &self.q, &self.p)? != one {
            return Err(KexError::invalid("g does not generate the order-q subgroup"));
        }

        debug!(bits = self.p.bits(), "DH parameters validated");
        Ok(())
    }
}

/// A named curve; custom curves are not representable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcParameters {
    pub curve: CurveId,
}

impl EcParameters {
    pub fn named(curve: CurveId) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> &'static Curve {
        self.curve.curve()
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        encode_oid(self.curve.oid())
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let mut reader = DerReader::new(der);
        let arcs = reader.read_oid()?;
        reader.finish()?;

        let curve = CurveId::from_oid(&arcs).ok_or_else(|| {
            let dotted: Vec<String> = arcs.iter().map(u64::to_string).collect();
            KexError::format(format!("unsupported curve OID {}", dotted.join(".")))
        })?;
        Ok(Self { curve })
    }
}

impl Default for EcParameters {
    fn default() -> Self {
        Self::named(CurveId::Secp256r1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_dh_der_layout() {
        assert_eq!(
            toy_group().to_der(),
            vec![0x30, 0x09, 0x02, 0x01, 0x17, 0x02, 0x01, 0x0b, 0x02, 0x01, 0x02]
        );
    }

    #[test]
    fn test_dh_der_roundtrip() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = DhParameters::generate(160, &SearchConfig::default(), &mut rng).unwrap();
        let decoded = DhParameters::from_der(&params.to_der()).unwrap();
        assert_eq!(decoded, params);
        assert_eq!(decoded.private_key_len(), 20);
        assert_eq!(decoded.public_key_len(), 20);
    }

    #[test]
    fn test_dh_der_truncated() {
        let der = toy_group().to_der();
        for cut in 0..der.len() {
            assert!(
                matches!(DhParameters::from_der(&der[..cut]), Err(KexError::Format(_))),
                "prefix of length {cut} decoded"
            );
        }

        let mut extra = der.clone();
        extra.push(0);
        assert!(DhParameters::from_der(&extra).is_err());
    }

    #[test]
    fn test_dh_der_missing_field() {
        let der = encode_sequence(&[encode_integer(&BigUint::from(23u32)), encode_integer(&BigUint::from(11u32))]);
        assert!(matches!(DhParameters::from_der(&der), Err(KexError::Format(_))));
    }

    #[test]
    fn test_validate() {
        let mut rng = StdRng::seed_from_u64(6);
        toy_group().validate(10, &mut rng).unwrap();

        let mut bad = toy_group();
        bad.g = BigUint::from(5u32); // 5 is a non-residue mod 23
        assert!(matches!(bad.validate(10, &mut rng), Err(KexError::InvalidParameters(_))));

        let mut bad = toy_group();
        bad.g = BigUint::one();
        assert!(bad.validate(10, &mut rng).is_err());

        let mut bad = toy_group();
        bad.q = BigUint::from(7u32);
        assert!(bad.validate(10, &mut rng).is_err());

        let bad = DhParameters {
            p: BigUint::from(25u32),
            q: BigUint::from(3u32),
            g: BigUint::from(7u32),
        };
        assert!(bad.validate(10, &mut rng).is_err());
    }

    #[test]
    fn test_ec_der_roundtrip() {
        for id in CurveId::ALL {
            let params = EcParameters::named(id);
            let der = params.to_der().unwrap();
            assert_eq!(EcParameters::from_der(&der).unwrap(), params);
        }
        assert_eq!(
            EcParameters::default().to_der().unwrap(),
            hex::decode("06082a8648ce3d030107").unwrap()
        );
    }

    #[test]
    fn test_ec_unknown_curve() {
        let der = encode_oid(&[1, 3, 132, 0, 10]).unwrap(); // secp256k1
        let result = EcParameters::from_der(&der);
        assert!(matches!(result, Err(KexError::Format(msg)) if msg.contains("1.3.132.0.10")));
    }
}
