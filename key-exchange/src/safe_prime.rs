//! Safe-prime and subgroup generator search for classic Diffie-Hellman
//!
//! Draws q with exactly `bits - 1` bits, forms p = 2q + 1 and keeps going
//! until both are prime and a small g generating the order-q subgroup is
//! found. The finished group is checked once more with
//! [`DhParameters::validate`] before it is returned. A failed candidate is
//! never an error; only an exhausted `max_attempts` budget is.

use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use tracing::{debug, instrument, trace, warn};

use crate::bigint::{mod_pow, random_with_bits};
use crate::config::SearchConfig;
use crate::error::{KexError, Result};
use crate::params::DhParameters;
use crate::primality::{has_small_factor, is_probable_prime};

/// Smallest accepted modulus size
pub const MIN_DH_BITS: u64 = 16;

/// Largest small integer tried as a generator before the draw is abandoned
const GENERATOR_SEARCH_LIMIT: u32 = 1000;

/// Searches for (p, q, g) with p = 2q + 1 and g of order q modulo p.
#[instrument(level = "info", skip(config, rng))]
pub fn generate_dh_parameters<R: RngCore + CryptoRng>(
    bits: u64,
    config: &SearchConfig,
    rng: &mut R,
) -> Result<DhParameters> {
    if bits < MIN_DH_BITS {
        return Err(KexError::InvalidBitLength {
            bits,
            min: MIN_DH_BITS,
        });
    }

    let mut attempts = 0u64;
    loop {
        if let Some(max) = config.max_attempts {
            if attempts >= max {
                warn!(attempts, "safe-prime search exhausted");
                return Err(KexError::SearchExhausted { attempts });
            }
        }
        attempts += 1;

        let q = random_with_bits(rng, bits - 1)? | BigUint::one();
        let p = (&q << 1u32) + 1u32;

        if has_small_factor(&q) || has_small_factor(&p) {
            continue;
        }

        // one round first: almost every candidate dies here
        if !is_probable_prime(&q, 1, rng) || !is_probable_prime(&p, 1, rng) {
            continue;
        }
        trace!(attempts, "candidate survived first round");

        if !is_probable_prime(&q, config.rounds, rng) || !is_probable_prime(&p, config.rounds, rng) {
            continue;
        }

        let Some(g) = find_generator(&p, &q)? else {
            continue;
        };

        let params = DhParameters { p, q, g };
        if let Err(err) = params.validate(config.rounds, rng) {
            warn!(attempts, %err, "candidate failed re-verification");
            continue;
        }

        debug!(attempts, bits = params.p.bits(), generator = %params.g, "safe prime found");
        return Ok(params);
    }
}

/// Smallest g >= 2 with g^q = 1 (mod p).
///
/// For a safe prime the order-q subgroup is the quadratic residues, so 4
/// always qualifies and the search ends almost immediately.
pub fn find_generator(p: &BigUint, q: &BigUint) -> Result<Option<BigUint>> {
    let one = BigUint::one();
    let p_minus_1 = p - &one;

    for candidate in 2..=GENERATOR_SEARCH_LIMIT {
        let g = BigUint::from(candidate);
        if g >= p_minus_1 {
            break;
        }
        if mod_pow(&g, q, p)? == one {
            return Ok(Some(g));
        }
    }

    Ok(None)
}
