//! Miller-Rabin primality testing
//!
//! Probabilistic test with error probability at most 4^-k after k rounds.
//! Witnesses come from the caller's RNG so tests can run on a seeded source.

use std::sync::OnceLock;

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::bigint::mod_pow;

/// Bound for the trial-division table
const SMALL_PRIME_LIMIT: usize = 2000;

/// Odd primes below [`SMALL_PRIME_LIMIT`], built once by a sieve
pub fn small_primes() -> &'static [u32] {
    static PRIMES: OnceLock<Vec<u32>> = OnceLock::new();
    PRIMES.get_or_init(|| {
        let mut composite = vec![false; SMALL_PRIME_LIMIT];
        let mut primes = Vec::new();
        for i in 2..SMALL_PRIME_LIMIT {
            if composite[i] {
                continue;
            }
            if i > 2 {
                primes.push(i as u32);
            }
            let mut j = i * i;
            while j < SMALL_PRIME_LIMIT {
                composite[j] = true;
                j += i;
            }
        }
        primes
    })
}

/// Returns true if some small odd prime divides `n` without being `n` itself.
pub fn has_small_factor(n: &BigUint) -> bool {
    small_primes().iter().any(|&p| {
        let r = n % p;
        r.is_zero() && *n != BigUint::from(p)
    })
}

/// Miller-Rabin test with `rounds` random witnesses.
///
/// `n < 2` and even `n > 2` are rejected without drawing a witness.
pub fn is_probable_prime<R: RngCore + CryptoRng>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    if n == &two || n == &BigUint::from(3u32) {
        return true;
    }
    if !n.bit(0) {
        return false;
    }

    // n - 1 = 2^s * d with d odd
    let one = BigUint::one();
    let n_minus_1 = n - &one;
    let s = n_minus_1.trailing_zeros().unwrap_or(0);
    let d = &n_minus_1 >> s;

    'witness: for _ in 0..rounds {
        // a in [2, n-2]
        let a = rng.gen_biguint_range(&two, &n_minus_1);
        let Ok(mut x) = mod_pow(&a, &d, n) else {
            return false;
        };

        if x == one || x == n_minus_1 {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }

    true
}
