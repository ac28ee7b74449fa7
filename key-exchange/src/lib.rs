//! # Key Exchange Library
//!
//! Domain-parameter and key-pair generation for classic Diffie-Hellman and
//! elliptic-curve Diffie-Hellman, with the number theory and curve
//! arithmetic implemented here rather than borrowed from a crypto library.
//!
//! ## Building blocks
//!
//! - [`bigint`] - modular exponentiation (Montgomery ladder), inversion, sampling
//! - [`primality`] - Miller-Rabin
//! - [`safe_prime`] - p = 2q + 1 search with a generator of the order-q subgroup
//! - [`ec`] - NIST P-256 / P-384 point arithmetic
//! - [`der`] and [`pem`] - the on-disk formats
//!
//! ## Usage
//!
//! ```rust
//! use key_exchange::{Dh, DhParameters, KeyExchangeScheme, SearchConfig};
//!
//! let mut rng = rand::thread_rng();
//! let params = DhParameters::generate(64, &SearchConfig::default(), &mut rng)?;
//! let pair = Dh::generate_key_pair(&params, &mut rng)?;
//!
//! assert_eq!(pair.private_key().len(), 8);
//! let text = Dh::parameters_to_pem(&params)?;
//! assert!(text.starts_with("-----BEGIN DH PARAMETERS-----"));
//! # Ok::<(), key_exchange::KexError>(())
//! ```

pub mod bigint;
pub mod cli;
pub mod config;
pub mod der;
pub mod ec;
pub mod error;
pub mod files;
pub mod keygen;
pub mod logging;
pub mod params;
pub mod pem;
pub mod primality;
pub mod safe_prime;
pub mod scheme;

pub use config::{DEFAULT_ROUNDS, SearchConfig};
pub use ec::CurveId;
pub use error::{KexError, Result};
pub use keygen::KeyPair;
pub use params::{DhParameters, EcParameters};
pub use scheme::{Dh, Ecdh, KeyExchangeScheme};
