//! Common interface over classic DH and ECDH
//!
//! Both command-line tools run the same `generate` / `load` sequence; the
//! scheme decides how parameters are encoded, checked and turned into keys,
//! and which envelope labels the files carry.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::keygen::{self, KeyPair};
use crate::params::{DhParameters, EcParameters};
use crate::pem;

pub trait KeyExchangeScheme {
    type Parameters;

    /// Short name used in log output
    const NAME: &'static str;
    const PARAMETERS_LABEL: &'static str;
    const PRIVATE_KEY_LABEL: &'static str;
    const PUBLIC_KEY_LABEL: &'static str;

    fn encode_parameters(params: &Self::Parameters) -> Result<Vec<u8>>;

    fn decode_parameters(der: &[u8]) -> Result<Self::Parameters>;

    /// Rejects decoded parameters that break the scheme's invariants
    fn check_parameters<R: RngCore + CryptoRng>(
        params: &Self::Parameters,
        config: &SearchConfig,
        rng: &mut R,
    ) -> Result<()>;

    fn generate_key_pair<R: RngCore + CryptoRng>(
        params: &Self::Parameters,
        rng: &mut R,
    ) -> Result<KeyPair>;

    fn public_from_private(params: &Self::Parameters, private_key: &[u8]) -> Result<Vec<u8>>;

    fn shared_secret(
        params: &Self::Parameters,
        private_key: &[u8],
        peer_public: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>>;

    /// Parameter file text; unlike key files it ends with a newline
    fn parameters_to_pem(params: &Self::Parameters) -> Result<String> {
        let mut text = pem::encode(Self::PARAMETERS_LABEL, &Self::encode_parameters(params)?);
        text.push('\n');
        Ok(text)
    }

    fn parameters_from_pem(text: &str) -> Result<Self::Parameters> {
        Self::decode_parameters(&pem::decode(Self::PARAMETERS_LABEL, text)?)
    }

    fn private_key_to_pem(pair: &KeyPair) -> String {
        pem::encode(Self::PRIVATE_KEY_LABEL, pair.private_key())
    }

    fn public_key_to_pem(pair: &KeyPair) -> String {
        pem::encode(Self::PUBLIC_KEY_LABEL, pair.public_key())
    }

    fn private_key_from_pem(text: &str) -> Result<Zeroizing<Vec<u8>>> {
        pem::decode(Self::PRIVATE_KEY_LABEL, text).map(Zeroizing::new)
    }

    fn public_key_from_pem(text: &str) -> Result<Vec<u8>> {
        pem::decode(Self::PUBLIC_KEY_LABEL, text)
    }
}

/// Finite-field Diffie-Hellman over a safe-prime group
#[derive(Debug, Clone, Copy, Default)]
pub struct Dh;

/// Diffie-Hellman over a named elliptic curve
#[derive(Debug, Clone, Copy, Default)]
pub struct Ecdh;

impl KeyExchangeScheme for Dh {
    type Parameters = DhParameters;

    const NAME: &'static str = "DH";
    const PARAMETERS_LABEL: &'static str = "DH PARAMETERS";
    const PRIVATE_KEY_LABEL: &'static str = "PRIVATE KEY";
    const PUBLIC_KEY_LABEL: &'static str = "PUBLIC KEY";

    fn encode_parameters(params: &DhParameters) -> Result<Vec<u8>> {
        Ok(params.to_der())
    }

    fn decode_parameters(der: &[u8]) -> Result<DhParameters> {
        DhParameters::from_der(der)
    }

    fn check_parameters<R: RngCore + CryptoRng>(
        params: &DhParameters,
        config: &SearchConfig,
        rng: &mut R,
    ) -> Result<()> {
        params.validate(config.rounds, rng)
    }

    fn generate_key_pair<R: RngCore + CryptoRng>(params: &DhParameters, rng: &mut R) -> Result<KeyPair> {
        keygen::generate_dh_key_pair(params, rng)
    }

    fn public_from_private(params: &DhParameters, private_key: &[u8]) -> Result<Vec<u8>> {
        keygen::dh_public_from_private(params, private_key)
    }

    fn shared_secret(
        params: &DhParameters,
        private_key: &[u8],
        peer_public: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        keygen::dh_shared_secret(params, private_key, peer_public)
    }
}

impl KeyExchangeScheme for Ecdh {
    type Parameters = EcParameters;

    const NAME: &'static str = "ECDH";
    const PARAMETERS_LABEL: &'static str = "EC PARAMETERS";
    const PRIVATE_KEY_LABEL: &'static str = "EC PRIVATE KEY";
    const PUBLIC_KEY_LABEL: &'static str = "EC PUBLIC KEY";

    fn encode_parameters(params: &EcParameters) -> Result<Vec<u8>> {
        params.to_der()
    }

    fn decode_parameters(der: &[u8]) -> Result<EcParameters> {
        EcParameters::from_der(der)
    }

    // named curves are fixed tables; decoding already rejected unknown OIDs
    fn check_parameters<R: RngCore + CryptoRng>(
        _params: &EcParameters,
        _config: &SearchConfig,
        _rng: &mut R,
    ) -> Result<()> {
        Ok(())
    }

    fn generate_key_pair<R: RngCore + CryptoRng>(params: &EcParameters, rng: &mut R) -> Result<KeyPair> {
        keygen::generate_ec_key_pair(params, rng)
    }

    fn public_from_private(params: &EcParameters, private_key: &[u8]) -> Result<Vec<u8>> {
        keygen::ec_public_from_private(params, private_key)
    }

    fn shared_secret(
        params: &EcParameters,
        private_key: &[u8],
        peer_public: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        keygen::ec_shared_secret(params, private_key, peer_public)
    }
}
