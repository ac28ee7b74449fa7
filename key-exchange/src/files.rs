//! File sequencing behind the `generate` and `load` commands
//!
//! `load` reads and decodes the whole parameter file before anything is
//! written, so a malformed input leaves no key files behind. A failed
//! public key write removes the private key written just before it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use rand::{CryptoRng, RngCore};
use tracing::{info, instrument};
use zeroize::Zeroizing;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::keygen::KeyPair;
use crate::scheme::KeyExchangeScheme;

/// Writes `text` to `path`, readable by the owner only on Unix.
fn write_private(path: &Path, text: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

pub fn save_parameters<S: KeyExchangeScheme>(path: &Path, params: &S::Parameters) -> Result<()> {
    fs::write(path, S::parameters_to_pem(params)?)?;
    info!(scheme = S::NAME, path = %path.display(), "parameters written");
    Ok(())
}

pub fn load_parameters<S: KeyExchangeScheme>(path: &Path) -> Result<S::Parameters> {
    let text = fs::read_to_string(path)?;
    S::parameters_from_pem(&text)
}

pub fn write_key_pair<S: KeyExchangeScheme>(
    private_path: &Path,
    public_path: &Path,
    pair: &KeyPair,
) -> Result<()> {
    let private_text = Zeroizing::new(S::private_key_to_pem(pair));
    let public_text = S::public_key_to_pem(pair);

    write_private(private_path, &private_text)?;
    if let Err(err) = fs::write(public_path, public_text) {
        // no private key without its public half
        let _ = fs::remove_file(private_path);
        return Err(err.into());
    }
    info!(
        scheme = S::NAME,
        private = %private_path.display(),
        public = %public_path.display(),
        "key pair written"
    );
    Ok(())
}

/// Reads parameters, checks them, derives a fresh key pair and writes both halves.
#[instrument(level = "info", skip_all, fields(scheme = S::NAME, params = %params_path.display()))]
pub fn load_parameters_and_generate_keys<S: KeyExchangeScheme, R: RngCore + CryptoRng>(
    params_path: &Path,
    private_path: &Path,
    public_path: &Path,
    config: &SearchConfig,
    rng: &mut R,
) -> Result<KeyPair> {
    let params = load_parameters::<S>(params_path)?;
    S::check_parameters(&params, config, rng)?;

    let pair = S::generate_key_pair(&params, rng)?;
    write_key_pair::<S>(private_path, public_path, &pair)?;
    Ok(pair)
}
