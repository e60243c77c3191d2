use anyhow::{anyhow, Context as _, Result};
use bip32::{Language, Mnemonic};
use zeroize::Zeroizing;

pub type Signing = cosmrs::crypto::secp256k1::SigningKey;

pub type Public = cosmrs::crypto::PublicKey;

pub fn derive_from_mnemonic(
    phrase: &Zeroizing<String>,
    password: &str,
) -> Result<Signing> {
    const DEFAULT_COSMOS_DERIVATION_PATH: &str = "m/44'/118'/0'/0/0";

    let derivation_path = DEFAULT_COSMOS_DERIVATION_PATH
        .parse()
        .context("Failed to parse key derivation path!")?;

    let seed = Mnemonic::new(phrase.trim(), Language::English)
        .map(|phrase| phrase.to_seed(password))
        .context("Failed to parse mnemonic!")?;

    Signing::derive_from_path(seed, &derivation_path)
        .map_err(|error| anyhow!(error))
        .context("Failed to derive signing key!")
}
