use crate::error::PrivateKeyError;
use alloy_primitives::{B256, hex::FromHex};
use alloy_signer_local::PrivateKeySigner;
use eyre::Result;

fn ensure_pk_not_env(pk: &str) -> Result<()> {
    if !pk.starts_with("0x") && std::env::var(pk).is_ok() {
        return Err(PrivateKeyError::ExistsAsEnvVar(pk.to_string()).into());
    }
    Ok(())
}

/// Validates and sanitizes user inputs, returning a configured [PrivateKeySigner].
pub fn create_private_key_signer(private_key_str: &str) -> Result<PrivateKeySigner> {
    let private_key_str = private_key_str.trim();
    if private_key_str.is_empty() {
        return Err(PrivateKeyError::Empty.into());
    }
    let private_key = match B256::from_hex(private_key_str) {
        Ok(private_key) => private_key,
        Err(err) => {
            ensure_pk_not_env(private_key_str)?;
            return Err(PrivateKeyError::InvalidHex(err).into());
        }
    };
    match PrivateKeySigner::from_bytes(&private_key) {
        Ok(pk) => Ok(pk),
        Err(err) => {
            ensure_pk_not_env(private_key_str)?;
            eyre::bail!("Failed to create wallet from private key: {err}")
        }
    }
}
