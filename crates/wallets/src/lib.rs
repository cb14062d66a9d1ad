//! # deploy-wallets
//!
//! Turns the credentials of a network into a signer.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use deploy_config::{ConfigError, ResolvedNetwork};
use eyre::Result;

pub mod error;
pub use error::PrivateKeyError;

pub mod utils;
pub use utils::create_private_key_signer;

/// Returns the signer that sends transactions on `network`.
///
/// `private_key` takes precedence over the network's first configured account. The signer is
/// bound to the network's chain ID.
pub fn network_signer(
    network: &ResolvedNetwork,
    private_key: Option<&str>,
) -> Result<PrivateKeySigner> {
    let key = match private_key {
        Some(key) => key,
        None => network
            .deployer_key()
            .ok_or_else(|| ConfigError::NoAccounts(network.name.clone()))?,
    };
    let mut signer = create_private_key_signer(key)?;
    signer.set_chain_id(Some(network.chain_id));
    debug!(address = %signer.address(), network = %network.name, "loaded signer");
    Ok(signer)
}
