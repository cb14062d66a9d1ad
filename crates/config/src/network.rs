//! Named networks a contract can be deployed to.

use crate::{
    error::ConfigError,
    resolve::{UnresolvedEnvVarError, interpolate},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, ops::Deref};

/// Name of the network that is always declared.
pub const ALFAJORES: &str = "alfajores";

/// RPC endpoint of the Celo Alfajores testnet.
pub const ALFAJORES_RPC_URL: &str = "https://alfajores-forno.celo-testnet.org";

/// Chain ID of the Celo Alfajores testnet.
pub const ALFAJORES_CHAIN_ID: u64 = 44787;

/// Environment variable holding the deployer's private key.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// A single network entry as it is declared.
///
/// `url` and each of the `accounts` may reference environment variables via `${VAR}`. These are
/// kept as-is and only substituted by [`NetworkConfig::resolve`] or
/// [`NetworkConfig::resolve_endpoint`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// RPC endpoint, http(s)
    #[serde(alias = "endpoint", alias = "rpc_url")]
    pub url: String,
    /// EIP-155 chain ID the endpoint is expected to serve
    #[serde(alias = "chainId")]
    pub chain_id: u64,
    /// Signing credentials, in order. The first one deploys.
    #[serde(default)]
    pub accounts: Vec<String>,
}

impl NetworkConfig {
    /// The built-in Celo Alfajores declaration.
    pub fn alfajores() -> Self {
        Self {
            url: ALFAJORES_RPC_URL.to_string(),
            chain_id: ALFAJORES_CHAIN_ID,
            accounts: vec![format!("${{{PRIVATE_KEY_ENV}}}")],
        }
    }

    /// Substitutes env vars in the endpoint and all accounts.
    pub fn resolve(&self, name: &str) -> Result<ResolvedNetwork, UnresolvedEnvVarError> {
        let mut network = self.resolve_endpoint(name)?;
        network.signing_keys =
            self.accounts.iter().map(|account| interpolate(account)).collect::<Result<_, _>>()?;
        Ok(network)
    }

    /// Substitutes env vars in the endpoint only. The accounts are left out, unresolved.
    pub fn resolve_endpoint(&self, name: &str) -> Result<ResolvedNetwork, UnresolvedEnvVarError> {
        let url = interpolate(&self.url)?;
        Ok(ResolvedNetwork {
            name: name.to_string(),
            url,
            chain_id: self.chain_id,
            signing_keys: Vec::new(),
        })
    }
}

/// A network with every placeholder substituted.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedNetwork {
    /// The name this network is declared under
    pub name: String,
    /// RPC endpoint
    pub url: String,
    /// Expected chain ID
    pub chain_id: u64,
    /// Raw signing credentials, no format validation has happened yet
    pub signing_keys: Vec<String>,
}

impl ResolvedNetwork {
    /// The credential used to sign the deployment, if any is configured.
    pub fn deployer_key(&self) -> Option<&str> {
        self.signing_keys.first().map(String::as_str)
    }
}

// keys are never printed
impl fmt::Debug for ResolvedNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedNetwork")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("chain_id", &self.chain_id)
            .field("signing_keys", &format_args!("[{} redacted]", self.signing_keys.len()))
            .finish()
    }
}

/// Container for all declared networks, keyed by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Networks {
    networks: BTreeMap<String, NetworkConfig>,
}

impl Networks {
    /// Creates a new set of networks
    pub fn new(networks: impl IntoIterator<Item = (impl Into<String>, NetworkConfig)>) -> Self {
        Self { networks: networks.into_iter().map(|(name, n)| (name.into(), n)).collect() }
    }

    /// Looks up `name` and resolves it.
    pub fn resolve(&self, name: &str) -> Result<ResolvedNetwork, ConfigError> {
        Ok(self.declared(name)?.resolve(name)?)
    }

    /// Looks up `name` and resolves its endpoint, see [`NetworkConfig::resolve_endpoint`].
    pub fn resolve_endpoint(&self, name: &str) -> Result<ResolvedNetwork, ConfigError> {
        Ok(self.declared(name)?.resolve_endpoint(name)?)
    }

    fn declared(&self, name: &str) -> Result<&NetworkConfig, ConfigError> {
        self.networks.get(name).ok_or_else(|| ConfigError::UnknownNetwork {
            name: name.to_string(),
            available: self.networks.keys().cloned().collect(),
        })
    }
}

impl Default for Networks {
    fn default() -> Self {
        Self::new([(ALFAJORES, NetworkConfig::alfajores())])
    }
}

impl Deref for Networks {
    type Target = BTreeMap<String, NetworkConfig>;

    fn deref(&self) -> &Self::Target {
        &self.networks
    }
}
