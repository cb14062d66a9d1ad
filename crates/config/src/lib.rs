//! # deploy-config
//!
//! Configuration for deploying contracts, loaded from built-in defaults, an optional
//! `deploy.toml` and `DEPLOY_` prefixed environment variables.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod error;
pub use error::{ConfigError, ExtractConfigError};

pub mod network;
pub use network::{NetworkConfig, Networks, ResolvedNetwork};

pub mod resolve;
pub use resolve::UnresolvedEnvVarError;

// reexport so cli types can implement `figment::Provider` to easily merge compiler arguments
pub use figment;

/// Deployment configuration.
///
/// Relative paths are resolved against [`Config::root`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The project root, never read from a provider.
    #[serde(skip)]
    pub root: PathBuf,
    /// Name of the network to deploy to
    pub network: String,
    /// Name of the contract to deploy
    pub contract: String,
    /// Directory the compiled build artifacts are searched in
    pub artifacts: PathBuf,
    /// Directory the address and artifact files are written to
    pub out: PathBuf,
    /// Number of confirmations to wait for
    pub confirmations: u64,
    /// Seconds to wait for the deployment to be confirmed
    pub transaction_timeout: u64,
    /// All declared networks
    pub networks: Networks,
}

impl Config {
    /// File name of config toml file
    pub const FILE_NAME: &'static str = "deploy.toml";

    /// Env var that overrides the location of [`Config::FILE_NAME`]
    pub const CONFIG_ENV: &'static str = "DEPLOY_CONFIG";

    /// Prefix of env vars that override config values
    pub const ENV_PREFIX: &'static str = "DEPLOY_";

    /// Files that mark the root of a Hardhat project
    pub const HARDHAT_CONFIG_FILES: &'static [&'static str] =
        &["hardhat.config.js", "hardhat.config.ts", "hardhat.config.cjs"];

    /// Default contract name
    pub const DEFAULT_CONTRACT: &'static str = "Trust";

    /// Returns the default config that uses the given root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), ..Default::default() }
    }

    /// Loads the config for the project at `root`.
    ///
    /// See [`figment_with_root`](Self::figment_with_root) for the sources that are merged.
    pub fn load_with_root(root: impl AsRef<Path>) -> Result<Self, ExtractConfigError> {
        let root = root.as_ref();
        let mut config = Self::try_from(Self::figment_with_root(root))?;
        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Attempts to extract a `Config` from `provider`, returning the result.
    ///
    /// The returned config has an empty [`root`](Self::root).
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        trace!("load config with provider: {:?}", provider.metadata());
        Figment::from(provider).extract::<Self>().map_err(ExtractConfigError::new)
    }

    /// Returns the [Figment] for the project at `root`.
    ///
    /// Sources, lowest precedence first:
    ///  - built-in defaults, which declare the `alfajores` network
    ///  - `deploy.toml` in `root`, or the file `DEPLOY_CONFIG` points to
    ///  - `DEPLOY_` prefixed env vars, e.g. `DEPLOY_NETWORK=alfajores`
    pub fn figment_with_root(root: impl AsRef<Path>) -> Figment {
        let root = root.as_ref();
        let toml = Env::var(Self::CONFIG_ENV)
            .map(|path| root.join(path))
            .unwrap_or_else(|| root.join(Self::FILE_NAME));
        debug!(path = %toml.display(), "loading deploy config");

        Figment::from(Self::with_root(root))
            .merge(Toml::file(toml))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["CONFIG", "DEBUG"]))
    }

    /// Resolves the selected [`network`](Self::network).
    pub fn resolved_network(&self) -> Result<ResolvedNetwork, ConfigError> {
        let network = self.networks.resolve(&self.network)?;
        if network.signing_keys.is_empty() {
            return Err(ConfigError::NoAccounts(network.name));
        }
        Ok(network)
    }

    /// Resolves the endpoint of the selected network, without its accounts.
    ///
    /// Used when the signer comes from somewhere else, so an account referencing an unset env
    /// var is not an error.
    pub fn resolved_endpoint(&self) -> Result<ResolvedNetwork, ConfigError> {
        self.networks.resolve_endpoint(&self.network)
    }

    /// The absolute artifacts directory.
    pub fn artifacts_path(&self) -> PathBuf {
        self.root.join(&self.artifacts)
    }

    /// The absolute output directory.
    pub fn out_path(&self) -> PathBuf {
        self.root.join(&self.out)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            network: network::ALFAJORES.to_string(),
            contract: Self::DEFAULT_CONTRACT.to_string(),
            artifacts: "artifacts".into(),
            out: "contracts".into(),
            confirmations: 1,
            transaction_timeout: 120,
            networks: Networks::default(),
        }
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("Deploy Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}

/// Returns the root of the project the current dir, or `path`, belongs to.
///
/// Traverses the dir tree up, looking for a `deploy.toml` or a Hardhat config file. Falls back to
/// the start dir if none is found.
pub fn find_project_root(path: Option<&Path>) -> std::io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let start = path.unwrap_or(&cwd);
    let is_root = |dir: &Path| {
        dir.join(Config::FILE_NAME).is_file() ||
            Config::HARDHAT_CONFIG_FILES.iter().any(|file| dir.join(file).is_file())
    };
    Ok(start.ancestors().find(|&dir| is_root(dir)).unwrap_or(start).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use similar_asserts::assert_eq;

    #[test]
    fn loads_defaults_without_file() {
        Jail::expect_with(|jail| {
            let config = Config::load_with_root(jail.directory()).unwrap();
            assert_eq!(config, Config::with_root(jail.directory()));
            assert_eq!(config.network, "alfajores");
            assert_eq!(config.contract, "Trust");
            assert_eq!(config.confirmations, 1);
            assert_eq!(config.out_path(), jail.directory().join("contracts"));
            assert_eq!(config.artifacts_path(), jail.directory().join("artifacts"));
            Ok(())
        });
    }

    #[test]
    fn resolves_private_key_env() {
        Jail::expect_with(|jail| {
            jail.set_env("PRIVATE_KEY", "0x01");
            let config = Config::load_with_root(jail.directory()).unwrap();
            let network = config.resolved_network().unwrap();
            assert_eq!(network.url, network::ALFAJORES_RPC_URL);
            assert_eq!(network.chain_id, 44787);
            assert_eq!(network.deployer_key(), Some("0x01"));
            Ok(())
        });
    }

    #[test]
    fn merges_toml_networks() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "deploy.toml",
                r#"
                network = "local"
                out = "deployments"

                [networks.local]
                url = "http://localhost:8545"
                chain_id = 31337
                accounts = ["${DEPLOY_TEST_LOCAL_KEY}"]
            "#,
            )?;
            jail.set_env("DEPLOY_TEST_LOCAL_KEY", "0x02");

            let config = Config::load_with_root(jail.directory()).unwrap();
            assert_eq!(config.network, "local");
            assert_eq!(config.out, PathBuf::from("deployments"));
            // the built-in network is kept
            assert!(config.networks.contains_key("alfajores"));

            let network = config.resolved_network().unwrap();
            assert_eq!(network.chain_id, 31337);
            assert_eq!(network.signing_keys, vec!["0x02".to_string()]);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("deploy.toml", "contract = \"Other\"\nconfirmations = 3")?;
            jail.set_env("DEPLOY_CONTRACT", "Trust");
            jail.set_env("DEPLOY_TRANSACTION_TIMEOUT", "30");

            let config = Config::load_with_root(jail.directory()).unwrap();
            assert_eq!(config.contract, "Trust");
            assert_eq!(config.confirmations, 3);
            assert_eq!(config.transaction_timeout, 30);
            Ok(())
        });
    }

    #[test]
    fn custom_config_path() {
        Jail::expect_with(|jail| {
            jail.create_file("celo.toml", "network = \"celo\"")?;
            jail.set_env("DEPLOY_CONFIG", "celo.toml");

            let config = Config::load_with_root(jail.directory()).unwrap();
            assert_eq!(config.network, "celo");
            assert!(matches!(
                config.resolved_network(),
                Err(ConfigError::UnknownNetwork { ref name, .. }) if name == "celo"
            ));
            Ok(())
        });
    }

    #[test]
    fn network_without_accounts() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "deploy.toml",
                r#"
                network = "readonly"

                [networks.readonly]
                url = "http://localhost:8545"
                chain_id = 31337
            "#,
            )?;

            let config = Config::load_with_root(jail.directory()).unwrap();
            assert_eq!(
                config.resolved_network().unwrap_err(),
                ConfigError::NoAccounts("readonly".to_string())
            );
            Ok(())
        });
    }

    #[test]
    fn invalid_toml_is_reported() {
        Jail::expect_with(|jail| {
            jail.create_file("deploy.toml", "confirmations = \"many\"")?;

            let err = Config::load_with_root(jail.directory()).unwrap_err();
            let msg = err.to_string();
            assert!(msg.starts_with("failed to extract deploy config:"), "{msg}");
            assert!(msg.contains("confirmations"), "{msg}");
            Ok(())
        });
    }

    #[test]
    fn finds_hardhat_root() {
        Jail::expect_with(|jail| {
            jail.create_file("hardhat.config.js", "module.exports = {};")?;
            let nested = jail.directory().join("scripts");
            std::fs::create_dir_all(&nested).unwrap();

            let root = find_project_root(Some(&nested)).unwrap();
            assert_eq!(root, jail.directory().to_path_buf());
            Ok(())
        });
    }
}
