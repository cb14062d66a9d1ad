//! Command line arguments of `trust-deploy`.

use crate::{RpcDeployer, deploy_contract};
use clap::{Parser, ValueHint};
use alloy_signer_local::PrivateKeySigner;
use deploy_common::{ContractArtifact, ProviderBuilder};
use deploy_config::{
    Config, ResolvedNetwork, find_project_root,
    figment::{
        self, Figment, Metadata, Profile, Provider,
        value::{Dict, Map, Value},
    },
};
use deploy_wallets::network_signer;
use eyre::Result;
use serde_json::json;
use std::{path::PathBuf, time::Duration};

/// Deploy a compiled contract and record its address.
///
/// The address is written to `<out>/<Contract>-address.json` and the artifact is copied to
/// `<out>/<Contract>.json`.
#[derive(Clone, Debug, Default, Parser)]
#[command(name = "trust-deploy", version, about, long_about = None)]
pub struct DeployArgs {
    /// The network to deploy to, as declared in `deploy.toml`.
    #[arg(long, short, value_name = "NAME")]
    pub network: Option<String>,

    /// The contract to deploy, either `<Name>` or `<path>:<Name>`.
    #[arg(long, value_name = "CONTRACT")]
    pub contract: Option<String>,

    /// The project's root path.
    ///
    /// By default this is the first ancestor of the current dir containing a `deploy.toml` or a
    /// Hardhat config.
    #[arg(long, value_hint = ValueHint::DirPath, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// The directory containing the compiled artifacts, relative to the root.
    #[arg(long, value_hint = ValueHint::DirPath, value_name = "PATH")]
    pub artifacts: Option<PathBuf>,

    /// The directory the address and artifact files are written to, relative to the root.
    #[arg(long, value_hint = ValueHint::DirPath, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Use the provided private key instead of the network's account.
    #[arg(long, value_name = "RAW_PRIVATE_KEY")]
    pub private_key: Option<String>,

    /// The number of confirmations to wait for.
    #[arg(long, value_name = "NUM")]
    pub confirmations: Option<u64>,

    /// Seconds to wait for the deployment to be confirmed.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Print the deployment information as JSON.
    #[arg(long, help_heading = "Display options")]
    pub json: bool,
}

impl DeployArgs {
    /// Returns the root of the project to deploy from.
    pub fn project_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => Ok(find_project_root(None)?),
        }
    }

    /// Loads the config of the project, with these arguments merged on top.
    pub fn load_config(&self) -> Result<Config> {
        let root = self.project_root()?;
        let figment: Figment = Config::figment_with_root(&root).merge(self.clone());
        let mut config = Config::try_from(figment)?;
        config.root = root;
        Ok(config)
    }

    /// Resolves the selected network and the signer that deploys on it.
    ///
    /// With `--private-key`, the network's accounts are not resolved.
    pub fn network_and_signer(
        &self,
        config: &Config,
    ) -> Result<(ResolvedNetwork, PrivateKeySigner)> {
        let network = match self.private_key {
            Some(_) => config.resolved_endpoint()?,
            None => config.resolved_network()?,
        };
        let signer = network_signer(&network, self.private_key.as_deref())?;
        Ok((network, signer))
    }

    /// Deploys the contract and writes its files.
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let (network, signer) = self.network_and_signer(&config)?;

        let artifact = ContractArtifact::read(&config.artifacts_path(), &config.contract)?;
        let code = artifact.creation_code()?;
        debug!(path = %artifact.path.display(), size = code.len(), "loaded artifact");

        let provider = ProviderBuilder::new(&network.url).build()?;
        let deployer =
            RpcDeployer::connect(&network.name, &network.url, network.chain_id, provider, signer)
                .await?;

        let outcome = deploy_contract(
            &deployer,
            &artifact,
            code,
            &config.out_path(),
            config.confirmations,
            Duration::from_secs(config.transaction_timeout),
        )
        .await?;

        let deployment = &outcome.deployment;
        if self.json {
            let output = json!({
                "deployer": deployment.deployer.to_string(),
                "deployedTo": deployment.address.to_string(),
                "transactionHash": deployment.transaction_hash,
            });
            println!("{output}");
        } else {
            let name = &outcome.record.contract_name;
            println!("{name} contract deployed to: {}", deployment.address);
        }
        Ok(())
    }
}

// Make these args a `figment::Provider` so they can be merged into the `Config`
impl Provider for DeployArgs {
    fn metadata(&self) -> Metadata {
        Metadata::named("Deploy Args Provider")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = Dict::new();

        if let Some(network) = &self.network {
            dict.insert("network".to_string(), network.as_str().into());
        }
        if let Some(contract) = &self.contract {
            dict.insert("contract".to_string(), contract.as_str().into());
        }
        if let Some(artifacts) = &self.artifacts {
            dict.insert("artifacts".to_string(), Value::serialize(artifacts)?);
        }
        if let Some(out) = &self.out {
            dict.insert("out".to_string(), Value::serialize(out)?);
        }
        if let Some(confirmations) = self.confirmations {
            dict.insert("confirmations".to_string(), confirmations.into());
        }
        if let Some(timeout) = self.timeout {
            dict.insert("transaction_timeout".to_string(), timeout.into());
        }

        Ok(Map::from([(Profile::Default, dict)]))
    }
}
