//! # trust-deploy
//!
//! Deploys a compiled contract, by default `Trust` on Celo alfajores, and records where it was
//! deployed next to a copy of its artifact.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_primitives::Bytes;
use deploy_common::ContractArtifact;
use eyre::{Result, WrapErr};
use std::{path::Path, time::Duration};

pub mod args;
pub use args::DeployArgs;

pub mod deployer;
pub use deployer::{ContractDeployer, DeployError, Deployment, RpcDeployer};

pub mod record;
pub use record::{DeployedContractRecord, DeploymentFiles};

/// A deployment whose files were written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployOutcome {
    /// The confirmed deployment
    pub deployment: Deployment,
    /// The recorded address
    pub record: DeployedContractRecord,
    /// Where the record and the artifact were written
    pub files: DeploymentFiles,
}

/// Deploys `code` of `artifact` and, once confirmed, writes the address and artifact files into
/// `out`.
///
/// Nothing is written if the deployment fails.
pub async fn deploy_contract<D: ContractDeployer + ?Sized>(
    deployer: &D,
    artifact: &ContractArtifact,
    code: Bytes,
    out: &Path,
    confirmations: u64,
    timeout: Duration,
) -> Result<DeployOutcome> {
    info!(contract = %artifact.name, deployer = %deployer.deployer(), "deploying contract");
    let deployment = deployer
        .deploy(code, confirmations, timeout)
        .await
        .wrap_err_with(|| format!("failed to deploy `{}`", artifact.name))?;
    info!(
        contract = %artifact.name,
        address = %deployment.address,
        tx_hash = %deployment.transaction_hash,
        "contract deployed"
    );

    let record = DeployedContractRecord::new(&artifact.name, deployment.address);
    let files = record.persist(out, artifact).wrap_err_with(|| {
        format!(
            "`{}` was deployed to {}, but its files could not be written",
            artifact.name, deployment.address
        )
    })?;
    Ok(DeployOutcome { deployment, record, files })
}
