//! Files describing a deployed contract.

use alloy_primitives::Address;
use deploy_common::{ADDRESS_FILE_SUFFIX, ContractArtifact, errors::FsPathError, fs};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::path::{Path, PathBuf};

/// Where a contract was deployed, written to `<Name>-address.json` as `{ "<Name>": "0x.." }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContractRecord {
    /// Name of the deployed contract
    pub contract_name: String,
    /// Address the contract was deployed to
    pub address: Address,
}

impl DeployedContractRecord {
    /// Creates a new record.
    pub fn new(contract_name: impl Into<String>, address: Address) -> Self {
        Self { contract_name: contract_name.into(), address }
    }

    /// Path of the address file in `out`.
    pub fn address_file(&self, out: &Path) -> PathBuf {
        out.join(format!("{}{ADDRESS_FILE_SUFFIX}", self.contract_name))
    }

    /// Path of the artifact copy in `out`.
    pub fn artifact_file(&self, out: &Path) -> PathBuf {
        out.join(format!("{}.json", self.contract_name))
    }

    /// Writes the address file and a copy of `artifact` into `out`, creating it if needed.
    ///
    /// Both files are replaced together: if either can't be written, both keep their previous
    /// contents.
    pub fn persist(
        &self,
        out: &Path,
        artifact: &ContractArtifact,
    ) -> Result<DeploymentFiles, FsPathError> {
        fs::create_dir_all(out)?;
        let files = DeploymentFiles {
            address: self.address_file(out),
            artifact: self.artifact_file(out),
        };
        let record = serde_json::to_value(self)
            .map_err(|source| FsPathError::WriteJson { source, path: files.address.clone() })?;
        fs::write_pretty_json_files(&[
            (files.address.clone(), &record),
            (files.artifact.clone(), artifact.document()),
        ])?;
        debug!(
            address = %files.address.display(),
            artifact = %files.artifact.display(),
            "wrote deployment files"
        );
        Ok(files)
    }
}

impl Serialize for DeployedContractRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.contract_name, &self.address.to_checksum(None))?;
        map.end()
    }
}

/// The files written for a deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentFiles {
    /// `<Name>-address.json`
    pub address: PathBuf,
    /// `<Name>.json`
    pub artifact: PathBuf,
}
