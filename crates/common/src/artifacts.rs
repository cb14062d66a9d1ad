//! Compiled contract artifacts, as emitted by Hardhat (or forge) builds.

use crate::{errors::FsPathError, fs};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Bytes, hex};
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `_format` tag of artifacts written by Hardhat.
pub const HARDHAT_ARTIFACT_FORMAT: &str = "hh-sol-artifact-1";

/// Directory holding the full compiler input/output, never contains contract artifacts.
const BUILD_INFO_DIR: &str = "build-info";

/// Errors raised while locating or interpreting a build artifact.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ArtifactError {
    #[error("no artifact for contract `{name}` found in {dir:?}, did you compile the contracts?")]
    ContractNotFound { name: String, dir: PathBuf },
    #[error(
        "multiple artifacts for contract `{name}` found, use the fully qualified name `<path>:<contract>`:\n{}",
        candidates.iter().map(|p| format!("\t{}", p.display())).collect::<Vec<_>>().join("\n")
    )]
    AmbiguousContract { name: String, candidates: Vec<PathBuf> },
    #[error("artifact {path:?} has no `{field}` field")]
    MissingField { path: PathBuf, field: &'static str },
    #[error("artifact {path:?} has an invalid ABI: {source}")]
    InvalidAbi { path: PathBuf, source: serde_json::Error },
    #[error("artifact {path:?} has invalid bytecode: {source}")]
    InvalidBytecode { path: PathBuf, source: hex::FromHexError },
    #[error("contract `{0}` has no creation bytecode, is it abstract or an interface?")]
    NoBytecode(String),
    #[error(
        "dynamic linking is not supported, deploy the following library contracts first and link them into `{name}`:\n{libraries}"
    )]
    UnlinkedLibraries { name: String, libraries: String },
    #[error(
        "the constructor of `{name}` takes {count} argument(s), but contracts are deployed without constructor arguments"
    )]
    ConstructorArguments { name: String, count: usize },
    #[error(transparent)]
    Fs(#[from] FsPathError),
}

/// A compiled contract, read from its artifact file.
///
/// The artifact document is kept as-is so it can be written back out verbatim.
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    /// The contract name, without the source path
    pub name: String,
    /// Location of the artifact file
    pub path: PathBuf,
    /// The contract's ABI
    pub abi: JsonAbi,
    document: Value,
}

impl ContractArtifact {
    /// Finds and loads the artifact of `contract` in `artifacts_dir`.
    ///
    /// `contract` is either a plain contract name, like `Trust`, or a fully qualified name, like
    /// `contracts/Trust.sol:Trust`.
    pub fn read(artifacts_dir: &Path, contract: &str) -> Result<Self, ArtifactError> {
        let path = find_artifact(artifacts_dir, contract)?;
        Self::load(contract_name(contract), &path)
    }

    /// Loads the artifact at `path`.
    pub fn load(name: &str, path: &Path) -> Result<Self, ArtifactError> {
        let document: Value = fs::read_json_file(path)?;
        let abi = document
            .get("abi")
            .ok_or_else(|| ArtifactError::MissingField { path: path.into(), field: "abi" })?;
        let abi = serde_json::from_value(abi.clone())
            .map_err(|source| ArtifactError::InvalidAbi { path: path.into(), source })?;
        if let Some(format) = document.get("_format").and_then(Value::as_str)
            && format != HARDHAT_ARTIFACT_FORMAT
        {
            warn!(%format, path = %path.display(), "unknown artifact format");
        }
        Ok(Self { name: name.to_string(), path: path.to_path_buf(), abi, document })
    }

    /// The full artifact document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Returns the code that deploys this contract without constructor arguments.
    ///
    /// Fails if the contract can't be deployed on its own: it has no bytecode, needs libraries
    /// linked, or its constructor takes arguments.
    pub fn creation_code(&self) -> Result<Bytes, ArtifactError> {
        let (object, link_references) = match self.document.get("bytecode") {
            // hardhat: `"bytecode": "0x..", "linkReferences": {..}`
            Some(Value::String(object)) => (object.as_str(), self.document.get("linkReferences")),
            // forge: `"bytecode": { "object": "0x..", "linkReferences": {..} }`
            Some(Value::Object(bytecode)) => (
                bytecode.get("object").and_then(Value::as_str).unwrap_or_default(),
                bytecode.get("linkReferences"),
            ),
            _ => {
                return Err(ArtifactError::MissingField {
                    path: self.path.clone(),
                    field: "bytecode",
                });
            }
        };

        if let Some(libraries) = unlinked_libraries(link_references) {
            return Err(ArtifactError::UnlinkedLibraries { name: self.name.clone(), libraries });
        }

        let object = object.strip_prefix("0x").unwrap_or(object);
        if object.is_empty() {
            return Err(ArtifactError::NoBytecode(self.name.clone()));
        }
        let code = hex::decode(object)
            .map_err(|source| ArtifactError::InvalidBytecode { path: self.path.clone(), source })?;

        if let Some(constructor) = &self.abi.constructor
            && !constructor.inputs.is_empty()
        {
            return Err(ArtifactError::ConstructorArguments {
                name: self.name.clone(),
                count: constructor.inputs.len(),
            });
        }

        Ok(code.into())
    }
}

/// Returns the `\t<library>: <source>` lines of all libraries that still need linking.
fn unlinked_libraries(link_references: Option<&Value>) -> Option<String> {
    let references = link_references?.as_object()?;
    let libraries = references
        .iter()
        .flat_map(|(source, names)| {
            names
                .as_object()
                .into_iter()
                .flat_map(|names| names.keys())
                .map(move |name| format!("\t{name}: {source}"))
        })
        .collect::<Vec<_>>();
    (!libraries.is_empty()).then(|| libraries.join("\n"))
}

/// Strips the source path of a fully qualified contract name.
pub fn contract_name(contract: &str) -> &str {
    contract.rsplit_once(':').map_or(contract, |(_, name)| name)
}

/// Returns the path of the artifact of `contract` in `artifacts_dir`.
///
/// Plain names are searched for recursively, skipping debug files and build info. Fully qualified
/// names map to `<artifacts_dir>/<path>/<contract>.json` directly.
pub fn find_artifact(artifacts_dir: &Path, contract: &str) -> Result<PathBuf, ArtifactError> {
    let not_found = || ArtifactError::ContractNotFound {
        name: contract.to_string(),
        dir: artifacts_dir.to_path_buf(),
    };

    if let Some((source, name)) = contract.rsplit_once(':') {
        let path = artifacts_dir.join(source).join(format!("{name}.json"));
        return if path.is_file() { Ok(path) } else { Err(not_found()) };
    }

    let file_name = format!("{contract}.json");
    let mut candidates = WalkDir::new(artifacts_dir)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != BUILD_INFO_DIR)
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name.as_str())
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();
    candidates.sort();
    trace!(?candidates, %contract, "searched artifacts");

    match candidates.len() {
        0 => Err(not_found()),
        1 => Ok(candidates.remove(0)),
        _ => Err(ArtifactError::AmbiguousContract { name: contract.to_string(), candidates }),
    }
}
