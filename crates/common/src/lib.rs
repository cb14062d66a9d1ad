//! Common utilities for deploying contracts.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod artifacts;
pub mod constants;
pub mod errors;
pub mod fs;
pub mod provider;

pub use artifacts::ContractArtifact;
pub use constants::*;
pub use provider::*;
