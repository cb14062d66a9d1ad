//! Commonly used constants.

use std::time::Duration;

/// The default timeout for RPC requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Suffix of the file the deployed address is recorded in, `<Contract>-address.json`.
pub const ADDRESS_FILE_SUFFIX: &str = "-address.json";
