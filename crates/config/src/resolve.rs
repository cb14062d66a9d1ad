//! Helper for resolving env vars

use regex::Regex;
use std::{env, env::VarError, fmt, sync::LazyLock};

/// A regex that matches `${val}` placeholders
pub static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?P<outer>\$\{\s*(?P<inner>.*?)\s*})").unwrap());

/// Error when we failed to resolve an env var
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedEnvVarError {
    /// The unresolved input string
    pub unresolved: String,
    /// Var that couldn't be resolved
    pub var: String,
    /// the `env::var` error
    pub source: VarError,
}

impl fmt::Display for UnresolvedEnvVarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to resolve env var `{}` in `{}`: {}",
            self.var, self.unresolved, self.source
        )
    }
}

impl std::error::Error for UnresolvedEnvVarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Replaces all Env var placeholders in the input string with the values they hold
pub fn interpolate(input: &str) -> Result<String, UnresolvedEnvVarError> {
    let mut res = input.to_string();

    // loop over all placeholders in the input and replace them one by one
    for caps in RE_PLACEHOLDER.captures_iter(input) {
        let var = &caps["inner"];
        let value = env::var(var).map_err(|source| UnresolvedEnvVarError {
            unresolved: input.to_string(),
            var: var.to_string(),
            source,
        })?;

        res = res.replacen(&caps["outer"], &value, 1);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_find_placeholder() {
        let val = "https://forno.celo.org/${API_KEY}";
        let cap = RE_PLACEHOLDER.captures(val).unwrap();
        assert_eq!(cap.name("outer").unwrap().as_str(), "${API_KEY}");
        assert_eq!(cap.name("inner").unwrap().as_str(), "API_KEY");

        assert!(RE_PLACEHOLDER.is_match("${ PRIVATE_KEY }"));
        assert!(!RE_PLACEHOLDER.is_match("https://alfajores-forno.celo-testnet.org"));
        assert!(!RE_PLACEHOLDER.is_match("$PRIVATE_KEY"));
    }

    #[test]
    fn can_interpolate() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DEPLOY_TEST_HOST", "localhost");
            jail.set_env("DEPLOY_TEST_PORT", "8545");

            let url = interpolate("http://${DEPLOY_TEST_HOST}:${ DEPLOY_TEST_PORT }").unwrap();
            assert_eq!(url, "http://localhost:8545");

            let plain = interpolate("http://127.0.0.1:8545").unwrap();
            assert_eq!(plain, "http://127.0.0.1:8545");
            Ok(())
        });
    }

    #[test]
    fn reports_missing_var() {
        let err = interpolate("${DEPLOY_TEST_SURELY_UNSET_VAR}").unwrap_err();
        assert_eq!(err.var, "DEPLOY_TEST_SURELY_UNSET_VAR");
        assert_eq!(err.source, VarError::NotPresent);
        assert!(err.to_string().contains("`DEPLOY_TEST_SURELY_UNSET_VAR`"));
    }
}
