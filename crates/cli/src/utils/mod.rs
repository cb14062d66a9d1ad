use deploy_config::find_project_root;
use std::{future::Future, path::Path};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default log directives, applied on top of `RUST_LOG`.
const DEFAULT_DIRECTIVES: &[&str] = &["hyper=off", "hyper_util=off", "reqwest=off", "h2=off"];

/// Initializes a tracing Subscriber for logging
///
/// Logs go to stderr so stdout only carries the deployment result.
pub fn subscriber() {
    let registry = tracing_subscriber::Registry::default().with(env_filter());
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if let Err(err) = registry.with(layer).try_init() {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}

fn env_filter() -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    for directive in DEFAULT_DIRECTIVES {
        filter = filter.add_directive(directive.parse().unwrap());
    }
    filter
}

/// Loads a dotenv file, from the cwd and the project root, ignoring potential failure.
///
/// We could use `warn!` here, but that would imply that the dotenv file can't configure
/// the logging behavior of the deployer.
pub fn load_dotenv() {
    // we only want the .env file of the cwd and project root
    if let (Ok(cwd), Ok(prj_root)) = (std::env::current_dir(), find_project_root(None)) {
        load_dotenv_from(&prj_root);
        if cwd != prj_root {
            // prj root and cwd can be identical
            load_dotenv_from(&cwd);
        }
    };
}

/// Loads `<dir>/.env`, variables that are already set are kept.
pub fn load_dotenv_from(dir: &Path) -> bool {
    dotenvy::from_path(dir.join(".env")).is_ok()
}

/// Runs the given future to completion on a single threaded runtime.
pub fn block_on<F: Future>(future: F) -> eyre::Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    Ok(rt.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        let filter = env_filter().to_string();
        for directive in DEFAULT_DIRECTIVES {
            assert!(filter.contains(directive), "{filter}");
        }
    }

    #[test]
    fn loads_dotenv_without_overriding() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "DEPLOY_CLI_TEST_DOTENV_NEW=from-file\nDEPLOY_CLI_TEST_DOTENV_SET=from-file\n",
        )
        .unwrap();
        // SAFETY: the variable names are unique to this test
        unsafe { std::env::set_var("DEPLOY_CLI_TEST_DOTENV_SET", "from-env") };

        assert!(load_dotenv_from(dir.path()));
        assert_eq!(std::env::var("DEPLOY_CLI_TEST_DOTENV_NEW").unwrap(), "from-file");
        assert_eq!(std::env::var("DEPLOY_CLI_TEST_DOTENV_SET").unwrap(), "from-env");

        assert!(!load_dotenv_from(&dir.path().join("missing")));
    }

    #[test]
    fn block_on_runs_future() {
        let value = block_on(async { 40 + 2 }).unwrap();
        assert_eq!(value, 42);
    }
}
