use deploy_common::errors::dedup_chain;
use eyre::EyreHandler;
use itertools::Itertools;
use std::{error::Error, fmt};

/// Env var that switches to color-eyre's report, with span traces and backtraces.
pub const DEBUG_ENV: &str = "DEPLOY_DEBUG";

/// Shown below the report of a panic.
const PANIC_SECTION: &str =
    "This is a bug in trust-deploy, please report it with the output above.";

/// Reports an error as its first message followed by its distinct causes.
///
/// ```text
/// Error: failed to deploy `Trust`
///   caused by: failed to submit the deployment transaction
///   caused by: insufficient funds for gas * price + value
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Handler;

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return write!(f, "{}", dedup_chain(error).iter().format(": "));
        }
        write!(f, "{error}")
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return fmt::Debug::fmt(error, f);
        }
        let causes = dedup_chain(error);
        let Some((error, causes)) = causes.split_first() else { return Ok(()) };
        write!(f, "{error}")?;
        for cause in causes {
            write!(f, "\n  caused by: {cause}")?;
        }
        Ok(())
    }
}

/// Installs the global [`eyre`] and panic hooks.
///
/// Errors are reported with [`Handler`], unless [`DEBUG_ENV`] is set. Panics always get
/// color-eyre's report.
pub fn install() {
    let hooks = color_eyre::config::HookBuilder::default().panic_section(PANIC_SECTION);
    let installed = if std::env::var_os(DEBUG_ENV).is_some() {
        hooks.install().map_err(|err| err.to_string())
    } else {
        let (panic_hook, _) = hooks.into_hooks();
        panic_hook.install();
        eyre::set_hook(Box::new(|_| Box::new(Handler))).map_err(|err| err.to_string())
    };
    if let Err(err) = installed {
        debug!("failed to install error hooks: {err}");
    }
}
