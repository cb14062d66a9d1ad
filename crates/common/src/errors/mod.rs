//! Commonly used errors

mod fs;
pub use fs::FsPathError;

use std::error::Error;

/// Returns the messages of `error` and its sources, outermost first.
///
/// A source whose message is already part of the message before it, as produced by
/// `#[error("...: {0}")]` wrappers, is skipped.
pub fn dedup_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut causes: Vec<String> = Vec::new();
    for cause in std::iter::successors(Some(error), |err| (*err).source()) {
        let msg = cause.to_string().trim().to_string();
        if causes.last().is_some_and(|prev| prev.contains(&msg)) {
            continue;
        }
        causes.push(msg);
    }
    causes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn causes(report: &eyre::Report) -> Vec<String> {
        dedup_chain(report.as_ref())
    }

    #[test]
    fn skips_repeated_source() {
        #[derive(thiserror::Error, Debug)]
        #[error("deployment failed: {0}")]
        struct Failed(#[from] Funds);

        #[derive(thiserror::Error, Debug)]
        #[error("{0}")]
        struct Funds(String);

        let report = eyre::Report::from(Failed(Funds("insufficient funds".into())));
        assert_eq!(report.chain().count(), 2);
        assert_eq!(causes(&report), vec!["deployment failed: insufficient funds".to_string()]);
    }

    #[test]
    fn keeps_distinct_causes() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err = FsPathError::write(io, "contracts/Trust.json");
        let report = eyre::Report::from(err).wrap_err("failed to persist deployment");
        assert_eq!(
            causes(&report),
            vec![
                "failed to persist deployment".to_string(),
                "failed to write to \"contracts/Trust.json\": permission denied".to_string(),
            ]
        );
    }
}
