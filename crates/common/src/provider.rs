//! Building the HTTP provider deployments are sent through.

use crate::REQUEST_TIMEOUT;
use alloy_network::AnyNetwork;
use alloy_provider::RootProvider;
use alloy_rpc_client::RpcClient;
use alloy_transport_http::Http;
use eyre::{Result, WrapErr};
use url::Url;

/// Provider that talks plain JSON-RPC over HTTP to the deployment network.
pub type DeployProvider<N = AnyNetwork> = RootProvider<N>;

/// Builds a [`DeployProvider`] for a network's RPC URL.
#[derive(Debug)]
pub struct ProviderBuilder {
    // a parse failure is reported by `build`
    url: Result<Url>,
}

impl ProviderBuilder {
    /// Creates a builder for `url_str`; a bare `localhost:<port>` is treated as `http://`.
    pub fn new(url_str: &str) -> Self {
        let url = match url_str.strip_prefix("localhost:") {
            Some(port) => Url::parse(&format!("http://localhost:{port}")),
            None => Url::parse(url_str),
        }
        .wrap_err_with(|| format!("invalid provider URL: {url_str:?}"));
        Self { url }
    }

    /// Connects to the URL, requests time out after [`REQUEST_TIMEOUT`].
    pub fn build(self) -> Result<DeployProvider> {
        let url = self.url?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => eyre::bail!("unsupported provider URL scheme `{scheme}`, expected http(s)"),
        }

        let is_local = is_local_url(&url);
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .wrap_err("failed to build http client")?;
        debug!(%url, is_local, "connecting provider");

        let transport = Http::with_client(client, url);
        Ok(RootProvider::new(RpcClient::new(transport, is_local)))
    }
}

/// Returns `true` if the URL points at this machine, most likely a dev node.
fn is_local_url(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "0.0.0.0" | "[::1]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_auto_correct_missing_prefix() {
        let builder = ProviderBuilder::new("localhost:8545");
        assert!(builder.url.is_ok());

        let url = builder.url.unwrap();
        assert_eq!(url, Url::parse("http://localhost:8545").unwrap());
    }

    #[test]
    fn rejects_invalid_urls() {
        let err = ProviderBuilder::new("not a url").build().unwrap_err();
        assert!(err.to_string().contains("invalid provider URL"), "{err}");

        let err = ProviderBuilder::new("ws://localhost:8546").build().unwrap_err();
        assert!(err.to_string().contains("unsupported provider URL scheme `ws`"), "{err}");
    }

    #[test]
    fn detects_local_nodes() {
        assert!(is_local_url(&Url::parse("http://localhost:8545").unwrap()));
        assert!(is_local_url(&Url::parse("http://127.0.0.1:8545").unwrap()));
        assert!(!is_local_url(&Url::parse("https://alfajores-forno.celo-testnet.org").unwrap()));
    }
}
