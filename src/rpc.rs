//! Blocking client for a Tezos node's RPC interface

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::{config::Network, error::DomainError, provider::NetworkProvider};

pub const RPC_CONSTANTS: &str = "chains/main/blocks/head/context/constants";
pub const RPC_TOTAL_VOTING_POWER: &str =
    "chains/main/blocks/head/votes/total_voting_power";

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Fetches network data from a single node.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl RpcClient {
    const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: &str) -> Result<Self, RpcError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|source| RpcError::Http {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client for the default node of `network`.
    pub fn for_network(network: Network) -> Result<Self, RpcError> {
        Self::new(network.rpc_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json(&self, path: &str) -> Result<Value, RpcError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "rpc request");

        let http_err = |source: reqwest::Error| RpcError::Http {
            url: url.clone(),
            source,
        };

        self.http
            .get(&url)
            .send()
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?
            .json()
            .map_err(http_err)
    }
}

impl NetworkProvider for RpcClient {
    type Error = RpcError;

    fn constants_payload(&self) -> Result<Value, RpcError> {
        self.get_json(RPC_CONSTANTS)
    }

    fn voting_power_payload(&self) -> Result<Value, RpcError> {
        self.get_json(RPC_TOTAL_VOTING_POWER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = RpcClient::new("http://localhost:8732/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8732");

        let client = RpcClient::for_network(Network::Florence).unwrap();
        assert_eq!(client.base_url(), "https://florence-tezos.giganode.io");
    }
}
