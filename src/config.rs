//! Immutable settings passed into every estimation, and the catalog of
//! known networks.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Amount;

/// Number of micro-units (mutez) in one whole token (tez).
pub const MICRO_UNITS_PER_TOKEN: u64 = 1_000_000;

/// Settings shared by all estimations. All monetary arithmetic happens in
/// micro-units; this config is only consulted when a result is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub micro_units_per_token: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            micro_units_per_token: MICRO_UNITS_PER_TOKEN,
        }
    }
}

impl EstimatorConfig {
    /// Converts an amount of micro-units into whole tokens.
    #[inline]
    pub fn to_whole(&self, micro: Amount) -> Amount {
        micro / self.micro_units_per_token as Amount
    }

    /// Converts an amount of whole tokens into micro-units.
    #[inline]
    pub fn to_micro(&self, whole: Amount) -> Amount {
        whole * self.micro_units_per_token as Amount
    }
}

/// Public Tezos networks with a known default RPC node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    #[default]
    Main,
    Florence,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network `{0}`, expected one of: main, florence")]
pub struct UnknownNetwork(pub String);

impl Network {
    pub const ALL: [Network; 2] = [Network::Main, Network::Florence];

    /// Default RPC node for this network.
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Self::Main => "https://mainnet-tezos.giganode.io",
            Self::Florence => "https://florence-tezos.giganode.io",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Florence => "florence",
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|network| network.name() == s)
            .ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}
