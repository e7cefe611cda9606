//! Sources of network data, and turning a baker's balances into stake input
//! for whichever protocol a network runs.

use serde_json::Value;
use tracing::debug;

use crate::{
    config::EstimatorConfig,
    constants::{as_integer, NetworkParameters, ProtocolConstants},
    error::{Amount, DomainError},
    stake::{BakerStakeInput, DelegateStake, RollStake},
};

/// Supplies protocol constants and the network's total voting power.
pub trait NetworkProvider {
    type Error: From<DomainError>;

    /// The raw `context/constants` object.
    fn constants_payload(&self) -> Result<Value, Self::Error>;

    /// The raw `votes/total_voting_power` value.
    fn voting_power_payload(&self) -> Result<Value, Self::Error>;
}

/// What a baker holds, as given on the command line. Balances are in whole
/// tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakerHoldings {
    /// Rolls baked with, under the roll-based protocols.
    pub rolls: u64,
    pub full_balance: Amount,
    pub delegated_balance: Amount,
    pub deposit_limit: Option<Amount>,
    /// Minimal staking balance for selection, in rolls.
    pub eligibility_rolls: u64,
}

impl Default for BakerHoldings {
    fn default() -> Self {
        Self {
            rolls: 1,
            full_balance: 6_000.0,
            delegated_balance: 0.0,
            deposit_limit: None,
            eligibility_rolls: 1,
        }
    }
}

/// Network state needed to run estimations, normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkSnapshot {
    pub constants: ProtocolConstants,
    pub params: NetworkParameters,
    /// Total active rolls across the network.
    pub total_voting_power: u64,
}

impl NetworkSnapshot {
    pub fn fetch<P: NetworkProvider>(provider: &P) -> Result<Self, P::Error> {
        let payload = provider.constants_payload()?;
        let constants = ProtocolConstants::from_json(&payload)?;
        let params = NetworkParameters::from_json(&payload)?;
        let total_voting_power = as_integer(
            "total_voting_power",
            &provider.voting_power_payload()?,
        )?;

        debug!(
            protocol = constants.kind(),
            preserved_cycles = params.preserved_cycles,
            total_voting_power,
            "fetched network snapshot"
        );

        Ok(Self {
            constants,
            params,
            total_voting_power,
        })
    }

    /// Builds stake input matching the protocol generation of this network.
    ///
    /// Under the stake-based protocols the network stake is taken to be the
    /// voting power in rolls times the roll size, and the eligibility
    /// threshold is a whole number of rolls.
    pub fn stake_input(
        &self,
        holdings: &BakerHoldings,
        config: &EstimatorConfig,
    ) -> BakerStakeInput {
        match self.constants {
            ProtocolConstants::RollBased(_) => RollStake {
                active_rolls_held: holdings.rolls,
                total_active_rolls: self.total_voting_power,
            }
            .into(),
            ProtocolConstants::StakeBased(_) => {
                let roll_size = self.params.tokens_per_roll as Amount;

                DelegateStake {
                    full_balance: config.to_micro(holdings.full_balance),
                    delegated_balance: config
                        .to_micro(holdings.delegated_balance),
                    deposit_limit: holdings
                        .deposit_limit
                        .map(|limit| config.to_micro(limit)),
                    total_active_stake: self.total_voting_power as Amount
                        * roll_size,
                    eligibility_threshold: holdings.eligibility_rolls
                        as Amount
                        * roll_size,
                }
                .into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FixedNetwork {
        constants: Value,
        voting_power: Value,
    }

    impl NetworkProvider for FixedNetwork {
        type Error = DomainError;

        fn constants_payload(&self) -> Result<Value, DomainError> {
            Ok(self.constants.clone())
        }

        fn voting_power_payload(&self) -> Result<Value, DomainError> {
            Ok(self.voting_power.clone())
        }
    }

    fn ithaca() -> FixedNetwork {
        FixedNetwork {
            constants: json!({
                "preserved_cycles": 3,
                "blocks_per_cycle": 4096,
                "tokens_per_roll": "6000000000",
                "baking_reward_fixed_portion": "5000000",
                "baking_reward_bonus_per_slot": "2143",
                "endorsing_reward_per_slot": "1428",
                "consensus_committee_size": 7000,
                "consensus_threshold": 4667,
                "frozen_deposits_percentage": 10,
            }),
            voting_power: json!(80_000),
        }
    }

    #[test]
    fn stake_based_holdings_are_converted_to_micro_units() {
        let snapshot = NetworkSnapshot::fetch(&ithaca()).unwrap();
        let holdings = BakerHoldings {
            deposit_limit: Some(500.0),
            ..BakerHoldings::default()
        };

        let stake =
            snapshot.stake_input(&holdings, &EstimatorConfig::default());

        assert_eq!(
            stake,
            BakerStakeInput::StakeBased(DelegateStake {
                full_balance: 6_000_000_000.0,
                delegated_balance: 0.0,
                deposit_limit: Some(500_000_000.0),
                total_active_stake: 480_000_000_000_000.0,
                eligibility_threshold: 6_000_000_000.0,
            })
        );
    }

    #[test]
    fn roll_based_holdings_use_voting_power_as_total_rolls() {
        let network = FixedNetwork {
            constants: json!({
                "preserved_cycles": 5,
                "blocks_per_cycle": 4096,
                "endorsers_per_block": 32,
                "tokens_per_roll": "8000000000",
                "block_security_deposit": "640000000",
                "endorsement_security_deposit": "2500000",
                "baking_reward_per_endorsement": ["78125", "11719"],
                "endorsement_reward": ["78125", "52083"],
            }),
            voting_power: json!("82000"),
        };
        let snapshot = NetworkSnapshot::fetch(&network).unwrap();
        let holdings = BakerHoldings {
            rolls: 3,
            ..BakerHoldings::default()
        };

        assert_eq!(
            snapshot.stake_input(&holdings, &EstimatorConfig::default()),
            BakerStakeInput::RollBased(RollStake {
                active_rolls_held: 3,
                total_active_rolls: 82_000,
            })
        );
    }

    #[test]
    fn malformed_voting_power() {
        let network = FixedNetwork {
            voting_power: json!({"rolls": 1}),
            ..ithaca()
        };

        assert!(matches!(
            NetworkSnapshot::fetch(&network),
            Err(DomainError::MalformedConstant { name, .. })
                if name == "total_voting_power"
        ));
    }
}
