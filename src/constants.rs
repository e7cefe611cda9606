//! Protocol constants for the two generations of Tezos consensus, and their
//! normalization from a node's `context/constants` payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, InvalidArgument};

/// Integer amount of micro-units (mutez).
pub type Mutez = u64;

/// Constants of the roll-based ("Emmy") protocols, where every roll held
/// gives one independent chance of being selected for each slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollConstants {
    pub blocks_per_cycle: u64,
    pub endorsers_per_block: u64,
    pub block_security_deposit: Mutez,
    pub endorsement_security_deposit: Mutez,
    /// Baking reward per included endorsement, at priority 0.
    pub baking_reward_per_endorsement: Mutez,
    /// Endorsement reward, at priority 0.
    pub endorsement_reward: Mutez,
}

impl Default for RollConstants {
    fn default() -> Self {
        Self {
            blocks_per_cycle: 4_096,
            endorsers_per_block: 32,
            block_security_deposit: 512_000_000,
            endorsement_security_deposit: 64_000_000,
            baking_reward_per_endorsement: 1_250_000,
            endorsement_reward: 1_250_000,
        }
    }
}

/// Constants of the stake-based ("Tenderbake") protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeConstants {
    pub blocks_per_cycle: u64,
    pub consensus_committee_size: u64,
    pub consensus_threshold: u64,
    pub frozen_deposits_percentage: u64,
    pub baking_reward_fixed_portion: Mutez,
    pub baking_reward_bonus_per_slot: Mutez,
    pub endorsing_reward_per_slot: Mutez,
}

impl Default for StakeConstants {
    fn default() -> Self {
        Self {
            blocks_per_cycle: 8_192,
            consensus_committee_size: 7_000,
            consensus_threshold: 4_667,
            frozen_deposits_percentage: 10,
            baking_reward_fixed_portion: 10_000_000,
            baking_reward_bonus_per_slot: 4_286,
            endorsing_reward_per_slot: 2_857,
        }
    }
}

impl StakeConstants {
    /// Checks the relations between fields that the protocol guarantees.
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        if self.frozen_deposits_percentage == 0 {
            return Err(InvalidArgument::NonPositiveFrozenDepositsPercentage);
        }

        if self.consensus_threshold > self.consensus_committee_size {
            return Err(InvalidArgument::ThresholdAboveCommittee {
                threshold: self.consensus_threshold,
                committee_size: self.consensus_committee_size,
            });
        }

        Ok(())
    }
}

/// Constants of either protocol generation. The variant is decided by
/// which fields a node reports, see [`ProtocolConstants::from_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum ProtocolConstants {
    RollBased(RollConstants),
    StakeBased(StakeConstants),
}

impl From<RollConstants> for ProtocolConstants {
    fn from(value: RollConstants) -> Self {
        Self::RollBased(value)
    }
}

impl From<StakeConstants> for ProtocolConstants {
    fn from(value: StakeConstants) -> Self {
        Self::StakeBased(value)
    }
}

impl ProtocolConstants {
    /// Short name of the protocol generation, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RollBased(_) => "roll-based",
            Self::StakeBased(_) => "stake-based",
        }
    }

    /// Blocks baked per cycle, whichever the protocol generation.
    pub fn blocks_per_cycle(&self) -> u64 {
        match self {
            Self::RollBased(c) => c.blocks_per_cycle,
            Self::StakeBased(c) => c.blocks_per_cycle,
        }
    }

    /// Normalizes a `context/constants` payload.
    ///
    /// Values may be JSON numbers or numeric strings. The presence of
    /// `consensus_committee_size` selects the stake-based protocol, the
    /// presence of `endorsers_per_block` the roll-based one.
    ///
    /// ```
    /// use bakestimator::constants::ProtocolConstants;
    ///
    /// let payload = serde_json::json!({
    ///     "blocks_per_cycle": 4096,
    ///     "endorsers_per_block": 32,
    ///     "block_security_deposit": "512000000",
    ///     "endorsement_security_deposit": "64000000",
    ///     "baking_reward_per_endorsement": ["1250000", "187500"],
    ///     "endorsement_reward": ["1250000", "833333"],
    /// });
    ///
    /// let constants = ProtocolConstants::from_json(&payload).unwrap();
    /// assert_eq!(constants.kind(), "roll-based");
    /// ```
    pub fn from_json(payload: &Value) -> Result<Self, DomainError> {
        if payload.get("consensus_committee_size").is_some() {
            let constants = StakeConstants {
                blocks_per_cycle: field(payload, "blocks_per_cycle")?,
                consensus_committee_size: field(
                    payload,
                    "consensus_committee_size",
                )?,
                consensus_threshold: field(payload, "consensus_threshold")?,
                frozen_deposits_percentage: field(
                    payload,
                    "frozen_deposits_percentage",
                )?,
                baking_reward_fixed_portion: field(
                    payload,
                    "baking_reward_fixed_portion",
                )?,
                baking_reward_bonus_per_slot: field(
                    payload,
                    "baking_reward_bonus_per_slot",
                )?,
                endorsing_reward_per_slot: field(
                    payload,
                    "endorsing_reward_per_slot",
                )?,
            };

            return Ok(Self::StakeBased(constants));
        }

        if payload.get("endorsers_per_block").is_some() {
            let constants = RollConstants {
                blocks_per_cycle: field(payload, "blocks_per_cycle")?,
                endorsers_per_block: field(payload, "endorsers_per_block")?,
                block_security_deposit: field(
                    payload,
                    "block_security_deposit",
                )?,
                endorsement_security_deposit: field(
                    payload,
                    "endorsement_security_deposit",
                )?,
                baking_reward_per_endorsement: first_field(
                    payload,
                    "baking_reward_per_endorsement",
                )?,
                endorsement_reward: first_field(payload, "endorsement_reward")?,
            };

            return Ok(Self::RollBased(constants));
        }

        Err(DomainError::UnknownProtocol)
    }
}

/// Network-wide parameters the command-line tool needs besides the
/// estimation constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParameters {
    /// Number of cycles deposits stay frozen; the default estimation window.
    pub preserved_cycles: u64,
    /// Size of a roll in micro-units.
    pub tokens_per_roll: Mutez,
}

impl NetworkParameters {
    pub fn from_json(payload: &Value) -> Result<Self, DomainError> {
        Ok(Self {
            preserved_cycles: field(payload, "preserved_cycles")?,
            tokens_per_roll: field(payload, "tokens_per_roll")?,
        })
    }
}

/// Reads a non-negative integer which may be encoded as a number or a
/// numeric string.
pub(crate) fn as_integer(name: &str, value: &Value) -> Result<u64, DomainError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| DomainError::MalformedConstant {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn field(payload: &Value, name: &str) -> Result<u64, DomainError> {
    let value = payload
        .get(name)
        .ok_or_else(|| DomainError::MissingConstant(name.to_string()))?;

    as_integer(name, value)
}

/// Like [`field`], but the value is a list indexed by priority and the
/// priority 0 entry is used. A bare scalar is accepted as well.
fn first_field(payload: &Value, name: &str) -> Result<u64, DomainError> {
    match payload.get(name) {
        None => Err(DomainError::MissingConstant(name.to_string())),
        Some(Value::Array(values)) => match values.first() {
            Some(first) => as_integer(name, first),
            None => Err(DomainError::MissingConstant(name.to_string())),
        },
        Some(value) => as_integer(name, value),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tenderbake_payload() -> Value {
        json!({
            "proof_of_work_nonce_size": 8,
            "preserved_cycles": 3,
            "blocks_per_cycle": 4096,
            "blocks_per_commitment": 32,
            "tokens_per_roll": "6000000000",
            "baking_reward_fixed_portion": "5000000",
            "baking_reward_bonus_per_slot": "2143",
            "endorsing_reward_per_slot": "1428",
            "consensus_committee_size": 7000,
            "consensus_threshold": 4667,
            "minimal_participation_ratio": {"numerator": 2, "denominator": 3},
            "frozen_deposits_percentage": 10,
            "double_baking_punishment": "640000000",
        })
    }

    #[test]
    fn stake_based_payload_is_normalized() {
        let constants =
            ProtocolConstants::from_json(&tenderbake_payload()).unwrap();

        assert_eq!(
            constants,
            ProtocolConstants::StakeBased(StakeConstants {
                blocks_per_cycle: 4096,
                consensus_committee_size: 7000,
                consensus_threshold: 4667,
                frozen_deposits_percentage: 10,
                baking_reward_fixed_portion: 5_000_000,
                baking_reward_bonus_per_slot: 2143,
                endorsing_reward_per_slot: 1428,
            })
        );
        assert_eq!(constants.kind(), "stake-based");
        assert_eq!(constants.blocks_per_cycle(), 4096);
    }

    #[test]
    fn roll_based_payload_uses_priority_zero_rewards() {
        let payload = json!({
            "preserved_cycles": 5,
            "blocks_per_cycle": 4096,
            "endorsers_per_block": 32,
            "tokens_per_roll": "8000000000",
            "block_security_deposit": "640000000",
            "endorsement_security_deposit": "2500000",
            "baking_reward_per_endorsement": ["78125", "11719"],
            "endorsement_reward": ["78125", "52083"],
        });

        let constants = ProtocolConstants::from_json(&payload).unwrap();
        assert_eq!(constants.blocks_per_cycle(), 4096);
        let ProtocolConstants::RollBased(c) = constants else {
            panic!("expected roll-based constants, got {:?}", constants);
        };

        assert_eq!(c.block_security_deposit, 640_000_000);
        assert_eq!(c.baking_reward_per_endorsement, 78_125);
        assert_eq!(c.endorsement_reward, 78_125);

        let params = NetworkParameters::from_json(&payload).unwrap();
        assert_eq!(params.preserved_cycles, 5);
        assert_eq!(params.tokens_per_roll, 8_000_000_000);
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let mut payload = tenderbake_payload();
        payload
            .as_object_mut()
            .unwrap()
            .remove("endorsing_reward_per_slot");

        assert_eq!(
            ProtocolConstants::from_json(&payload),
            Err(DomainError::MissingConstant(
                "endorsing_reward_per_slot".into()
            ))
        );
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let mut payload = tenderbake_payload();
        payload["consensus_threshold"] = json!("two thirds");

        assert!(matches!(
            ProtocolConstants::from_json(&payload),
            Err(DomainError::MalformedConstant { name, .. })
                if name == "consensus_threshold"
        ));
    }

    #[test]
    fn unrecognized_payload() {
        assert_eq!(
            ProtocolConstants::from_json(&json!({"blocks_per_cycle": 1})),
            Err(DomainError::UnknownProtocol)
        );
    }

    #[test]
    fn threshold_cannot_exceed_committee() {
        let constants = StakeConstants {
            consensus_threshold: 8_000,
            ..StakeConstants::default()
        };

        assert_eq!(
            constants.validate(),
            Err(InvalidArgument::ThresholdAboveCommittee {
                threshold: 8_000,
                committee_size: 7_000
            })
        );
        assert_eq!(StakeConstants::default().validate(), Ok(()));
    }
}
