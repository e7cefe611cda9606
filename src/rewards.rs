//! Converting won opportunities into deposits and rewards.
//!
//! Every monetary figure produced here is in micro-units. Conversion into
//! whole tokens happens once, when a report is assembled.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    bound::{self, CountBound},
    constants::{Mutez, RollConstants, StakeConstants},
    error::{EstimationError, InvalidArgument},
};

/// A statistic reported both as its expectation and as its value at the
/// requested confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanMax<T> {
    pub mean: T,
    pub max: T,
}

impl From<CountBound> for MeanMax<f64> {
    fn from(bound: CountBound) -> Self {
        MeanMax {
            mean: bound.mean,
            max: bound.max,
        }
    }
}

impl<T> MeanMax<T> {
    /// Applies `f` to both statistics.
    pub fn map<U, F: Fn(T) -> U>(self, f: F) -> MeanMax<U> {
        MeanMax {
            mean: f(self.mean),
            max: f(self.max),
        }
    }
}

/// Count, deposits and rewards for one opportunity category under the
/// roll-based protocols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub count: f64,
    pub deposits: f64,
    pub rewards: f64,
}

impl std::ops::Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Self) -> Self::Output {
        Tally {
            count: self.count + rhs.count,
            deposits: self.deposits + rhs.deposits,
            rewards: self.rewards + rhs.rewards,
        }
    }
}

/// Rewards that depend on how much endorsing power ends up in each block,
/// from none of the bonus to all of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardRange {
    pub min: f64,
    pub max: f64,
}

/// Baking count and reward range under the stake-based protocols.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BakeTally {
    pub count: f64,
    pub rewards: RewardRange,
}

/// Expected endorsing slots and their rewards under the stake-based
/// protocols.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndorseTally {
    pub count: f64,
    pub rewards: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollTallies {
    pub bakes: MeanMax<Tally>,
    pub endorsements: MeanMax<Tally>,
    pub total: MeanMax<Tally>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakeTallies {
    pub bakes: MeanMax<BakeTally>,
    pub endorsements: EndorseTally,
}

/// Turns a selection probability into deposits and rewards over a number of
/// cycles, following one protocol's economics.
pub trait RewardModel {
    type Tallies;

    fn aggregate(
        &self,
        probability: f64,
        cycles: u64,
        confidence: f64,
    ) -> Result<Self::Tallies, EstimationError>;
}

impl RollConstants {
    /// The largest block reward: every endorsement slot included.
    pub fn max_block_reward(&self) -> Result<Mutez, InvalidArgument> {
        reward_product(
            "baking_reward_per_endorsement",
            self.baking_reward_per_endorsement,
            self.endorsers_per_block,
        )
    }
}

impl StakeConstants {
    /// Extra reward per block for including all endorsing power above the
    /// consensus threshold.
    pub fn max_bonus_per_block(&self) -> Result<Mutez, InvalidArgument> {
        reward_product(
            "baking_reward_bonus_per_slot",
            self.baking_reward_bonus_per_slot,
            self.consensus_committee_size
                .saturating_sub(self.consensus_threshold),
        )
    }
}

impl RewardModel for RollConstants {
    type Tallies = RollTallies;

    fn aggregate(
        &self,
        probability: f64,
        cycles: u64,
        confidence: f64,
    ) -> Result<RollTallies, EstimationError> {
        let max_block_reward = self.max_block_reward()?;
        let block_count = opportunities(self.blocks_per_cycle, cycles)?;
        let endorsement_count =
            opportunities(block_count, self.endorsers_per_block)?;

        let bakes = bound::estimate(block_count, probability, confidence)?;
        let endorsements =
            bound::estimate(endorsement_count, probability, confidence)?;
        debug!(
            block_count,
            endorsement_count,
            ?bakes,
            ?endorsements,
            "roll-based opportunities"
        );

        let tally = |bound: CountBound, deposit: Mutez, reward: Mutez| {
            MeanMax::from(bound).map(|count| Tally {
                count,
                deposits: count * deposit as f64,
                rewards: count * reward as f64,
            })
        };

        let bakes = tally(
            bakes,
            self.block_security_deposit,
            max_block_reward,
        );
        let endorsements = tally(
            endorsements,
            self.endorsement_security_deposit,
            self.endorsement_reward,
        );
        let total = MeanMax {
            mean: bakes.mean + endorsements.mean,
            max: bakes.max + endorsements.max,
        };

        Ok(RollTallies { bakes, endorsements, total })
    }
}

impl RewardModel for StakeConstants {
    type Tallies = StakeTallies;

    fn aggregate(
        &self,
        probability: f64,
        cycles: u64,
        confidence: f64,
    ) -> Result<StakeTallies, EstimationError> {
        self.validate()?;
        let max_bonus = self.max_bonus_per_block()?;

        let block_count = opportunities(self.blocks_per_cycle, cycles)?;
        let slot_count =
            opportunities(block_count, self.consensus_committee_size)?;

        let bakes = bound::estimate(block_count, probability, confidence)?;
        debug!(block_count, slot_count, ?bakes, "stake-based opportunities");

        let fixed = self.baking_reward_fixed_portion as f64;
        let with_bonus = fixed + max_bonus as f64;
        let bakes = MeanMax::from(bakes).map(|count| BakeTally {
            count,
            rewards: RewardRange {
                min: count * fixed,
                max: count * with_bonus,
            },
        });

        let slots = probability * slot_count as f64;
        let endorsements = EndorseTally {
            count: slots,
            rewards: slots * self.endorsing_reward_per_slot as f64,
        };

        Ok(StakeTallies { bakes, endorsements })
    }
}

fn opportunities(per_unit: u64, units: u64) -> Result<u64, InvalidArgument> {
    per_unit
        .checked_mul(units)
        .ok_or(InvalidArgument::TooManyOpportunities { per_unit, units })
}

fn reward_product(
    name: &'static str,
    reward: Mutez,
    slots: u64,
) -> Result<Mutez, InvalidArgument> {
    reward
        .checked_mul(slots)
        .ok_or(InvalidArgument::RewardOverflow { name, reward, slots })
}
