//! Probability that the baker is selected for a single baking or endorsing
//! opportunity.

use tracing::debug;

use crate::{
    constants::StakeConstants,
    error::{Amount, DomainError, EstimationError, InvalidArgument},
    stake::{active_stake, DelegateStake, RollStake},
};

/// Per-opportunity selection probability of a baker.
pub trait SelectionModel {
    /// Probability, in `0.0..=1.0`, that the baker is selected for any one
    /// opportunity.
    fn probability(&self) -> Result<f64, EstimationError>;
}

/// Under the roll-based protocols each slot goes to a roll drawn uniformly
/// from all active rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollSelection {
    pub baking_rolls: u64,
    pub total_active_rolls: u64,
}

impl From<RollStake> for RollSelection {
    fn from(stake: RollStake) -> Self {
        Self {
            baking_rolls: stake.active_rolls_held,
            total_active_rolls: stake.total_active_rolls,
        }
    }
}

impl SelectionModel for RollSelection {
    fn probability(&self) -> Result<f64, EstimationError> {
        if self.total_active_rolls == 0 {
            return Err(DomainError::EmptyStakePool.into());
        }

        let one_roll = 1.0 / self.total_active_rolls as f64;
        checked_probability(self.baking_rolls as f64 * one_roll)
    }
}

/// Under the stake-based protocols the baker is selected in proportion to
/// its active stake, provided its staking balance reaches the eligibility
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakeSelection {
    pub active_stake: Amount,
    pub staking_balance: Amount,
    pub total_active_stake: Amount,
    pub eligibility_threshold: Amount,
}

impl StakeSelection {
    /// Derives the baker's active stake from its balances and the protocol's
    /// frozen deposit ratio.
    pub fn new(
        stake: &DelegateStake,
        constants: &StakeConstants,
    ) -> Result<Self, InvalidArgument> {
        stake.validate()?;

        let staking_balance = stake.staking_balance();
        let active_stake = active_stake(
            staking_balance,
            stake.deposit_cap(),
            constants.frozen_deposits_percentage as Amount,
        )?;

        Ok(Self {
            active_stake,
            staking_balance,
            total_active_stake: stake.total_active_stake,
            eligibility_threshold: stake.eligibility_threshold,
        })
    }
}

impl SelectionModel for StakeSelection {
    fn probability(&self) -> Result<f64, EstimationError> {
        if self.total_active_stake.is_nan() || self.total_active_stake <= 0.0 {
            return Err(DomainError::EmptyStakePool.into());
        }

        if self.staking_balance < self.eligibility_threshold {
            debug!(
                staking_balance = self.staking_balance,
                eligibility_threshold = self.eligibility_threshold,
                "staking balance below eligibility threshold"
            );
            return Ok(0.0);
        }

        checked_probability(self.active_stake / self.total_active_stake)
    }
}

fn checked_probability(p: f64) -> Result<f64, EstimationError> {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return Err(InvalidArgument::Probability(p).into());
    }

    Ok(p)
}
