//! Building and running estimations

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    bound::check_confidence,
    config::EstimatorConfig,
    constants::{ProtocolConstants, RollConstants, StakeConstants},
    error::{EstimationError, InvalidArgument},
    results::{EstimationResult, RollReport, StakeReport},
    rewards::RewardModel,
    selection::{RollSelection, SelectionModel, StakeSelection},
    stake::{BakerStakeInput, DelegateStake, RollStake},
};

pub mod builder;

pub use builder::{EstimationBuildError, EstimationBuilder};

/// Everything a single estimation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimationRequest {
    pub constants: ProtocolConstants,
    pub stake: BakerStakeInput,
    pub cycles: u64,
    /// Probability that a reported "max" value is not exceeded.
    pub confidence: f64,
    pub config: EstimatorConfig,
}

impl EstimationRequest {
    pub fn builder() -> EstimationBuilder {
        EstimationBuilder::new()
    }

    /// Checks the arguments that do not depend on the protocol's economics.
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        check_cycles(self.cycles)?;
        check_confidence(self.confidence)?;

        match (&self.constants, &self.stake) {
            (ProtocolConstants::RollBased(_), BakerStakeInput::RollBased(_))
            | (
                ProtocolConstants::StakeBased(_),
                BakerStakeInput::StakeBased(_),
            ) => Ok(()),
            (constants, stake) => Err(InvalidArgument::VariantMismatch {
                stake: stake.kind(),
                constants: constants.kind(),
            }),
        }
    }

    /// Runs the estimation for the protocol generation of the request's
    /// constants.
    pub fn run(&self) -> Result<EstimationResult, EstimationError> {
        self.validate()?;

        let result = match (&self.constants, &self.stake) {
            (
                ProtocolConstants::RollBased(constants),
                BakerStakeInput::RollBased(stake),
            ) => EstimationResult::RollBased(estimate_roll_based(
                constants,
                stake,
                self.cycles,
                self.confidence,
                &self.config,
            )?),
            (
                ProtocolConstants::StakeBased(constants),
                BakerStakeInput::StakeBased(stake),
            ) => EstimationResult::StakeBased(estimate_stake_based(
                constants,
                stake,
                self.cycles,
                self.confidence,
                &self.config,
            )?),
            _ => unreachable!("variants are matched by validate"),
        };

        Ok(result)
    }
}

/// Estimates baking and endorsing under the roll-based protocols.
///
/// ```
/// use bakestimator::prelude::*;
///
/// let stake = RollStake { active_rolls_held: 1, total_active_rolls: 1_000 };
/// let config = EstimatorConfig::default();
/// let report =
///     estimate_roll_based(&RollConstants::default(), &stake, 1, 0.9, &config)
///         .unwrap();
///
/// assert_eq!(report.bakes.mean.count, 4.096);
/// ```
pub fn estimate_roll_based(
    constants: &RollConstants,
    stake: &RollStake,
    cycles: u64,
    confidence: f64,
    config: &EstimatorConfig,
) -> Result<RollReport, EstimationError> {
    check_cycles(cycles)?;
    check_confidence(confidence)?;

    let probability = RollSelection::from(*stake).probability()?;
    debug!(probability, cycles, confidence, "roll-based estimation");

    let tallies = constants.aggregate(probability, cycles, confidence)?;

    Ok(RollReport::assemble(
        tallies,
        stake.total_active_rolls,
        stake.active_rolls_held,
        cycles,
        config,
    ))
}

/// Estimates baking and endorsing under the stake-based protocols.
pub fn estimate_stake_based(
    constants: &StakeConstants,
    stake: &DelegateStake,
    cycles: u64,
    confidence: f64,
    config: &EstimatorConfig,
) -> Result<StakeReport, EstimationError> {
    check_cycles(cycles)?;
    check_confidence(confidence)?;
    constants.validate()?;

    let selection = StakeSelection::new(stake, constants)?;
    let probability = selection.probability()?;
    debug!(
        probability,
        active_stake = selection.active_stake,
        cycles,
        confidence,
        "stake-based estimation"
    );

    let tallies = constants.aggregate(probability, cycles, confidence)?;

    Ok(StakeReport::assemble(
        tallies,
        selection.active_stake,
        cycles,
        config,
    ))
}

fn check_cycles(cycles: u64) -> Result<u64, InvalidArgument> {
    if cycles == 0 {
        return Err(InvalidArgument::ZeroCycles);
    }

    Ok(cycles)
}

/// The same estimation evaluated over several cycle counts.
#[derive(Debug, Clone)]
pub struct EstimationGroup {
    requests: Vec<EstimationRequest>,
}

impl EstimationGroup {
    pub(crate) fn new(requests: Vec<EstimationRequest>) -> Self {
        Self { requests }
    }

    pub fn builder() -> EstimationBuilder {
        EstimationBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Runs every request, returning results in request order. Fails with the
    /// first error encountered.
    pub fn run_all(&self) -> Result<Vec<EstimationResult>, EstimationError> {
        #[cfg(feature = "rayon")]
        let results: Result<Vec<_>, _> =
            self.requests.par_iter().map(|r| r.run()).collect();
        #[cfg(not(feature = "rayon"))]
        let results: Result<Vec<_>, _> =
            self.requests.iter().map(|r| r.run()).collect();

        results
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DomainError;

    use super::*;

    fn doc_stake() -> DelegateStake {
        DelegateStake {
            full_balance: 0.5,
            delegated_balance: 4.5,
            deposit_limit: None,
            total_active_stake: 100.0,
            eligibility_threshold: 1.0,
        }
    }

    #[test]
    fn roll_based_scenario() {
        let stake = RollStake {
            active_rolls_held: 1,
            total_active_rolls: 1_000,
        };
        let report = estimate_roll_based(
            &RollConstants::default(),
            &stake,
            1,
            0.9,
            &EstimatorConfig::default(),
        )
        .unwrap();

        assert_eq!(report.bakes.mean.count, 4.096);
        assert_eq!(report.bakes.max.count, 7.0);
        assert_eq!(report.bakes.max.deposits, 7.0 * 512.0);
        assert_eq!(report.bakes.max.rewards, 7.0 * 40.0);
        assert_eq!(report.active_rolls, 1_000);
    }

    #[test]
    fn stake_based_scenario() {
        let constants = StakeConstants {
            consensus_committee_size: 8_000,
            endorsing_reward_per_slot: 2_500,
            ..StakeConstants::default()
        };
        let report = estimate_stake_based(
            &constants,
            &doc_stake(),
            1,
            0.9,
            &EstimatorConfig::default(),
        )
        .unwrap();

        assert_eq!(report.endorsements.count, 3_276_800.0);
        assert_eq!(report.endorsements.rewards, 8_192.0);
        assert_eq!(report.active_stake, 5.0 / 1_000_000.0);
    }

    #[test]
    fn ineligible_baker_bakes_nothing() {
        let stake = DelegateStake {
            eligibility_threshold: 6.0,
            ..doc_stake()
        };
        let report = estimate_stake_based(
            &StakeConstants::default(),
            &stake,
            3,
            0.9,
            &EstimatorConfig::default(),
        )
        .unwrap();

        assert_eq!(report.bakes.mean.count, 0.0);
        assert_eq!(report.bakes.max.count, 0.0);
        assert_eq!(report.endorsements.count, 0.0);
        // active stake is still reported
        assert!(report.active_stake > 0.0);
    }

    #[test]
    fn empty_stake_pool_fails_instead_of_dividing_by_zero() {
        let stake = DelegateStake {
            total_active_stake: 0.0,
            ..doc_stake()
        };

        assert_eq!(
            estimate_stake_based(
                &StakeConstants::default(),
                &stake,
                1,
                0.9,
                &EstimatorConfig::default(),
            ),
            Err(DomainError::EmptyStakePool.into())
        );
    }

    #[test]
    fn zero_cycles_is_rejected() {
        let stake = RollStake {
            active_rolls_held: 1,
            total_active_rolls: 10,
        };

        assert_eq!(
            estimate_roll_based(
                &RollConstants::default(),
                &stake,
                0,
                0.9,
                &EstimatorConfig::default(),
            ),
            Err(InvalidArgument::ZeroCycles.into())
        );
    }

    #[test]
    fn mismatched_variants_are_rejected() {
        let request = EstimationRequest {
            constants: RollConstants::default().into(),
            stake: doc_stake().into(),
            cycles: 1,
            confidence: 0.9,
            config: EstimatorConfig::default(),
        };

        assert_eq!(
            request.run(),
            Err(InvalidArgument::VariantMismatch {
                stake: "stake-based",
                constants: "roll-based"
            }
            .into())
        );
    }

    #[test]
    fn group_results_follow_request_order() {
        let group = EstimationBuilder::new()
            .constants(RollConstants::default())
            .stake(RollStake {
                active_rolls_held: 10,
                total_active_rolls: 80_000,
            })
            .cycles_iter([1, 5, 2])
            .build_group()
            .unwrap();

        let results = group.run_all().unwrap();
        let cycles: Vec<_> = results.iter().map(|r| r.cycles()).collect();

        assert_eq!(group.len(), 3);
        assert_eq!(cycles, vec![1, 5, 2]);
        assert!(results[1].mean_bakes() > results[2].mean_bakes());
    }
}
