use crate::{
    config::EstimatorConfig,
    constants::ProtocolConstants,
    error::InvalidArgument,
    stake::BakerStakeInput,
};

use super::{EstimationGroup, EstimationRequest};

/// Builds an [`EstimationRequest`] or an [`EstimationGroup`].
#[derive(Debug, Default, Clone)]
pub struct EstimationBuilder {
    constants: Option<ProtocolConstants>,
    stake: Option<BakerStakeInput>,
    cycles: Vec<u64>,
    confidence: Option<f64>,
    config: Option<EstimatorConfig>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationBuildError {
    #[error("no protocol constants were given")]
    NoConstantsGiven,
    #[error("no baker stake was given")]
    NoStakeGiven,
    #[error("{0} cycle counts were given for a single estimation")]
    AmbiguousCycles(usize),
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

impl EstimationBuilder {
    /// Default confidence of "max" values.
    pub const DEFAULT_CONFIDENCE: f64 = 0.9;

    /// Creates a new [`EstimationBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the protocol constants, which also select the protocol
    /// generation the estimation follows.
    pub fn constants<C: Into<ProtocolConstants>>(mut self, constants: C) -> Self {
        self.constants = Some(constants.into());

        self
    }

    /// Sets the baker's stake. Must be of the same protocol generation as
    /// the constants.
    pub fn stake<S: Into<BakerStakeInput>>(mut self, stake: S) -> Self {
        self.stake = Some(stake.into());

        self
    }

    /// Estimate over `cycles` cycles (default 1), replacing any previously
    /// given cycle counts.
    pub fn cycles(mut self, cycles: u64) -> Self {
        self.cycles = vec![cycles];

        self
    }

    /// Add one estimation per element of `cycles`. Only usable with
    /// [`EstimationBuilder::build_group`] when more than one count is given.
    pub fn cycles_iter<I>(mut self, cycles: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        self.cycles.extend(cycles);

        self
    }

    /// Probability that reported "max" values are not exceeded (default
    /// 0.9).
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);

        self
    }

    pub fn config(mut self, config: EstimatorConfig) -> Self {
        self.config = Some(config);

        self
    }

    /// Creates a single [`EstimationRequest`].
    pub fn build(self) -> Result<EstimationRequest, EstimationBuildError> {
        let mut requests = self.build_requests()?;

        match requests.len() {
            1 => Ok(requests.remove(0)),
            n => Err(EstimationBuildError::AmbiguousCycles(n)),
        }
    }

    /// Creates an [`EstimationGroup`] with one request per cycle count.
    pub fn build_group(self) -> Result<EstimationGroup, EstimationBuildError> {
        Ok(EstimationGroup::new(self.build_requests()?))
    }

    fn build_requests(
        self,
    ) -> Result<Vec<EstimationRequest>, EstimationBuildError> {
        use EstimationBuildError::*;

        let EstimationBuilder {
            constants,
            stake,
            mut cycles,
            confidence,
            config,
        } = self;

        let constants = constants.ok_or(NoConstantsGiven)?;
        let stake = stake.ok_or(NoStakeGiven)?;
        if cycles.is_empty() {
            cycles.push(1);
        }

        let mut requests = vec![];
        for cycles in cycles {
            let request = EstimationRequest {
                constants,
                stake,
                cycles,
                confidence: confidence.unwrap_or(Self::DEFAULT_CONFIDENCE),
                config: config.unwrap_or_default(),
            };
            request.validate()?;
            requests.push(request);
        }

        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use crate::{constants::RollConstants, stake::RollStake};

    use super::*;

    fn rolls() -> RollStake {
        RollStake {
            active_rolls_held: 1,
            total_active_rolls: 1_000,
        }
    }

    #[test]
    fn example_build() {
        let request = EstimationBuilder::new()
            .constants(RollConstants::default())
            .stake(rolls())
            .build()
            .expect("valid estimation build");

        assert_eq!(request.cycles, 1);
        assert_eq!(request.confidence, 0.9);
        assert_eq!(request.config, EstimatorConfig::default());
    }

    #[test]
    fn missing_inputs() {
        assert_eq!(
            EstimationBuilder::new().stake(rolls()).build(),
            Err(EstimationBuildError::NoConstantsGiven)
        );
        assert_eq!(
            EstimationBuilder::new()
                .constants(RollConstants::default())
                .build(),
            Err(EstimationBuildError::NoStakeGiven)
        );
    }

    #[test]
    fn invalid_arguments_fail_the_build() {
        let builder = EstimationBuilder::new()
            .constants(RollConstants::default())
            .stake(rolls());

        assert_eq!(
            builder.clone().cycles(0).build(),
            Err(InvalidArgument::ZeroCycles.into())
        );
        assert_eq!(
            builder.confidence(1.0).build(),
            Err(InvalidArgument::Confidence(1.0).into())
        );
    }

    #[test]
    fn several_cycle_counts_need_a_group() {
        let builder = EstimationBuilder::new()
            .constants(RollConstants::default())
            .stake(rolls())
            .cycles_iter([1, 5]);

        assert_eq!(
            builder.clone().build(),
            Err(EstimationBuildError::AmbiguousCycles(2))
        );
        assert_eq!(builder.build_group().unwrap().len(), 2);
    }
}
