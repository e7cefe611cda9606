/*!
Re-export of common values and datatypes used for running and displaying
estimations. Must be imported manually.

```
use bakestimator::prelude::*;
```
*/

use crate::{
    config, constants, error, estimation, provider, results, rewards, stake,
};

pub use config::{EstimatorConfig, Network, MICRO_UNITS_PER_TOKEN};

pub use constants::{
    Mutez, NetworkParameters, ProtocolConstants, RollConstants, StakeConstants,
};

pub use error::{Amount, DomainError, EstimationError, InvalidArgument};

pub use estimation::{
    estimate_roll_based, estimate_stake_based, EstimationBuildError,
    EstimationBuilder, EstimationGroup, EstimationRequest,
};

pub use provider::{BakerHoldings, NetworkProvider, NetworkSnapshot};

pub use results::{EstimationResult, Format, RollReport, StakeReport};

pub use rewards::{BakeTally, EndorseTally, MeanMax, RewardRange, Tally};

pub use stake::{BakerStakeInput, DelegateStake, RollStake};
