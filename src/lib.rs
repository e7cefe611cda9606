/*!
Estimates of the baking and endorsing opportunities a Tezos baker can expect
over a number of cycles, the security deposits they require, and the rewards
they pay.

Both the expected values and confidence-bounded maximums are reported. The
maximums are exact quantiles of the binomial distribution of opportunities
won, so they stay meaningful for small bakers and short windows.

```
use bakestimator::prelude::*;

let result = EstimationBuilder::new()
    .constants(RollConstants::default())
    .stake(RollStake { active_rolls_held: 1, total_active_rolls: 1_000 })
    .confidence(0.9)
    .build()
    .unwrap()
    .run()
    .unwrap();

assert_eq!(result.mean_bakes(), 4.096);
println!("{}", result);
```
*/

pub mod bound;
pub mod config;
pub mod constants;
pub mod error;
pub mod estimation;
pub mod prelude;
pub mod provider;
pub mod results;
pub mod rewards;
#[cfg(feature = "rpc")]
pub mod rpc;
pub mod selection;
pub mod stake;

pub use estimation::{
    estimate_roll_based, estimate_stake_based, EstimationBuilder,
    EstimationGroup, EstimationRequest,
};
pub use results::{EstimationResult, Format};
