//! Describing a baker's stake and the share of it that counts toward
//! selection.

use serde::{Deserialize, Serialize};

use crate::error::{non_negative, Amount, InvalidArgument};

/// Stake held by the baker under the roll-based protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollStake {
    /// Rolls the baker holds and bakes with.
    pub active_rolls_held: u64,
    /// Rolls active across the whole network.
    pub total_active_rolls: u64,
}

/// Stake held by the baker under the stake-based protocols. Every amount is
/// in micro-units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelegateStake {
    /// The baker's own balance.
    pub full_balance: Amount,
    /// Balance delegated to the baker by others.
    pub delegated_balance: Amount,
    /// Upper bound the baker has set on its frozen deposits, if any.
    pub deposit_limit: Option<Amount>,
    /// Stake active across the whole network.
    pub total_active_stake: Amount,
    /// Staking balance below which a baker is never selected.
    pub eligibility_threshold: Amount,
}

impl DelegateStake {
    /// Own plus delegated balance.
    #[inline]
    pub fn staking_balance(&self) -> Amount {
        self.full_balance + self.delegated_balance
    }

    /// The most the baker can freeze as deposit: its deposit limit when set,
    /// otherwise its full balance.
    #[inline]
    pub fn deposit_cap(&self) -> Amount {
        self.deposit_limit.unwrap_or(self.full_balance)
    }

    /// Fails if any amount is negative. An empty network stake is a domain
    /// failure and is left to the selection model.
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        non_negative("full_balance", self.full_balance)?;
        non_negative("delegated_balance", self.delegated_balance)?;
        if let Some(limit) = self.deposit_limit {
            non_negative("deposit_limit", limit)?;
        }
        non_negative("eligibility_threshold", self.eligibility_threshold)?;

        Ok(())
    }
}

/// Stake figures for either protocol generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum BakerStakeInput {
    RollBased(RollStake),
    StakeBased(DelegateStake),
}

impl BakerStakeInput {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RollBased(_) => "roll-based",
            Self::StakeBased(_) => "stake-based",
        }
    }
}

impl From<RollStake> for BakerStakeInput {
    fn from(value: RollStake) -> Self {
        Self::RollBased(value)
    }
}

impl From<DelegateStake> for BakerStakeInput {
    fn from(value: DelegateStake) -> Self {
        Self::StakeBased(value)
    }
}

/// Stake that counts toward selection: the staking balance, capped at what
/// the deposit cap can back given the protocol's frozen deposit ratio.
///
/// ```
/// use bakestimator::stake::active_stake;
///
/// // 10% frozen deposits: a cap of 1000 backs up to 10000 of stake
/// assert_eq!(active_stake(9000.0, 1000.0, 10.0), Ok(9000.0));
/// assert_eq!(active_stake(12000.0, 1000.0, 10.0), Ok(10000.0));
/// assert_eq!(active_stake(9000.0, 400.0, 10.0), Ok(4000.0));
/// ```
pub fn active_stake(
    staking_balance: Amount,
    deposit_cap: Amount,
    frozen_deposits_percentage: Amount,
) -> Result<Amount, InvalidArgument> {
    if frozen_deposits_percentage.is_nan() || frozen_deposits_percentage <= 0.0
    {
        return Err(InvalidArgument::NonPositiveFrozenDepositsPercentage);
    }
    let staking_balance = non_negative("staking_balance", staking_balance)?;
    let deposit_cap = non_negative("deposit_cap", deposit_cap)?;

    Ok(staking_balance.min(deposit_cap * 100.0 / frozen_deposits_percentage))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn delegate(full: Amount, delegated: Amount) -> DelegateStake {
        DelegateStake {
            full_balance: full,
            delegated_balance: delegated,
            deposit_limit: None,
            total_active_stake: 1_000_000.0,
            eligibility_threshold: 0.0,
        }
    }

    #[test]
    fn over_delegated_stake_is_capped() {
        assert_eq!(active_stake(12_000.0, 400.0, 10.0), Ok(4_000.0));
        assert_eq!(active_stake(12_000.0, 1_000.0, 25.0), Ok(4_000.0));
    }

    #[test]
    fn zero_frozen_percentage_is_rejected() {
        assert_eq!(
            active_stake(1.0, 1.0, 0.0),
            Err(InvalidArgument::NonPositiveFrozenDepositsPercentage)
        );
    }

    #[test]
    fn deposit_limit_overrides_full_balance() {
        let mut stake = delegate(6_000.0, 3_000.0);
        assert_eq!(stake.staking_balance(), 9_000.0);
        assert_eq!(stake.deposit_cap(), 6_000.0);

        stake.deposit_limit = Some(500.0);
        assert_eq!(stake.deposit_cap(), 500.0);
    }

    #[test]
    fn negative_balance_fails_validation() {
        let stake = delegate(-1.0, 0.0);

        assert!(matches!(
            stake.validate(),
            Err(InvalidArgument::Negative {
                name: "full_balance",
                ..
            })
        ));
        assert_eq!(delegate(1.0, 2.0).validate(), Ok(()));
    }

    #[test]
    fn active_stake_is_monotone_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1_000 {
            let balance = rng.gen_range(0.0..1e12);
            let cap = rng.gen_range(0.0..1e11);
            let pct = rng.gen_range(1.0..=100.0);
            let extra = rng.gen_range(0.0..1e10);

            let base = active_stake(balance, cap, pct).unwrap();
            assert!(base <= cap * 100.0 / pct);
            assert!(active_stake(balance + extra, cap, pct).unwrap() >= base);
            assert!(active_stake(balance, cap + extra, pct).unwrap() >= base);
        }
    }
}
