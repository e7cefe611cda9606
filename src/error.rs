//! Errors raised while building or running an estimation

/// Numeric type used for stake, balances and probabilities.
pub type Amount = f64;

/// Any failure of a single estimation call. There is no partial result: an
/// estimation either produces a complete result or one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// A caller-supplied value is outside the range the estimator accepts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("number of cycles must be at least 1")]
    ZeroCycles,
    #[error("confidence {0} is not in the open range 0.0..1.0")]
    Confidence(f64),
    #[error("probability {0} is not in the range 0.0..=1.0")]
    Probability(f64),
    #[error("{name} must be a non-negative number, got {value}")]
    Negative { name: &'static str, value: Amount },
    #[error("frozen deposits percentage must be greater than 0")]
    NonPositiveFrozenDepositsPercentage,
    #[error(
        "consensus threshold {threshold} exceeds committee size \
         {committee_size}"
    )]
    ThresholdAboveCommittee { threshold: u64, committee_size: u64 },
    #[error("{per_unit} opportunities per unit over {units} units overflows")]
    TooManyOpportunities { per_unit: u64, units: u64 },
    #[error("{name} of {reward} over {slots} slots overflows")]
    RewardOverflow {
        name: &'static str,
        reward: u64,
        slots: u64,
    },
    #[error("{stake} stake input cannot be used with {constants} constants")]
    VariantMismatch {
        stake: &'static str,
        constants: &'static str,
    },
}

/// The supplied data does not describe a network the estimator can reason
/// about.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("total active stake is zero, selection probability is undefined")]
    EmptyStakePool,
    #[error("protocol constant `{0}` is missing")]
    MissingConstant(String),
    #[error("protocol constant `{name}` has non-numeric value {value}")]
    MalformedConstant { name: String, value: String },
    #[error("constants match neither the roll-based nor the stake-based protocol")]
    UnknownProtocol,
}

/// Fails with [`InvalidArgument::Negative`] when `value` is negative or NaN.
pub(crate) fn non_negative(
    name: &'static str,
    value: Amount,
) -> Result<Amount, InvalidArgument> {
    if value.is_nan() || value < 0.0 {
        return Err(InvalidArgument::Negative { name, value });
    }

    Ok(value)
}
