//! Expected and confidence-bounded counts of won opportunities.
//!
//! The number of opportunities a baker wins out of `n`, each won
//! independently with probability `p`, follows Binomial(`n`, `p`). The
//! upper bound reported is the exact quantile of that distribution.

use statrs::distribution::{Binomial, DiscreteCDF};
use tracing::trace;

use crate::error::{EstimationError, InvalidArgument};

/// Expected count and the count not exceeded with the requested confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountBound {
    pub mean: f64,
    pub max: f64,
}

/// Fails unless `confidence` lies in the open range `0.0..1.0`.
pub fn check_confidence(confidence: f64) -> Result<f64, InvalidArgument> {
    if confidence.is_nan() || confidence <= 0.0 || confidence >= 1.0 {
        return Err(InvalidArgument::Confidence(confidence));
    }

    Ok(confidence)
}

/// Computes the mean and the `confidence` quantile of Binomial(`n`, `p`).
///
/// ```
/// use bakestimator::bound::estimate;
///
/// let bound = estimate(10, 0.5, 0.9).unwrap();
/// assert_eq!(bound.mean, 5.0);
/// assert_eq!(bound.max, 7.0);
/// ```
pub fn estimate(
    n: u64,
    p: f64,
    confidence: f64,
) -> Result<CountBound, EstimationError> {
    let confidence = check_confidence(confidence)?;
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return Err(InvalidArgument::Probability(p).into());
    }

    Ok(CountBound {
        mean: p * n as f64,
        max: quantile(n, p, confidence)? as f64,
    })
}

/// Relative slack allowed when comparing the CDF to the confidence. The
/// regularized beta behind the CDF can land a few ulps below an exact tie,
/// which must still resolve to the lower `k`.
const CDF_TOLERANCE: f64 = 1e-12;

/// Smallest `k` such that `P(X <= k) >= confidence` for X ~ Binomial(n, p).
fn quantile(n: u64, p: f64, confidence: f64) -> Result<u64, EstimationError> {
    if n == 0 || p == 0.0 {
        return Ok(0);
    }
    if p == 1.0 {
        return Ok(n);
    }

    let dist = Binomial::new(p, n)
        .map_err(|_| InvalidArgument::Probability(p))?;

    // The CDF is non-decreasing in k and reaches 1 at k = n, so the search
    // always terminates inside 0..=n.
    let (mut lo, mut hi) = (0, n);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let cdf = dist.cdf(mid);
        trace!(n, p, mid, cdf, "binomial quantile search");

        if cdf >= confidence * (1.0 - CDF_TOLERANCE) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    Ok(lo)
}
