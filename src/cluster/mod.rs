//! Clusters: sums over diagrams of Mayer bonds evaluated for a configuration of points.

use crate::configuration::PairConfiguration;
use crate::error::{ClusterError, ClusterResult};

/// Two-slot value cache for accept/reject sampling.
pub mod cache;
/// Biconnected sum by explicit enumeration of edge sets, for small clusters.
pub mod brute_force;
/// Biconnected sum by Wheatley's recursion over subsets.
pub mod wheatley;

pub use brute_force::*;
pub use cache::*;
pub use wheatley::*;

/// Largest number of points any cluster accepts. The Wheatley arrays hold `2 (n + 1) 2^n`
/// floats (about 350 MB at 20 points) and a recompute costs `O(n 4^n)`.
pub const MAX_POINTS: usize = 20;

/// The interface samplers use to evaluate a cluster on a configuration.
pub trait Cluster: Send {
    /// Number of points in the cluster.
    fn point_count(&self) -> usize;

    /// Value of the cluster for `cfg`. Repeated calls with the current configuration id, or with
    /// the id of the configuration before it, do not recompute anything.
    fn value<P: PairConfiguration + ?Sized>(&mut self, cfg: &P) -> ClusterResult<f64>;

    /// Set the temperature used for subsequent bond evaluations.
    fn set_temperature(&mut self, temperature: f64) -> ClusterResult<()>;

    /// The current temperature.
    fn temperature(&self) -> f64;

    /// An independent cluster with the same points, Mayer function and temperature, and an
    /// empty cache.
    fn make_copy(&self) -> Self
    where
        Self: Sized;
}

/// Check `n` against `max` and return `2^n`.
pub(crate) fn check_point_count(n: usize, max: usize) -> ClusterResult<usize> {
    if n < 1 {
        return Err(ClusterError::InvalidPointCount { n });
    }
    let max = max.min(MAX_POINTS);
    let too_many = ClusterError::TooManyPoints { n, max };
    if n > max {
        return Err(too_many);
    }
    let nf = u32::try_from(n)
        .ok()
        .and_then(|s| 1usize.checked_shl(s))
        .ok_or(too_many)?;
    // fA and fB hold n rows of 2^n.
    nf.checked_mul(n).ok_or(too_many)?;
    Ok(nf)
}

/// Check a temperature and return the matching beta.
pub(crate) fn check_temperature(temperature: f64) -> ClusterResult<f64> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(1.0 / temperature)
    } else {
        Err(ClusterError::InvalidTemperature { temperature })
    }
}

/// `n!` as a float.
pub(crate) fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_point_count() {
        assert_eq!(check_point_count(1, MAX_POINTS), Ok(2));
        assert_eq!(check_point_count(4, MAX_POINTS), Ok(16));
        assert_eq!(
            check_point_count(0, MAX_POINTS),
            Err(ClusterError::InvalidPointCount { n: 0 })
        );
        assert_eq!(
            check_point_count(21, 64),
            Err(ClusterError::TooManyPoints { n: 21, max: 20 })
        );
        assert_eq!(
            check_point_count(8, 7),
            Err(ClusterError::TooManyPoints { n: 8, max: 7 })
        );
    }

    #[test]
    fn test_check_temperature() {
        assert_eq!(check_temperature(2.0), Ok(0.5));
        assert!(check_temperature(0.0).is_err());
        assert!(check_temperature(-1.0).is_err());
        assert!(check_temperature(f64::NAN).is_err());
        assert!(check_temperature(f64::INFINITY).is_err());
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(1), 1.0);
        assert_eq!(factorial(5), 120.0);
    }
}
