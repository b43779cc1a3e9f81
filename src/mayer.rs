/// A pairwise Mayer function `f(r) = exp(-beta u(r)) - 1`.
///
/// Implementations must be pure: the same inputs always give the same value, and evaluating
/// never mutates shared state. Cluster copies on different threads share one instance.
pub trait MayerFunction: Send + Sync {
    /// Evaluate the Mayer function for points `i` and `j` separated by `r2` (squared distance)
    /// at inverse temperature `beta`.
    fn f(&self, i: usize, j: usize, r2: f64, beta: f64) -> f64;
}

impl<F> MayerFunction for F
where
    F: Fn(usize, usize, f64, f64) -> f64 + Send + Sync,
{
    fn f(&self, i: usize, j: usize, r2: f64, beta: f64) -> f64 {
        self(i, j, r2, beta)
    }
}

/// Hard spheres of diameter `sigma`: -1 on overlap, 0 otherwise. Independent of temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MayerHardSphere {
    sigma2: f64,
}

impl MayerHardSphere {
    /// Make a hard sphere Mayer function with diameter `sigma`.
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma2: sigma * sigma,
        }
    }

    /// The sphere diameter.
    pub fn sigma(&self) -> f64 {
        self.sigma2.sqrt()
    }
}

impl MayerFunction for MayerHardSphere {
    fn f(&self, _i: usize, _j: usize, r2: f64, _beta: f64) -> f64 {
        if r2 < self.sigma2 {
            -1.0
        } else {
            0.0
        }
    }
}

/// Mayer function for an arbitrary spherical pair energy `u(r2)`.
#[derive(Debug, Clone, Copy)]
pub struct MayerGeneral<U> {
    u: U,
}

impl<U> MayerGeneral<U>
where
    U: Fn(f64) -> f64 + Send + Sync,
{
    /// Wrap a pair energy given as a function of the squared separation.
    pub fn new(u: U) -> Self {
        Self { u }
    }

    /// Pair energy at squared separation `r2`.
    pub fn energy(&self, r2: f64) -> f64 {
        (self.u)(r2)
    }
}

impl<U> MayerFunction for MayerGeneral<U>
where
    U: Fn(f64) -> f64 + Send + Sync,
{
    fn f(&self, _i: usize, _j: usize, r2: f64, beta: f64) -> f64 {
        let u = (self.u)(r2);
        // Hard cores: exp(-inf) would be fine, but 0 * inf at beta = 0 is not.
        if u == f64::INFINITY {
            -1.0
        } else {
            (-beta * u).exp() - 1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_sphere() {
        let f = MayerHardSphere::new(1.0);
        assert_eq!(f.f(0, 1, 0.99, 1.0), -1.0);
        assert_eq!(f.f(0, 1, 1.0, 1.0), 0.0);
        assert_eq!(f.f(0, 1, 4.0, 10.0), 0.0);
        assert!((f.sigma() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_general_square_well() {
        let well = MayerGeneral::new(|r2: f64| {
            if r2 < 1.0 {
                f64::INFINITY
            } else if r2 < 2.25 {
                -1.0
            } else {
                0.0
            }
        });
        assert_eq!(well.f(0, 1, 0.5, 1.0), -1.0);
        assert!((well.f(0, 1, 2.0, 2.0) - (2.0f64.exp() - 1.0)).abs() < 1e-12);
        assert_eq!(well.f(0, 1, 3.0, 2.0), 0.0);
        assert_eq!(well.energy(2.0), -1.0);
    }

    #[test]
    fn test_closure() {
        let f = |i: usize, j: usize, _r2: f64, beta: f64| (i + j) as f64 * beta;
        assert_eq!(MayerFunction::f(&f, 1, 2, 0.0, 0.5), 1.5);
    }
}
