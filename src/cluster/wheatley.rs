use crate::bonds::BondMatrix;
use crate::cluster::cache::{CacheStats, RollbackCache};
use crate::cluster::{check_point_count, check_temperature, factorial, Cluster, MAX_POINTS};
use crate::configuration::PairConfiguration;
use crate::error::{ClusterError, ClusterResult};
use crate::mayer::MayerFunction;
use crate::settings::EngineSettings;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// Sum of all biconnected diagrams on `n` points, computed with Wheatley's recursion.
///
/// Every subset `S` of the points is a bitmask index into flat arrays of length `2^n`:
/// - `fQ[S]` is the product of all e-bonds within `S`,
/// - `fC[S]` is the sum over connected diagrams on `S`,
/// - `fB[v][S]` is the sum over connected diagrams on `S` with no articulation point at any
///   vertex `<= v`, and `fA[v][S]` those whose lowest articulation point is `v`.
///
/// `fB[n-1][all]` is the biconnected sum, reported as `(1 - n) / n!` times that sum.
/// The cost of a recompute is `O(n 4^n)` in the worst case and is paid inside
/// [`Cluster::value`] whenever the configuration id is new.
pub struct ClusterWheatley<M: MayerFunction> {
    n: usize,
    f: Arc<M>,
    bonds: BondMatrix,
    f_q: Vec<f64>,
    f_c: Vec<f64>,
    f_a: Vec<f64>,
    f_b: Vec<f64>,
    beta: f64,
    cache: RollbackCache,
    evaluations: usize,
    bond_calls: usize,
}

impl<M: MayerFunction> Debug for ClusterWheatley<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterWheatley")
            .field("n", &self.n)
            .field("beta", &self.beta)
            .field("cache", &self.cache)
            .field("evaluations", &self.evaluations)
            .finish()
    }
}

impl<M: MayerFunction> ClusterWheatley<M> {
    /// Make a cluster of `n` points with Mayer function `f` at temperature 1.
    pub fn new(n: usize, f: M) -> ClusterResult<Self> {
        Self::new_shared(n, Arc::new(f))
    }

    /// Make a cluster which shares its Mayer function with other clusters.
    pub fn new_shared(n: usize, f: Arc<M>) -> ClusterResult<Self> {
        check_point_count(n, MAX_POINTS)?;
        Self::allocate(n, f, 1.0)
    }

    /// Make a cluster using the temperature and size limit from `settings`.
    pub fn with_settings(n: usize, f: M, settings: &EngineSettings) -> ClusterResult<Self> {
        settings.validate()?;
        check_point_count(n, settings.max_points)?;
        let beta = check_temperature(settings.temperature)?;
        Self::allocate(n, Arc::new(f), beta)
    }

    /// Allocate the subset arrays, reporting failure instead of aborting.
    fn allocate(n: usize, f: Arc<M>, beta: f64) -> ClusterResult<Self> {
        let nf = 1usize << n;
        let f_q = zeroed(n, nf)?;
        let f_c = zeroed(n, nf)?;
        let f_a = zeroed(n, n * nf)?;
        let f_b = zeroed(n, n * nf)?;
        Ok(Self::assemble(n, f, beta, f_q, f_c, f_a, f_b))
    }

    fn assemble(
        n: usize,
        f: Arc<M>,
        beta: f64,
        mut f_q: Vec<f64>,
        f_c: Vec<f64>,
        f_a: Vec<f64>,
        f_b: Vec<f64>,
    ) -> Self {
        let nf = f_q.len();
        for i in 0..n {
            f_q[1usize << i] = 1.0;
        }
        debug!(n, nf, "allocated Wheatley cluster");
        Self {
            n,
            f,
            bonds: BondMatrix::new(n),
            f_q,
            f_c,
            f_a,
            f_b,
            beta,
            cache: RollbackCache::new(),
            evaluations: 0,
            bond_calls: 0,
        }
    }

    /// The shared Mayer function.
    pub fn mayer_function(&self) -> &Arc<M> {
        &self.f
    }

    /// Inverse temperature.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// The e-bonds used by the last recompute.
    pub fn bonds(&self) -> &BondMatrix {
        &self.bonds
    }

    /// Number of times the subset recursion has run.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Number of Mayer function evaluations so far.
    pub fn bond_calls(&self) -> usize {
        self.bond_calls
    }

    /// How value lookups have been resolved.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Forget cached values, so the next call to `value` recomputes.
    pub fn clear_cache(&mut self) {
        self.cache.clear()
    }

    /// Unnormalized sum over biconnected diagrams from the last recompute, `fB[n-1][all]`.
    pub fn biconnected_sum(&self) -> f64 {
        let nf = 1usize << self.n;
        self.f_b[self.n * nf - 1]
    }

    /// Evaluate the cluster for an explicit e-bond matrix, bypassing the configuration cache.
    ///
    /// A NaN or infinite result, for instance from an infinite e-bond, is
    /// [`ClusterError::DegenerateBonds`].
    pub fn value_for_bonds(&mut self, bonds: &BondMatrix) -> ClusterResult<f64> {
        self.bonds.copy_from(bonds)?;
        let value = self.calc_value();
        if value.is_finite() {
            Ok(value)
        } else {
            error!(value, "degenerate bond matrix");
            Err(ClusterError::DegenerateBonds { value })
        }
    }

    fn update_bonds<P: PairConfiguration + ?Sized>(&mut self, cfg: &P) -> ClusterResult<()> {
        self.bond_calls += self.bonds.refresh(self.f.as_ref(), cfg, self.beta)?;
        Ok(())
    }

    fn calc_value(&mut self) -> f64 {
        self.evaluations += 1;
        let n = self.n;
        let nf = 1usize << n;
        let e = &self.bonds;
        let f_q = &mut self.f_q;
        let f_c = &mut self.f_c;

        // Product of e-bonds within each subset, built by adding the lowest point to the rest.
        for i in 3..nf {
            let j = i & i.wrapping_neg();
            if i == j {
                continue;
            }
            let k = i & !j;
            let jj = j.trailing_zeros() as usize;
            let mut q = f_q[k];
            for l in (jj + 1)..n {
                if (1 << l) & k == 0 {
                    continue;
                }
                q *= e.get(jj, l);
            }
            f_q[i] = q;
        }

        // Connected sums: remove every split of i into a connected piece holding its lowest
        // point and an arbitrary remainder.
        for i in 1..nf {
            let low = i & i.wrapping_neg();
            let mut c = f_q[i];
            for j in 1..i {
                if j & low == 0 {
                    continue;
                }
                let j_comp = i & !j;
                if (j_comp | j) != i {
                    continue;
                }
                c -= f_c[j] * f_q[j_comp];
            }
            f_c[i] = c;
        }

        // Articulation points at point 0.
        {
            let a0 = &mut self.f_a[..nf];
            let b0 = &mut self.f_b[..nf];
            for i in 1..nf {
                a0[i] = 0.0;
                b0[i] = f_c[i];
                if i & 1 == 0 || i == 1 {
                    continue;
                }
                let ii = i - 1;
                let j_bits = 1 | (ii & ii.wrapping_neg());
                let mut a = 0.0;
                for j in (3..i).step_by(2) {
                    if (j & j_bits) != j_bits {
                        continue;
                    }
                    let j_comp = i & !j;
                    if j_comp == 0 || (j_comp | j) != i {
                        continue;
                    }
                    a += b0[j] * f_c[j_comp | 1];
                }
                a0[i] = a;
                b0[i] -= a;
            }
        }

        // Articulation points at v, given none below v. Must run in increasing v.
        for v in 1..n {
            let vs1 = 1usize << v;
            let (done, rest) = self.f_b.split_at_mut(v * nf);
            let b_prev = &done[(v - 1) * nf..];
            let b = &mut rest[..nf];
            let a_v = &mut self.f_a[v * nf..(v + 1) * nf];
            for i in 1..nf {
                a_v[i] = 0.0;
                b[i] = b_prev[i];
                if i & vs1 == 0 {
                    continue;
                }
                let mut j_bits = i & i.wrapping_neg();
                if j_bits != vs1 {
                    j_bits |= vs1;
                } else if j_bits == i {
                    continue;
                } else {
                    let ii = i & !j_bits;
                    j_bits |= ii & ii.wrapping_neg();
                }
                // j_bits is either (lowest point + v) or (v + next lowest point).
                let mut a = 0.0;
                for j in 3..i {
                    if (j & j_bits) != j_bits {
                        continue;
                    }
                    let j_comp = i & !j;
                    if j_comp == 0 || (j_comp | j) != i {
                        continue;
                    }
                    a += b[j] * (b[j_comp | vs1] + a_v[j_comp | vs1]);
                }
                a_v[i] = a;
                b[i] -= a;
            }
        }

        (1.0 - n as f64) * self.f_b[n * nf - 1] / factorial(n)
    }
}

fn zeroed(n: usize, len: usize) -> ClusterResult<Vec<f64>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| ClusterError::ScratchAllocation {
            n,
            bytes: len.saturating_mul(size_of::<f64>()),
        })?;
    v.resize(len, 0.0);
    Ok(v)
}

impl<M: MayerFunction> Cluster for ClusterWheatley<M> {
    fn point_count(&self) -> usize {
        self.n
    }

    fn value<P: PairConfiguration + ?Sized>(&mut self, cfg: &P) -> ClusterResult<f64> {
        let id = cfg.id();
        if let Some(value) = self.cache.lookup(id) {
            return Ok(value);
        }

        self.update_bonds(cfg)?;
        let mut value = self.calc_value();
        if !value.is_finite() {
            warn!(id, value, "non-finite cluster value, recomputing bonds");
            self.update_bonds(cfg)?;
            value = self.calc_value();
            if !value.is_finite() {
                error!(id, value, "degenerate configuration");
                return Err(ClusterError::DegenerateConfiguration { id, value });
            }
        }
        trace!(id, value, "computed cluster value");
        self.cache.push(id, value);
        Ok(value)
    }

    fn set_temperature(&mut self, temperature: f64) -> ClusterResult<()> {
        self.beta = check_temperature(temperature)?;
        Ok(())
    }

    fn temperature(&self) -> f64 {
        1.0 / self.beta
    }

    fn make_copy(&self) -> Self {
        let nf = 1usize << self.n;
        Self::assemble(
            self.n,
            Arc::clone(&self.f),
            self.beta,
            vec![0.0; nf],
            vec![0.0; nf],
            vec![0.0; self.n * nf],
            vec![0.0; self.n * nf],
        )
    }
}
