use crate::bonds::BondMatrix;
use crate::cluster::cache::{CacheStats, RollbackCache};
use crate::cluster::{check_point_count, check_temperature, factorial, Cluster};
use crate::configuration::PairConfiguration;
use crate::error::{ClusterError, ClusterResult};
use crate::mayer::MayerFunction;
use itertools::Itertools;
use smallvec::{smallvec, SmallVec};
use std::cmp::min;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, error};

/// Largest cluster the brute force sum accepts: `2^21` edge sets at 7 points.
pub const BRUTE_FORCE_MAX_POINTS: usize = 7;

type Adjacency = SmallVec<[SmallVec<[usize; 8]>; 8]>;

/// Sum of all biconnected diagrams found by enumerating every set of edges.
///
/// Gives the same value as [`ClusterWheatley`](crate::cluster::ClusterWheatley) at a cost
/// exponential in the number of pairs; useful for checking it on small clusters.
pub struct ClusterBruteForce<M: MayerFunction> {
    n: usize,
    f: Arc<M>,
    bonds: BondMatrix,
    pairs: Vec<(usize, usize)>,
    beta: f64,
    cache: RollbackCache,
    sum: f64,
}

impl<M: MayerFunction> Debug for ClusterBruteForce<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterBruteForce")
            .field("n", &self.n)
            .field("beta", &self.beta)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<M: MayerFunction> ClusterBruteForce<M> {
    /// Make a cluster of `n` points with Mayer function `f` at temperature 1.
    pub fn new(n: usize, f: M) -> ClusterResult<Self> {
        Self::new_shared(n, Arc::new(f))
    }

    /// Make a cluster which shares its Mayer function with other clusters.
    pub fn new_shared(n: usize, f: Arc<M>) -> ClusterResult<Self> {
        check_point_count(n, BRUTE_FORCE_MAX_POINTS)?;
        debug!(n, "allocated brute force cluster");
        Ok(Self {
            n,
            f,
            bonds: BondMatrix::new(n),
            pairs: (0..n).tuple_combinations().collect(),
            beta: 1.0,
            cache: RollbackCache::new(),
            sum: 0.0,
        })
    }

    /// Unnormalized sum over biconnected diagrams from the last recompute.
    pub fn biconnected_sum(&self) -> f64 {
        self.sum
    }

    /// How value lookups have been resolved.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Evaluate the cluster for an explicit e-bond matrix, bypassing the configuration cache.
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

    fn calc_value(&mut self) -> f64 {
        let n = self.n;
        let f_bonds = self
            .pairs
            .iter()
            .map(|(i, j)| self.bonds.get(*i, *j) - 1.0)
            .collect::<Vec<_>>();

        let mut adj: Adjacency = smallvec![SmallVec::new(); n];
        let mut sum = 0.0;
        for edge_set in 0usize..(1 << self.pairs.len()) {
            adj.iter_mut().for_each(|a| a.clear());
            let mut weight = 1.0;
            for (k, (i, j)) in self.pairs.iter().enumerate() {
                if edge_set & (1 << k) != 0 {
                    adj[*i].push(*j);
                    adj[*j].push(*i);
                    weight *= f_bonds[k];
                }
            }
            if is_biconnected(&adj) {
                sum += weight;
            }
        }
        self.sum = sum;
        (1.0 - n as f64) * sum / factorial(n)
    }
}

/// Whether the graph is connected and has no articulation point. A single point and a single
/// edge both count as biconnected.
pub fn is_biconnected(adj: &[SmallVec<[usize; 8]>]) -> bool {
    let n = adj.len();
    if n <= 1 {
        return true;
    }
    let mut disc: SmallVec<[usize; 8]> = smallvec![usize::MAX; n];
    let mut low: SmallVec<[usize; 8]> = smallvec![0; n];
    let mut time = 0;
    let mut articulation = false;

    let root_children = articulation_search(
        adj,
        0,
        usize::MAX,
        &mut disc,
        &mut low,
        &mut time,
        &mut articulation,
    );
    let connected = disc.iter().all(|d| *d != usize::MAX);
    connected && !articulation && root_children <= 1
}

/// Depth first search filling discovery times and low links. Returns the number of tree
/// children of `v`; non-root articulation points are flagged in `articulation`.
fn articulation_search(
    adj: &[SmallVec<[usize; 8]>],
    v: usize,
    parent: usize,
    disc: &mut [usize],
    low: &mut [usize],
    time: &mut usize,
    articulation: &mut bool,
) -> usize {
    disc[v] = *time;
    low[v] = *time;
    *time += 1;
    let mut children = 0;
    for &w in adj[v].iter() {
        if disc[w] == usize::MAX {
            children += 1;
            articulation_search(adj, w, v, disc, low, time, articulation);
            low[v] = min(low[v], low[w]);
            if parent != usize::MAX && low[w] >= disc[v] {
                *articulation = true;
            }
        } else if w != parent {
            low[v] = min(low[v], disc[w]);
        }
    }
    children
}

impl<M: MayerFunction> Cluster for ClusterBruteForce<M> {
    fn point_count(&self) -> usize {
        self.n
    }

    fn value<P: PairConfiguration + ?Sized>(&mut self, cfg: &P) -> ClusterResult<f64> {
        let id = cfg.id();
        if let Some(value) = self.cache.lookup(id) {
            return Ok(value);
        }
        self.bonds.refresh(self.f.as_ref(), cfg, self.beta)?;
        let value = self.calc_value();
        if !value.is_finite() {
            error!(id, value, "degenerate configuration");
            return Err(ClusterError::DegenerateConfiguration { id, value });
        }
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
        Self {
            n: self.n,
            f: Arc::clone(&self.f),
            bonds: BondMatrix::new(self.n),
            pairs: self.pairs.clone(),
            beta: self.beta,
            cache: RollbackCache::new(),
            sum: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, edges: &[(usize, usize)]) -> Vec<SmallVec<[usize; 8]>> {
        let mut adj = vec![SmallVec::new(); n];
        edges.iter().for_each(|(a, b)| {
            adj[*a].push(*b);
            adj[*b].push(*a);
        });
        adj
    }

    #[test]
    fn test_biconnected_small() {
        assert!(is_biconnected(&graph(1, &[])));
        assert!(is_biconnected(&graph(2, &[(0, 1)])));
        assert!(!is_biconnected(&graph(2, &[])));
        assert!(is_biconnected(&graph(3, &[(0, 1), (1, 2), (2, 0)])));
        assert!(!is_biconnected(&graph(3, &[(0, 1), (1, 2)])));
    }

    #[test]
    fn test_articulation_point() {
        // Two triangles sharing point 2.
        let bowtie = graph(5, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2)]);
        assert!(!is_biconnected(&bowtie));
        let square = graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert!(is_biconnected(&square));
        let disjoint = graph(4, &[(0, 1), (2, 3)]);
        assert!(!is_biconnected(&disjoint));
    }

    #[test]
    fn test_square_ring() {
        // All f = -1: biconnected graphs on 4 labeled points are 3 rings, 6 rings with a
        // chord and 1 complete graph: 3 - 6 + 1 = -2.
        let mut c = ClusterBruteForce::new(4, |_i: usize, _j: usize, _r2: f64, _b: f64| 0.0)
            .unwrap();
        let bonds = BondMatrix::from_e_bonds(4, &[0.0; 6]).unwrap();
        let v = c.value_for_bonds(&bonds).unwrap();
        assert_eq!(c.biconnected_sum(), -2.0);
        assert!((v - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_size_limit() {
        let res = ClusterBruteForce::new(8, |_i: usize, _j: usize, _r2: f64, _b: f64| 0.0);
        assert_eq!(
            res.unwrap_err(),
            ClusterError::TooManyPoints { n: 8, max: 7 }
        );
    }
}
