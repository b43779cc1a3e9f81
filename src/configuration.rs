use crate::error::{ClusterError, ClusterResult};
use itertools::Itertools;
use rand::Rng;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};

/// Coordinates of a single point. Three dimensions fit without allocating.
pub type Position = SmallVec<[f64; 3]>;

/// A set of points whose pairwise squared separations a cluster can read.
pub trait PairConfiguration {
    /// An identifier which changes if and only if the separations may have changed.
    fn id(&self) -> u64;
    /// Number of points.
    fn point_count(&self) -> usize;
    /// Squared separation between points `i` and `j`.
    fn r2(&self, i: usize, j: usize) -> f64;
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Point coordinates along with a cache of all pairwise squared separations.
///
/// Every mutation takes a fresh id from a process-wide counter, so two pair sets never share an
/// id and a cluster holding a cached value for one id can trust it.
///
/// Only the positions are serialized. Loading goes through [`CoordinatePairSet::new`], so a
/// loaded set gets a fresh id and separations computed from its positions.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serialize",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<Position>", into = "Vec<Position>")
)]
pub struct CoordinatePairSet {
    positions: Vec<Position>,
    dim: usize,
    r2: Vec<f64>,
    id: u64,
}

impl CoordinatePairSet {
    /// Make a pair set from a list of positions, all of which must share a dimension.
    pub fn new(positions: Vec<Position>) -> ClusterResult<Self> {
        if positions.is_empty() {
            return Err(ClusterError::InvalidPointCount { n: 0 });
        }
        let dim = positions[0].len();
        Self::check_dims(&positions, dim)?;
        let n = positions.len();
        let mut pairs = Self {
            positions,
            dim,
            r2: vec![0.0; n * n],
            id: next_id(),
        };
        pairs.recompute_all();
        Ok(pairs)
    }

    /// Make a pair set with all `n` points at the origin of a `dim` dimensional space.
    pub fn at_origin(n: usize, dim: usize) -> ClusterResult<Self> {
        Self::new((0..n).map(|_| smallvec::smallvec![0.0; dim]).collect())
    }

    /// Place `n` points uniformly in the cube `[-half_width, half_width)^dim`.
    pub fn random_in_cube<R: Rng>(
        n: usize,
        dim: usize,
        half_width: f64,
        rng: &mut R,
    ) -> ClusterResult<Self> {
        Self::new(
            (0..n)
                .map(|_| {
                    (0..dim)
                        .map(|_| rng.gen_range(-half_width..half_width))
                        .collect()
                })
                .collect(),
        )
    }

    /// Dimension of the space the points live in.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Position of point `i`.
    pub fn position(&self, i: usize) -> &[f64] {
        &self.positions[i]
    }

    /// All positions.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Move point `i` to `pos`.
    pub fn set_position(&mut self, i: usize, pos: &[f64]) {
        assert_eq!(pos.len(), self.dim);
        self.positions[i].copy_from_slice(pos);
        self.recompute_point(i);
    }

    /// Shift point `i` by `delta`.
    pub fn translate_point(&mut self, i: usize, delta: &[f64]) {
        assert_eq!(delta.len(), self.dim);
        self.positions[i]
            .iter_mut()
            .zip(delta.iter())
            .for_each(|(x, dx)| *x += dx);
        self.recompute_point(i);
    }

    /// Overwrite every position at once.
    pub fn set_positions(&mut self, positions: Vec<Position>) -> ClusterResult<()> {
        if positions.len() != self.positions.len() {
            return Err(ClusterError::PointCountMismatch {
                expected: self.positions.len(),
                found: positions.len(),
            });
        }
        Self::check_dims(&positions, self.dim)?;
        self.positions = positions;
        self.recompute_all();
        Ok(())
    }

    fn check_dims(positions: &[Position], dim: usize) -> ClusterResult<()> {
        match positions.iter().find(|p| p.len() != dim) {
            Some(p) => Err(ClusterError::DimensionMismatch {
                expected: dim,
                found: p.len(),
            }),
            None => Ok(()),
        }
    }

    fn dist2(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    fn recompute_point(&mut self, i: usize) {
        let n = self.positions.len();
        for j in (0..n).filter(|j| *j != i) {
            let d = Self::dist2(&self.positions[i], &self.positions[j]);
            self.r2[i * n + j] = d;
            self.r2[j * n + i] = d;
        }
        self.id = next_id();
    }

    fn recompute_all(&mut self) {
        let n = self.positions.len();
        for (i, j) in (0..n).tuple_combinations() {
            let d = Self::dist2(&self.positions[i], &self.positions[j]);
            self.r2[i * n + j] = d;
            self.r2[j * n + i] = d;
        }
        self.id = next_id();
    }
}

impl PairConfiguration for CoordinatePairSet {
    fn id(&self) -> u64 {
        self.id
    }

    fn point_count(&self) -> usize {
        self.positions.len()
    }

    fn r2(&self, i: usize, j: usize) -> f64 {
        self.r2[i * self.positions.len() + j]
    }
}

impl TryFrom<Vec<Position>> for CoordinatePairSet {
    type Error = ClusterError;

    fn try_from(positions: Vec<Position>) -> ClusterResult<Self> {
        Self::new(positions)
    }
}

impl From<CoordinatePairSet> for Vec<Position> {
    fn from(pairs: CoordinatePairSet) -> Self {
        pairs.positions
    }
}
