use crate::configuration::PairConfiguration;
use crate::error::{ClusterError, ClusterResult};
use crate::mayer::MayerFunction;
use itertools::Itertools;

/// Symmetric matrix of e-bonds, `e_ij = f_ij + 1`, for `n` points. The diagonal is unused.
#[derive(Debug, Clone, PartialEq)]
pub struct BondMatrix {
    n: usize,
    e: Vec<f64>,
}

impl BondMatrix {
    /// A matrix for `n` points with every bond set to 1 (no interaction).
    pub fn new(n: usize) -> Self {
        Self {
            n,
            e: vec![1.0; n * n],
        }
    }

    /// Build a matrix from e-bond values of the unordered pairs `(i, j)`, `i < j`, listed in
    /// lexicographic order: `(0,1), (0,2), ..., (1,2), ...`.
    pub fn from_e_bonds(n: usize, e_bonds: &[f64]) -> ClusterResult<Self> {
        let expected = n * n.saturating_sub(1) / 2;
        if e_bonds.len() != expected {
            return Err(ClusterError::BondMatrixDimension {
                expected,
                found: e_bonds.len(),
            });
        }
        let mut mat = Self::new(n);
        (0..n)
            .tuple_combinations()
            .zip(e_bonds.iter())
            .for_each(|((i, j), e)| mat.set(i, j, *e));
        Ok(mat)
    }

    /// Number of points.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The e-bond between `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.e[i * self.n + j]
    }

    /// Set the e-bond between `i` and `j`, keeping the matrix symmetric.
    pub fn set(&mut self, i: usize, j: usize, e: f64) {
        self.e[i * self.n + j] = e;
        self.e[j * self.n + i] = e;
    }

    /// Copy every bond from another matrix of the same size.
    pub fn copy_from(&mut self, other: &BondMatrix) -> ClusterResult<()> {
        if other.n != self.n {
            return Err(ClusterError::PointCountMismatch {
                expected: self.n,
                found: other.n,
            });
        }
        self.e.copy_from_slice(&other.e);
        Ok(())
    }

    /// Recompute every pair from `cfg`, returning the number of Mayer function calls.
    pub fn refresh<M, P>(&mut self, f: &M, cfg: &P, beta: f64) -> ClusterResult<usize>
    where
        M: MayerFunction + ?Sized,
        P: PairConfiguration + ?Sized,
    {
        if cfg.point_count() != self.n {
            return Err(ClusterError::PointCountMismatch {
                expected: self.n,
                found: cfg.point_count(),
            });
        }
        let mut calls = 0;
        for (i, j) in (0..self.n).tuple_combinations() {
            let e = f.f(i, j, cfg.r2(i, j), beta) + 1.0;
            self.set(i, j, e);
            calls += 1;
        }
        Ok(calls)
    }

    /// The same bonds with points relabeled so that new point `k` is old point `perm[k]`.
    ///
    /// Panics unless `perm` lists every point exactly once.
    pub fn permuted(&self, perm: &[usize]) -> Self {
        assert_eq!(perm.len(), self.n);
        let mut seen = vec![false; self.n];
        for &p in perm {
            assert!(p < self.n && !seen[p], "{:?} is not a permutation", perm);
            seen[p] = true;
        }
        let mut mat = Self::new(self.n);
        for (i, j) in (0..self.n).tuple_combinations() {
            mat.set(i, j, self.get(perm[i], perm[j]));
        }
        mat
    }
}
