use crate::cluster::Cluster;
use crate::configuration::PairConfiguration;
use crate::error::{ClusterError, ClusterResult};
use crate::settings::EngineSettings;
use tracing::debug;

/// A set of independent copies of one cluster, one per sampling box or chain.
///
/// Each copy owns its own scratch arrays and cache, so copies can be evaluated on different
/// configurations (or threads) without interfering with one another.
#[derive(Debug)]
pub struct ClusterEnsemble<C: Cluster> {
    clusters: Vec<C>,
}

impl<C: Cluster> ClusterEnsemble<C> {
    /// Make `count` copies of `prototype`. The prototype itself is kept as the first member.
    pub fn new(prototype: C, count: usize) -> Self {
        let mut clusters = Vec::with_capacity(count);
        if count > 0 {
            clusters.extend((1..count).map(|_| prototype.make_copy()));
            clusters.insert(0, prototype);
        }
        debug!(count, "built cluster ensemble");
        Self { clusters }
    }

    /// Make `count` copies of `prototype`, all at the temperature in `settings`.
    pub fn with_settings(
        prototype: C,
        count: usize,
        settings: &EngineSettings,
    ) -> ClusterResult<Self> {
        settings.validate()?;
        let mut ensemble = Self::new(prototype, count);
        ensemble.set_temperature(settings.temperature)?;
        Ok(ensemble)
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether the ensemble is empty.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Add another copy of the first cluster, returning its index.
    pub fn add_copy(&mut self) -> Option<usize> {
        let copy = self.clusters.first()?.make_copy();
        self.clusters.push(copy);
        Some(self.clusters.len() - 1)
    }

    /// The clusters.
    pub fn clusters_ref(&self) -> &[C] {
        &self.clusters
    }

    /// The clusters, mutably.
    pub fn clusters_mut(&mut self) -> &mut [C] {
        &mut self.clusters
    }

    /// Set the temperature of every cluster.
    pub fn set_temperature(&mut self, temperature: f64) -> ClusterResult<()> {
        self.clusters
            .iter_mut()
            .try_for_each(|c| c.set_temperature(temperature))
    }

    /// Evaluate cluster `k` on configuration `k`.
    pub fn values<P: PairConfiguration>(&mut self, configs: &[P]) -> ClusterResult<Vec<f64>> {
        self.check_len(configs.len())?;
        self.clusters
            .iter_mut()
            .zip(configs.iter())
            .map(|(c, cfg)| c.value(cfg))
            .collect()
    }

    fn check_len(&self, found: usize) -> ClusterResult<()> {
        if found == self.clusters.len() {
            Ok(())
        } else {
            Err(ClusterError::EnsembleSizeMismatch {
                expected: self.clusters.len(),
                found,
            })
        }
    }
}

/// Parallel evaluation of ensembles on the rayon thread pool.
#[cfg(feature = "parallel")]
pub mod rayon_ensemble {
    use super::*;
    use rayon::prelude::*;

    /// Evaluate every cluster of an ensemble on its own configuration in parallel.
    pub trait ParallelClusterValues {
        /// Evaluate cluster `k` on configuration `k`, one task per cluster.
        fn parallel_values<P>(&mut self, configs: &[P]) -> ClusterResult<Vec<f64>>
        where
            P: PairConfiguration + Sync;
    }

    impl<C: Cluster> ParallelClusterValues for ClusterEnsemble<C> {
        fn parallel_values<P>(&mut self, configs: &[P]) -> ClusterResult<Vec<f64>>
        where
            P: PairConfiguration + Sync,
        {
            self.check_len(configs.len())?;
            self.clusters
                .par_iter_mut()
                .zip(configs.par_iter())
                .map(|(c, cfg)| c.value(cfg))
                .collect()
        }
    }

    #[cfg(test)]
    mod parallel_ensemble_test {
        use super::*;
        use crate::cluster::ClusterWheatley;
        use crate::configuration::CoordinatePairSet;
        use crate::mayer::MayerHardSphere;
        use rand::prelude::SmallRng;
        use rand::SeedableRng;

        #[test]
        fn test_parallel_matches_serial() {
            let mut rng = SmallRng::seed_from_u64(0u64);
            let configs = (0..8)
                .map(|_| CoordinatePairSet::random_in_cube(5, 3, 0.6, &mut rng).unwrap())
                .collect::<Vec<_>>();
            let proto = ClusterWheatley::new(5, MayerHardSphere::new(1.0)).unwrap();
            let mut serial = ClusterEnsemble::new(proto.make_copy(), 8);
            let mut parallel = ClusterEnsemble::new(proto, 8);

            let a = serial.values(&configs).unwrap();
            let b = parallel.parallel_values(&configs).unwrap();
            assert_eq!(a, b);
        }
    }
}

#[cfg(test)]
mod ensemble_test {
    use super::*;
    use crate::cluster::ClusterWheatley;
    use crate::configuration::CoordinatePairSet;
    use crate::mayer::MayerHardSphere;
    use smallvec::smallvec;

    #[test]
    fn test_basic() {
        let proto = ClusterWheatley::new(2, MayerHardSphere::new(1.0)).unwrap();
        let mut ensemble = ClusterEnsemble::new(proto, 3);
        assert_eq!(ensemble.len(), 3);

        let near = CoordinatePairSet::new(vec![smallvec![0.0], smallvec![0.5]]).unwrap();
        let far = CoordinatePairSet::new(vec![smallvec![0.0], smallvec![1.5]]).unwrap();
        let values = ensemble
            .values(&[near.clone(), far.clone(), near.clone()])
            .unwrap();
        assert_eq!(values, vec![0.5, 0.0, 0.5]);

        assert!(ensemble.values(&[near, far]).is_err());
    }

    #[test]
    fn test_empty_and_add() {
        let proto = ClusterWheatley::new(2, MayerHardSphere::new(1.0)).unwrap();
        let mut ensemble = ClusterEnsemble::new(proto, 0);
        assert!(ensemble.is_empty());
        assert_eq!(ensemble.add_copy(), None);

        let proto = ClusterWheatley::new(2, MayerHardSphere::new(1.0)).unwrap();
        let mut ensemble = ClusterEnsemble::new(proto, 1);
        assert_eq!(ensemble.add_copy(), Some(1));
        assert_eq!(ensemble.clusters_ref().len(), 2);
    }

    #[test]
    fn test_settings_temperature() {
        let proto = ClusterWheatley::new(3, MayerHardSphere::new(1.0)).unwrap();
        let settings = EngineSettings::default().with_temperature(2.0);
        let ensemble = ClusterEnsemble::with_settings(proto, 4, &settings).unwrap();
        assert!(ensemble
            .clusters_ref()
            .iter()
            .all(|c| c.temperature() == 2.0));

        let proto = ClusterWheatley::new(3, MayerHardSphere::new(1.0)).unwrap();
        let bad = EngineSettings::default().with_temperature(f64::NAN);
        assert!(ClusterEnsemble::with_settings(proto, 4, &bad).is_err());
    }
}
