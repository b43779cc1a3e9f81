#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A cluster value computed for a configuration id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedValue {
    /// Configuration id.
    pub id: u64,
    /// Cluster value for that configuration.
    pub value: f64,
}

/// Counters for how lookups were resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CacheStats {
    /// Lookups answered by the current slot.
    pub hits: usize,
    /// Lookups answered by swapping back to the previous slot.
    pub rollbacks: usize,
    /// Lookups which required a recompute.
    pub misses: usize,
}

/// Remembers the values of the current configuration and the one before it.
///
/// Monte Carlo drivers alternate between an accepted configuration and a trial; when a trial is
/// rejected the driver asks again for the old configuration, which is then served from the
/// previous slot without recomputing.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RollbackCache {
    current: Option<CachedValue>,
    previous: Option<CachedValue>,
    stats: CacheStats,
}

impl RollbackCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value for `id`. A hit on the previous slot makes it current again.
    pub fn lookup(&mut self, id: u64) -> Option<f64> {
        match (self.current, self.previous) {
            (Some(c), _) if c.id == id => {
                self.stats.hits += 1;
                Some(c.value)
            }
            (_, Some(p)) if p.id == id => {
                // Presumably the last configuration was a trial that got rejected.
                std::mem::swap(&mut self.current, &mut self.previous);
                self.stats.rollbacks += 1;
                Some(p.value)
            }
            _ => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Record a freshly computed value; the current entry becomes the previous one.
    pub fn push(&mut self, id: u64, value: f64) {
        self.previous = self.current.take();
        self.current = Some(CachedValue { id, value });
    }

    /// The current entry, if any.
    pub fn current(&self) -> Option<CachedValue> {
        self.current
    }

    /// The previous entry, if any.
    pub fn previous(&self) -> Option<CachedValue> {
        self.previous
    }

    /// Forget both entries. Statistics are kept.
    pub fn clear(&mut self) {
        self.current = None;
        self.previous = None;
    }

    /// Lookup statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let mut cache = RollbackCache::new();
        assert_eq!(cache.lookup(0), None);
        assert_eq!(cache.current(), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_hit_and_rollback() {
        let mut cache = RollbackCache::new();
        cache.push(1, 10.0);
        cache.push(2, 20.0);
        assert_eq!(cache.lookup(2), Some(20.0));
        assert_eq!(cache.lookup(1), Some(10.0));
        assert_eq!(cache.current().map(|c| c.id), Some(1));
        assert_eq!(cache.previous().map(|c| c.id), Some(2));
        // Going back again swaps again.
        assert_eq!(cache.lookup(2), Some(20.0));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                rollbacks: 2,
                misses: 0
            }
        );
    }

    #[test]
    fn test_third_configuration_evicts() {
        let mut cache = RollbackCache::new();
        cache.push(1, 10.0);
        cache.push(2, 20.0);
        cache.push(3, 30.0);
        assert_eq!(cache.lookup(1), None);
        assert_eq!(cache.lookup(2), Some(20.0));
    }

    #[test]
    fn test_clear() {
        let mut cache = RollbackCache::new();
        cache.push(1, 10.0);
        cache.clear();
        assert_eq!(cache.lookup(1), None);
        assert_eq!(cache.previous(), None);
    }
}
