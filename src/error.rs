use thiserror::Error;

/// Errors produced while building or evaluating a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ClusterError {
    /// A cluster needs at least one point.
    #[error("a cluster needs at least one point, got {n}")]
    InvalidPointCount {
        /// Requested number of points.
        n: usize,
    },

    /// Subset arrays of size `2^n` cannot be indexed for this many points.
    #[error("{n} points exceeds the supported maximum of {max}")]
    TooManyPoints {
        /// Requested number of points.
        n: usize,
        /// Largest supported number of points.
        max: usize,
    },

    /// Temperatures must be finite and strictly positive.
    #[error("invalid temperature {temperature}")]
    InvalidTemperature {
        /// Offending temperature.
        temperature: f64,
    },

    /// The configuration does not have as many points as the cluster.
    #[error("configuration has {found} points but the cluster expects {expected}")]
    PointCountMismatch {
        /// Points in the cluster.
        expected: usize,
        /// Points in the configuration.
        found: usize,
    },

    /// Positions of one pair set do not all live in the same number of dimensions.
    #[error("position has {found} coordinates but the pair set is {expected} dimensional")]
    DimensionMismatch {
        /// Dimension of the pair set.
        expected: usize,
        /// Coordinates in the offending position.
        found: usize,
    },

    /// An ensemble was given a different number of configurations than it has clusters.
    #[error("ensemble has {expected} clusters but was given {found} configurations")]
    EnsembleSizeMismatch {
        /// Clusters in the ensemble.
        expected: usize,
        /// Configurations supplied.
        found: usize,
    },

    /// An e-bond matrix was given with the wrong number of entries.
    #[error("bond matrix has {found} entries, expected {expected}")]
    BondMatrixDimension {
        /// Required number of entries.
        expected: usize,
        /// Supplied number of entries.
        found: usize,
    },

    /// The cluster value stayed NaN or infinite after a full recompute, usually because
    /// overlapping points fed an infinite bond into the sum.
    #[error("degenerate configuration {id}: cluster value is {value}")]
    DegenerateConfiguration {
        /// Id of the configuration that was evaluated.
        id: u64,
        /// The non-finite value.
        value: f64,
    },

    /// An explicit e-bond matrix produced a NaN or infinite cluster value.
    #[error("degenerate bond matrix: cluster value is {value}")]
    DegenerateBonds {
        /// The non-finite value.
        value: f64,
    },

    /// The subset arrays for `n` points could not be allocated.
    #[error("could not allocate {bytes} bytes of subset arrays for {n} points")]
    ScratchAllocation {
        /// Requested number of points.
        n: usize,
        /// Bytes requested for the arrays.
        bytes: usize,
    },
}

/// Result alias for cluster operations.
pub type ClusterResult<T> = Result<T, ClusterError>;
