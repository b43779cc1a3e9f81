#![deny(
    missing_docs,
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

//! `virial` computes cluster integrals for virial coefficient Monte Carlo: the sum over all
//! biconnected diagrams of Mayer bonds between `n` points, evaluated for a configuration.
//!
//! The main engine is [`cluster::ClusterWheatley`], which uses Wheatley's recursion over subsets
//! of the points. It caches the value of the current and previous configuration, so accept/reject
//! sampling loops only pay for a recompute when a genuinely new configuration appears.
//!
//! It also offers a few feature gated extensions:
//! - parallel evaluation of cluster ensembles with the `parallel` feature.
//! - serde support for settings and pair sets with the `serialize` feature.
//!
//! # Hard sphere example
//! ```
//! use virial::cluster::*;
//! use virial::configuration::CoordinatePairSet;
//! use virial::mayer::MayerHardSphere;
//! use smallvec::smallvec;
//!
//! // Three mutually overlapping spheres of diameter 1.
//! let pairs = CoordinatePairSet::new(vec![
//!     smallvec![0.0, 0.0, 0.0],
//!     smallvec![0.5, 0.0, 0.0],
//!     smallvec![0.0, 0.5, 0.0],
//! ]).unwrap();
//!
//! let mut cluster = ClusterWheatley::new(3, MayerHardSphere::new(1.0)).unwrap();
//! let value = cluster.value(&pairs).unwrap();
//! assert!((value - 1.0 / 3.0).abs() < 1e-12);
//!
//! // Asking again for the same configuration is free.
//! assert_eq!(cluster.value(&pairs).unwrap(), value);
//! assert_eq!(cluster.evaluations(), 1);
//! ```

/// e-bond matrices.
pub mod bonds;
/// Cluster engines and the interface samplers use.
pub mod cluster;
/// Point configurations and their pairwise separations.
pub mod configuration;
/// Groups of independent cluster copies.
pub mod ensemble;
/// Error types.
pub mod error;
/// Mayer functions.
pub mod mayer;
/// Engine settings.
pub mod settings;

pub use cluster::{Cluster, ClusterBruteForce, ClusterWheatley};
pub use error::{ClusterError, ClusterResult};
