//! A balanced k-way graph partitioning library.
//!
//! Given an undirected [`Graph`] and a part count `k`, kwaycut assigns every
//! vertex to one of `k` parts so that few edges cross part boundaries (the
//! *edge cut*) while part sizes stay within a percentage margin of the mean.
//!
//! # Crate Layout
//!
//! kwaycut exposes a [`Partition`] trait, which is in turn implemented by
//! algorithms.  The same algorithms are available as free functions that work
//! on a [`BalancedPartition`], a part assignment that keeps its part sizes and
//! edge cut up to date.
//!
//! # Available algorithms
//!
//! ## Partitioner algorithms
//!
//! - [Modulo][Modulo]: vertex `i` goes to part `i mod k`
//! - [Block-sequential][Sequential]: `k` contiguous ranges of vertex ids
//! - [Random + rebalance][RandomRebalance]
//! - [Hybrid][Hybrid] multi-start search, which combines everything below
//!
//! ## Partition improving algorithms
//!
//! - [Kernighan-Lin][KernighanLin], single-vertex k-way variant with a
//!   balance constraint
//! - [Perturbation][perturb], to escape local optima
//!
//! # Example
//!
//! ```rust
//! # fn main() -> Result<(), kwaycut::Error> {
//! use rand::SeedableRng as _;
//!
//! // 0 - 1
//! // |   |
//! // 3 - 2
//! let graph = kwaycut::Graph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 0)])?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let partition = kwaycut::find_best_partition(&graph, 2, 50, &mut rng)?;
//! assert_eq!(partition.cut_edges(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    rust_2018_idioms
)]

mod algorithms;
mod graph;
pub mod imbalance;
mod partition;
mod run_info;
mod topology;
mod vec;

#[cfg(test)]
mod tests;

pub use crate::algorithms::*;
pub use crate::graph::Graph;
pub use crate::imbalance::Balance;
pub use crate::partition::BalancedPartition;
pub use crate::run_info::RunInfo;
pub use crate::topology::Topology;

pub use rand;
pub use rayon;
#[cfg(feature = "sprs")]
pub use sprs;

/// The `Partition` trait allows for partitioning data.
///
/// Partitioning algorithms implement this trait.
///
/// The generic argument `M` defines the input of the algorithms (here, a
/// [`Graph`]).
///
/// The input partition must be of the correct size and its contents may or may
/// not be used by the algorithms.
pub trait Partition<M> {
    /// Diagnostic data returned for a specific run of the algorithm.
    type Metadata;

    /// Error details, should the algorithm fail to run.
    type Error;

    /// Partition the given data and output the part ID of each element in
    /// `part_ids`.
    ///
    /// Part IDs must be contiguous and start from zero, meaning the number of
    /// parts is one plus the maximum of `part_ids`.  If a lower ID does not
    /// appear in the array, the part is assumed to be empty.
    fn partition(&mut self, part_ids: &mut [usize], data: M)
        -> Result<Self::Metadata, Self::Error>;
}

/// The edge cut of `partition` on `graph`, recomputed from scratch.
///
/// Each undirected edge is counted once.  This ignores the value maintained
/// by the partition, see [`BalancedPartition::resync_cut_edges`] to correct
/// it.
pub fn cut_edges(graph: &Graph, partition: &BalancedPartition) -> usize {
    graph.edge_cut(partition.part_ids())
}
