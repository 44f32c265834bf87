use std::collections::TryReserveError;
use std::fmt;
use std::str::FromStr;

use crate::BalancedPartition;
use crate::Graph;

mod hybrid;
mod kernighan_lin;
mod modulo;
mod perturbation;
mod random;
mod sequential;

pub use hybrid::find_best_partition;
pub use hybrid::Hybrid;
pub use hybrid::Metadata as HybridMetadata;
pub use hybrid::Phase as HybridPhase;
pub use hybrid::Settings as HybridSettings;
pub use kernighan_lin::gain;
pub use kernighan_lin::kernighan_lin_pass;
pub use kernighan_lin::refine;
pub use kernighan_lin::KernighanLin;
pub use kernighan_lin::Metadata as KlMetadata;
pub use modulo::build_modulo;
pub use modulo::Modulo;
pub use perturbation::perturb;
pub use random::build_random;
pub use random::rebalance;
pub use random::RandomRebalance;
pub use sequential::build_sequential;
pub use sequential::Sequential;

/// Common errors thrown by algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// No partition could be produced.
    NotFound,

    /// The graph has no vertices.
    EmptyGraph,

    /// The part count is zero, or too low for the requested operation.
    InvalidPartCount { part_count: usize },

    /// The imbalance margin is above 100%.
    MarginOutOfRange { margin_percent: usize },

    /// The perturbation fraction is not in `(0, 1]`.
    InvalidFraction,

    /// Input sets don't have matching lengths.
    InputLenMismatch { expected: usize, actual: usize },

    /// A part id is not lower than the part count.
    PartOutOfRange { vertex: usize, part: usize },

    /// CSR row pointers are empty, decreasing, or do not match the adjacency
    /// array.
    MalformedRowPointers,

    /// An adjacency entry is not a vertex of the graph.
    NeighborOutOfRange { vertex: usize, neighbor: usize },

    /// An edge links a vertex to itself.
    SelfLoop { vertex: usize },

    /// The adjacency array of an undirected graph must hold every edge twice.
    OddAdjacencyLength { len: usize },

    /// `vertex` lists `neighbor`, but `neighbor` does not list `vertex` back
    /// (or lists it fewer times).
    AsymmetricAdjacency { vertex: usize, neighbor: usize },

    /// A working buffer could not be allocated.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "no partition found"),
            Error::EmptyGraph => write!(f, "graph has no vertices"),
            Error::InvalidPartCount { part_count } => {
                write!(f, "invalid part count {part_count}")
            }
            Error::MarginOutOfRange { margin_percent } => write!(
                f,
                "imbalance margin must be between 0% and 100% (got {margin_percent}%)",
            ),
            Error::InvalidFraction => write!(f, "perturbation fraction must be in (0, 1]"),
            Error::InputLenMismatch { expected, actual } => write!(
                f,
                "input sets don't have the same length (expected {expected} items, got {actual})",
            ),
            Error::PartOutOfRange { vertex, part } => {
                write!(f, "vertex {vertex} is assigned to unknown part {part}")
            }
            Error::MalformedRowPointers => write!(f, "malformed CSR row pointers"),
            Error::NeighborOutOfRange { vertex, neighbor } => {
                write!(f, "vertex {vertex} has out-of-range neighbor {neighbor}")
            }
            Error::SelfLoop { vertex } => write!(f, "vertex {vertex} is its own neighbor"),
            Error::OddAdjacencyLength { len } => write!(
                f,
                "adjacency array of length {len} cannot store every edge twice",
            ),
            Error::AsymmetricAdjacency { vertex, neighbor } => write!(
                f,
                "vertex {vertex} lists {neighbor} as a neighbor, but not the other way around",
            ),
            Error::OutOfMemory => write!(f, "failed to allocate a working buffer"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

/// Validates the arguments shared by every partition constructor.
pub(crate) fn check_params(
    graph: &Graph,
    part_count: usize,
    margin_percent: usize,
) -> Result<(), Error> {
    if graph.is_empty() {
        return Err(Error::EmptyGraph);
    }
    if part_count == 0 {
        return Err(Error::InvalidPartCount { part_count });
    }
    if 100 < margin_percent {
        return Err(Error::MarginOutOfRange { margin_percent });
    }
    Ok(())
}

/// Checks the output buffer of a [`crate::Partition`] implementation.
pub(crate) fn check_len(part_ids: &[usize], graph: &Graph) -> Result<(), Error> {
    if part_ids.len() != graph.len() {
        return Err(Error::InputLenMismatch {
            expected: graph.len(),
            actual: part_ids.len(),
        });
    }
    Ok(())
}

/// Checks that `partition` was built for `graph`.
pub(crate) fn check_partition_len(
    partition: &BalancedPartition,
    graph: &Graph,
) -> Result<(), Error> {
    if partition.vertex_count() != graph.len() {
        return Err(Error::InputLenMismatch {
            expected: graph.len(),
            actual: partition.vertex_count(),
        });
    }
    Ok(())
}

/// Which algorithm [`partition_graph`] runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// [`build_modulo`], then [`refine`].
    #[default]
    Modulo,
    /// [`build_sequential`], then [`refine`].
    Sequential,
    /// [`build_random`], then [`refine`].
    Random,
    /// [`find_best_partition`].
    Hybrid,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Modulo,
        Strategy::Sequential,
        Strategy::Random,
        Strategy::Hybrid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Modulo => "modulo",
            Strategy::Sequential => "sequential",
            Strategy::Random => "random",
            Strategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown [`Strategy`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown algorithm {:?}, expected one of modulo, sequential, random, hybrid",
            self.0,
        )
    }
}

impl std::error::Error for UnknownStrategy {}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStrategy(s.to_owned()))
    }
}

/// Partitions `graph` into `part_count` parts with the given strategy.
///
/// Single-strategy runs build the initial partition and refine it with
/// [`refine`]; [`Strategy::Hybrid`] runs the whole [`find_best_partition`]
/// search.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kwaycut::Strategy;
/// use rand::SeedableRng as _;
///
/// // Two triangles linked by a single edge.
/// let graph = kwaycut::Graph::from_edges(
///     6,
///     [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)],
/// )?;
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
///
/// let strategy: Strategy = "sequential".parse()?;
/// let partition = kwaycut::partition_graph(&graph, 2, 10, strategy, &mut rng)?;
/// assert_eq!(partition.cut_edges(), 1);
/// # Ok(())
/// # }
/// ```
pub fn partition_graph<R>(
    graph: &Graph,
    part_count: usize,
    margin_percent: usize,
    strategy: Strategy,
    rng: &mut R,
) -> Result<BalancedPartition, Error>
where
    R: rand::Rng,
{
    let span = tracing::info_span!("partition_graph", %strategy, part_count, margin_percent);
    let _enter = span.enter();

    let mut partition = match strategy {
        Strategy::Modulo => build_modulo(graph, part_count, margin_percent)?,
        Strategy::Sequential => build_sequential(graph, part_count, margin_percent)?,
        Strategy::Random => build_random(graph, part_count, margin_percent, rng)?,
        Strategy::Hybrid => return find_best_partition(graph, part_count, margin_percent, rng),
    };
    tracing::info!(cut_edges = partition.cut_edges(), "initial partition");
    refine(graph, &mut partition)?;
    tracing::info!(cut_edges = partition.cut_edges(), "refined partition");
    Ok(partition)
}
