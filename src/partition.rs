//! The mutable partition state refined by the engine.

use std::fmt;

use crate::algorithms::check_params;
use crate::imbalance::Balance;
use crate::topology::Topology as _;
use crate::vec::SliceExt as _;
use crate::vec::VecExt as _;
use crate::Error;
use crate::Graph;

/// Maximum number of member ids listed per part by the `Display` impl.
const DISPLAYED_MEMBERS: usize = 10;

/// A k-way partition of the vertices of a [`Graph`].
///
/// Alongside the part id of each vertex, a `BalancedPartition` maintains the
/// size of each part and the edge cut, so that both are available in constant
/// time.  Engine operations keep the three mutually consistent after every
/// move: the part sizes always add up to the vertex count and match the
/// assignment, and [`cut_edges`](Self::cut_edges) equals the value recomputed
/// from scratch by [`crate::cut_edges`] once an operation returns.
///
/// The part count and the imbalance margin are fixed for the lifetime of the
/// partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedPartition {
    part_ids: Vec<usize>,
    part_sizes: Vec<usize>,
    cut_edges: usize,
    margin_percent: usize,
}

impl BalancedPartition {
    /// Adopts an existing assignment of the vertices of `graph`.
    ///
    /// Part sizes and the edge cut are computed from `part_ids`.  The
    /// assignment does not need to satisfy the balance constraint.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), kwaycut::Error> {
    /// let graph = kwaycut::Graph::from_edges(3, [(0, 1), (1, 2)])?;
    /// let partition = kwaycut::BalancedPartition::from_part_ids(&graph, vec![0, 0, 1], 2, 10)?;
    /// assert_eq!(partition.part_sizes(), &[2, 1]);
    /// assert_eq!(partition.cut_edges(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_part_ids(
        graph: &Graph,
        part_ids: Vec<usize>,
        part_count: usize,
        margin_percent: usize,
    ) -> Result<Self, Error> {
        check_params(graph, part_count, margin_percent)?;
        if part_ids.len() != graph.len() {
            return Err(Error::InputLenMismatch {
                expected: graph.len(),
                actual: part_ids.len(),
            });
        }
        if let Some((vertex, &part)) = part_ids
            .iter()
            .enumerate()
            .find(|(_, part)| part_count <= **part)
        {
            return Err(Error::PartOutOfRange { vertex, part });
        }
        Self::from_raw(graph, part_ids, part_count, margin_percent)
    }

    /// Builds a partition from an assignment already known to be valid.
    pub(crate) fn from_raw(
        graph: &Graph,
        part_ids: Vec<usize>,
        part_count: usize,
        margin_percent: usize,
    ) -> Result<Self, Error> {
        debug_assert_eq!(part_ids.len(), graph.len());
        let mut part_sizes = Vec::try_filled(0, part_count)?;
        for &part in &part_ids {
            part_sizes[part] += 1;
        }
        let cut_edges = graph.edge_cut(&part_ids);
        Ok(Self {
            part_ids,
            part_sizes,
            cut_edges,
            margin_percent,
        })
    }

    pub fn part_count(&self) -> usize {
        self.part_sizes.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.part_ids.len()
    }

    /// The part id of each vertex.
    pub fn part_ids(&self) -> &[usize] {
        &self.part_ids
    }

    /// The number of vertices in each part.
    pub fn part_sizes(&self) -> &[usize] {
        &self.part_sizes
    }

    /// The maintained edge cut.
    pub fn cut_edges(&self) -> usize {
        self.cut_edges
    }

    pub fn margin_percent(&self) -> usize {
        self.margin_percent
    }

    /// The balance constraint moves on this partition must satisfy.
    pub fn balance(&self) -> Balance {
        Balance::new(self.vertex_count(), self.part_count(), self.margin_percent)
    }

    /// Whether every part size is within `[average - margin, average + margin]`.
    pub fn is_balanced(&self) -> bool {
        let balance = self.balance();
        self.part_sizes.iter().all(|&size| balance.contains(size))
    }

    /// The vertices assigned to `part`, in ascending order.
    pub fn part_members(&self, part: usize) -> impl Iterator<Item = usize> + '_ {
        self.part_ids
            .iter()
            .enumerate()
            .filter(move |(_, p)| **p == part)
            .map(|(vertex, _)| vertex)
    }

    pub fn into_part_ids(self) -> Vec<usize> {
        self.part_ids
    }

    /// Deep copy that reports allocation failures instead of aborting.
    pub fn try_clone(&self) -> Result<Self, Error> {
        Ok(Self {
            part_ids: self.part_ids.as_slice().try_to_vec()?,
            part_sizes: self.part_sizes.as_slice().try_to_vec()?,
            cut_edges: self.cut_edges,
            margin_percent: self.margin_percent,
        })
    }

    /// Recomputes the edge cut from scratch and overwrites the maintained
    /// value if they disagree.
    ///
    /// Returns whether a correction was needed.
    pub fn resync_cut_edges(&mut self, graph: &Graph) -> bool {
        let actual = graph.edge_cut(&self.part_ids);
        if actual == self.cut_edges {
            return false;
        }
        tracing::warn!(
            maintained = self.cut_edges,
            actual,
            "correcting edge cut drift"
        );
        self.cut_edges = actual;
        true
    }

    /// Whether `vertex` may move to part `to` under `balance`.
    pub(crate) fn can_move(&self, balance: &Balance, vertex: usize, to: usize) -> bool {
        let from = self.part_ids[vertex];
        from != to && balance.allows_move(self.part_sizes[from], self.part_sizes[to])
    }

    /// Reassigns `vertex` to part `to`, updating part sizes but not the edge
    /// cut.  Returns the previous part of `vertex`.
    pub(crate) fn move_vertex(&mut self, vertex: usize, to: usize) -> usize {
        let from = self.part_ids[vertex];
        self.part_ids[vertex] = to;
        self.part_sizes[from] -= 1;
        self.part_sizes[to] += 1;
        from
    }

    /// Overwrites the assignment and part sizes with a snapshot taken from
    /// this partition.
    pub(crate) fn restore(&mut self, part_ids: &[usize], part_sizes: &[usize]) {
        self.part_ids.copy_from_slice(part_ids);
        self.part_sizes.copy_from_slice(part_sizes);
    }

    pub(crate) fn set_cut_edges(&mut self, cut_edges: usize) {
        self.cut_edges = cut_edges;
    }
}

impl fmt::Display for BalancedPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Partition into {} parts:", self.part_count())?;
        for (part, &size) in self.part_sizes.iter().enumerate() {
            write!(f, "Part {part} (size {size}):")?;
            for vertex in self.part_members(part).take(DISPLAYED_MEMBERS) {
                write!(f, " {vertex}")?;
            }
            if DISPLAYED_MEMBERS < size {
                write!(f, " ... ({} more)", size - DISPLAYED_MEMBERS)?;
            }
            writeln!(f)?;
        }
        write!(f, "Edge cut: {}", self.cut_edges)
    }
}
