use super::check_len;
use super::check_params;
use super::Error;
use crate::vec::VecExt as _;
use crate::BalancedPartition;
use crate::Graph;
use crate::RunInfo;

/// Splits the vertex ids `0..n` into `part_count` contiguous ranges.
///
/// The first `n mod part_count` ranges hold one extra vertex.  Works well
/// when vertex ids follow the graph locality, e.g. meshes numbered along a
/// space-filling curve.
pub fn build_sequential(
    graph: &Graph,
    part_count: usize,
    margin_percent: usize,
) -> Result<BalancedPartition, Error> {
    check_params(graph, part_count, margin_percent)?;
    let per_part = graph.len() / part_count;
    let extra = graph.len() % part_count;

    let mut part_ids = Vec::try_with_capacity(graph.len())?;
    for part in 0..part_count {
        let size = per_part + usize::from(part < extra);
        part_ids.extend(std::iter::repeat(part).take(size));
    }
    debug_assert_eq!(part_ids.len(), graph.len());

    BalancedPartition::from_raw(graph, part_ids, part_count, margin_percent)
}

/// Block-sequential partitioner, see [`build_sequential`].
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), kwaycut::Error> {
/// use kwaycut::Partition as _;
///
/// let graph = kwaycut::Graph::from_edges(5, [(0, 1), (1, 2), (2, 3), (3, 4)])?;
/// let mut partition = [0; 5];
///
/// let info = kwaycut::Sequential { part_count: 2, margin_percent: 10 }
///     .partition(&mut partition, &graph)?;
///
/// assert_eq!(partition, [0, 0, 0, 1, 1]);
/// assert_eq!(info.cut_edges, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequential {
    pub part_count: usize,
    pub margin_percent: usize,
}

impl Default for Sequential {
    fn default() -> Self {
        Self {
            part_count: 2,
            margin_percent: 10,
        }
    }
}

impl<'a> crate::Partition<&'a Graph> for Sequential {
    type Metadata = RunInfo;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        graph: &'a Graph,
    ) -> Result<Self::Metadata, Self::Error> {
        check_len(part_ids, graph)?;
        let partition = build_sequential(graph, self.part_count, self.margin_percent)?;
        part_ids.copy_from_slice(partition.part_ids());
        Ok(RunInfo::built(partition.cut_edges()))
    }
}
