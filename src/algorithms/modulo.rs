use super::check_len;
use super::check_params;
use super::Error;
use crate::vec::VecExt as _;
use crate::BalancedPartition;
use crate::Graph;
use crate::RunInfo;

/// Assigns vertex `i` to part `i mod part_count`.
///
/// Part sizes differ by at most one, so the result always satisfies the
/// balance constraint.  The graph structure is ignored.
pub fn build_modulo(
    graph: &Graph,
    part_count: usize,
    margin_percent: usize,
) -> Result<BalancedPartition, Error> {
    check_params(graph, part_count, margin_percent)?;
    let mut part_ids = Vec::try_with_capacity(graph.len())?;
    part_ids.extend((0..graph.len()).map(|vertex| vertex % part_count));
    BalancedPartition::from_raw(graph, part_ids, part_count, margin_percent)
}

/// Modulo partitioner.
///
/// Deals vertices to parts in a round-robin fashion, see [`build_modulo`].
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
/// let info = kwaycut::Modulo { part_count: 2, margin_percent: 10 }
///     .partition(&mut partition, &graph)?;
///
/// assert_eq!(partition, [0, 1, 0, 1, 0]);
/// assert_eq!(info.cut_edges, 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modulo {
    pub part_count: usize,
    pub margin_percent: usize,
}

impl Default for Modulo {
    fn default() -> Self {
        Self {
            part_count: 2,
            margin_percent: 10,
        }
    }
}

impl<'a> crate::Partition<&'a Graph> for Modulo {
    type Metadata = RunInfo;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        graph: &'a Graph,
    ) -> Result<Self::Metadata, Self::Error> {
        check_len(part_ids, graph)?;
        let partition = build_modulo(graph, self.part_count, self.margin_percent)?;
        part_ids.copy_from_slice(partition.part_ids());
        Ok(RunInfo::built(partition.cut_edges()))
    }
}
