use super::check_len;
use super::check_partition_len;
use super::check_params;
use super::Error;
use crate::topology::Topology as _;
use crate::vec::VecExt as _;
use crate::BalancedPartition;
use crate::Graph;
use crate::RunInfo;
use rand::Rng;

fn random_partition<R>(
    graph: &Graph,
    part_count: usize,
    margin_percent: usize,
    rng: &mut R,
) -> Result<(BalancedPartition, usize), Error>
where
    R: Rng,
{
    check_params(graph, part_count, margin_percent)?;
    let mut part_ids = Vec::try_with_capacity(graph.len())?;
    part_ids.extend((0..graph.len()).map(|_| rng.gen_range(0..part_count)));
    let mut partition = BalancedPartition::from_raw(graph, part_ids, part_count, margin_percent)?;
    let rounds = rebalance(graph, &mut partition, rng)?;
    Ok((partition, rounds))
}

/// Assigns each vertex to a uniformly random part, then runs [`rebalance`].
pub fn build_random<R>(
    graph: &Graph,
    part_count: usize,
    margin_percent: usize,
    rng: &mut R,
) -> Result<BalancedPartition, Error>
where
    R: Rng,
{
    random_partition(graph, part_count, margin_percent, rng).map(|(partition, _)| partition)
}

/// Moves random vertices from oversized parts to undersized ones.
///
/// Each round classifies parts as *over* (larger than `average + margin`) or
/// *under* (smaller than `average - margin`), pairs the two lists in order,
/// and moves one random member of each over part to its paired under part.
/// Rounds stop when either list is empty, or after `n / 2` rounds.  The edge
/// cut is not taken into account, and is recomputed at the end.
///
/// Returns the number of rounds that moved vertices, or
/// [`Error::InputLenMismatch`] if `partition` was built for another graph.
pub fn rebalance<R>(
    graph: &Graph,
    partition: &mut BalancedPartition,
    rng: &mut R,
) -> Result<usize, Error>
where
    R: Rng,
{
    check_partition_len(partition, graph)?;
    if graph.is_empty() || partition.part_count() <= 1 {
        return Ok(0);
    }

    let balance = partition.balance();
    let max_rounds = graph.len() / 2;
    let mut over = Vec::try_with_capacity(partition.part_count())?;
    let mut under = Vec::try_with_capacity(partition.part_count())?;

    let mut rounds = 0;
    while rounds < max_rounds {
        over.clear();
        under.clear();
        for (part, &size) in partition.part_sizes().iter().enumerate() {
            if balance.is_over(size) {
                over.push(part);
            } else if balance.is_under(size) {
                under.push(part);
            }
        }
        if over.is_empty() || under.is_empty() {
            break;
        }
        for (&source, &target) in over.iter().zip(&under) {
            let nth = rng.gen_range(0..partition.part_sizes()[source]);
            let vertex = partition.part_members(source).nth(nth);
            if let Some(vertex) = vertex {
                partition.move_vertex(vertex, target);
            }
        }
        rounds += 1;
    }

    tracing::debug!(rounds, sizes = ?partition.part_sizes(), "rebalanced random partition");
    partition.set_cut_edges(graph.edge_cut(partition.part_ids()));
    Ok(rounds)
}

/// Random partitioner with size correction.
///
/// Maps vertices to parts randomly, then moves random vertices from parts
/// that are too large to parts that are too small, see [`rebalance`].
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), kwaycut::Error> {
/// use kwaycut::Partition as _;
/// use rand::SeedableRng as _;
///
/// let graph = kwaycut::Graph::from_edges(12, (1..12).map(|v| (v - 1, v)))?;
/// let mut partition = [0; 12];
///
/// kwaycut::RandomRebalance {
///     rng: rand::rngs::StdRng::seed_from_u64(7),
///     part_count: 3,
///     margin_percent: 25,
/// }
/// .partition(&mut partition, &graph)?;
///
/// assert!(partition.iter().all(|part| *part < 3));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RandomRebalance<R> {
    pub rng: R,
    pub part_count: usize,
    pub margin_percent: usize,
}

impl<'a, R> crate::Partition<&'a Graph> for RandomRebalance<R>
where
    R: Rng,
{
    type Metadata = RunInfo;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        graph: &'a Graph,
    ) -> Result<Self::Metadata, Self::Error> {
        check_len(part_ids, graph)?;
        let (partition, rounds) =
            random_partition(graph, self.part_count, self.margin_percent, &mut self.rng)?;
        part_ids.copy_from_slice(partition.part_ids());
        Ok(RunInfo {
            cut_edges: partition.cut_edges(),
            algo_iterations: Some(rounds),
        })
    }
}
