//! Single-vertex, k-way variant of the Kernighan-Lin algorithm.
//!
//! Each pass greedily moves the unmoved vertex with the highest gain to the
//! part that yields it, as long as the move keeps part sizes within the
//! balance constraint.  Only the prefix of the move sequence with the best
//! cumulative gain is kept, so a pass never increases the edge cut.

use super::check_len;
use super::check_partition_len;
use super::Error;
use crate::topology::Topology as _;
use crate::vec::SliceExt as _;
use crate::vec::VecExt as _;
use crate::BalancedPartition;
use crate::Graph;

/// Pass cap of [`refine`].
const MAX_PASSES: usize = 50;

/// Pass cap of [`refine`] for graphs with more than [`LARGE_GRAPH`] vertices.
const MAX_PASSES_LARGE: usize = 20;

const LARGE_GRAPH: usize = 5000;

fn default_max_passes(vertex_count: usize) -> usize {
    if LARGE_GRAPH < vertex_count {
        MAX_PASSES_LARGE
    } else {
        MAX_PASSES
    }
}

/// A tentative move, recorded to replay the best prefix of a pass.
#[derive(Debug, Clone, Copy)]
struct Move {
    vertex: usize,
    from: usize,
    to: usize,
    gain: i64,
}

/// By how much moving `vertex` to part `to` would reduce the edge cut.
///
/// This is the number of neighbors of `vertex` in `to` minus the number of
/// its neighbors in its current part.  A negative gain means the move would
/// increase the cut.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), kwaycut::Error> {
/// let graph = kwaycut::Graph::from_edges(3, [(0, 1), (1, 2)])?;
/// let partition = kwaycut::BalancedPartition::from_part_ids(&graph, vec![0, 1, 0], 2, 10)?;
///
/// assert_eq!(kwaycut::gain(&graph, &partition, 1, 0), 2);
/// assert_eq!(kwaycut::gain(&graph, &partition, 0, 1), 1);
/// # Ok(())
/// # }
/// ```
pub fn gain(graph: &Graph, partition: &BalancedPartition, vertex: usize, to: usize) -> i64 {
    let part_ids = partition.part_ids();
    let from = part_ids[vertex];
    let external = graph.neighbors_in(vertex, part_ids, to) as i64;
    let internal = graph.neighbors_in(vertex, part_ids, from) as i64;
    external - internal
}

/// Runs one pass of the algorithm on `partition`.
///
/// The pass repeatedly picks, among unmoved vertices and every other part,
/// the move with the strictly greatest positive gain that the balance
/// constraint allows.  Ties go to the lowest vertex id, then to the lowest
/// part id.  Once no such move remains, the partition is rewound and only
/// the prefix of moves with the highest cumulative gain is applied again.
///
/// Returns whether the edge cut decreased.  Working buffers are allocated
/// before the first move, so on error the partition is left untouched.
///
/// # Errors
///
/// Fails with [`Error::InputLenMismatch`] if `partition` does not have one
/// entry per vertex of `graph`.
pub fn kernighan_lin_pass(
    graph: &Graph,
    partition: &mut BalancedPartition,
) -> Result<bool, Error> {
    check_partition_len(partition, graph)?;
    let vertex_count = graph.len();
    let part_count = partition.part_count();
    if vertex_count == 0 || part_count <= 1 {
        return Ok(false);
    }

    let initial_ids = partition.part_ids().try_to_vec()?;
    let initial_sizes = partition.part_sizes().try_to_vec()?;
    let mut moved = Vec::try_filled(false, vertex_count)?;
    let mut moves = Vec::try_with_capacity(vertex_count)?;

    let balance = partition.balance();
    let mut cumulative_gain = 0;
    let mut best_gain = 0;
    let mut best_len = 0;

    for _ in 0..vertex_count {
        let mut best: Option<Move> = None;
        for vertex in (0..vertex_count).filter(|vertex| !moved[*vertex]) {
            for to in 0..part_count {
                if !partition.can_move(&balance, vertex, to) {
                    continue;
                }
                let gain = gain(graph, partition, vertex, to);
                if 0 < gain && best.map_or(true, |best| best.gain < gain) {
                    best = Some(Move {
                        vertex,
                        from: partition.part_ids()[vertex],
                        to,
                        gain,
                    });
                }
            }
        }
        let Some(best) = best else {
            break;
        };

        partition.move_vertex(best.vertex, best.to);
        moved[best.vertex] = true;
        // At most one move per vertex, within the capacity reserved above.
        moves.push(best);

        cumulative_gain += best.gain;
        if best_gain < cumulative_gain {
            best_gain = cumulative_gain;
            best_len = moves.len();
        }
    }

    partition.restore(&initial_ids, &initial_sizes);
    for m in &moves[..best_len] {
        debug_assert_eq!(partition.part_ids()[m.vertex], m.from);
        partition.move_vertex(m.vertex, m.to);
    }

    tracing::debug!(
        tentative_moves = moves.len(),
        kept_moves = best_len,
        best_gain,
        "kernighan-lin pass"
    );

    if best_gain <= 0 {
        return Ok(false);
    }
    let cut_edges = partition.cut_edges().saturating_sub(best_gain as usize);
    partition.set_cut_edges(cut_edges);
    Ok(true)
}

fn refine_with(
    graph: &Graph,
    partition: &mut BalancedPartition,
    max_passes: usize,
) -> Result<usize, Error> {
    check_partition_len(partition, graph)?;
    if graph.is_empty() || partition.part_count() <= 1 {
        return Ok(0);
    }

    let mut passes = 0;
    while passes < max_passes && kernighan_lin_pass(graph, partition)? {
        passes += 1;
    }
    partition.resync_cut_edges(graph);

    tracing::info!(passes, cut_edges = partition.cut_edges(), "refined partition");
    Ok(passes)
}

/// Runs [`kernighan_lin_pass`] until it stops improving the edge cut.
///
/// At most 50 passes are run, or 20 on graphs with more than 5000 vertices.
/// The maintained edge cut is then checked against a full recount.
///
/// Returns the number of passes that improved the cut.
///
/// # Errors
///
/// Same as [`kernighan_lin_pass`].
pub fn refine(graph: &Graph, partition: &mut BalancedPartition) -> Result<usize, Error> {
    refine_with(graph, partition, default_max_passes(graph.len()))
}

/// Diagnostic data for a [`KernighanLin`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// Passes that improved the edge cut.
    pub passes: usize,
    pub initial_cut: usize,
    pub final_cut: usize,
}

/// KernighanLin
///
/// Partition improving algorithm that moves single vertices between parts
/// to reduce the edge cut, see [`kernighan_lin_pass`].  The number of parts is
/// one plus the highest part id of the input.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), kwaycut::Error> {
/// use kwaycut::Partition as _;
///
/// // 0  0  1  1
/// // +--+--+--+
/// // |  |  |  |
/// // +--+--+--+
/// // 0  1  0  1
/// //    swap
/// let mut edges = Vec::new();
/// for col in 0..4 {
///     edges.push((col, col + 4));
///     if col < 3 {
///         edges.push((col, col + 1));
///         edges.push((col + 4, col + 5));
///     }
/// }
/// let graph = kwaycut::Graph::from_edges(8, edges)?;
/// let mut partition = [0, 0, 1, 1, 0, 1, 0, 1];
///
/// // Parts may hold between 3 and 5 vertices.
/// let metadata = kwaycut::KernighanLin { margin_percent: 25, ..Default::default() }
///     .partition(&mut partition, &graph)?;
///
/// assert_eq!(partition, [0, 0, 1, 1, 0, 0, 1, 1]);
/// assert_eq!(metadata.initial_cut, 6);
/// assert_eq!(metadata.final_cut, 2);
/// # Ok(())
/// # }
/// ```
///
/// # Reference
///
/// Kernighan, B. W., & Lin, S. (1970). An efficient heuristic procedure for
/// partitioning graphs. *The Bell System Technical Journal*, 49(2), 291-307.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernighanLin {
    pub margin_percent: usize,
    /// Defaults to 50, or 20 on graphs with more than 5000 vertices.
    pub max_passes: Option<usize>,
}

impl Default for KernighanLin {
    fn default() -> Self {
        Self {
            margin_percent: 10,
            max_passes: None,
        }
    }
}

impl<'a> crate::Partition<&'a Graph> for KernighanLin {
    type Metadata = Metadata;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        graph: &'a Graph,
    ) -> Result<Self::Metadata, Self::Error> {
        check_len(part_ids, graph)?;
        let part_count = 1 + part_ids.iter().max().copied().unwrap_or(0);
        let mut partition = BalancedPartition::from_part_ids(
            graph,
            part_ids.try_to_vec()?,
            part_count,
            self.margin_percent,
        )?;
        let initial_cut = partition.cut_edges();
        let max_passes = self
            .max_passes
            .unwrap_or_else(|| default_max_passes(graph.len()));
        let passes = refine_with(graph, &mut partition, max_passes)?;
        part_ids.copy_from_slice(partition.part_ids());
        Ok(Metadata {
            passes,
            initial_cut,
            final_cut: partition.cut_edges(),
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::tests;
    use crate::Partition as _;
    use crate::Topology as _;
    use rand::SeedableRng as _;

    #[test]
    fn cycle_reaches_optimal_bisection() {
        let graph = tests::cycle(4);
        let mut partition = crate::build_modulo(&graph, 2, 50).unwrap();
        assert_eq!(partition.part_ids(), &[0, 1, 0, 1]);
        assert_eq!(partition.cut_edges(), 4);

        assert_eq!(gain(&graph, &partition, 0, 1), 2);
        assert_eq!(refine(&graph, &mut partition).unwrap(), 1);

        assert_eq!(partition.part_ids(), &[1, 1, 0, 1]);
        assert_eq!(partition.part_sizes(), &[1, 3]);
        assert_eq!(partition.cut_edges(), 2);
        tests::assert_consistent(&graph, &partition);
    }

    #[test]
    fn edgeless_graph_needs_no_move() {
        let graph = Graph::from_edges(6, std::iter::empty()).unwrap();
        let mut rng = rand_pcg::Pcg64::seed_from_u64(5);
        for mut partition in [
            crate::build_modulo(&graph, 3, 10).unwrap(),
            crate::build_sequential(&graph, 3, 10).unwrap(),
            crate::build_random(&graph, 3, 10, &mut rng).unwrap(),
        ] {
            let before = partition.clone();
            assert_eq!(partition.cut_edges(), 0);
            assert_eq!(refine(&graph, &mut partition).unwrap(), 0);
            assert_eq!(partition, before);
        }
    }

    #[test]
    fn partition_of_another_graph_is_rejected() {
        let graph = tests::path(6);
        let mut partition = crate::build_modulo(&tests::path(3), 2, 50).unwrap();
        let before = partition.clone();
        let mismatch = Error::InputLenMismatch {
            expected: 6,
            actual: 3,
        };

        assert_eq!(kernighan_lin_pass(&graph, &mut partition), Err(mismatch));
        assert_eq!(refine(&graph, &mut partition), Err(mismatch));
        assert_eq!(partition, before);
    }

    #[test]
    fn star_center_keeps_a_bounded_part() {
        // average = 5, margin = 1
        let graph = tests::star(10);
        let mut partition = crate::build_modulo(&graph, 2, 10).unwrap();
        assert_eq!(partition.cut_edges(), 5);

        refine(&graph, &mut partition).unwrap();

        let center_part = partition.part_ids()[0];
        assert!(partition.part_sizes()[center_part] <= 6);
        let opposite_leaves = (1..10)
            .filter(|leaf| partition.part_ids()[*leaf] != center_part)
            .count();
        assert_eq!(partition.cut_edges(), opposite_leaves);
        assert_eq!(partition.cut_edges(), 4);
        assert!(partition.is_balanced());
    }

    #[test]
    fn moves_respect_the_balance_constraint() {
        // average = 2, margin = 1: vertex 0 may not leave part 0.
        let graph = tests::path(4);
        let mut partition =
            BalancedPartition::from_part_ids(&graph, vec![0, 1, 1, 1], 2, 0).unwrap();
        let before = partition.clone();
        assert!(0 < gain(&graph, &partition, 0, 1));
        assert!(!kernighan_lin_pass(&graph, &mut partition).unwrap());
        assert_eq!(partition, before);
    }

    #[test]
    fn single_part_is_left_alone() {
        let graph = tests::path(3);
        let mut partition = crate::build_modulo(&graph, 1, 10).unwrap();
        assert!(!kernighan_lin_pass(&graph, &mut partition).unwrap());
        assert_eq!(refine(&graph, &mut partition).unwrap(), 0);
        assert_eq!(partition.part_ids(), &[0, 0, 0]);
    }

    #[test]
    fn pass_cap() {
        let graph = tests::grid(8, 8);
        let mut part_ids = vec![0; 64];
        for (vertex, part) in part_ids.iter_mut().enumerate() {
            *part = vertex % 3;
        }
        let metadata = KernighanLin {
            margin_percent: 20,
            max_passes: Some(1),
        }
        .partition(&mut part_ids, &graph)
        .unwrap();
        assert_eq!(metadata.passes, 1);
        assert!(metadata.final_cut < metadata.initial_cut);
        assert_eq!(metadata.final_cut, graph.edge_cut(&part_ids));
    }

    proptest!(
        #![proptest_config(ProptestConfig{timeout: 2000, ..ProptestConfig::default()})]

        /// Refinement never increases the cut, nor breaks part bookkeeping.
        #[test]
        fn refine_never_worsens((graph, mut partition) in tests::graph_and_partition(40)) {
            let initial_cut = partition.cut_edges();
            refine(&graph, &mut partition).unwrap();
            prop_assert!(partition.cut_edges() <= initial_cut);
            tests::assert_consistent(&graph, &partition);
        }

        /// A pass that does not improve the cut does not touch the partition.
        #[test]
        fn converged_pass_is_a_no_op((graph, mut partition) in tests::graph_and_partition(40)) {
            while kernighan_lin_pass(&graph, &mut partition).unwrap() {}
            let converged = partition.clone();
            prop_assert!(!kernighan_lin_pass(&graph, &mut partition).unwrap());
            prop_assert_eq!(&partition, &converged);
        }

        /// Balanced partitions stay balanced.
        #[test]
        fn balance_is_preserved(
            graph in tests::graph(40),
            part_count in 2..6usize,
            margin in 0..=100usize,
        ) {
            let mut partition = crate::build_modulo(&graph, part_count, margin).unwrap();
            prop_assert!(partition.is_balanced());
            refine(&graph, &mut partition).unwrap();
            prop_assert!(partition.is_balanced());
        }
    );
}
