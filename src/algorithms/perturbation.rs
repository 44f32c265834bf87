use super::check_partition_len;
use super::Error;
use crate::topology::Topology as _;
use crate::BalancedPartition;
use crate::Graph;
use rand::Rng;

/// Number of attempts per requested move.
const ATTEMPTS_PER_MOVE: usize = 10;

/// Returns a copy of `source` where about `fraction` of the vertices moved to
/// a random other part.
///
/// The number of requested moves is `round(n * fraction)`, clamped to
/// `1..=n`.  Each attempt draws a random vertex and a random part other than
/// its own, and the move is applied only if the balance constraint allows
/// it.  The search gives up after ten attempts per requested move.  Gains are
/// ignored: the point is to leave a local optimum, not to improve the cut.
///
/// # Errors
///
/// Fails if the graph is empty, if `source` has less than two parts, if
/// `fraction` is not in `(0, 1]`, or if `source` was built for another graph.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), kwaycut::Error> {
/// use rand::SeedableRng as _;
///
/// let graph = kwaycut::Graph::from_edges(100, (1..100).map(|v| (v - 1, v)))?;
/// let source = kwaycut::build_sequential(&graph, 4, 10)?;
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
///
/// let perturbed = kwaycut::perturb(&source, &graph, 0.1, &mut rng)?;
///
/// let moved = (0..100)
///     .filter(|v| source.part_ids()[*v] != perturbed.part_ids()[*v])
///     .count();
/// assert!(moved <= 10);
/// assert_eq!(perturbed.cut_edges(), kwaycut::cut_edges(&graph, &perturbed));
/// # Ok(())
/// # }
/// ```
pub fn perturb<R>(
    source: &BalancedPartition,
    graph: &Graph,
    fraction: f64,
    rng: &mut R,
) -> Result<BalancedPartition, Error>
where
    R: Rng,
{
    if graph.is_empty() {
        return Err(Error::EmptyGraph);
    }
    let part_count = source.part_count();
    if part_count < 2 {
        return Err(Error::InvalidPartCount { part_count });
    }
    if !(0.0 < fraction && fraction <= 1.0) {
        return Err(Error::InvalidFraction);
    }
    check_partition_len(source, graph)?;

    let vertex_count = graph.len();
    let target = ((vertex_count as f64 * fraction).round() as usize).clamp(1, vertex_count);
    let max_attempts = ATTEMPTS_PER_MOVE * target;

    let mut perturbed = source.try_clone()?;
    let balance = perturbed.balance();
    let mut applied = 0;
    let mut attempts = 0;
    while applied < target && attempts < max_attempts {
        attempts += 1;
        let vertex = rng.gen_range(0..vertex_count);
        // Uniform among the parts `vertex` is not in.
        let mut to = rng.gen_range(0..part_count - 1);
        if perturbed.part_ids()[vertex] <= to {
            to += 1;
        }
        if perturbed.can_move(&balance, vertex, to) {
            perturbed.move_vertex(vertex, to);
            applied += 1;
        }
    }

    let cut_edges = graph.edge_cut(perturbed.part_ids());
    perturbed.set_cut_edges(cut_edges);
    tracing::debug!(
        fraction,
        target,
        applied,
        attempts,
        cut_edges,
        "perturbed partition"
    );
    Ok(perturbed)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;

    use super::*;
    use crate::tests;

    fn moved_count(a: &BalancedPartition, b: &BalancedPartition) -> usize {
        a.part_ids()
            .iter()
            .zip(b.part_ids())
            .filter(|(a, b)| a != b)
            .count()
    }

    #[test]
    fn displaces_the_partition() {
        let graph = tests::grid(10, 10);
        let source = crate::build_sequential(&graph, 4, 10).unwrap();
        let mut rng = rand_pcg::Pcg64::seed_from_u64(17);

        let perturbed = perturb(&source, &graph, 1.0, &mut rng).unwrap();

        assert_ne!(perturbed.part_ids(), source.part_ids());
        assert!(perturbed.is_balanced());
        tests::assert_consistent(&graph, &perturbed);
    }

    #[test]
    fn tiny_fraction_still_moves_one_vertex() {
        let graph = tests::path(10);
        let source = crate::build_modulo(&graph, 2, 50).unwrap();
        let mut rng = rand_pcg::Pcg64::seed_from_u64(2);

        let perturbed = perturb(&source, &graph, 1e-9, &mut rng).unwrap();

        // average = 5, margin = 2: the first attempt always succeeds.
        assert_eq!(moved_count(&source, &perturbed), 1);
        tests::assert_consistent(&graph, &perturbed);
    }

    #[test]
    fn invalid_arguments() {
        let graph = tests::path(6);
        let mut rng = rand_pcg::Pcg64::seed_from_u64(0);
        let single = crate::build_modulo(&graph, 1, 10).unwrap();
        assert_eq!(
            perturb(&single, &graph, 0.1, &mut rng),
            Err(Error::InvalidPartCount { part_count: 1 }),
        );
        let source = crate::build_modulo(&graph, 2, 10).unwrap();
        for fraction in [0.0, -0.5, 1.5, f64::NAN] {
            assert_eq!(
                perturb(&source, &graph, fraction, &mut rng),
                Err(Error::InvalidFraction),
            );
        }
        let other = tests::path(5);
        assert_eq!(
            perturb(&source, &other, 0.1, &mut rng),
            Err(Error::InputLenMismatch {
                expected: 5,
                actual: 6
            }),
        );
    }

    proptest!(
        #![proptest_config(ProptestConfig{timeout: 2000, ..ProptestConfig::default()})]

        /// Perturbation moves at most the requested number of vertices and
        /// keeps balanced partitions balanced.
        #[test]
        fn bounded_and_balanced(
            graph in tests::graph(60),
            part_count in 2..6usize,
            margin in 0..=100usize,
            fraction in 0.01..=1.0f64,
            seed in any::<u64>(),
        ) {
            let source = crate::build_modulo(&graph, part_count, margin).unwrap();
            let mut rng = rand_pcg::Pcg64::seed_from_u64(seed);
            let perturbed = perturb(&source, &graph, fraction, &mut rng).unwrap();

            let target = ((graph.len() as f64 * fraction).round() as usize).clamp(1, graph.len());
            prop_assert!(moved_count(&source, &perturbed) <= target);
            prop_assert!(perturbed.is_balanced());
            tests::assert_consistent(&graph, &perturbed);
        }
    );
}
