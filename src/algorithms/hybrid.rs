//! Multi-start search combining every other algorithm of the crate.
//!
//! The search goes through three phases, each one seeded by the best
//! partition found so far:
//!
//! 1. [`Phase::Deterministic`] refines the modulo and block-sequential
//!    partitions,
//! 2. [`Phase::RandomMultiStart`] refines several random partitions,
//! 3. [`Phase::PerturbRestart`] perturbs the best partition and refines it
//!    again.
//!
//! A candidate replaces the best partition only if it has a strictly lower
//! edge cut.  Candidates that fail to build are skipped.

use std::fmt;

use super::build_modulo;
use super::build_random;
use super::build_sequential;
use super::check_len;
use super::check_params;
use super::perturb;
use super::refine;
use super::Error;
use crate::BalancedPartition;
use crate::Graph;
use rand::Rng;

/// Graphs with more vertices than this get at most [`LARGE_GRAPH_TRIALS`]
/// random starts.
const LARGE_GRAPH: usize = 10_000;
const LARGE_GRAPH_TRIALS: usize = 2;

/// Graphs with more vertices than this get an extra perturbation round.
const PERTURBATION_EXTRA_ROUND_THRESHOLD: usize = 1000;

/// The stages of [`find_best_partition`], in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Deterministic,
    RandomMultiStart,
    PerturbRestart,
    Done,
}

impl Phase {
    fn next(self) -> Phase {
        match self {
            Phase::Deterministic => Phase::RandomMultiStart,
            Phase::RandomMultiStart => Phase::PerturbRestart,
            Phase::PerturbRestart | Phase::Done => Phase::Done,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Deterministic => "deterministic",
            Phase::RandomMultiStart => "random multi-start",
            Phase::PerturbRestart => "perturb-restart",
            Phase::Done => "done",
        })
    }
}

/// Knobs of the hybrid search.
///
/// The defaults adapt the amount of work to the graph, see
/// [`find_best_partition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Number of random starts.  Computed from the graph density and the
    /// part count when `None`.
    pub random_trials: Option<usize>,

    /// Number of perturb-restart rounds.  Defaults to 2, or 3 on graphs with
    /// more than 1000 vertices.
    pub perturbation_rounds: Option<usize>,

    /// Fraction of vertices moved by the first perturbation.
    pub first_perturbation_fraction: f64,

    /// Fraction of vertices moved by subsequent perturbations.
    pub perturbation_fraction: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            random_trials: None,
            perturbation_rounds: None,
            first_perturbation_fraction: 0.15,
            perturbation_fraction: 0.1,
        }
    }
}

/// Diagnostic data for a [`Hybrid`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub cut_edges: usize,
    /// The phase that produced the returned partition.
    pub winner: Phase,
    /// Candidates that were built and refined.
    pub candidates: usize,
    /// Candidates that failed, and were skipped.
    pub skipped: usize,
}

/// Number of random starts when [`Settings::random_trials`] is unset.
///
/// Sparse graphs and high part counts get more starts, and so does a poor
/// deterministic result (a cut above half of the edges, or no result at all).
fn random_trial_count(graph: &Graph, part_count: usize, best_cut: Option<usize>) -> usize {
    let density = graph.density();
    let mut trials = if density < 0.01 {
        5
    } else if density < 0.1 {
        4
    } else {
        3
    };
    if 10 < part_count {
        trials += 2;
    } else if 5 < part_count {
        trials += 1;
    }
    if best_cut.map_or(true, |cut| graph.edge_count() / 2 < cut) {
        trials += 1;
    }
    if LARGE_GRAPH < graph.len() {
        trials = usize::min(trials, LARGE_GRAPH_TRIALS);
    }
    trials
}

fn perturbation_rounds(graph: &Graph) -> usize {
    if PERTURBATION_EXTRA_ROUND_THRESHOLD < graph.len() {
        3
    } else {
        2
    }
}

/// Refines a freshly built partition.
fn refined(
    graph: &Graph,
    partition: Result<BalancedPartition, Error>,
) -> Result<BalancedPartition, Error> {
    let mut partition = partition?;
    refine(graph, &mut partition)?;
    Ok(partition)
}

/// The best partition found so far.
struct Search<'a> {
    graph: &'a Graph,
    best: Option<BalancedPartition>,
    winner: Phase,
    candidates: usize,
    skipped: usize,
}

impl<'a> Search<'a> {
    fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            best: None,
            winner: Phase::Done,
            candidates: 0,
            skipped: 0,
        }
    }

    fn best_cut(&self) -> Option<usize> {
        self.best.as_ref().map(BalancedPartition::cut_edges)
    }

    /// Keeps `candidate` if it strictly improves the edge cut.
    fn offer(&mut self, phase: Phase, candidate: Result<BalancedPartition, Error>) {
        let candidate = match candidate {
            Ok(candidate) => candidate,
            Err(err) => {
                tracing::debug!(%err, "skipping candidate");
                self.skipped += 1;
                return;
            }
        };
        self.candidates += 1;
        let cut_edges = candidate.cut_edges();
        tracing::info!(cut_edges, "candidate");
        if self.best_cut().map_or(true, |best| cut_edges < best) {
            tracing::info!(cut_edges, previous = ?self.best_cut(), "new best partition");
            self.best = Some(candidate);
            self.winner = phase;
        }
    }

    fn run<R>(
        &mut self,
        part_count: usize,
        margin_percent: usize,
        settings: &Settings,
        rng: &mut R,
    )
    where
        R: Rng,
    {
        let graph = self.graph;
        let mut phase = Phase::Deterministic;
        while phase != Phase::Done {
            let span = tracing::info_span!("phase", %phase);
            let _enter = span.enter();

            match phase {
                Phase::Deterministic => {
                    let modulo = build_modulo(graph, part_count, margin_percent);
                    self.offer(phase, refined(graph, modulo));
                    let sequential = build_sequential(graph, part_count, margin_percent);
                    self.offer(phase, refined(graph, sequential));
                }
                Phase::RandomMultiStart => {
                    let trials = settings.random_trials.unwrap_or_else(|| {
                        random_trial_count(graph, part_count, self.best_cut())
                    });
                    tracing::info!(trials, "random starts");
                    for _ in 0..trials {
                        let random = build_random(graph, part_count, margin_percent, rng);
                        self.offer(phase, refined(graph, random));
                    }
                }
                Phase::PerturbRestart => {
                    let rounds = settings
                        .perturbation_rounds
                        .unwrap_or_else(|| perturbation_rounds(graph));
                    tracing::info!(rounds, "perturbation rounds");
                    for round in 0..rounds {
                        let fraction = if round == 0 {
                            settings.first_perturbation_fraction
                        } else {
                            settings.perturbation_fraction
                        };
                        let Some(best) = &self.best else {
                            break;
                        };
                        let perturbed = perturb(best, graph, fraction, rng);
                        self.offer(phase, refined(graph, perturbed));
                    }
                }
                Phase::Done => {}
            }

            tracing::info!(best_cut = ?self.best_cut(), "phase done");
            phase = phase.next();
        }
    }
}

fn search<R>(
    graph: &Graph,
    part_count: usize,
    margin_percent: usize,
    settings: &Settings,
    rng: &mut R,
) -> Result<(BalancedPartition, Metadata), Error>
where
    R: Rng,
{
    check_params(graph, part_count, margin_percent)?;
    let span = tracing::info_span!("hybrid", part_count, margin_percent);
    let _enter = span.enter();

    let mut search = Search::new(graph);
    search.run(part_count, margin_percent, settings, rng);

    let mut best = search.best.ok_or(Error::NotFound)?;
    best.resync_cut_edges(graph);
    let metadata = Metadata {
        cut_edges: best.cut_edges(),
        winner: search.winner,
        candidates: search.candidates,
        skipped: search.skipped,
    };
    tracing::info!(?metadata, "hybrid search done");
    Ok((best, metadata))
}

/// Searches for the partition with the lowest edge cut, combining every
/// constructor with refinement and perturbation.
///
/// 1. The modulo and block-sequential partitions are refined with
///    [`refine`].
/// 2. Several random partitions are refined.  The number of starts is 3,
///    raised to 4 when the graph density is below 0.1 and to 5 below 0.01,
///    plus 2 when `part_count > 10` (1 when `part_count > 5`), plus 1 if the
///    best cut so far is above half of the edge count.  Graphs with more than
///    10 000 vertices get at most 2 starts.
/// 3. The best partition is perturbed then refined, twice (three times on
///    graphs with more than 1000 vertices).  The first perturbation moves
///    15% of the vertices, the others 10%.
///
/// Candidates that fail are skipped.  The returned partition has the
/// lowest edge cut among all candidates, and the earliest one wins ties.
///
/// # Errors
///
/// Fails on invalid arguments, and with [`Error::NotFound`] if every
/// candidate failed.
pub fn find_best_partition<R>(
    graph: &Graph,
    part_count: usize,
    margin_percent: usize,
    rng: &mut R,
) -> Result<BalancedPartition, Error>
where
    R: Rng,
{
    search(graph, part_count, margin_percent, &Settings::default(), rng)
        .map(|(partition, _)| partition)
}

/// Hybrid partitioner, see [`find_best_partition`].
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), kwaycut::Error> {
/// use kwaycut::Partition as _;
/// use rand::SeedableRng as _;
///
/// // Two 4-cliques linked by a single edge.
/// let mut edges = vec![(3, 4)];
/// for a in 0..4 {
///     for b in a + 1..4 {
///         edges.push((a, b));
///         edges.push((a + 4, b + 4));
///     }
/// }
/// let graph = kwaycut::Graph::from_edges(8, edges)?;
/// let mut partition = [0; 8];
///
/// let metadata = kwaycut::Hybrid {
///     rng: rand::rngs::StdRng::seed_from_u64(1),
///     part_count: 2,
///     margin_percent: 10,
///     settings: kwaycut::HybridSettings::default(),
/// }
/// .partition(&mut partition, &graph)?;
///
/// assert_eq!(metadata.cut_edges, 1);
/// assert_eq!(partition, [0, 0, 0, 0, 1, 1, 1, 1]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Hybrid<R> {
    pub rng: R,
    pub part_count: usize,
    pub margin_percent: usize,
    pub settings: Settings,
}

impl<'a, R> crate::Partition<&'a Graph> for Hybrid<R>
where
    R: Rng,
{
    type Metadata = Metadata;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        graph: &'a Graph,
    ) -> Result<Self::Metadata, Self::Error> {
        check_len(part_ids, graph)?;
        let (partition, metadata) = search(
            graph,
            self.part_count,
            self.margin_percent,
            &self.settings,
            &mut self.rng,
        )?;
        part_ids.copy_from_slice(partition.part_ids());
        Ok(metadata)
    }
}
