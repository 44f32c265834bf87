/// Information on a partition constructor run.
///
/// Filled in by constructors when run through [`crate::Partition`].  Gives
/// information about the produced partition.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RunInfo {
    /// Edge cut of the produced partition.
    pub cut_edges: usize,

    /// Number of rebalancing rounds the constructor underwent, if it
    /// rebalances.
    pub algo_iterations: Option<usize>,
}

impl RunInfo {
    pub(crate) fn built(cut_edges: usize) -> RunInfo {
        RunInfo {
            cut_edges,
            algo_iterations: None,
        }
    }
}
