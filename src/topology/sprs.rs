use super::Topology;
use rayon::iter::IndexedParallelIterator as _;
use rayon::iter::IntoParallelRefIterator as _;
use rayon::iter::ParallelIterator as _;
use std::iter::Cloned;

/// Adjacency matrices in CSR format.  Stored values are ignored, every
/// non-zero entry is an edge.
impl<'a, E> Topology for sprs::CsMatView<'a, E>
where
    E: Sync,
{
    type Neighbors<'n> = Cloned<std::slice::Iter<'n, usize>>
    where
        Self: 'n;

    fn len(&self) -> usize {
        debug_assert_eq!(self.rows(), self.cols());
        self.rows()
    }

    /// # Panics
    ///
    /// Panics if `vertex` is not a row of the matrix, like
    /// [`Graph::neighbors`](crate::Graph::neighbors).
    fn neighbors(&self, vertex: usize) -> Self::Neighbors<'_> {
        // Iterate the raw index slice, which borrows from `self` rather than
        // from the temporary row view.
        let (indices, _data) = self
            .outer_view(vertex)
            .expect("vertex out of range of the adjacency matrix")
            .into_raw_storage();
        indices.iter().cloned()
    }

    fn edge_cut(&self, partition: &[usize]) -> usize {
        let indptr = self.indptr().into_raw_storage();
        let indices = self.indices();
        indptr
            .par_iter()
            .zip(&indptr[1..])
            .enumerate()
            .map(|(vertex, (start, end))| {
                let vertex_part = partition[vertex];
                indices[*start..*end]
                    .iter()
                    .filter(|neighbor| vertex < **neighbor && vertex_part != partition[**neighbor])
                    .count()
            })
            .sum()
    }
}
