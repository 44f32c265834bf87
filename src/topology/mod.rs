use rayon::iter::IntoParallelIterator as _;
use rayon::iter::ParallelIterator as _;
use std::collections::HashSet;

#[cfg(feature = "sprs")]
mod sprs;

/// Read-only access to an undirected, unweighted graph.
///
/// Implemented by [`crate::Graph`] and, with the `sprs` feature, by CSR
/// adjacency matrices.  Partition metrics are provided on top of
/// [`Topology::neighbors`].
pub trait Topology {
    /// Iterator returned by [`Topology::neighbors`].
    type Neighbors<'n>: Iterator<Item = usize>
    where
        Self: 'n;

    /// The number of vertices in the graph.
    fn len(&self) -> usize;

    /// Whether the topology has no vertices.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An iterator over the neighbors of the given vertex.
    fn neighbors(&self, vertex: usize) -> Self::Neighbors<'_>;

    /// The number of neighbors of `vertex` that `partition` assigns to `part`.
    fn neighbors_in(&self, vertex: usize, partition: &[usize], part: usize) -> usize {
        self.neighbors(vertex)
            .filter(|neighbor| partition[*neighbor] == part)
            .count()
    }

    /// The number of edges whose endpoints lie in different parts.
    ///
    /// Each undirected edge is counted once, from its lower endpoint.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), kwaycut::Error> {
    /// use kwaycut::Topology as _;
    ///
    /// // 0 - 1 - 2
    /// //  \     /
    /// //   - 3 -
    /// let graph = kwaycut::Graph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 0)])?;
    /// assert_eq!(graph.edge_cut(&[0, 0, 1, 1]), 2);
    /// assert_eq!(graph.edge_cut(&[0, 1, 0, 1]), 4);
    /// # Ok(())
    /// # }
    /// ```
    fn edge_cut(&self, partition: &[usize]) -> usize
    where
        Self: Sync,
    {
        (0..self.len())
            .into_par_iter()
            .map(|vertex| {
                let vertex_part = partition[vertex];
                self.neighbors(vertex)
                    .filter(|neighbor| vertex < *neighbor && vertex_part != partition[*neighbor])
                    .count()
            })
            .sum()
    }

    /// The λ-1 cut of a partition: for each vertex, the number of foreign
    /// parts among its neighbors, summed over all vertices.
    fn lambda_cut(&self, partition: &[usize]) -> usize
    where
        Self: Sync,
    {
        (0..self.len())
            .into_par_iter()
            .map_with(HashSet::new(), |neighbor_parts, vertex| {
                neighbor_parts.clear();
                neighbor_parts.insert(partition[vertex]);
                neighbor_parts.extend(self.neighbors(vertex).map(|v| partition[v]));
                neighbor_parts.len() - 1
            })
            .sum()
    }
}

impl<'a, T> Topology for &'a T
where
    T: Topology,
{
    type Neighbors<'n> = T::Neighbors<'n>
    where
        Self: 'n;

    fn len(&self) -> usize {
        T::len(self)
    }

    fn neighbors(&self, vertex: usize) -> Self::Neighbors<'_> {
        T::neighbors(self, vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Graph;

    // 0 - 1 - 2
    // |   |
    // 3 - 4
    fn house() -> Graph {
        Graph::from_edges(5, [(0, 1), (1, 2), (0, 3), (1, 4), (3, 4)]).unwrap()
    }

    #[test]
    fn edge_cut_counts_each_edge_once() {
        let graph = house();
        assert_eq!(graph.edge_cut(&[0, 0, 0, 0, 0]), 0);
        assert_eq!(graph.edge_cut(&[0, 0, 0, 1, 1]), 2);
        assert_eq!(graph.edge_cut(&[0, 1, 0, 1, 0]), 5);
    }

    #[test]
    fn lambda_cut() {
        let graph = house();
        assert_eq!(graph.lambda_cut(&[0, 0, 0, 0, 0]), 0);
        // 0, 1, 3, 4 each see one foreign part, 2 sees none.
        assert_eq!(graph.lambda_cut(&[0, 0, 0, 1, 1]), 4);
        // 1 sees parts 1 and 2.
        assert_eq!(graph.lambda_cut(&[0, 0, 2, 1, 1]), 6);
    }

    #[test]
    fn neighbors_in_part() {
        let graph = house();
        let partition = [0, 1, 0, 1, 0];
        assert_eq!(graph.neighbors_in(1, &partition, 0), 3);
        assert_eq!(graph.neighbors_in(1, &partition, 1), 0);
        assert_eq!((&graph).neighbors_in(0, &partition, 1), 2);
    }
}
