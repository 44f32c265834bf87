//! Compressed sparse row storage for undirected graphs.

use crate::topology::Topology;
use crate::vec::SliceExt as _;
use crate::vec::VecExt as _;
use crate::Error;
use rayon::iter::IndexedParallelIterator as _;
use rayon::iter::IntoParallelRefIterator as _;
use rayon::iter::ParallelIterator as _;
use std::iter::Copied;
use std::slice;

/// An undirected, unweighted graph in CSR format.
///
/// The neighbors of vertex `v` are `adjacency[row_ptr[v]..row_ptr[v + 1]]`.
/// Every undirected edge is stored twice, once from each endpoint.
///
/// A `Graph` is never mutated once built, so it can be shared by any number
/// of partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    row_ptr: Vec<usize>,
    adjacency: Vec<usize>,
}

impl Graph {
    /// Builds a graph from raw CSR arrays.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedRowPointers`] if `row_ptr` is empty, does not start
    ///   at zero, decreases, or does not end at `adjacency.len()`,
    /// - [`Error::NeighborOutOfRange`] if a neighbor id is not a vertex,
    /// - [`Error::SelfLoop`] if a vertex is listed among its own neighbors,
    /// - [`Error::OddAdjacencyLength`] if `adjacency` cannot hold every edge
    ///   twice,
    /// - [`Error::AsymmetricAdjacency`] if an edge is not stored from both of
    ///   its endpoints.
    pub fn from_csr(row_ptr: Vec<usize>, adjacency: Vec<usize>) -> Result<Self, Error> {
        let (first, last) = match (row_ptr.first(), row_ptr.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(Error::MalformedRowPointers),
        };
        if first != 0
            || last != adjacency.len()
            || row_ptr.windows(2).any(|w| w[1] < w[0])
        {
            return Err(Error::MalformedRowPointers);
        }
        let vertex_count = row_ptr.len() - 1;
        for (vertex, w) in row_ptr.windows(2).enumerate() {
            for &neighbor in &adjacency[w[0]..w[1]] {
                if vertex_count <= neighbor {
                    return Err(Error::NeighborOutOfRange { vertex, neighbor });
                }
                if neighbor == vertex {
                    return Err(Error::SelfLoop { vertex });
                }
            }
        }
        if adjacency.len() % 2 != 0 {
            return Err(Error::OddAdjacencyLength {
                len: adjacency.len(),
            });
        }
        check_symmetry(&row_ptr, &adjacency)?;
        Ok(Self { row_ptr, adjacency })
    }

    /// Builds a graph from a list of undirected edges.
    ///
    /// Each edge may be given in either direction, and duplicates are merged.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), kwaycut::Error> {
    /// // 0 - 1 - 2
    /// let graph = kwaycut::Graph::from_edges(3, [(0, 1), (2, 1), (1, 0)])?;
    /// assert_eq!(graph.edge_count(), 2);
    /// assert_eq!(graph.neighbors(1), &[0, 2]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_edges<I>(vertex_count: usize, edges: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut lists = vec![Vec::new(); vertex_count];
        for (a, b) in edges {
            if vertex_count <= a {
                return Err(Error::NeighborOutOfRange {
                    vertex: b,
                    neighbor: a,
                });
            }
            if vertex_count <= b {
                return Err(Error::NeighborOutOfRange {
                    vertex: a,
                    neighbor: b,
                });
            }
            if a == b {
                return Err(Error::SelfLoop { vertex: a });
            }
            lists[a].push(b);
            lists[b].push(a);
        }
        Self::from_lists(lists)
    }

    /// Copies any other graph representation, such as a `sprs` adjacency
    /// matrix, into a `Graph`.
    ///
    /// Neighbor lists are sorted and deduplicated.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::from_csr`], in particular the source must be
    /// symmetric.
    pub fn from_topology<T: Topology>(topology: T) -> Result<Self, Error> {
        let vertex_count = topology.len();
        let lists = (0..vertex_count)
            .map(|vertex| topology.neighbors(vertex).collect::<Vec<_>>())
            .collect();
        Self::from_lists(lists)
    }

    fn from_lists(mut lists: Vec<Vec<usize>>) -> Result<Self, Error> {
        let mut row_ptr = Vec::with_capacity(lists.len() + 1);
        row_ptr.push(0);
        let mut adjacency = Vec::new();
        for list in &mut lists {
            list.sort_unstable();
            list.dedup();
            adjacency.extend_from_slice(list);
            row_ptr.push(adjacency.len());
        }
        Self::from_csr(row_ptr, adjacency)
    }

    /// The number of vertices.
    pub fn len(&self) -> usize {
        self.row_ptr.len() - 1
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of undirected edges, each counted once.
    pub fn edge_count(&self) -> usize {
        self.adjacency.len() / 2
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn adjacency(&self) -> &[usize] {
        &self.adjacency
    }

    /// The neighbors of `vertex`.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is out of bounds.
    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        &self.adjacency[self.row_ptr[vertex]..self.row_ptr[vertex + 1]]
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.row_ptr[vertex + 1] - self.row_ptr[vertex]
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        a < self.len() && self.neighbors(a).contains(&b)
    }

    /// The ratio between the edge count and the edge count of the complete
    /// graph with the same vertices.  Zero for graphs with less than two
    /// vertices.
    pub fn density(&self) -> f64 {
        let n = self.len();
        if n <= 1 {
            return 0.0;
        }
        let max_edges = n as f64 * (n - 1) as f64 / 2.0;
        self.edge_count() as f64 / max_edges
    }
}

/// Compares every row of a validated CSR graph with the matching row of its
/// transpose.
fn check_symmetry(row_ptr: &[usize], adjacency: &[usize]) -> Result<(), Error> {
    let vertex_count = row_ptr.len() - 1;

    let mut transposed_ptr = Vec::try_filled(0, vertex_count + 1)?;
    for &neighbor in adjacency {
        transposed_ptr[neighbor + 1] += 1;
    }
    for vertex in 0..vertex_count {
        transposed_ptr[vertex + 1] += transposed_ptr[vertex];
    }
    let mut next = transposed_ptr.try_to_vec()?;
    let mut transposed = Vec::try_filled(0, adjacency.len())?;
    for (vertex, w) in row_ptr.windows(2).enumerate() {
        for &neighbor in &adjacency[w[0]..w[1]] {
            transposed[next[neighbor]] = vertex;
            next[neighbor] += 1;
        }
    }

    // Rows of the transpose are filled in increasing order, only the rows of
    // the input need sorting.
    let mut row = Vec::new();
    for (vertex, w) in row_ptr.windows(2).enumerate() {
        row.clear();
        row.extend_from_slice(&adjacency[w[0]..w[1]]);
        row.sort_unstable();
        let incoming = &transposed[transposed_ptr[vertex]..transposed_ptr[vertex + 1]];
        if let Some((vertex, neighbor)) = first_unmatched(vertex, &row, incoming) {
            return Err(Error::AsymmetricAdjacency { vertex, neighbor });
        }
    }
    Ok(())
}

/// Merges the sorted outgoing and incoming neighbors of `vertex`, and returns
/// the first `(vertex, neighbor)` pair stored only from `vertex`.
fn first_unmatched(
    vertex: usize,
    outgoing: &[usize],
    incoming: &[usize],
) -> Option<(usize, usize)> {
    let mut i = 0;
    let mut j = 0;
    loop {
        match (outgoing.get(i), incoming.get(j)) {
            (None, None) => return None,
            (Some(a), Some(b)) if a == b => {
                i += 1;
                j += 1;
            }
            (Some(a), Some(b)) if a < b => return Some((vertex, *a)),
            (Some(a), None) => return Some((vertex, *a)),
            (_, Some(b)) => return Some((*b, vertex)),
        }
    }
}

impl Topology for Graph {
    type Neighbors<'n> = Copied<slice::Iter<'n, usize>>
    where
        Self: 'n;

    fn len(&self) -> usize {
        Graph::len(self)
    }

    fn neighbors(&self, vertex: usize) -> Self::Neighbors<'_> {
        Graph::neighbors(self, vertex).iter().copied()
    }

    fn edge_cut(&self, partition: &[usize]) -> usize {
        debug_assert_eq!(self.len(), partition.len());
        self.row_ptr
            .par_iter()
            .zip(&self.row_ptr[1..])
            .enumerate()
            .map(|(vertex, (start, end))| {
                let vertex_part = partition[vertex];
                self.adjacency[*start..*end]
                    .iter()
                    .filter(|neighbor| vertex < **neighbor && vertex_part != partition[**neighbor])
                    .count()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csr_validation() {
        assert!(matches!(
            Graph::from_csr(vec![], vec![]),
            Err(Error::MalformedRowPointers),
        ));
        assert!(matches!(
            Graph::from_csr(vec![0, 2, 1], vec![1, 0]),
            Err(Error::MalformedRowPointers),
        ));
        assert!(matches!(
            Graph::from_csr(vec![0, 1, 3], vec![1, 0]),
            Err(Error::MalformedRowPointers),
        ));
        assert!(matches!(
            Graph::from_csr(vec![0, 1, 2], vec![1, 2]),
            Err(Error::NeighborOutOfRange {
                vertex: 1,
                neighbor: 2
            }),
        ));
        assert!(matches!(
            Graph::from_csr(vec![0, 1, 1], vec![0]),
            Err(Error::SelfLoop { vertex: 0 }),
        ));
        assert!(matches!(
            Graph::from_csr(vec![0, 1, 1], vec![1]),
            Err(Error::OddAdjacencyLength { len: 1 }),
        ));
    }

    #[test]
    fn csr_must_be_symmetric() {
        // Vertex 2 lists 0 three times and 3 once, nobody lists 2.
        assert!(matches!(
            Graph::from_csr(vec![0, 0, 0, 4, 4], vec![0, 0, 0, 3]),
            Err(Error::AsymmetricAdjacency {
                vertex: 2,
                neighbor: 0
            }),
        ));
        // Vertex 1 lists 0 and 2, which list nothing.
        assert!(matches!(
            Graph::from_csr(vec![0, 0, 2, 2], vec![0, 2]),
            Err(Error::AsymmetricAdjacency {
                vertex: 1,
                neighbor: 0
            }),
        ));
        // 0 lists 1 three times, 1 lists 0 once.
        assert!(matches!(
            Graph::from_csr(vec![0, 3, 4], vec![1, 1, 1, 0]),
            Err(Error::AsymmetricAdjacency {
                vertex: 0,
                neighbor: 1
            }),
        ));
        // Unsorted rows are fine as long as every edge is stored both ways.
        let graph = Graph::from_csr(vec![0, 2, 3, 4], vec![2, 1, 0, 0]).unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.neighbors(0), &[2, 1]);
    }

    #[test]
    fn empty_graph() {
        let graph = Graph::from_csr(vec![0], vec![]).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.density(), 0.0);
    }

    #[test]
    fn queries() {
        // triangle 0-1-2 plus pendant 3 on 2
        let graph = Graph::from_edges(4, [(0, 1), (1, 2), (2, 0), (3, 2)]).unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.row_ptr(), &[0, 2, 4, 7, 8]);
        assert_eq!(graph.neighbors(2), &[0, 1, 3]);
        assert_eq!(graph.degree(3), 1);
        assert!(graph.has_edge(3, 2));
        assert!(!graph.has_edge(0, 3));
        assert!(!graph.has_edge(9, 0));
        assert!((graph.density() - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn from_edges_rejects_bad_edges() {
        assert!(matches!(
            Graph::from_edges(2, [(0, 2)]),
            Err(Error::NeighborOutOfRange {
                vertex: 0,
                neighbor: 2
            }),
        ));
        assert!(matches!(
            Graph::from_edges(2, [(1, 1)]),
            Err(Error::SelfLoop { vertex: 1 }),
        ));
    }

    #[test]
    fn copy_from_topology() {
        let graph = Graph::from_edges(3, [(0, 1), (1, 2)]).unwrap();
        let copy = Graph::from_topology(&graph).unwrap();
        assert_eq!(graph, copy);
    }
}
