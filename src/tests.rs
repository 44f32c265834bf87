//! Graphs and proptest strategies shared by unit tests.

use proptest::prelude::*;

use crate::BalancedPartition;
use crate::Graph;

pub fn path(n: usize) -> Graph {
    Graph::from_edges(n, (1..n).map(|v| (v - 1, v))).unwrap()
}

pub fn cycle(n: usize) -> Graph {
    Graph::from_edges(n, (0..n).map(|v| (v, (v + 1) % n))).unwrap()
}

/// Vertex 0 linked to every other vertex.
pub fn star(n: usize) -> Graph {
    Graph::from_edges(n, (1..n).map(|v| (0, v))).unwrap()
}

/// A `width` by `height` grid, numbered row by row.
pub fn grid(width: usize, height: usize) -> Graph {
    let mut edges = Vec::new();
    for row in 0..height {
        for col in 0..width {
            let v = row * width + col;
            if col + 1 < width {
                edges.push((v, v + 1));
            }
            if row + 1 < height {
                edges.push((v, v + width));
            }
        }
    }
    Graph::from_edges(width * height, edges).unwrap()
}

/// Random graphs with up to `max_vertices` vertices and about two edges per
/// vertex.
pub fn graph(max_vertices: usize) -> impl Strategy<Value = Graph> {
    (2..max_vertices).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..4 * n).prop_map(move |edges| {
            let edges = edges.into_iter().filter(|(a, b)| a != b);
            Graph::from_edges(n, edges).unwrap()
        })
    })
}

/// A random graph with an arbitrary, possibly unbalanced, assignment into
/// 1 to 5 parts.
pub fn graph_and_partition(
    max_vertices: usize,
) -> impl Strategy<Value = (Graph, BalancedPartition)> {
    (graph(max_vertices), 1..6usize, 0..=100usize).prop_flat_map(|(graph, part_count, margin)| {
        prop::collection::vec(0..part_count, graph.len()).prop_map(move |part_ids| {
            let partition =
                BalancedPartition::from_part_ids(&graph, part_ids, part_count, margin).unwrap();
            (graph.clone(), partition)
        })
    })
}

/// Part sizes add up to the vertex count, match the assignment, and the
/// maintained cut matches the recomputed one.
pub fn assert_consistent(graph: &Graph, partition: &BalancedPartition) {
    assert_eq!(partition.vertex_count(), graph.len());
    assert_eq!(partition.part_sizes().iter().sum::<usize>(), graph.len());
    for (part, &size) in partition.part_sizes().iter().enumerate() {
        assert_eq!(size, partition.part_members(part).count(), "part {part}");
    }
    assert_eq!(partition.cut_edges(), crate::cut_edges(graph, partition));
}
