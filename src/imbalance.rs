//! Part-size arithmetic: the balance constraint enforced on moves, and
//! imbalance metrics over finished partitions.

use itertools::Itertools;

/// The balance constraint shared by every move of the engine.
///
/// With `average = n / k` (integer division) and
/// `margin = max(1, average * margin_percent / 100)`, a vertex may leave a part
/// only if that part is strictly larger than `average - margin`, and may join
/// a part only if that part is strictly smaller than `average + margin`.
///
/// # Example
///
/// ```rust
/// let balance = kwaycut::Balance::new(100, 4, 10);
/// assert_eq!(balance.average, 25);
/// assert_eq!(balance.margin, 2);
///
/// assert!(balance.allows_move(25, 25));
/// assert!(!balance.allows_move(23, 25)); // source would get too small
/// assert!(!balance.allows_move(25, 27)); // destination is full
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub average: usize,
    pub margin: usize,
}

impl Balance {
    pub fn new(vertex_count: usize, part_count: usize, margin_percent: usize) -> Self {
        let average = vertex_count.checked_div(part_count).unwrap_or(0);
        let margin = usize::max(1, average * margin_percent / 100);
        Self { average, margin }
    }

    /// Whether a vertex may move from a part of size `from_size` to a part of
    /// size `to_size`.
    pub fn allows_move(&self, from_size: usize, to_size: usize) -> bool {
        to_size < self.average + self.margin && self.average < from_size + self.margin
    }

    /// Whether a part of this size is strictly above `average + margin`.
    pub fn is_over(&self, size: usize) -> bool {
        self.average + self.margin < size
    }

    /// Whether a part of this size is strictly below `average - margin`.
    pub fn is_under(&self, size: usize) -> bool {
        size + self.margin < self.average
    }

    /// Whether a part of this size is within `[average - margin, average + margin]`.
    pub fn contains(&self, size: usize) -> bool {
        !self.is_over(size) && !self.is_under(size)
    }
}

/// The number of elements in each part.
pub fn compute_parts_load(partition: &[usize], num_parts: usize) -> Vec<usize> {
    debug_assert!(*partition.iter().max().unwrap_or(&0) < num_parts.max(1));
    partition
        .iter()
        .fold(vec![0; num_parts], |mut acc, &part| {
            acc[part] += 1;
            acc
        })
}

/// The difference between the largest and the smallest part.
pub fn max_imbalance(part_sizes: &[usize]) -> usize {
    part_sizes
        .iter()
        .minmax()
        .into_option()
        .map_or(0, |(min, max)| max - min)
}

/// The largest relative deviation of a part from the ideal part size.
///
/// Zero for an empty partition.
pub fn imbalance(part_sizes: &[usize]) -> f64 {
    let total: usize = part_sizes.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let ideal_part_size = total as f64 / part_sizes.len() as f64;
    part_sizes
        .iter()
        .map(|&size| (size as f64 - ideal_part_size) / ideal_part_size)
        .minmax_by(f64::total_cmp)
        .into_option()
        .map_or(0.0, |(_min, max)| max)
}
