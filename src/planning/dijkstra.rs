//! Dijkstra's shortest path over an adjacency list with dynamic edge costs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// State for Dijkstra's algorithm priority queue.
#[derive(Clone, Copy, Debug)]
pub struct DijkstraState {
    /// Current path cost.
    pub cost: f64,
    /// Current node index.
    pub node: usize,
}

impl PartialEq for DijkstraState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DijkstraState {}

impl Ord for DijkstraState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; lower node index wins ties
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for DijkstraState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a Dijkstra search.
#[derive(Clone, Debug, PartialEq)]
pub struct DijkstraResult {
    /// Sequence of node indices from start to goal.
    pub path: Vec<usize>,
    /// Total path cost.
    pub cost: f64,
}

/// Find the cheapest path from `start` to `goal`.
///
/// # Arguments
/// * `edges` - Adjacency list: edges[i] = [(neighbor_idx, base_cost), ...]
/// * `start` - Start node index
/// * `goal` - Goal node index
/// * `edge_cost` - Maps `(from, to, base_cost)` to the cost actually paid
///
/// # Returns
/// DijkstraResult with path and cost, or None if no path exists.
pub fn dijkstra<F>(
    edges: &[Vec<(usize, f64)>],
    start: usize,
    goal: usize,
    edge_cost: F,
) -> Option<DijkstraResult>
where
    F: Fn(usize, usize, f64) -> f64,
{
    let n = edges.len();

    if n == 0 || start >= n || goal >= n {
        return None;
    }

    if start == goal {
        return Some(DijkstraResult {
            path: vec![start],
            cost: 0.0,
        });
    }

    let mut dist: Vec<f64> = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    dist[start] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(DijkstraState {
        cost: 0.0,
        node: start,
    });

    while let Some(DijkstraState { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }

        if node == goal {
            break;
        }

        for &(neighbor, base) in &edges[node] {
            let step = edge_cost(node, neighbor, base);
            if !(step.is_finite() && step >= 0.0) {
                continue;
            }
            let new_dist = cost + step;
            if new_dist < dist[neighbor] {
                dist[neighbor] = new_dist;
                prev[neighbor] = Some(node);
                heap.push(DijkstraState {
                    cost: new_dist,
                    node: neighbor,
                });
            }
        }
    }

    prev[goal]?;

    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = prev[current]?;
        path.push(current);
    }
    path.reverse();

    Some(DijkstraResult {
        path,
        cost: dist[goal],
    })
}
