// https://github.com/graphext/louvain-rs/tree/master
// Copyright 2018 Juan Morales (crispamares@gmail.com)
// Repository: https://github.com/graphext/louvain-rs/tree/master
// Licensed under the MIT License.
use crate::network::Network;
use crate::FloatOps;
use anyhow::{anyhow, bail};
use ball_tree::{BallTree, Point};
use log::debug;
use ndarray::ArrayView2;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Smallest weight given to an edge between cells that share at least one neighbour.
const MIN_SNN_WEIGHT: f64 = 1e-6;

#[derive(Clone, PartialEq)]
struct Cell(Vec<f64>);

impl Point for Cell {
    fn distance(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (b - a).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    fn move_towards(&self, other: &Self, d: f64) -> Self {
        let total = self.distance(other);
        let frac = if total == 0.0 { 0.0 } else { d / total };

        Cell(self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(&s, &o)| s + frac * (o - s))
            .collect())
    }
}

fn to_cells<T: FloatOps>(data: ArrayView2<T>) -> anyhow::Result<Vec<Cell>> {
    data.rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .map(|&x| match x.to_f64() {
                    Some(v) if v.is_finite() => Ok(v),
                    _ => Err(anyhow!("Cell {} has a non-finite coordinate", i)),
                })
                .collect::<anyhow::Result<Vec<f64>>>()
                .map(Cell)
        })
        .collect()
}

/// Exact k nearest neighbours of every row by Euclidean distance, closest first.
///
/// A cell is never its own neighbour. Ties are broken by row index so the result is fully
/// deterministic. `k` is capped at `n_cells - 1`.
pub fn find_knn<T: FloatOps>(data: ArrayView2<T>, k: usize) -> anyhow::Result<Vec<Vec<usize>>> {
    let n_cells = data.nrows();
    if n_cells < 2 {
        bail!("At least two cells are needed to find neighbours, got {}", n_cells);
    }
    if k == 0 {
        bail!("The number of neighbours has to be at least 1");
    }
    let k = k.min(n_cells - 1);

    let cells = to_cells(data)?;
    debug!("constructing ball tree of {} cells in {} dimensions", n_cells, data.ncols());
    let ball_tree = BallTree::new(cells.clone(), (0..n_cells).collect());

    let by_distance = |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n_cells];
    neighbors.par_iter_mut().enumerate().for_each_init(
        || ball_tree.query(),
        |query, (cell, out)| {
            // Results arrive closest first; keep reading past the k-th cell while the distance
            // still ties with it, so the index tie-break sees every candidate.
            let mut found: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
            for (_, distance, &other) in query.nn(&cells[cell]) {
                if other == cell {
                    continue;
                }
                if found.len() >= k && distance > found[k - 1].0 {
                    break;
                }
                found.push((distance, other));
            }
            found.sort_unstable_by(by_distance);
            found.truncate(k);
            *out = found.into_iter().map(|(_, j)| j).collect();
        },
    );

    Ok(neighbors)
}

/// Shared nearest neighbour graph over the rows of `data`.
///
/// Every cell is ranked together with its `k` nearest neighbours (itself at rank 0). Two cells
/// are connected if they share any ranked cell, with weight `k - r / 2` where `r` is the smallest
/// sum of the two ranks over all shared cells, floored at a small positive value.
pub fn build_snn_network<T: FloatOps>(data: ArrayView2<T>, k: usize) -> anyhow::Result<Network> {
    let neighbors = find_knn(data, k)?;
    let n_cells = neighbors.len();
    let k = neighbors.first().map_or(0, |n| n.len());

    // For every cell, the cells whose ranked list contains it and at which rank.
    let mut hosts: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n_cells];
    for (i, list) in neighbors.iter().enumerate() {
        hosts[i].push((i, 0));
        for (rank, &neighbor) in list.iter().enumerate() {
            hosts[neighbor].push((i, rank + 1));
        }
    }

    let edges: Vec<Vec<(usize, usize, f64)>> = (0..n_cells)
        .into_par_iter()
        .map(|i| {
            let mut best: BTreeMap<usize, usize> = BTreeMap::new();
            let ranked = std::iter::once(i).chain(neighbors[i].iter().copied());
            for (rank_i, shared) in ranked.enumerate() {
                for &(j, rank_j) in &hosts[shared] {
                    if j <= i {
                        continue;
                    }
                    best.entry(j)
                        .and_modify(|r| *r = (*r).min(rank_i + rank_j))
                        .or_insert(rank_i + rank_j);
                }
            }
            best.into_iter()
                .map(|(j, r)| (i, j, (k as f64 - 0.5 * r as f64).max(MIN_SNN_WEIGHT)))
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(Network::from_edges(n_cells, edges.into_iter().flatten()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_find_knn_orders_by_distance() {
        let data = array![[0.0, 0.0], [1.0, 0.0], [3.0, 0.0], [10.0, 0.0]];
        let neighbors = find_knn(data.view(), 2).unwrap();

        assert_eq!(neighbors[0], vec![1, 2]);
        assert_eq!(neighbors[1], vec![0, 2]);
        assert_eq!(neighbors[3], vec![2, 1]);
    }

    #[test]
    fn test_find_knn_ties_and_cap() {
        let data = array![[0.0], [1.0], [-1.0]];
        let neighbors = find_knn(data.view(), 5).unwrap();

        assert_eq!(neighbors[0], vec![1, 2]);
        assert_eq!(neighbors[1], vec![0, 2]);
    }

    #[test]
    fn test_find_knn_errors() {
        let single = array![[1.0, 2.0]];
        assert!(find_knn(single.view(), 1).is_err());

        let data = array![[1.0], [2.0]];
        assert!(find_knn(data.view(), 0).is_err());
    }

    #[test]
    fn test_find_knn_matches_exhaustive_search() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let data: ndarray::Array2<f64> = ndarray::Array2::from_shape_fn((300, 12), |_| rng.random_range(-1.0..1.0));
        let neighbors = find_knn(data.view(), 10).unwrap();

        for i in 0..data.nrows() {
            let mut expected: Vec<(f64, usize)> = (0..data.nrows())
                .filter(|&j| j != i)
                .map(|j| {
                    let d: f64 = data
                        .row(i)
                        .iter()
                        .zip(data.row(j).iter())
                        .map(|(a, b)| (a - b).powi(2))
                        .sum();
                    (d, j)
                })
                .collect();
            expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            let expected: Vec<usize> = expected.iter().take(10).map(|&(_, j)| j).collect();
            assert_eq!(neighbors[i], expected, "cell {}", i);
        }
    }

    #[test]
    fn test_find_knn_duplicate_cells_use_lowest_indices() {
        let data = ndarray::Array2::<f64>::zeros((12, 3));
        let neighbors = find_knn(data.view(), 3).unwrap();

        assert_eq!(neighbors[0], vec![1, 2, 3]);
        assert_eq!(neighbors[5], vec![0, 1, 2]);
        assert_eq!(neighbors[11], vec![0, 1, 2]);
    }

    #[test]
    fn test_find_knn_rejects_non_finite() {
        let data = array![[0.0], [f64::NAN], [1.0]];
        assert!(find_knn(data.view(), 1).is_err());
    }

    #[test]
    fn test_snn_weights() {
        // Two pairs far apart: each cell only shares neighbours with its partner.
        let data = array![[0.0], [0.1], [50.0], [50.1]];
        let network = build_snn_network(data.view(), 1).unwrap();

        assert_eq!(network.nodes(), 4);
        assert_eq!(network.graph.edge_count(), 2);

        // Partners list each other at rank 1 and themselves at rank 0: r = 0 + 1.
        let edges: Vec<_> = network.neighbors(0).collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].0, 1);
        assert_relative_eq!(edges[0].1, 0.5);
    }
}
