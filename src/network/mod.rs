// https://en.wikipedia.org/wiki/Louvain_method & https://github.com/graphext/louvain-rs/tree/master
// Copyright 2018 Juan Morales (crispamares@gmail.com)
// Repository: https://github.com/graphext/louvain-rs/tree/master
// Licensed under the MIT License.
use crate::network::clustering::NetworkGrouping;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;

pub mod clustering;

pub type Graph = UnGraph<f64, f64>;

/// Weighted undirected graph of cells.
///
/// Node weights are the total weight of the edges attached to a node. Edge weight that has
/// been folded into a single node by aggregation is kept in `self_loop_weight` so the total
/// edge weight of the graph is preserved across levels.
#[derive(Debug, Clone)]
pub struct Network {
    pub graph: Graph,
    self_loop_weight: f64,
}

impl Network {
    pub fn new() -> Self {
        Network {
            graph: Graph::new_undirected(),
            self_loop_weight: 0.0,
        }
    }

    pub(crate) fn new_from_graph(graph: Graph) -> Self {
        Network {
            graph,
            self_loop_weight: 0.0,
        }
    }

    /// Builds a network from unique undirected edges `(i, j, weight)` with `i != j`.
    /// Node weights are set to the weighted degree.
    pub fn from_edges<I>(n_nodes: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut graph = Graph::with_capacity(n_nodes, n_nodes * 4);
        for _ in 0..n_nodes {
            graph.add_node(0.0);
        }

        let mut strength = vec![0.0; n_nodes];
        for (i, j, weight) in edges {
            graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), weight);
            strength[i] += weight;
            strength[j] += weight;
        }
        for (idx, s) in strength.into_iter().enumerate() {
            graph[NodeIndex::new(idx)] = s;
        }

        Network::new_from_graph(graph)
    }

    pub fn nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub fn weight(&self, node: usize) -> f64 {
        self.graph[NodeIndex::new(node)]
    }

    /// Neighbouring nodes of `node` with the weight of the connecting edge.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.graph.edges(NodeIndex::new(node)).map(move |edge| {
            let other = if edge.source().index() == node {
                edge.target().index()
            } else {
                edge.source().index()
            };
            (other, *edge.weight())
        })
    }

    pub fn get_total_edge_weight(&self) -> f64 {
        self.graph.edge_weights().sum::<f64>() + self.self_loop_weight
    }

    /// Aggregates every group of `grouping` into a single node. Node weights and edges between
    /// groups are summed; edges inside a group become self-loop weight.
    pub fn create_reduced_network<G: NetworkGrouping>(&self, grouping: &G) -> Self {
        let n_groups = grouping.group_count();
        let mut reduced = Graph::with_capacity(n_groups, n_groups * 2);
        for _ in 0..n_groups {
            reduced.add_node(0.0);
        }

        for node in self.graph.node_indices() {
            let group = NodeIndex::new(grouping.get_group(node.index()));
            reduced[group] += self.graph[node];
        }

        let mut self_loop_weight = self.self_loop_weight;
        let mut between = BTreeMap::new();
        for edge in self.graph.edge_references() {
            let g1 = grouping.get_group(edge.source().index());
            let g2 = grouping.get_group(edge.target().index());

            if g1 == g2 {
                self_loop_weight += *edge.weight();
                continue;
            }

            let key = if g1 < g2 { (g1, g2) } else { (g2, g1) };
            *between.entry(key).or_insert(0.0) += *edge.weight();
        }

        for ((g1, g2), weight) in between {
            reduced.add_edge(NodeIndex::new(g1), NodeIndex::new(g2), weight);
        }

        Network {
            graph: reduced,
            self_loop_weight,
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::clustering::VectorGrouping;
    use approx::assert_relative_eq;

    fn two_triangles() -> Network {
        Network::from_edges(
            6,
            vec![
                (0, 1, 1.0),
                (1, 2, 1.0),
                (0, 2, 1.0),
                (3, 4, 2.0),
                (4, 5, 2.0),
                (3, 5, 2.0),
                (2, 3, 0.5),
            ],
        )
    }

    #[test]
    fn test_from_edges_weights_nodes_by_strength() {
        let network = two_triangles();
        assert_eq!(network.nodes(), 6);
        assert_relative_eq!(network.weight(0), 2.0);
        assert_relative_eq!(network.weight(2), 2.5);
        assert_relative_eq!(network.weight(3), 4.5);
        assert_relative_eq!(network.get_total_edge_weight(), 9.5);
        assert_relative_eq!(network.graph.node_weights().sum::<f64>(), 19.0);
    }

    #[test]
    fn test_neighbors_from_either_end() {
        let network = two_triangles();
        let mut neighbors: Vec<_> = network.neighbors(3).map(|(n, _)| n).collect();
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![2, 4, 5]);

        let to_two: Vec<_> = network.neighbors(3).filter(|&(n, _)| n == 2).collect();
        assert_eq!(to_two, vec![(2, 0.5)]);
    }

    #[test]
    fn test_reduced_network_preserves_weight() {
        let network = two_triangles();
        let grouping = VectorGrouping::from_assignments(&[0, 0, 0, 1, 1, 1]);
        let reduced = network.create_reduced_network(&grouping);

        assert_eq!(reduced.nodes(), 2);
        assert_eq!(reduced.graph.edge_count(), 1);
        assert_relative_eq!(reduced.weight(0), 6.5);
        assert_relative_eq!(reduced.weight(1), 12.5);
        assert_relative_eq!(reduced.get_total_edge_weight(), network.get_total_edge_weight());

        let neighbors: Vec<_> = reduced.neighbors(0).collect();
        assert_eq!(neighbors, vec![(1, 0.5)]);
    }
}
