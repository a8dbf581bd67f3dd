// See: https://en.wikipedia.org/wiki/Louvain_method & https://github.com/graphext/louvain-rs/tree/master
// Copyright 2018 Juan Morales (crispamares@gmail.com)
// Repository: https://github.com/graphext/louvain-rs/tree/master
// Licensed under the MIT License.
use crate::network::clustering::NetworkGrouping;
use crate::network::Network;
use crate::utils::ZeroVec;
use log::trace;
use rand::seq::SliceRandom;
use rand::RngCore;

/// One pass of the Louvain local moving heuristic: every node is visited in random order and
/// moved to the neighbouring group (or an empty group) with the largest modularity gain, until
/// every node is stable.
#[derive(Debug, Default)]
pub struct StandardLocalMoving {
    resolution: f64,
    cluster_weights: Vec<f64>,
    nodes_per_cluster: Vec<usize>,
    unused_clusters: Vec<usize>,
    node_order: Vec<usize>,
    edge_weight_per_cluster: Vec<f64>,
    neighboring_clusters: Vec<usize>,
    stable_nodes: Vec<bool>,
}

impl StandardLocalMoving {
    pub fn new(resolution: f64) -> Self {
        StandardLocalMoving {
            resolution,
            ..Default::default()
        }
    }

    /// Returns true if any node changed group.
    pub fn iterate<C, R>(&mut self, network: &Network, clustering: &mut C, rng: &mut R) -> bool
    where
        C: NetworkGrouping,
        R: RngCore,
    {
        let node_count = network.nodes();
        if node_count == 0 {
            return false;
        }

        // Group ids can never exceed the node count after normalisation, but an unnormalised
        // input may carry larger ids.
        let capacity = node_count.max(clustering.group_count());
        self.cluster_weights.zero_len(capacity);
        self.nodes_per_cluster.zero_len(capacity);
        self.edge_weight_per_cluster.zero_len(capacity);
        self.unused_clusters.zero_len(capacity);
        self.neighboring_clusters.zero_len(capacity);
        self.stable_nodes.zero_len(node_count);

        for node in 0..node_count {
            let cluster = clustering.get_group(node);
            self.cluster_weights[cluster] += network.weight(node);
            self.nodes_per_cluster[cluster] += 1;
        }

        let mut num_unused_clusters = 0;
        for cluster in (0..capacity).rev() {
            if self.nodes_per_cluster[cluster] == 0 {
                self.unused_clusters[num_unused_clusters] = cluster;
                num_unused_clusters += 1;
            }
        }

        self.node_order.clear();
        self.node_order.extend(0..node_count);
        self.node_order.shuffle(rng);

        let total_edge_weight = network.get_total_edge_weight();
        if total_edge_weight <= 0.0 {
            return false;
        }
        let scale = self.resolution / (2.0 * total_edge_weight);

        let mut update = false;
        let mut num_unstable_nodes = node_count;
        let mut i = 0;

        while num_unstable_nodes > 0 {
            let node = self.node_order[i];
            i = (i + 1) % node_count;
            if self.stable_nodes[node] {
                continue;
            }

            let current_cluster = clustering.get_group(node);
            let node_weight = network.weight(node);

            // Take the node out of its group.
            self.cluster_weights[current_cluster] -= node_weight;
            self.nodes_per_cluster[current_cluster] -= 1;
            if self.nodes_per_cluster[current_cluster] == 0 {
                self.unused_clusters[num_unused_clusters] = current_cluster;
                num_unused_clusters += 1;
            }

            // An empty group is always a candidate.
            self.neighboring_clusters[0] = self.unused_clusters[num_unused_clusters - 1];
            let mut num_neighboring_clusters = 1;

            for (target, weight) in network.neighbors(node) {
                let neighbor_cluster = clustering.get_group(target);
                if self.edge_weight_per_cluster[neighbor_cluster] == 0.0 {
                    self.neighboring_clusters[num_neighboring_clusters] = neighbor_cluster;
                    num_neighboring_clusters += 1;
                }
                self.edge_weight_per_cluster[neighbor_cluster] += weight;
            }

            let mut best_cluster = current_cluster;
            let mut max_quality_increment = self.edge_weight_per_cluster[current_cluster]
                - node_weight * self.cluster_weights[current_cluster] * scale;

            for &cluster in &self.neighboring_clusters[..num_neighboring_clusters] {
                let quality_increment = self.edge_weight_per_cluster[cluster]
                    - node_weight * self.cluster_weights[cluster] * scale;
                if quality_increment > max_quality_increment
                    || (quality_increment == max_quality_increment && cluster < best_cluster)
                {
                    best_cluster = cluster;
                    max_quality_increment = quality_increment;
                }
                self.edge_weight_per_cluster[cluster] = 0.0;
            }
            self.edge_weight_per_cluster[current_cluster] = 0.0;

            self.cluster_weights[best_cluster] += node_weight;
            self.nodes_per_cluster[best_cluster] += 1;
            if best_cluster == self.unused_clusters[num_unused_clusters - 1] {
                num_unused_clusters -= 1;
            }

            self.stable_nodes[node] = true;
            num_unstable_nodes -= 1;

            if best_cluster != current_cluster {
                trace!("Moving node {} from group {} to {}", node, current_cluster, best_cluster);
                clustering.set_group(node, best_cluster);
                update = true;

                // Neighbours outside the new group have to be looked at again.
                for (target, _) in network.neighbors(node) {
                    if self.stable_nodes[target] && clustering.get_group(target) != best_cluster {
                        self.stable_nodes[target] = false;
                        num_unstable_nodes += 1;
                    }
                }
            }
        }

        if update {
            clustering.normalize_groups();
        }

        update
    }
}
