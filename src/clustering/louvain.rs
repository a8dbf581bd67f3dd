// See: https://en.wikipedia.org/wiki/Louvain_method & https://github.com/graphext/louvain-rs/tree/master
// Copyright 2018 Juan Morales (crispamares@gmail.com)
// Repository: https://github.com/graphext/louvain-rs/tree/master
// Licensed under the MIT License.
use crate::local_moving::StandardLocalMoving;
use crate::network::clustering::{NetworkGrouping, VectorGrouping};
use crate::network::Network;
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

pub const DEFAULT_RESOLUTION: f64 = 1.0;

/// Multi-level Louvain community detection.
pub struct Louvain {
    rng: ChaCha20Rng,
    local_moving: StandardLocalMoving,
}

impl Louvain {
    /// The seed fully determines the node visiting order, and with it the result.
    pub fn new(resolution: f64, seed: u64) -> Self {
        Louvain {
            rng: ChaCha20Rng::seed_from_u64(seed),
            local_moving: StandardLocalMoving::new(resolution),
        }
    }

    /// One Louvain step: local moving on `network`, then recursively on the network aggregated
    /// by the resulting groups. Returns true if any label changed.
    pub fn iterate<C: NetworkGrouping>(&mut self, network: &Network, clustering: &mut C) -> bool {
        let mut update = self
            .local_moving
            .iterate(network, clustering, &mut self.rng);

        if clustering.group_count() == network.nodes() {
            return update;
        }

        let reduced = network.create_reduced_network(clustering);
        let mut reduced_clustering = C::create_isolated(reduced.nodes());

        update |= self.iterate(&reduced, &mut reduced_clustering);

        clustering.merge(&reduced_clustering);

        update
    }

    /// Runs Louvain steps from singleton groups until labels stop changing or
    /// `max_iterations` steps have been taken.
    pub fn run(&mut self, network: &Network, max_iterations: usize) -> VectorGrouping {
        let mut clustering = VectorGrouping::create_isolated(network.nodes());

        for iteration in 0..max_iterations {
            if !self.iterate(network, &mut clustering) {
                debug!("Louvain converged after {} iterations", iteration + 1);
                break;
            }
        }

        clustering
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cliques() -> Network {
        let mut edges = Vec::new();
        for offset in [0, 5] {
            for i in 0..5 {
                for j in (i + 1)..5 {
                    edges.push((offset + i, offset + j, 1.0));
                }
            }
        }
        edges.push((4, 5, 0.1));
        Network::from_edges(10, edges)
    }

    #[test]
    fn test_separates_cliques() {
        let network = two_cliques();
        let clustering = Louvain::new(DEFAULT_RESOLUTION, 0).run(&network, 10);

        assert_eq!(clustering.group_count(), 2);
        let labels = clustering.into_assignments();
        assert!(labels[..5].iter().all(|&l| l == labels[0]));
        assert!(labels[5..].iter().all(|&l| l == labels[5]));
        assert_ne!(labels[0], labels[5]);
    }

    #[test]
    fn test_same_seed_same_labels() {
        let network = two_cliques();
        let a = Louvain::new(1.0, 11).run(&network, 10);
        let b = Louvain::new(1.0, 11).run(&network, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_network() {
        let network = Network::new();
        let clustering = Louvain::new(1.0, 0).run(&network, 10);
        assert_eq!(clustering.group_count(), 0);
    }
}
