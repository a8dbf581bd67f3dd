//! # Graph-based clustering of cells
//!
//! Default clustering oracle for the depth selectors: a shared nearest neighbour graph is built
//! over the cells of the (truncated) embedding and partitioned with the Louvain method.

use crate::network::clustering::NetworkGrouping;
use crate::selection::oracle::ClusterCount;
use crate::FloatOps;
use anyhow::bail;
use log::debug;
use ndarray::ArrayView2;

pub(crate) mod louvain;
pub(crate) mod similarity_network;
pub use louvain::{Louvain, DEFAULT_RESOLUTION};
pub use similarity_network::build_snn_network;
pub use similarity_network::find_knn;

/// Shared nearest neighbour graph + Louvain clustering.
///
/// All randomness comes from `seed`, so repeated calls on the same matrix give the same labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SnnGraphClustering {
    k: usize,
    resolution: f64,
    seed: u64,
    max_iterations: usize,
}

impl Default for SnnGraphClustering {
    fn default() -> Self {
        SnnGraphClustering {
            k: 10,
            resolution: DEFAULT_RESOLUTION,
            seed: 42,
            max_iterations: 10,
        }
    }
}

impl SnnGraphClustering {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// One cluster label per row of `data`, numbered from 0 in order of first appearance.
    pub fn cluster_labels<T: FloatOps>(&self, data: ArrayView2<T>) -> anyhow::Result<Vec<usize>> {
        if data.nrows() < 2 {
            bail!("Clustering needs at least two cells, got {}", data.nrows());
        }
        if data.ncols() == 0 {
            bail!("Clustering needs at least one component");
        }
        if self.k == 0 {
            bail!("The number of neighbours has to be at least 1");
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            bail!("Resolution has to be positive, got {}", self.resolution);
        }
        if data.iter().any(|v| !v.is_finite()) {
            bail!("Input contains non-finite values");
        }

        let network = build_snn_network(data, self.k)?;
        let clustering = Louvain::new(self.resolution, self.seed).run(&network, self.max_iterations);
        debug!(
            "Clustered {} cells on {} components into {} groups",
            data.nrows(),
            data.ncols(),
            clustering.group_count()
        );

        Ok(clustering.into_assignments())
    }
}

impl<T: FloatOps> ClusterCount<T> for SnnGraphClustering {
    fn cluster_count(&self, matrix: ArrayView2<'_, T>) -> anyhow::Result<usize> {
        let labels = self.cluster_labels(matrix)?;
        Ok(labels.iter().max().map_or(0, |&max| max + 1))
    }
}
