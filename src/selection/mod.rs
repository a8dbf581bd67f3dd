//! # Choosing the number of principal components
//!
//! Heuristics that decide how many leading components of an ordered embedding (cells x
//! components, components sorted by decreasing explained variance) should be kept for
//! downstream analysis.
//!
//! ## Available heuristics
//! - **Population structure** ([`select_depth`], [`ClusteredPcs`]): clusters the cells on a sweep
//!   of truncation depths and keeps the largest depth `d` whose cluster count does not exceed
//!   `d + 1`.
//! - **Elbow point** ([`elbow::find_elbow_point`]): picks the point of the variance curve
//!   furthest below the line joining its first and last points.
//! - **Technical noise** ([`denoised::denoised_pc_count`]): keeps components until the discarded
//!   variance would fall below the technical component of the variance.

use ndarray::{s, ArrayView2};
use std::fmt;

pub mod candidates;
mod clustered;
pub mod denoised;
pub mod elbow;
pub mod oracle;
pub mod variance;

pub use clustered::{select_depth, ClusteredPcs, ClusteredPcsBuilder};

/// Outcome of clustering the cells on the first `depth` components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trial {
    pub depth: usize,
    pub n_clusters: usize,
}

impl Trial {
    pub fn new(depth: usize, n_clusters: usize) -> Self {
        Trial { depth, n_clusters }
    }

    /// Largest cluster count that `depth` orthogonal directions can separate.
    pub fn bound(&self) -> usize {
        self.depth + 1
    }

    pub fn is_acceptable(&self) -> bool {
        self.n_clusters <= self.bound()
    }
}

impl fmt::Display for Trial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} PCs -> {} clusters", self.depth, self.n_clusters)
    }
}

/// Full trace of a depth sweep together with the selected depth.
///
/// The trace holds exactly one trial per candidate depth, in ascending depth order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    trials: Vec<Trial>,
    // index into `trials`
    chosen: usize,
}

impl SelectionResult {
    /// Picks the maximum acceptable depth of `trials`. Acceptance is judged per trial, so an
    /// unacceptable depth between two acceptable ones does not cut the sweep short.
    pub(crate) fn from_trials(trials: Vec<Trial>) -> Result<Self, SelectionError> {
        match trials
            .iter()
            .enumerate()
            .filter(|(_, trial)| trial.is_acceptable())
            .max_by_key(|(_, trial)| trial.depth)
            .map(|(idx, _)| idx)
        {
            Some(chosen) => Ok(SelectionResult { trials, chosen }),
            None => Err(SelectionError::NoAcceptableDepth { trials }),
        }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn chosen_depth(&self) -> usize {
        self.trials[self.chosen].depth
    }

    pub fn chosen_trial(&self) -> Trial {
        self.trials[self.chosen]
    }

    pub fn acceptable_depths(&self) -> Vec<usize> {
        self.trials
            .iter()
            .filter(|trial| trial.is_acceptable())
            .map(|trial| trial.depth)
            .collect()
    }

    /// View of the first `chosen_depth` columns of `embedding`.
    pub fn truncate<'a, T>(&self, embedding: ArrayView2<'a, T>) -> anyhow::Result<ArrayView2<'a, T>> {
        let depth = self.chosen_depth();
        if embedding.ncols() < depth {
            anyhow::bail!(
                "Embedding has {} components, but {} were selected",
                embedding.ncols(),
                depth
            );
        }
        Ok(embedding.slice_move(s![.., ..depth]))
    }

    pub fn into_trials(self) -> Vec<Trial> {
        self.trials
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Clustering failed at depth {depth}: {source}")]
    ClusteringFailed {
        depth: usize,
        /// Trials finished before the failing depth, in ascending order.
        completed: Vec<Trial>,
        #[source]
        source: anyhow::Error,
    },

    #[error("No tested depth produced at most depth + 1 clusters ({} trials)", .trials.len())]
    NoAcceptableDepth { trials: Vec<Trial> },
}

impl SelectionError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SelectionError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Depth that caused the failure, if the failure is tied to a single depth.
    pub fn depth(&self) -> Option<usize> {
        match self {
            SelectionError::ClusteringFailed { depth, .. } => Some(*depth),
            _ => None,
        }
    }

    /// Trials that completed before the sweep stopped. Empty for invalid input.
    pub fn trials(&self) -> &[Trial] {
        match self {
            SelectionError::InvalidInput { .. } => &[],
            SelectionError::ClusteringFailed { completed, .. } => completed.as_slice(),
            SelectionError::NoAcceptableDepth { trials } => trials.as_slice(),
        }
    }
}
