use super::candidates::linear_depths;
use super::oracle::ClusterCount;
use super::{SelectionError, SelectionResult, Trial};
use log::{debug, info, warn};
use ndarray::{s, ArrayView2};
use rayon::prelude::*;

/// Sweeps `candidates` in ascending order, clusters the cells on the first `d` components of
/// `embedding` for every candidate depth `d`, and returns the largest depth whose cluster count
/// stays within `d + 1`.
///
/// The oracle is called exactly once per candidate, smallest depth first. The sweep stops at the
/// first clustering failure; the returned error carries the trials completed up to that point.
pub fn select_depth<T, O>(
    embedding: ArrayView2<T>,
    oracle: &O,
    candidates: &[usize],
) -> Result<SelectionResult, SelectionError>
where
    O: ClusterCount<T> + ?Sized,
{
    validate(&embedding, candidates)?;

    let mut trials = Vec::with_capacity(candidates.len());
    for &depth in candidates {
        match run_trial(&embedding, oracle, depth) {
            Ok(trial) => trials.push(trial),
            Err(source) => {
                return Err(SelectionError::ClusteringFailed {
                    depth,
                    completed: trials,
                    source,
                })
            }
        }
    }

    finish(trials)
}

/// Same contract as [`select_depth`], with the trials spread over the rayon thread pool.
///
/// On failure the smallest failing depth is reported. Trials for larger depths may already have
/// run by then.
fn select_depth_parallel<T, O>(
    embedding: ArrayView2<T>,
    oracle: &O,
    candidates: &[usize],
) -> Result<SelectionResult, SelectionError>
where
    T: Sync,
    O: ClusterCount<T> + Sync + ?Sized,
{
    validate(&embedding, candidates)?;

    // `collect` on an indexed parallel iterator keeps the candidate order.
    let outcomes: Vec<anyhow::Result<Trial>> = candidates
        .par_iter()
        .map(|&depth| run_trial(&embedding, oracle, depth))
        .collect();

    let mut trials = Vec::with_capacity(candidates.len());
    for (outcome, &depth) in outcomes.into_iter().zip(candidates) {
        match outcome {
            Ok(trial) => trials.push(trial),
            Err(source) => {
                return Err(SelectionError::ClusteringFailed {
                    depth,
                    completed: trials,
                    source,
                })
            }
        }
    }

    finish(trials)
}

fn validate<T>(embedding: &ArrayView2<T>, candidates: &[usize]) -> Result<(), SelectionError> {
    if candidates.is_empty() {
        return Err(SelectionError::invalid("No candidate depths were supplied"));
    }
    if embedding.nrows() == 0 {
        return Err(SelectionError::invalid("The embedding does not contain any cells"));
    }
    if candidates[0] == 0 {
        return Err(SelectionError::invalid("Candidate depths have to be at least 1"));
    }
    if let Some(pair) = candidates.windows(2).find(|w| w[0] >= w[1]) {
        return Err(SelectionError::invalid(format!(
            "Candidate depths have to be strictly ascending, found {} followed by {}",
            pair[0], pair[1]
        )));
    }
    let deepest = candidates[candidates.len() - 1];
    if deepest > embedding.ncols() {
        return Err(SelectionError::invalid(format!(
            "Candidate depth {} exceeds the {} available components",
            deepest,
            embedding.ncols()
        )));
    }
    Ok(())
}

fn run_trial<T, O>(embedding: &ArrayView2<T>, oracle: &O, depth: usize) -> anyhow::Result<Trial>
where
    O: ClusterCount<T> + ?Sized,
{
    let n_clusters = oracle.cluster_count(embedding.slice(s![.., ..depth]))?;
    if n_clusters == 0 {
        anyhow::bail!("Clustering reported zero clusters");
    }

    let trial = Trial::new(depth, n_clusters);
    debug!(
        "{} (bound {}, {})",
        trial,
        trial.bound(),
        if trial.is_acceptable() { "accepted" } else { "rejected" }
    );
    Ok(trial)
}

fn finish(trials: Vec<Trial>) -> Result<SelectionResult, SelectionError> {
    match SelectionResult::from_trials(trials) {
        Ok(result) => {
            info!(
                "Selected {} of the tested depths: {}",
                result.chosen_depth(),
                result.chosen_trial()
            );
            Ok(result)
        }
        Err(err) => {
            warn!("None of the {} tested depths kept the cluster count within depth + 1", err.trials().len());
            Err(err)
        }
    }
}

/// Population-structure based choice of the number of components, configured through
/// [`ClusteredPcsBuilder`].
#[derive(Debug, Clone)]
pub struct ClusteredPcs {
    min_rank: usize,
    max_rank: Option<usize>,
    by: usize,
    candidates: Option<Vec<usize>>,
    parallel: bool,
}

pub struct ClusteredPcsBuilder {
    min_rank: usize,
    max_rank: Option<usize>,
    by: usize,
    candidates: Option<Vec<usize>>,
    parallel: bool,
}

impl Default for ClusteredPcsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusteredPcsBuilder {
    pub fn new() -> Self {
        ClusteredPcsBuilder {
            min_rank: 5,
            max_rank: None,
            by: 1,
            candidates: None,
            parallel: false,
        }
    }

    pub fn min_rank(mut self, min_rank: usize) -> Self {
        self.min_rank = min_rank;
        self
    }

    /// Defaults to the number of components in the embedding; larger values are clamped to it.
    pub fn max_rank(mut self, max_rank: usize) -> Self {
        self.max_rank = Some(max_rank);
        self
    }

    pub fn by(mut self, by: usize) -> Self {
        self.by = by;
        self
    }

    /// Explicit depths to test. Overrides `min_rank`, `max_rank` and `by`.
    pub fn candidates(mut self, candidates: Vec<usize>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(self) -> ClusteredPcs {
        ClusteredPcs {
            min_rank: self.min_rank.max(1),
            max_rank: self.max_rank,
            by: self.by,
            candidates: self.candidates,
            parallel: self.parallel,
        }
    }
}

impl ClusteredPcs {
    pub fn builder() -> ClusteredPcsBuilder {
        ClusteredPcsBuilder::new()
    }

    /// Depths that [`ClusteredPcs::select`] would test on an embedding with `n_components`
    /// columns.
    pub fn candidate_depths(&self, n_components: usize) -> Result<Vec<usize>, SelectionError> {
        if let Some(candidates) = &self.candidates {
            return Ok(candidates.clone());
        }
        let max_rank = self
            .max_rank
            .map_or(n_components, |max| max.min(n_components));
        linear_depths(self.min_rank, max_rank, self.by)
            .map_err(|e| SelectionError::invalid(e.to_string()))
    }

    pub fn select<T, O>(
        &self,
        embedding: ArrayView2<T>,
        oracle: &O,
    ) -> Result<SelectionResult, SelectionError>
    where
        T: Sync,
        O: ClusterCount<T> + Sync + ?Sized,
    {
        if !self.parallel {
            return self.select_sequential(embedding, oracle);
        }
        let candidates = self.planned_depths(&embedding)?;
        select_depth_parallel(embedding, oracle, &candidates)
    }

    /// Runs the sweep on the calling thread regardless of `parallel`, so neither the oracle nor
    /// the elements need to be `Sync`.
    pub fn select_sequential<T, O>(
        &self,
        embedding: ArrayView2<T>,
        oracle: &O,
    ) -> Result<SelectionResult, SelectionError>
    where
        O: ClusterCount<T> + ?Sized,
    {
        let candidates = self.planned_depths(&embedding)?;
        select_depth(embedding, oracle, &candidates)
    }

    fn planned_depths<T>(&self, embedding: &ArrayView2<T>) -> Result<Vec<usize>, SelectionError> {
        let candidates = self.candidate_depths(embedding.ncols())?;
        debug!(
            "Testing {} depths between {:?} and {:?} on {} cells",
            candidates.len(),
            candidates.first(),
            candidates.last(),
            embedding.nrows()
        );
        Ok(candidates)
    }
}
