use ndarray::ArrayView2;
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

/// Anything that partitions the cells (rows) of a matrix and reports how many groups it found.
///
/// Only the cardinality of the partition is used by the depth selectors. Implementations that
/// involve randomness should take their seed at construction so that repeated calls on the
/// same input report the same count.
pub trait ClusterCount<T> {
    fn cluster_count(&self, matrix: ArrayView2<'_, T>) -> anyhow::Result<usize>;
}

impl<T, O> ClusterCount<T> for &O
where
    O: ClusterCount<T> + ?Sized,
{
    fn cluster_count(&self, matrix: ArrayView2<'_, T>) -> anyhow::Result<usize> {
        (**self).cluster_count(matrix)
    }
}

/// Wraps a closure returning a cluster count.
#[derive(Debug, Clone, Copy)]
pub struct FnCount<F>(F);

/// Uses `f` as a clustering oracle.
pub fn from_fn<T, F>(f: F) -> FnCount<F>
where
    F: Fn(ArrayView2<'_, T>) -> anyhow::Result<usize>,
{
    FnCount(f)
}

impl<T, F> ClusterCount<T> for FnCount<F>
where
    F: Fn(ArrayView2<'_, T>) -> anyhow::Result<usize>,
{
    fn cluster_count(&self, matrix: ArrayView2<'_, T>) -> anyhow::Result<usize> {
        (self.0)(matrix)
    }
}

/// Adapts a clusterer that returns one label per cell into a [`ClusterCount`].
pub struct LabelCount<F, L> {
    f: F,
    _label: PhantomData<fn() -> L>,
}

impl<F, L> LabelCount<F, L>
where
    L: Eq + Hash,
{
    pub fn new<T>(f: F) -> Self
    where
        F: Fn(ArrayView2<'_, T>) -> anyhow::Result<Vec<L>>,
    {
        LabelCount {
            f,
            _label: PhantomData,
        }
    }
}

impl<T, L, F> ClusterCount<T> for LabelCount<F, L>
where
    F: Fn(ArrayView2<'_, T>) -> anyhow::Result<Vec<L>>,
    L: Eq + Hash,
{
    fn cluster_count(&self, matrix: ArrayView2<'_, T>) -> anyhow::Result<usize> {
        let n_cells = matrix.nrows();
        let labels = (self.f)(matrix)?;
        if labels.len() != n_cells {
            anyhow::bail!(
                "Clustering returned {} labels for {} cells",
                labels.len(),
                n_cells
            );
        }
        Ok(count_distinct_labels(&labels))
    }
}

pub fn count_distinct_labels<L: Eq + Hash>(labels: &[L]) -> usize {
    labels.iter().collect::<HashSet<_>>().len()
}
