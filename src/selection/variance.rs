use crate::FloatOps;
use ndarray::{Array1, ArrayView2, Axis};
use rayon::prelude::*;

/// Sample variance (n - 1 denominator) of every component of an embedding.
pub fn component_variances<T: FloatOps>(embedding: ArrayView2<T>) -> anyhow::Result<Array1<f64>> {
    let n_cells = embedding.nrows();
    if n_cells < 2 {
        anyhow::bail!("At least two cells are required to compute variances, got {}", n_cells);
    }

    let variances: Vec<f64> = embedding
        .axis_iter(Axis(1))
        .into_par_iter()
        .map(|column| {
            let values: Vec<f64> = column.iter().filter_map(|v| v.to_f64()).collect();
            let mean = values.iter().sum::<f64>() / n_cells as f64;
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n_cells - 1) as f64
        })
        .collect();

    Ok(Array1::from(variances))
}

/// Fraction of `total` captured by each component.
pub fn variance_explained_ratio(variances: &Array1<f64>, total: f64) -> anyhow::Result<Array1<f64>> {
    if !(total.is_finite() && total > 0.0) {
        anyhow::bail!("Total variance has to be positive, got {}", total);
    }
    Ok(variances / total)
}
