use anyhow::bail;

/// Number of leading components to keep so that the variance thrown away stays within the
/// technical component of the total variance.
///
/// `variance` is the variance captured by each component in decreasing order and `total` the
/// total variance of the data the components were computed from; anything in `total` not
/// covered by `variance` counts as already discarded. Returns the largest `k` for which dropping
/// components `k..` would discard more than `technical`, so keeping the first `k` components
/// discards at most `technical`. The count is clamped to `[min_rank, max_rank]` and never exceeds
/// the number of components.
pub fn denoised_pc_count(
    variance: &[f64],
    technical: f64,
    total: f64,
    min_rank: usize,
    max_rank: usize,
) -> anyhow::Result<usize> {
    if variance.is_empty() {
        bail!("No component variances supplied");
    }
    if variance.iter().any(|v| !v.is_finite() || *v < 0.0) {
        bail!("Component variances have to be finite and non-negative");
    }
    if !technical.is_finite() || technical < 0.0 {
        bail!("Technical variance has to be finite and non-negative, got {}", technical);
    }
    if min_rank > max_rank {
        bail!("min_rank ({}) exceeds max_rank ({})", min_rank, max_rank);
    }

    let explained: f64 = variance.iter().sum();
    // summation order differs from the caller's, allow for rounding
    if !total.is_finite() || total < explained * (1.0 - 1e-8) {
        bail!(
            "Total variance ({}) is smaller than the variance of the components ({})",
            total,
            explained
        );
    }
    let unexplained = (total - explained).max(0.0);

    let n = variance.len();
    let mut discarded = unexplained;
    let mut keep = n;
    let mut found = false;
    for k in (0..n).rev() {
        discarded += variance[k];
        if discarded > technical {
            keep = k + 1;
            found = true;
            break;
        }
    }
    if !found {
        log::debug!("Technical variance {} exceeds the total, keeping all {} components", technical, n);
    }

    Ok(keep.max(min_rank).min(max_rank).min(n))
}
