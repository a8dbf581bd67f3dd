use anyhow::bail;

/// Finds the elbow of a variance-explained curve.
///
/// `variance` holds the variance captured by each component, in decreasing order. The curve is
/// compared against the straight line joining its first and last points, and the 1-based index
/// of the point lying furthest below that line is returned. A curve with no point below the line
/// has no elbow, in which case every component is kept.
pub fn find_elbow_point(variance: &[f64]) -> anyhow::Result<usize> {
    if variance.is_empty() {
        bail!("Cannot locate an elbow in an empty variance curve");
    }
    if variance.iter().any(|v| !v.is_finite()) {
        bail!("Variance curve contains non-finite values");
    }
    if variance.windows(2).any(|w| w[1] > w[0]) {
        bail!("Variance has to be sorted in decreasing order");
    }

    let n = variance.len();
    let first = variance[0];

    let dx = (n - 1) as f64;
    let dy = variance[n - 1] - first;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return Ok(n);
    }
    let tolerance = f64::EPSILON * first.abs().max(dx);

    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in variance.iter().enumerate() {
        let x0 = i as f64;
        let y0 = v - first;

        // Signed perpendicular distance to the line, negative below it.
        let signed = (y0 * dx - x0 * dy) / length;
        if signed < -tolerance && best.map_or(true, |(_, d)| -signed > d) {
            best = Some((i + 1, -signed));
        }
    }

    Ok(best.map_or(n, |(idx, _)| idx))
}
