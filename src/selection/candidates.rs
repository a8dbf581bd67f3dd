use anyhow::bail;

/// Evenly spaced depths `min, min + by, ...` up to and including `max` where it falls on the grid.
pub fn linear_depths(min: usize, max: usize, by: usize) -> anyhow::Result<Vec<usize>> {
    if min == 0 {
        bail!("The smallest depth has to be at least 1");
    }
    if by == 0 {
        bail!("The step between depths has to be at least 1");
    }
    if min > max {
        bail!("Smallest depth ({}) exceeds largest depth ({})", min, max);
    }

    Ok((min..=max).step_by(by).collect())
}

/// Roughly geometric sweep of `n` depths between `min` and `max`, both included.
///
/// Depths are rounded to integers and deduplicated, so fewer than `n` depths come back when the
/// range is narrow.
pub fn geometric_depths(min: usize, max: usize, n: usize) -> anyhow::Result<Vec<usize>> {
    if min == 0 {
        bail!("The smallest depth has to be at least 1");
    }
    if min > max {
        bail!("Smallest depth ({}) exceeds largest depth ({})", min, max);
    }
    if n == 0 {
        bail!("At least one depth has to be requested");
    }
    if n == 1 || min == max {
        return Ok(vec![max]);
    }

    let log_min = (min as f64).ln();
    let step = ((max as f64).ln() - log_min) / (n - 1) as f64;

    let mut depths: Vec<usize> = (0..n)
        .map(|i| (log_min + step * i as f64).exp().round() as usize)
        .map(|d| d.clamp(min, max))
        .collect();
    depths.dedup();
    // rounding can land the last point just short of `max`
    if let Some(last) = depths.last_mut() {
        *last = max;
    }
    depths.dedup();

    Ok(depths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_depths() {
        assert_eq!(linear_depths(5, 30, 5).unwrap(), vec![5, 10, 15, 20, 25, 30]);
        assert_eq!(linear_depths(5, 12, 5).unwrap(), vec![5, 10]);
        assert_eq!(linear_depths(3, 3, 1).unwrap(), vec![3]);
    }

    #[test]
    fn test_linear_depths_errors() {
        assert!(linear_depths(0, 10, 1).is_err());
        assert!(linear_depths(5, 10, 0).is_err());
        assert!(linear_depths(11, 10, 1).is_err());
    }

    #[test]
    fn test_geometric_depths() {
        let depths = geometric_depths(5, 50, 5).unwrap();
        assert_eq!(depths.first(), Some(&5));
        assert_eq!(depths.last(), Some(&50));
        assert!(depths.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(depths, vec![5, 9, 16, 28, 50]);
    }

    #[test]
    fn test_geometric_depths_narrow_range() {
        let depths = geometric_depths(2, 3, 10).unwrap();
        assert_eq!(depths, vec![2, 3]);
        assert_eq!(geometric_depths(4, 4, 3).unwrap(), vec![4]);
        assert_eq!(geometric_depths(4, 9, 1).unwrap(), vec![9]);
    }
}
