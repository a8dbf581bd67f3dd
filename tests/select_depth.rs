use ndarray::{Array2, ArrayView2};
use single_pcselect::selection::denoised::denoised_pc_count;
use single_pcselect::selection::elbow::find_elbow_point;
use single_pcselect::selection::oracle::from_fn;
use single_pcselect::selection::variance::component_variances;
use single_pcselect::{select_depth, ClusteredPcs, SelectionError, Trial};
use std::sync::atomic::{AtomicUsize, Ordering};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three tight populations separated on the first two components; remaining components are
/// scaled-down copies so the column variances decrease.
fn three_populations(n_components: usize) -> Array2<f64> {
    let centers = [(0.0, 0.0), (100.0, 0.0), (0.0, 90.0)];
    Array2::from_shape_fn((24, n_components), |(cell, component)| {
        let (cx, cy) = centers[cell / 8];
        let i = cell % 8;
        let x = cx + (i % 3) as f64 * 0.1;
        let y = cy + (i / 3) as f64 * 0.1;
        match component {
            0 => x,
            1 => y,
            c => x * 1e-3 / c as f64,
        }
    })
}

#[test]
fn scripted_sweep_keeps_deepest_acceptable_depth() {
    init_logging();
    let embedding = Array2::<f64>::zeros((50, 30));
    let counts = [(5, 4), (10, 8), (15, 15), (20, 22), (25, 23), (30, 24)];
    let calls = AtomicUsize::new(0);
    let oracle = from_fn(|m: ArrayView2<'_, f64>| {
        calls.fetch_add(1, Ordering::SeqCst);
        let (_, n) = counts
            .iter()
            .find(|(depth, _)| *depth == m.ncols())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("unexpected depth {}", m.ncols()))?;
        Ok(n)
    });

    let selector = ClusteredPcs::builder().min_rank(5).by(5).build();
    let result = selector.select(embedding.view(), &oracle).unwrap();

    assert_eq!(result.chosen_depth(), 30);
    let expected: Vec<Trial> = counts.iter().map(|&(d, n)| Trial::new(d, n)).collect();
    assert_eq!(result.trials(), expected.as_slice());
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[test]
fn repeated_runs_are_identical() {
    init_logging();
    let embedding = three_populations(6);
    let oracle = single_pcselect::clustering::SnnGraphClustering::new().k(5);

    let first = select_depth(embedding.view(), &oracle, &[2, 4, 6]).unwrap();
    let second = select_depth(embedding.view(), &oracle, &[2, 4, 6]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn graph_clustering_selects_full_depth_for_separated_populations() {
    init_logging();
    let embedding = three_populations(6);
    let oracle = single_pcselect::clustering::SnnGraphClustering::new().k(5);

    let result = ClusteredPcs::builder()
        .min_rank(2)
        .parallel(true)
        .build()
        .select(embedding.view(), &oracle)
        .unwrap();

    assert_eq!(result.chosen_depth(), 6);
    for trial in result.trials() {
        assert_eq!(trial.n_clusters, 3, "{}", trial);
    }

    let truncated = result.truncate(embedding.view()).unwrap();
    assert_eq!(truncated.ncols(), 6);
}

#[test]
fn no_acceptable_depth_leaves_fallback_to_caller() {
    init_logging();
    let embedding = Array2::<f64>::zeros((10, 6));
    let oracle = from_fn(|m: ArrayView2<'_, f64>| Ok(m.ncols() * 5));

    let err = select_depth(embedding.view(), &oracle, &[2, 4, 6]).unwrap_err();
    assert!(matches!(err, SelectionError::NoAcceptableDepth { .. }));

    let fallback = err.trials().first().map(|t| t.depth);
    assert_eq!(fallback, Some(2));
}

#[test]
fn clustering_failure_surfaces_depth_and_cause() {
    init_logging();
    let embedding = Array2::<f64>::zeros((10, 6));
    let oracle = single_pcselect::clustering::SnnGraphClustering::new().k(0);

    let err = select_depth(embedding.view(), &oracle, &[2, 4]).unwrap_err();
    assert_eq!(err.depth(), Some(2));
    assert!(err.trials().is_empty());
    let source = std::error::Error::source(&err).map(|e| e.to_string());
    assert!(source.unwrap().contains("neighbours"));
}

#[test]
fn variance_heuristics_on_embedding() {
    init_logging();
    let embedding = three_populations(6);
    let variances = component_variances(embedding.view()).unwrap();
    let variances = variances.to_vec();

    assert!(variances.windows(2).all(|w| w[0] >= w[1]));
    // the elbow sits on the first low-variance component
    assert_eq!(find_elbow_point(&variances).unwrap(), 3);

    let total: f64 = variances.iter().sum();
    assert_eq!(denoised_pc_count(&variances, 0.5, total, 1, 6).unwrap(), 2);
}
