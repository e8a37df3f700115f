
// spectral coordinates of the analyzed words

use crate::eigen::{EigenDecomposition, SymmetricEigensolver};
use crate::error::{ManifoldError, Result};
use crate::laplacian::Laplacian;

use ndarray::{s, Array1, Array2};
use ndarray_stats::QuantileExt;
use log::{debug, info, warn};

/// Relative threshold under which an eigenvalue counts as zero.
pub const NEAR_ZERO: f64 = 1e-8;

/// What the spectrum said about the similarity graph.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralReport {
    /// Eigenvalues within `NEAR_ZERO · max(1, λmax)` of zero; more than one means the
    /// graph is disconnected.
    pub near_zero: usize,
    pub largest: f64,
    /// Eigenvalues of the retained coordinates, ascending.
    pub retained: Vec<f64>,
}

impl SpectralReport {
    pub fn is_degenerate(&self) -> bool {
        self.near_zero > 1
    }
}

#[derive(Clone, Debug)]
pub struct Embedding {
    /// N × M, row i is the position of word i.
    pub coordinates: Array2<f64>,
    pub report: SpectralReport,
}

impl Embedding {
    pub fn dims(&self) -> usize {
        self.coordinates.ncols()
    }
}

/// Number of non-trivial eigenvectors kept for `n` words when `requested` eigenvectors
/// (the trivial one included) were asked for.
pub fn retained_dimensions(requested: usize, n: usize) -> usize {
    let usable = requested.min(n);
    if usable < requested {
        warn!("{} eigenvectors requested but only {} words, keeping {}", requested, n, usable);
    }
    usable.saturating_sub(1)
}

/// Diagonalises the Laplacian, drops the trivial eigenvector and keeps the next `dims`.
///
/// A spectrum with several near-zero eigenvalues is only logged unless
/// `abort_on_degenerate` is set; non-finite results always abort.
pub fn spectral_embedding<E: SymmetricEigensolver>(
    laplacian: Laplacian,
    solver: &E,
    dims: usize,
    abort_on_degenerate: bool,
) -> Result<Embedding> {

    let n = laplacian.n_nodes();
    if n == 0 {
        return Err(ManifoldError::EmptyVocabulary);
    }
    let dims = dims.min(n.saturating_sub(1));

    let EigenDecomposition { values, vectors } = solver.decompose(laplacian.into_matrix())?;
    let report = inspect_spectrum(&values, dims)?;
    drop(values);

    info!(
        "spectrum: {} near-zero eigenvalues, largest {:.6}, keeping {} coordinates",
        report.near_zero, report.largest, dims
    );
    if report.is_degenerate() {
        let message = format!(
            "{} near-zero eigenvalues, the similarity graph has disconnected components",
            report.near_zero
        );
        if abort_on_degenerate {
            return Err(ManifoldError::DegenerateGraph(message));
        }
        warn!("{}", message);
    }

    let coordinates = vectors.slice(s![.., 1..=dims]).to_owned();
    drop(vectors);

    if coordinates.iter().any(|x| !x.is_finite()) {
        return Err(ManifoldError::DegenerateGraph("embedding coordinates are not finite".to_string()));
    }
    let embedding = Embedding { coordinates, report };
    debug!(
        "embedding is {}×{}, retained eigenvalues {:?}",
        embedding.coordinates.nrows(), embedding.dims(), embedding.report.retained
    );
    Ok(embedding)
}

fn inspect_spectrum(values: &Array1<f64>, dims: usize) -> Result<SpectralReport> {

    if values.is_empty() {
        return Ok(SpectralReport { near_zero: 0, largest: 0.0, retained: Vec::new() });
    }
    let largest = *values
        .max()
        .map_err(|_| ManifoldError::DegenerateGraph("eigenvalues are not comparable".to_string()))?;
    if !largest.is_finite() {
        return Err(ManifoldError::DegenerateGraph("eigenvalues are not finite".to_string()));
    }

    let tolerance = NEAR_ZERO * largest.abs().max(1.0);
    let near_zero = values.iter().filter(|v| v.abs() <= tolerance).count();
    let retained = values.iter().skip(1).take(dims).copied().collect();

    Ok(SpectralReport { near_zero, largest, retained })
}


#[cfg(test)]
mod tests {

    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use crate::eigen::DenseEigensolver;
    use crate::laplacian::laplacian_from_similarities;
    use super::*;

    fn two_clusters() -> Array2<f64> {
        array![
            [0.0, 1.0, 0.1, 0.0],
            [1.0, 0.0, 0.0, 0.1],
            [0.1, 0.0, 0.0, 1.0],
            [0.0, 0.1, 1.0, 0.0],
        ]
    }

    #[test]
    fn drops_the_trivial_eigenvector() {

        let laplacian = laplacian_from_similarities(two_clusters()).unwrap();
        let embedding = spectral_embedding(laplacian, &DenseEigensolver::default(), 2, false).unwrap();

        assert_eq!(embedding.coordinates.dim(), (4, 2));
        assert_eq!(embedding.report.near_zero, 1);
        assert_eq!(embedding.report.retained.len(), 2);
        assert!(embedding.report.retained[0] > 1e-6);

        // the fiedler vector splits {0, 1} from {2, 3}
        let fiedler = embedding.coordinates.column(0);
        assert!(fiedler[0] * fiedler[1] > 0.0);
        assert!(fiedler[2] * fiedler[3] > 0.0);
        assert!(fiedler[0] * fiedler[2] < 0.0);
        // orthogonal to the constant vector
        assert_abs_diff_eq!(fiedler.sum(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn dimensions_are_clamped() {

        assert_eq!(retained_dimensions(11, 1000), 10);
        assert_eq!(retained_dimensions(11, 4), 3);
        assert_eq!(retained_dimensions(11, 1), 0);

        let laplacian = laplacian_from_similarities(two_clusters()).unwrap();
        let embedding = spectral_embedding(laplacian, &DenseEigensolver::default(), 10, false).unwrap();
        assert_eq!(embedding.dims(), 3);
    }

    #[test]
    fn disconnected_graph_is_reported() {

        let mut w = two_clusters();
        w[[0, 2]] = 0.0;
        w[[2, 0]] = 0.0;
        w[[1, 3]] = 0.0;
        w[[3, 1]] = 0.0;

        let laplacian = laplacian_from_similarities(w.clone()).unwrap();
        let embedding = spectral_embedding(laplacian, &DenseEigensolver::default(), 2, false).unwrap();
        assert_eq!(embedding.report.near_zero, 2);
        assert!(embedding.report.is_degenerate());
        assert!(embedding.coordinates.iter().all(|x| x.is_finite()));

        let laplacian = laplacian_from_similarities(w).unwrap();
        let strict = spectral_embedding(laplacian, &DenseEigensolver::default(), 2, true);
        assert!(matches!(strict, Err(ManifoldError::DegenerateGraph(_))));
    }
}
