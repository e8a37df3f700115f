//! Dense symmetric eigensolver.
//!
//! `DenseEigensolver` hands the matrix to `nalgebra`'s symmetric QR decomposition
//! and reorders the eigenpairs by ascending eigenvalue.

use crate::error::{ManifoldError, Result};

use ndarray::{Array1, Array2};
use nalgebra::{DMatrix, SymmetricEigen};
use log::debug;

/// Eigenvalues in ascending order and the matching unit eigenvectors as columns.
#[derive(Clone, Debug)]
pub struct EigenDecomposition {
    pub values: Array1<f64>,
    pub vectors: Array2<f64>,
}

/// Anything that can diagonalise a real symmetric matrix.
pub trait SymmetricEigensolver {
    /// Consumes `matrix` (only its values are used, symmetry is assumed) and returns
    /// the full decomposition sorted by ascending eigenvalue.
    fn decompose(&self, matrix: Array2<f64>) -> Result<EigenDecomposition>;
}

#[derive(Clone, Copy, Debug)]
pub struct DenseEigensolver {
    /// Convergence threshold on off-diagonal entries.
    pub epsilon: f64,
    /// Cap on QR sweeps over the whole matrix, 0 for no cap.
    pub max_iterations: usize,
}

impl Default for DenseEigensolver {
    fn default() -> Self {
        DenseEigensolver { epsilon: f64::EPSILON, max_iterations: 0 }
    }
}

impl SymmetricEigensolver for DenseEigensolver {

    fn decompose(&self, matrix: Array2<f64>) -> Result<EigenDecomposition> {

        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(ManifoldError::DegenerateGraph(format!("cannot diagonalise a {}×{} matrix", rows, cols)));
        }
        if matrix.iter().any(|x| !x.is_finite()) {
            return Err(ManifoldError::DegenerateGraph("matrix holds non-finite values".to_string()));
        }

        let n = rows;
        if n == 0 {
            return Ok(EigenDecomposition { values: Array1::zeros(0), vectors: Array2::zeros((0, 0)) });
        }

        // row-major data read as column-major is the transpose, i.e. the same symmetric matrix
        let data = if matrix.is_standard_layout() {
            matrix.into_raw_vec()
        } else {
            matrix.iter().copied().collect()
        };
        let eigen = SymmetricEigen::try_new(DMatrix::from_vec(n, n, data), self.epsilon, self.max_iterations)
            .ok_or(ManifoldError::NoConvergence { iterations: self.max_iterations })?;
        debug!("symmetric eigendecomposition done for n = {}", n);

        Ok(sorted(eigen))
    }

}

/// Orders eigenpairs by ascending eigenvalue; equal values keep the solver's order.
fn sorted(eigen: SymmetricEigen<f64, nalgebra::Dyn>) -> EigenDecomposition {

    let eigenvalues = &eigen.eigenvalues;
    let eigenvectors = &eigen.eigenvectors;
    let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigenvalues[a].total_cmp(&eigenvalues[b]));

    let values = Array1::from_iter(order.iter().map(|&i| eigenvalues[i]));
    let vectors = Array2::from_shape_fn((eigenvectors.nrows(), order.len()), |(i, j)| eigenvectors[(i, order[j])]);
    EigenDecomposition { values, vectors }
}


#[cfg(test)]
mod tests {

    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2, Axis};
    use ndarray_rand::RandomExt;
    use ndarray_rand::rand_distr::Uniform;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use super::*;

    fn random_symmetric(n: usize, seed: u64) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let a: Array2<f64> = Array2::random_using((n, n), Uniform::new(-1.0, 1.0), &mut rng);
        &a + &a.t()
    }

    fn assert_decomposes(matrix: &Array2<f64>, dec: &EigenDecomposition, tol: f64) {

        let n = matrix.nrows();
        // A V = V Λ
        let av = matrix.dot(&dec.vectors);
        for j in 0..n {
            for i in 0..n {
                assert_abs_diff_eq!(av[[i, j]], dec.vectors[[i, j]] * dec.values[j], epsilon = tol);
            }
        }
        // Vᵀ V = I
        let gram = dec.vectors.t().dot(&dec.vectors);
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(gram[[i, j]], expected, epsilon = tol);
            }
        }
        // ascending
        for w in dec.values.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn two_by_two() {

        let m = array![[2.0, 1.0], [1.0, 2.0]];
        let dec = DenseEigensolver::default().decompose(m.clone()).unwrap();
        assert_abs_diff_eq!(dec.values[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dec.values[1], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dec.vectors[[0, 0]].abs(), 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_decomposes(&m, &dec, 1e-12);
    }

    #[test]
    fn diagonal_and_trivial_sizes() {

        let m = array![[3.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 2.0]];
        let dec = DenseEigensolver::default().decompose(m.clone()).unwrap();
        assert_abs_diff_eq!(dec.values[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dec.values[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dec.values[2], 3.0, epsilon = 1e-12);
        assert_decomposes(&m, &dec, 1e-12);

        let one = array![[5.0]];
        let dec = DenseEigensolver::default().decompose(one).unwrap();
        assert_abs_diff_eq!(dec.values[0], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dec.vectors[[0, 0]].abs(), 1.0, epsilon = 1e-12);

        let empty = DenseEigensolver::default().decompose(Array2::zeros((0, 0))).unwrap();
        assert_eq!(empty.values.len(), 0);
    }

    #[test]
    fn random_symmetric_matrices() {

        for (n, seed) in [(5, 1), (17, 2), (40, 3)] {
            let m = random_symmetric(n, seed);
            let dec = DenseEigensolver::default().decompose(m.clone()).unwrap();
            assert_decomposes(&m, &dec, 1e-9);
        }
    }

    #[test]
    fn column_major_layout_gives_the_same_spectrum() {

        let m = random_symmetric(6, 4);
        let standard = DenseEigensolver::default().decompose(m.clone()).unwrap();
        let column_major = DenseEigensolver::default().decompose(m.clone().reversed_axes()).unwrap();
        for k in 0..6 {
            assert_abs_diff_eq!(standard.values[k], column_major.values[k], epsilon = 1e-12);
        }
        assert_decomposes(&m, &column_major, 1e-10);
    }

    #[test]
    fn path_graph_laplacian_spectrum() {

        // eigenvalues of the path P_n Laplacian are 2 - 2 cos(pi k / n)
        let n = 8;
        let mut l = Array2::<f64>::zeros((n, n));
        for i in 0..(n - 1) {
            l[[i, i + 1]] = -1.0;
            l[[i + 1, i]] = -1.0;
        }
        let degrees = l.sum_axis(Axis(1)).mapv(|s| -s);
        for i in 0..n {
            l[[i, i]] = degrees[i];
        }

        let dec = DenseEigensolver::default().decompose(l.clone()).unwrap();
        for k in 0..n {
            let expected = 2.0 - 2.0 * (std::f64::consts::PI * k as f64 / n as f64).cos();
            assert_abs_diff_eq!(dec.values[k], expected, epsilon = 1e-10);
        }
        // the trivial eigenvector is constant
        let first = dec.vectors.column(0);
        for x in first.iter() {
            assert_abs_diff_eq!(x.abs(), 1.0 / (n as f64).sqrt(), epsilon = 1e-10);
        }
        assert_decomposes(&l, &dec, 1e-10);
    }

    #[test]
    fn iteration_cap_reports_no_convergence() {

        let solver = DenseEigensolver { max_iterations: 1, ..DenseEigensolver::default() };
        let result = solver.decompose(random_symmetric(40, 5));
        assert!(matches!(result, Err(ManifoldError::NoConvergence { iterations: 1 })));
    }

    #[test]
    fn non_finite_input_is_rejected() {

        let m = array![[1.0, f64::INFINITY], [f64::INFINITY, 1.0]];
        assert!(DenseEigensolver::default().decompose(m).is_err());
    }
}
