
//! Word graph and its combinatorial Laplacian.
//!
//! The normalized similarity matrix is read as a weighted undirected graph over the
//! analyzed words (no self-loops). Its Laplacian `L = D − W` is symmetric positive
//! semi-definite and every row sums to zero, so the constant vector spans part of
//! its null space; each further zero eigenvalue is one more connected component.

use crate::error::{ManifoldError, Result};

use ndarray::{Array1, Array2, Axis};
use log::{debug, info, trace, warn};

pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Weighted adjacency over the analyzed words.
#[derive(Clone, Debug)]
pub struct IncidenceGraph {
    weights: Array2<f64>,
}

impl IncidenceGraph {

    /// Takes over the normalized similarities. Self-loops are cleared and the weights are
    /// symmetrised, so that rounding never breaks the Laplacian invariants.
    pub fn from_similarities(mut weights: Array2<f64>) -> Result<IncidenceGraph> {

        let (rows, cols) = weights.dim();
        if rows != cols {
            return Err(ManifoldError::DegenerateGraph(format!("similarity matrix is {}×{}, expected square", rows, cols)));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ManifoldError::DegenerateGraph("similarity weights must be finite and non-negative".to_string()));
        }

        for i in 0..rows {
            weights[[i, i]] = 0.0;
            for j in (i + 1)..rows {
                let w = 0.5 * (weights[[i, j]] + weights[[j, i]]);
                weights[[i, j]] = w;
                weights[[j, i]] = w;
            }
        }

        Ok(IncidenceGraph { weights })
    }

    pub fn n_nodes(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn degrees(&self) -> Array1<f64> {
        self.weights.sum_axis(Axis(1))
    }

    /// Number of words with no edge at all.
    pub fn isolated(&self) -> usize {
        self.degrees().iter().filter(|&&d| d == 0.0).count()
    }

    /// Number of connected components among the positively weighted edges.
    pub fn components(&self) -> usize {

        let n = self.n_nodes();
        let mut seen = vec![false; n];
        let mut count = 0;
        let mut stack: Vec<usize> = Vec::new();

        for start in 0..n {
            if seen[start] {
                continue;
            }
            count += 1;
            seen[start] = true;
            stack.push(start);
            while let Some(node) = stack.pop() {
                for (next, &w) in self.weights.row(node).iter().enumerate() {
                    if w > 0.0 && !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        count
    }

    /// `D − W`, reusing the adjacency buffer.
    pub fn into_laplacian(self) -> Laplacian {

        let degrees = self.degrees();
        let mut matrix = self.weights;
        matrix.mapv_inplace(|w| -w);
        for (i, degree) in degrees.iter().enumerate() {
            matrix[[i, i]] = *degree;
        }
        trace!("laplacian diagonal filled for {} nodes", degrees.len());
        Laplacian { matrix }
    }

}

#[derive(Clone, Debug)]
pub struct Laplacian {
    matrix: Array2<f64>,
}

impl Laplacian {

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn into_matrix(self) -> Array2<f64> {
        self.matrix
    }

    pub fn n_nodes(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn row_sums(&self) -> Array1<f64> {
        self.matrix.sum_axis(Axis(1))
    }

    /// Largest absolute row sum, zero up to rounding for a well formed Laplacian.
    pub fn max_row_sum(&self) -> f64 {
        self.row_sums().iter().fold(0.0_f64, |acc, s| acc.max(s.abs()))
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.n_nodes();
        (0..n).all(|i| ((i + 1)..n).all(|j| self.matrix[[i, j]] == self.matrix[[j, i]]))
    }

    /// Checks symmetry and zero row sums, scaled by the largest degree.
    pub fn check(&self) -> Result<()> {

        if !self.is_symmetric() {
            return Err(ManifoldError::DegenerateGraph("laplacian is not symmetric".to_string()));
        }
        let scale = self.matrix.diag().iter().fold(1.0_f64, |acc, d| acc.max(d.abs()));
        let worst = self.max_row_sum();
        if worst > ROW_SUM_TOLERANCE * scale {
            return Err(ManifoldError::DegenerateGraph(format!("laplacian row sum {} is not zero", worst)));
        }
        debug!("laplacian invariants hold, worst row sum {:e}", worst);
        Ok(())
    }

}

/// Builds the graph from normalized similarities and returns its verified Laplacian.
/// The adjacency buffer becomes the Laplacian, so no second N×N matrix is held.
pub fn laplacian_from_similarities(similarities: Array2<f64>) -> Result<Laplacian> {

    let graph = IncidenceGraph::from_similarities(similarities)?;

    let isolated = graph.isolated();
    let components = graph.components();
    info!("incidence graph: {} words, {} components, {} isolated", graph.n_nodes(), components, isolated);
    if components > 1 {
        warn!("similarity graph has {} connected components, the embedding of small components will be degenerate", components);
    }

    let laplacian = graph.into_laplacian();
    laplacian.check()?;
    Ok(laplacian)
}


#[cfg(test)]
mod tests {

    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use super::*;

    #[test]
    fn laplacian_is_degree_minus_adjacency() {

        let w = array![[0.0, 0.5, 0.25], [0.5, 0.0, 1.0], [0.25, 1.0, 0.0]];
        let laplacian = laplacian_from_similarities(w).unwrap();
        let l = laplacian.matrix();

        assert_abs_diff_eq!(l[[0, 0]], 0.75, epsilon = 1e-15);
        assert_abs_diff_eq!(l[[1, 1]], 1.5, epsilon = 1e-15);
        assert_abs_diff_eq!(l[[2, 2]], 1.25, epsilon = 1e-15);
        assert_eq!(l[[0, 1]], -0.5);
        assert_eq!(l[[2, 1]], -1.0);
        assert!(laplacian.is_symmetric());
        for s in laplacian.row_sums().iter() {
            assert!(s.abs() < 1e-9);
        }
    }

    #[test]
    fn self_loops_and_asymmetry_are_removed() {

        let w = array![[0.7, 0.2], [0.4, 0.9]];
        let graph = IncidenceGraph::from_similarities(w).unwrap();
        assert_eq!(graph.weights()[[0, 0]], 0.0);
        assert_abs_diff_eq!(graph.weights()[[0, 1]], 0.3, epsilon = 1e-15);
        assert_eq!(graph.weights()[[0, 1]], graph.weights()[[1, 0]]);
    }

    #[test]
    fn components_count_isolated_words() {

        let w = array![
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.5],
            [0.0, 0.0, 0.5, 0.0],
        ];
        assert_eq!(IncidenceGraph::from_similarities(w.clone()).unwrap().components(), 2);

        let mut lonely = w;
        lonely[[2, 3]] = 0.0;
        lonely[[3, 2]] = 0.0;
        let graph = IncidenceGraph::from_similarities(lonely).unwrap();
        assert_eq!(graph.components(), 3);
        assert_eq!(graph.isolated(), 2);
    }

    #[test]
    fn rejects_non_finite_weights() {

        let w = array![[0.0, f64::NAN], [f64::NAN, 0.0]];
        assert!(matches!(laplacian_from_similarities(w), Err(ManifoldError::DegenerateGraph(_))));
    }
}
