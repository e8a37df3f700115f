
// shared contexts between words and their bounded normalization

use crate::contexts::ContextArray;

use ndarray::{Array1, Array2, Axis, Zip};
use log::{debug, info};


/// `A · Aᵀ` for the context array `A`: cell (i, j) counts the context mass words i and j share.
/// Consumes the array so that only the dense product outlives this stage.
pub fn shared_contexts(array: ContextArray) -> Array2<f64> {

    let n = array.n_words();
    let matrix = array.into_matrix();
    let product = &matrix * &matrix.transpose_view();
    drop(matrix);

    let nnz = product.nnz();
    let shared: Array2<f64> = product.to_dense();
    drop(product);

    debug!("shared-context matrix {}×{} from {} sparse non-zeros", n, n, nnz);
    shared
}

/// Square root of each word's self-overlap, the scale used by `normalize`.
pub fn diameters(shared: &Array2<f64>) -> Array1<f64> {
    shared.diag().mapv(|mass| mass.max(0.0).sqrt())
}

/// Turns shared-context counts into cosine weights in place.
///
/// Off-diagonal cells become `S_ij / (d_i d_j)` with `d_i = sqrt(S_ii)`, which lies in [0, 1]
/// for non-negative counts. Pairs involving a word without contexts get 0 and the diagonal
/// is cleared so that no word is its own neighbor in the graph.
pub fn normalize(mut shared: Array2<f64>) -> Array2<f64> {

    let diameter = diameters(&shared);
    let empty = diameter.iter().filter(|&&d| d == 0.0).count();
    if empty > 0 {
        debug!("{} words have zero context mass, their similarities are set to 0", empty);
    }

    Zip::indexed(&mut shared).for_each(|(i, j), value| {
        let scale = diameter[i] * diameter[j];
        *value = if i == j || scale == 0.0 {
            0.0
        } else {
            (*value / scale).clamp(0.0, 1.0)
        };
    });

    info!("normalized similarities for {} words", shared.len_of(Axis(0)));
    shared
}
