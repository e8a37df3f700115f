
// nearest words in the spectral embedding

use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use log::{info, warn};


/// Euclidean distances between all rows of `coordinates`; symmetric with a zero diagonal.
pub fn pairwise_distances(coordinates: &Array2<f64>) -> Array2<f64> {

    let n = coordinates.nrows();
    let mut distances = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        let row_i = coordinates.row(i);
        for j in (i + 1)..n {
            let d = euclidean(row_i, coordinates.row(j));
            distances[[i, j]] = d;
            distances[[j, i]] = d;
        }
    }
    distances
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Effective neighbor count for `n` words: never more than the other words available.
pub fn clamp_neighbors(requested: usize, n: usize) -> usize {
    let available = n.saturating_sub(1);
    if requested > available {
        warn!("{} neighbors requested but only {} other words, keeping {}", requested, available, available);
        available
    } else {
        requested
    }
}

/// Row indices of each word's nearest other words with their distances, closest first.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborTable {
    pub indices: Vec<Vec<usize>>,
    pub distances: Vec<Vec<f64>>,
}

/// Ranks row `i` of the distance matrix: self excluded, ascending distance,
/// ties resolved by the lower row index.
fn closest_in_row(i: usize, row: ArrayView1<f64>, k: usize) -> (Vec<usize>, Vec<f64>) {

    let mut indexed: Vec<(usize, f64)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .collect();

    // stable, and the candidates are already in index order
    indexed.sort_by(|(_, s), (_, t)| s.total_cmp(t));
    indexed.truncate(k);

    indexed.into_iter().unzip()
}

/// For every word the `k` closest other words (clamped to `n - 1`).
/// Consumes the distance matrix once every row has been ranked.
pub fn closest_neighbors(distances: Array2<f64>, k: usize) -> NeighborTable {

    let n = distances.nrows();
    let k = clamp_neighbors(k, n);

    let ranked: Vec<(Vec<usize>, Vec<f64>)> = (0..n)
        .into_par_iter()
        .map(|i| closest_in_row(i, distances.row(i), k))
        .collect();
    drop(distances);

    info!("found {} nearest neighbors for {} words", k, n);
    let (indices, distances) = ranked.into_iter().unzip();
    NeighborTable { indices, distances }
}

/// Word → ordered neighbor words, in analyzed-word order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WordNeighbors {
    entries: Vec<(String, Vec<String>)>,
}

impl WordNeighbors {

    pub fn from_table(words: &[String], table: &NeighborTable) -> WordNeighbors {
        let entries = words
            .iter()
            .zip(table.indices.iter())
            .map(|(word, row)| (word.clone(), row.iter().map(|&j| words[j].clone()).collect()))
            .collect();
        WordNeighbors { entries }
    }

    pub fn from_entries(entries: Vec<(String, Vec<String>)>) -> WordNeighbors {
        WordNeighbors { entries }
    }

    pub fn get(&self, word: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(w, _)| w == word)
            .map(|(_, neighbors)| neighbors.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(w, n)| (w.as_str(), n.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}


#[cfg(test)]
mod tests {

    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use super::*;

    #[test]
    fn distances_are_symmetric_with_zero_diagonal() {

        let coords = array![[0.0, 0.0], [3.0, 4.0], [0.0, 1.0]];
        let d = pairwise_distances(&coords);
        assert_abs_diff_eq!(d[[0, 1]], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d[[1, 2]], 18.0_f64.sqrt(), epsilon = 1e-12);
        for i in 0..3 {
            assert_eq!(d[[i, i]], 0.0);
            for j in 0..3 {
                assert_eq!(d[[i, j]], d[[j, i]]);
            }
        }
    }

    #[test]
    fn neighbors_are_sorted_and_exclude_self() {

        let coords = array![[0.0], [1.0], [3.0], [3.5], [10.0]];
        let table = closest_neighbors(pairwise_distances(&coords), 2);

        assert_eq!(table.indices[0], vec![1, 2]);
        assert_eq!(table.indices[2], vec![3, 1]);
        assert_eq!(table.indices[4], vec![3, 2]);
        for (i, (row, dists)) in table.indices.iter().zip(table.distances.iter()).enumerate() {
            assert_eq!(row.len(), 2);
            assert!(!row.contains(&i));
            assert!(dists.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn ties_prefer_lower_row_index() {

        // every point at the same distance from point 2
        let coords = array![[1.0], [1.0], [0.0], [-1.0], [-1.0]];
        let table = closest_neighbors(pairwise_distances(&coords), 3);
        assert_eq!(table.indices[2], vec![0, 1, 3]);
        assert_eq!(table.indices[0], vec![1, 2, 3]);
    }

    #[test]
    fn neighbor_count_is_clamped() {

        let coords = array![[0.0], [1.0], [2.0]];
        let table = closest_neighbors(pairwise_distances(&coords), 9);
        assert!(table.indices.iter().all(|row| row.len() == 2));

        let single = closest_neighbors(pairwise_distances(&array![[0.0]]), 9);
        assert_eq!(single.indices, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn word_mapping_follows_row_order() {

        let words: Vec<String> = ["a", "b", "c"].iter().map(|w| w.to_string()).collect();
        let table = NeighborTable { indices: vec![vec![2], vec![0], vec![1]], distances: vec![vec![0.1]; 3] };
        let neighbors = WordNeighbors::from_table(&words, &table);

        assert_eq!(neighbors.get("a"), Some(&["c".to_string()][..]));
        assert_eq!(neighbors.iter().map(|(w, _)| w).collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(neighbors.get("zzz").is_none());
    }
}
