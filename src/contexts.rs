
//! Sparse word × context incidence.
//!
//! Contexts are discovered while scanning the n-gram records: the slot the word
//! occupies is written `__` and the remaining tokens form the key, so the trigram
//! `the cat sat` yields `the __ sat` for `cat`, `__ cat sat` for `the` and
//! `the cat __` for `sat`. Every new key is interned to the next free column.

use crate::error::{ManifoldError, Result};
use crate::vocab::NgramRecord;

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use log::{debug, info};
use sprs::{CsMat, TriMat};

const SLOT: &str = "__";

/// How repeated occurrences of a word in a context fill its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weighting {
    /// Sum of the record counts.
    Count,
    /// 1 whenever the pair was seen at all.
    Binary,
}

impl Display for Weighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Weighting::Count => write!(f, "count"),
            Weighting::Binary => write!(f, "binary"),
        }
    }
}

impl FromStr for Weighting {
    type Err = ManifoldError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "count" => Ok(Weighting::Count),
            "binary" => Ok(Weighting::Binary),
            other => Err(ManifoldError::Config(format!("unknown weighting '{}', expected count or binary", other))),
        }
    }
}

/// Dense column indices for context keys, assigned on first sight.
#[derive(Clone, Debug, Default)]
pub struct ContextInterner {
    index: HashMap<String, usize>,
    keys: Vec<String>,
}

impl ContextInterner {

    pub fn intern(&mut self, key: String) -> usize {
        if let Some(&col) = self.index.get(&key) {
            return col;
        }
        let col = self.keys.len();
        self.index.insert(key.clone(), col);
        self.keys.push(key);
        col
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn key(&self, col: usize) -> Option<&str> {
        self.keys.get(col).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

}

/// Key of the context seen by the token at `slot` of `tokens`.
pub fn context_key(tokens: &[String], slot: usize) -> String {
    tokens
        .iter()
        .enumerate()
        .map(|(i, tok)| if i == slot { SLOT } else { tok.as_str() })
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Rows are the analyzed words in vocabulary order, columns the interned contexts.
#[derive(Clone, Debug)]
pub struct ContextArray {
    matrix: CsMat<f64>,
    contexts: ContextInterner,
}

impl ContextArray {

    pub fn matrix(&self) -> &CsMat<f64> {
        &self.matrix
    }

    pub fn contexts(&self) -> &ContextInterner {
        &self.contexts
    }

    pub fn n_words(&self) -> usize {
        self.matrix.rows()
    }

    pub fn n_contexts(&self) -> usize {
        self.matrix.cols()
    }

    /// Value of cell `(word, context)`, zero when the pair never occurred.
    #[cfg(test)]
    pub(crate) fn get(&self, word: usize, context: usize) -> f64 {
        self.matrix.get(word, context).copied().unwrap_or(0.0)
    }

    /// Total context mass of each word.
    pub fn row_sums(&self) -> Vec<f64> {
        self.matrix
            .outer_iterator()
            .map(|row| row.data().iter().sum())
            .collect()
    }

    pub fn into_matrix(self) -> CsMat<f64> {
        self.matrix
    }

}

/// Ordered `key -> members` lists kept for inspection output.
pub type InspectionMap = Vec<(String, Vec<String>)>;

#[derive(Clone, Debug)]
pub struct ContextBuild {
    pub array: ContextArray,
    pub word_to_contexts: Option<InspectionMap>,
    pub context_to_words: Option<InspectionMap>,
}

pub struct ContextArrayBuilder<'a> {
    words: &'a [String],
    weighting: Weighting,
    word_to_contexts: bool,
    context_to_words: bool,
}

impl<'a> ContextArrayBuilder<'a> {

    pub fn new(words: &'a [String]) -> ContextArrayBuilder<'a> {
        ContextArrayBuilder { words, weighting: Weighting::Count, word_to_contexts: false, context_to_words: false }
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_word_to_contexts(mut self, enabled: bool) -> Self {
        self.word_to_contexts = enabled;
        self
    }

    pub fn with_context_to_words(mut self, enabled: bool) -> Self {
        self.context_to_words = enabled;
        self
    }

    /// Scans trigrams then bigrams and accumulates one cell per (word, context) occurrence.
    pub fn build(self, bigrams: &[NgramRecord], trigrams: &[NgramRecord]) -> ContextBuild {

        let row_of: HashMap<&str, usize> = self
            .words
            .iter()
            .enumerate()
            .map(|(row, word)| (word.as_str(), row))
            .collect();

        let mut contexts = ContextInterner::default();
        let mut cells: HashMap<(usize, usize), f64> = HashMap::new();
        let mut first_seen: Vec<(usize, usize)> = Vec::new();

        for record in trigrams.iter().chain(bigrams.iter()) {
            for (slot, tok) in record.tokens.iter().enumerate() {
                let row = match row_of.get(tok.as_str()) {
                    Some(row) => *row,
                    None => continue,
                };
                let col = contexts.intern(context_key(&record.tokens, slot));
                let cell = cells.entry((row, col)).or_insert_with(|| {
                    first_seen.push((row, col));
                    0.0
                });
                *cell += record.count;
            }
        }

        let n_words = self.words.len();
        let n_contexts = contexts.len();
        let mut triplets = TriMat::new((n_words, n_contexts));
        for &(row, col) in &first_seen {
            let value = match self.weighting {
                Weighting::Count => cells[&(row, col)],
                Weighting::Binary => 1.0,
            };
            triplets.add_triplet(row, col, value);
        }
        let matrix: CsMat<f64> = triplets.to_csr();

        let empty_rows = matrix.outer_iterator().filter(|row| row.nnz() == 0).count();
        if empty_rows > 0 {
            debug!("{} analyzed words have no observed context", empty_rows);
        }
        info!("context array: {} words × {} contexts, {} non-zeros", n_words, n_contexts, matrix.nnz());

        let word_to_contexts = if self.word_to_contexts {
            Some(word_to_contexts(self.words, &contexts, &first_seen))
        } else {
            None
        };
        let context_to_words = if self.context_to_words {
            Some(context_to_words(self.words, &contexts, &first_seen))
        } else {
            None
        };

        let array = ContextArray { matrix, contexts };
        let without_contexts = array.row_sums().iter().filter(|&&mass| mass == 0.0).count();
        if without_contexts > 0 {
            info!("{} analyzed words occur in no context", without_contexts);
        }

        ContextBuild { array, word_to_contexts, context_to_words }
    }

}

fn word_to_contexts(words: &[String], contexts: &ContextInterner, pairs: &[(usize, usize)]) -> InspectionMap {
    let mut lists: Vec<Vec<String>> = vec![Vec::new(); words.len()];
    let mut order: Vec<usize> = Vec::new();
    for &(row, col) in pairs {
        if lists[row].is_empty() {
            order.push(row);
        }
        lists[row].push(contexts.key(col).unwrap_or_default().to_string());
    }
    let map = order.into_iter().map(|row| (words[row].clone(), std::mem::take(&mut lists[row]))).collect();
    by_descending_length(map)
}

fn context_to_words(words: &[String], contexts: &ContextInterner, pairs: &[(usize, usize)]) -> InspectionMap {
    let mut lists: Vec<Vec<String>> = vec![Vec::new(); contexts.len()];
    for &(row, col) in pairs {
        lists[col].push(words[row].clone());
    }
    let map = lists
        .into_iter()
        .enumerate()
        .map(|(col, members)| (contexts.key(col).unwrap_or_default().to_string(), members))
        .collect();
    by_descending_length(map)
}

/// Longest lists first; equal lengths keep their first-seen order.
pub fn by_descending_length(mut map: InspectionMap) -> InspectionMap {
    map.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));
    map
}
