
// word list and n-gram records feeding the context array

use crate::error::{ManifoldError, Result};
use crate::files_handling::open_lines;

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;
use log::{debug, info, warn};


/// Ranked word types, most frequent first. Rank 1 is the first line of the word list.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    entries: Vec<(String, usize)>,
    ranks: HashMap<String, usize>,
}

impl Vocabulary {

    /// Builds a vocabulary from `(word, frequency)` pairs given in rank order.
    /// A repeated word keeps its first (best) rank.
    pub fn from_entries<I, S>(entries: I) -> Vocabulary
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut vocab = Vocabulary::default();
        for (word, frequency) in entries {
            vocab.push(word.into(), frequency);
        }
        vocab
    }

    fn push(&mut self, word: String, frequency: usize) {
        if self.ranks.contains_key(&word) {
            debug!("word {} listed twice, keeping its first rank", word);
            return;
        }
        self.ranks.insert(word.clone(), self.entries.len() + 1);
        self.entries.push((word, frequency));
    }

    /// Reads a word list: one `word [count]` per line, `#` lines are comments.
    pub fn load(file_path: &Path) -> Result<Vocabulary> {

        let mut vocab = Vocabulary::default();
        for (line_no, line) in open_lines(file_path)?.lines().enumerate() {

            let line = line.map_err(|e| ManifoldError::on_read(file_path, e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let word = fields.next().unwrap_or_default().to_string();
            let frequency = match fields.next() {
                Some(count) => count.parse::<usize>().map_err(|_| ManifoldError::Parse {
                    path: file_path.to_path_buf(),
                    line: line_no + 1,
                    reason: format!("word count '{}' is not an integer", count),
                })?,
                None => 0,
            };
            vocab.push(word, frequency);
        }

        info!("read {} word types from {}", vocab.len(), file_path.display());
        Ok(vocab)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rank(&self, word: &str) -> Option<usize> {
        self.ranks.get(word).copied()
    }

    pub fn frequency(&self, word: &str) -> Option<usize> {
        self.rank(word).map(|rank| self.entries[rank - 1].1)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(word, _)| word.as_str())
    }

    /// The first `max_word_types` words, clamped to the vocabulary size.
    pub fn analyzed(&self, max_word_types: usize) -> Vec<String> {
        let n = max_word_types.min(self.len());
        if n < max_word_types {
            warn!("only {} word types available, analysing {} instead of {}", self.len(), n, max_word_types);
        }
        info!("number of words for analysis adjusted to {}", n);
        self.entries[..n].iter().map(|(word, _)| word.clone()).collect()
    }

}


/// One bigram or trigram line with its corpus count.
#[derive(Clone, Debug, PartialEq)]
pub struct NgramRecord {
    pub tokens: Vec<String>,
    pub count: f64,
}

impl NgramRecord {

    pub fn new<S: Into<String>>(tokens: impl IntoIterator<Item = S>, count: f64) -> NgramRecord {
        NgramRecord { tokens: tokens.into_iter().map(Into::into).collect(), count }
    }

    fn touches(&self, analyzed: &HashSet<&str>) -> bool {
        self.tokens.iter().any(|tok| analyzed.contains(tok.as_str()))
    }

}

/// Parses one n-gram line: `order` tokens optionally followed by a count.
fn parse_record(line: &str, order: usize) -> std::result::Result<Option<NgramRecord>, String> {

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    if fields.len() == order {
        return Ok(Some(NgramRecord::new(fields, 1.0)));
    }
    if fields.len() != order + 1 {
        return Err(format!("expected {} tokens and a count, found {} fields", order, fields.len()));
    }

    let count = fields[order]
        .parse::<f64>()
        .map_err(|_| format!("count '{}' is not numeric", fields[order]))?;
    if !count.is_finite() || count < 0.0 {
        return Err(format!("count '{}' must be finite and non-negative", fields[order]));
    }
    Ok(Some(NgramRecord::new(fields[..order].iter().copied(), count)))
}

/// Reads an n-gram file, keeping only the records that mention an analyzed word.
pub fn read_ngrams(file_path: &Path, order: usize, analyzed: &[String]) -> Result<Vec<NgramRecord>> {

    let keep: HashSet<&str> = analyzed.iter().map(String::as_str).collect();
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in open_lines(file_path)?.lines().enumerate() {
        let line = line.map_err(|e| ManifoldError::on_read(file_path, e))?;
        let record = parse_record(&line, order).map_err(|reason| ManifoldError::Parse {
            path: file_path.to_path_buf(),
            line: line_no + 1,
            reason,
        })?;
        match record {
            Some(record) if record.touches(&keep) => records.push(record),
            Some(_) => skipped += 1,
            None => continue,
        }
    }

    debug!("{}: kept {} records, skipped {} without analyzed words", file_path.display(), records.len(), skipped);
    Ok(records)
}


/// Everything the context array needs, read from the word list and the n-gram files.
#[derive(Clone, Debug)]
pub struct LoadedInput {
    pub vocabulary: Vocabulary,
    pub analyzed: Vec<String>,
    pub bigrams: Vec<NgramRecord>,
    pub trigrams: Vec<NgramRecord>,
}

impl LoadedInput {

    pub fn load(words_file: &Path, bigrams_file: &Path, trigrams_file: &Path, max_word_types: usize) -> Result<LoadedInput> {

        let vocabulary = Vocabulary::load(words_file)?;
        if vocabulary.is_empty() {
            return Err(ManifoldError::EmptyVocabulary);
        }
        info!("corpus has {} word types", vocabulary.len());

        let analyzed = vocabulary.analyzed(max_word_types);
        if let Some(last) = analyzed.last() {
            debug!("least frequent analyzed word '{}' occurs {} times", last, vocabulary.frequency(last).unwrap_or(0));
        }
        let bigrams = read_ngrams(bigrams_file, 2, &analyzed)?;
        let trigrams = read_ngrams(trigrams_file, 3, &analyzed)?;
        info!("read {} bigram and {} trigram records", bigrams.len(), trigrams.len());

        Ok(LoadedInput { vocabulary, analyzed, bigrams, trigrams })
    }

}
