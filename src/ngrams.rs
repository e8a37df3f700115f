
// n-gram extraction, run when a corpus has no word list yet

use crate::error::{ManifoldError, Result};
use crate::files_handling::{open_lines, write_text};

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Instant;
use log::info;


/// Counts of one n-gram order, remembering first-appearance order for stable ties.
#[derive(Clone, Debug, Default)]
pub struct NgramCounts {
    index: HashMap<Vec<String>, usize>,
    entries: Vec<(Vec<String>, usize)>,
}

impl NgramCounts {

    fn add(&mut self, gram: &[String]) {
        match self.index.get(gram) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(gram.to_vec(), self.entries.len());
                self.entries.push((gram.to_vec(), 1));
            }
        }
    }

    /// Most frequent first, ties in order of first appearance.
    pub fn ranked(&self) -> Vec<(&[String], usize)> {
        let mut ranked: Vec<(&[String], usize)> = self.entries.iter().map(|(g, c)| (g.as_slice(), *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn count(&self, gram: &[&str]) -> usize {
        let key: Vec<String> = gram.iter().map(|s| s.to_string()).collect();
        self.index.get(&key).map_or(0, |&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}

// defines how a corpus line becomes tokens
trait Tokenizer {
    fn tokenize(sequence: &str) -> Vec<String>;
}

/// Unigram, bigram and trigram counts of a corpus.
#[derive(Clone, Debug, Default)]
pub struct Ngrams {
    pub words: NgramCounts,
    pub bigrams: NgramCounts,
    pub trigrams: NgramCounts,
}

impl Tokenizer for Ngrams {
    // whitespace split, the corpus is expected to be tokenized already
    fn tokenize(sequence: &str) -> Vec<String> {
        sequence.split_whitespace().map(|x| x.to_string()).collect()
    }
}

impl Ngrams {

    /// Adds the n-grams of one corpus line; n-grams never cross line boundaries.
    pub fn accumulate(&mut self, line: &str) {

        let tokens = Ngrams::tokenize(line);
        for window in tokens.windows(1) {
            self.words.add(window);
        }
        for window in tokens.windows(2) {
            self.bigrams.add(window);
        }
        for window in tokens.windows(3) {
            self.trigrams.add(window);
        }
    }

    pub fn load(corpus_file: &Path) -> Result<Ngrams> {

        let mut ngrams = Ngrams::default();
        for line in open_lines(corpus_file)?.lines() {
            let line = line.map_err(|e| ManifoldError::on_read(corpus_file, e))?;
            ngrams.accumulate(&line);
        }
        Ok(ngrams)
    }

    fn render(counts: &NgramCounts, title: &str, corpus_file: &Path) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "# {} in {}", title, corpus_file.display());
        let _ = writeln!(text, "# {} distinct", counts.len());
        for (gram, count) in counts.ranked() {
            let _ = writeln!(text, "{} {}", gram.join(" "), count);
        }
        text
    }

    /// Writes the three ranked files the loader reads.
    pub fn save(&self, corpus_file: &Path, words_file: &Path, bigrams_file: &Path, trigrams_file: &Path) -> Result<()> {
        write_text(words_file, &Ngrams::render(&self.words, "words", corpus_file))?;
        write_text(bigrams_file, &Ngrams::render(&self.bigrams, "bigrams", corpus_file))?;
        write_text(trigrams_file, &Ngrams::render(&self.trigrams, "trigrams", corpus_file))?;
        Ok(())
    }

}

/// Output locations of an extraction run.
#[derive(Clone, Debug)]
pub struct NgramFiles {
    pub words: PathBuf,
    pub bigrams: PathBuf,
    pub trigrams: PathBuf,
}

/// Reads `corpus_file` and writes its word, bigram and trigram lists.
pub fn extract(corpus_file: &Path, files: &NgramFiles) -> Result<()> {

    let timer = Instant::now();
    info!("extracting n-grams from {}", corpus_file.display());

    let ngrams = Ngrams::load(corpus_file)?;
    ngrams.save(corpus_file, &files.words, &files.bigrams, &files.trigrams)?;

    info!(
        "wrote {} words, {} bigrams, {} trigrams in {} seconds",
        ngrams.words.len(), ngrams.bigrams.len(), ngrams.trigrams.len(), timer.elapsed().as_secs()
    );
    Ok(())
}


#[cfg(test)]
mod tests {

    use std::fs;
    use crate::vocab::{read_ngrams, NgramRecord, Vocabulary};
    use super::*;

    #[test]
    fn counts_within_lines() {

        let mut ngrams = Ngrams::default();
        ngrams.accumulate("the cat sat on the mat");
        ngrams.accumulate("the dog sat");

        assert_eq!(ngrams.words.count(&["the"]), 3);
        assert_eq!(ngrams.words.count(&["sat"]), 2);
        assert_eq!(ngrams.bigrams.count(&["the", "cat"]), 1);
        assert_eq!(ngrams.bigrams.count(&["mat", "the"]), 0);
        assert_eq!(ngrams.trigrams.count(&["the", "dog", "sat"]), 1);
        assert_eq!(ngrams.trigrams.len(), 5);
    }

    #[test]
    fn ranking_keeps_first_appearance_for_ties() {

        let mut ngrams = Ngrams::default();
        ngrams.accumulate("b a c a");
        let ranked: Vec<(String, usize)> = ngrams.words.ranked().iter().map(|(g, c)| (g.join(" "), *c)).collect();
        assert_eq!(ranked, vec![("a".to_string(), 2), ("b".to_string(), 1), ("c".to_string(), 1)]);
    }

    #[test]
    fn extracted_files_are_readable_by_the_loader() {

        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("toy.txt");
        fs::write(&corpus, "the cat sat\nthe dog sat\n").unwrap();
        let files = NgramFiles {
            words: dir.path().join("ngrams/toy_words.txt"),
            bigrams: dir.path().join("ngrams/toy_bigrams.txt"),
            trigrams: dir.path().join("ngrams/toy_trigrams.txt"),
        };

        extract(&corpus, &files).unwrap();

        let vocab = Vocabulary::load(&files.words).unwrap();
        assert_eq!(vocab.words().collect::<Vec<_>>(), vec!["the", "sat", "cat", "dog"]);
        assert_eq!(vocab.frequency("the"), Some(2));

        let analyzed = vocab.analyzed(4);
        let bigrams = read_ngrams(&files.bigrams, 2, &analyzed).unwrap();
        assert_eq!(bigrams[0], NgramRecord::new(["the", "cat"], 1.0));
        assert_eq!(bigrams.len(), 4);
        let trigrams = read_ngrams(&files.trigrams, 3, &analyzed).unwrap();
        assert_eq!(trigrams.len(), 2);
    }

    #[test]
    fn missing_corpus_is_fatal() {

        let dir = tempfile::tempdir().unwrap();
        let files = NgramFiles {
            words: dir.path().join("w.txt"),
            bigrams: dir.path().join("b.txt"),
            trigrams: dir.path().join("t.txt"),
        };
        assert!(matches!(extract(&dir.path().join("absent.txt"), &files), Err(ManifoldError::MissingInput { .. })));
    }
}
