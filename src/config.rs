
use crate::contexts::Weighting;
use crate::error::{ManifoldError, Result};

use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use serde_json::Value;

pub const DEFAULT_MAX_WORD_TYPES: usize = 1000;
pub const DEFAULT_NEIGHBORS: usize = 9;
pub const DEFAULT_EIGENVECTORS: usize = 11;

#[derive(Clone, Debug, PartialEq)]
pub struct ManifoldParams {
    pub language: String,
    pub corpus: String,
    pub datafolder: PathBuf,
    pub max_word_types: usize,
    pub n_neighbors: usize,
    pub n_eigenvectors: usize,
    pub word_to_contexts: bool,
    pub context_to_words: bool,
    pub weighting: Weighting,
    pub abort_on_degenerate: bool,
    pub save_coordinates: bool,
}

impl Display for ManifoldParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using parameters:
        language: {}
        corpus: {}
        datafolder: {}
        maxwordtypes: {}
        nNeighbors: {}
        nEigenvectors: {}
        wordtocontexts: {}
        contexttowords: {}
        weighting: {}
        abortOnDegenerate: {}
        saveCoordinates: {}",
        self.language, self.corpus, self.datafolder.display(), self.max_word_types, self.n_neighbors,
        self.n_eigenvectors, self.word_to_contexts, self.context_to_words, self.weighting,
        self.abort_on_degenerate, self.save_coordinates
        )
    }
}

/// Values given on the command line; each one wins over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub language: Option<String>,
    pub corpus: Option<String>,
    pub datafolder: Option<PathBuf>,
    pub max_word_types: Option<usize>,
    pub n_neighbors: Option<usize>,
    pub n_eigenvectors: Option<usize>,
    pub word_to_contexts: Option<bool>,
    pub context_to_words: Option<bool>,
    pub weighting: Option<Weighting>,
    pub abort_on_degenerate: Option<bool>,
    pub save_coordinates: Option<bool>,
}

pub struct Config {
    params: ManifoldParams
}

impl Config {

    pub fn get_params(&self) -> ManifoldParams {
        self.params.clone()
    }

    /// Reads the JSON config at `config_path` and applies `overrides` on top of it.
    /// A config file that does not exist is only tolerated when `required` is false,
    /// in which case every mandatory key must come from the overrides.
    pub fn new(config_path: &Path, required: bool, overrides: Overrides) -> Result<Config> {

        let json = if config_path.exists() {
            let f = File::open(config_path).map_err(|e| ManifoldError::on_read(config_path, e))?;
            serde_json::from_reader(BufReader::new(f))?
        } else if required {
            return Err(ManifoldError::MissingInput { path: config_path.to_path_buf() });
        } else {
            Value::Object(Default::default())
        };

        Config::from_json(&json, overrides)
    }

    pub fn from_json(json: &Value, overrides: Overrides) -> Result<Config> {

        if !json.is_object() {
            return Err(ManifoldError::Config("config file must hold a JSON object".to_string()));
        }

        // mandatory location keys, the command line may supply them instead
        let language = match overrides.language {
            Some(language) => language,
            None => get_str(json, "language")?
                .ok_or_else(|| ManifoldError::Config("language was not supplied".to_string()))?,
        };
        let corpus = match overrides.corpus {
            Some(corpus) => corpus,
            None => get_str(json, "corpus")?
                .ok_or_else(|| ManifoldError::Config("corpus was not supplied".to_string()))?,
        };
        let datafolder = match overrides.datafolder {
            Some(datafolder) => datafolder,
            None => get_str(json, "datafolder")?
                .map(PathBuf::from)
                .ok_or_else(|| ManifoldError::Config("datafolder was not supplied".to_string()))?,
        };

        // handle default vs input parameters
        let max_word_types = match overrides.max_word_types {
            Some(v) => v,
            None => get_usize(json, "maxwordtypes")?.unwrap_or(DEFAULT_MAX_WORD_TYPES),
        };
        let n_neighbors = match overrides.n_neighbors {
            Some(v) => v,
            None => get_usize(json, "nNeighbors")?.unwrap_or(DEFAULT_NEIGHBORS),
        };
        let n_eigenvectors = match overrides.n_eigenvectors {
            Some(v) => v,
            None => get_usize(json, "nEigenvectors")?.unwrap_or(DEFAULT_EIGENVECTORS),
        };
        let word_to_contexts = match overrides.word_to_contexts {
            Some(v) => v,
            None => get_bool(json, "wordtocontexts")?.unwrap_or(true),
        };
        let context_to_words = match overrides.context_to_words {
            Some(v) => v,
            None => get_bool(json, "contexttowords")?.unwrap_or(false),
        };
        let weighting = match overrides.weighting {
            Some(v) => v,
            None => match get_str(json, "weighting")? {
                Some(name) => name.parse::<Weighting>()?,
                None => Weighting::Count,
            },
        };
        let abort_on_degenerate = match overrides.abort_on_degenerate {
            Some(v) => v,
            None => get_bool(json, "abortOnDegenerate")?.unwrap_or(false),
        };
        let save_coordinates = match overrides.save_coordinates {
            Some(v) => v,
            None => get_bool(json, "saveCoordinates")?.unwrap_or(false),
        };

        let params = ManifoldParams {
            language,
            corpus,
            datafolder,
            max_word_types,
            n_neighbors,
            n_eigenvectors,
            word_to_contexts,
            context_to_words,
            weighting,
            abort_on_degenerate,
            save_coordinates,
        };
        validate(&params)?;

        Ok(Self { params })
    }

}

fn validate(params: &ManifoldParams) -> Result<()> {
    if params.max_word_types < 1 {
        return Err(ManifoldError::Config("maxwordtypes must be at least 1".to_string()));
    }
    if params.n_neighbors < 1 {
        return Err(ManifoldError::Config("nNeighbors must be at least 1".to_string()));
    }
    // the first eigenvector is always dropped
    if params.n_eigenvectors < 2 {
        return Err(ManifoldError::Config("nEigenvectors must be at least 2".to_string()));
    }
    if params.corpus.trim().is_empty() {
        return Err(ManifoldError::Config("corpus must not be empty".to_string()));
    }
    Ok(())
}

fn get_str(json: &Value, key: &str) -> Result<Option<String>> {
    match json.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.to_owned())),
        Some(other) => Err(ManifoldError::Config(format!("{} should be a string, got {}", key, other))),
    }
}

fn get_usize(json: &Value, key: &str) -> Result<Option<usize>> {
    match json.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|v| Some(v as usize))
            .ok_or_else(|| ManifoldError::Config(format!("{} should be a non-negative integer, got {}", key, value))),
    }
}

fn get_bool(json: &Value, key: &str) -> Result<Option<bool>> {
    match json.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| ManifoldError::Config(format!("{} should be a boolean, got {}", key, value))),
    }
}


/// Where every input and output of a run lives, derived from the parameters.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    pub infolder: PathBuf,
    pub outfolder: PathBuf,
    pub contexts_folder: PathBuf,
    pub corpus_stem: String,
    pub corpus_name: String,
}

impl OutputLayout {

    pub fn new(params: &ManifoldParams) -> OutputLayout {

        let language_root = params.datafolder.join(&params.language);
        let corpus_stem = Path::new(&params.corpus)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| params.corpus.clone());
        let corpus_name = format!("{}_{}_{}", corpus_stem, params.max_word_types, params.n_neighbors);

        OutputLayout {
            infolder: language_root.join("ngrams"),
            outfolder: language_root.join("neighbors"),
            contexts_folder: language_root.join("word_contexts"),
            corpus_stem,
            corpus_name,
        }
    }

    /// The corpus text itself, as given or relative to the data folder.
    pub fn corpus_file(params: &ManifoldParams) -> PathBuf {
        let given = PathBuf::from(&params.corpus);
        if given.is_absolute() || given.exists() {
            given
        } else {
            params.datafolder.join(&params.language).join(given)
        }
    }

    pub fn words_file(&self) -> PathBuf {
        self.infolder.join(format!("{}_words.txt", self.corpus_stem))
    }

    pub fn bigrams_file(&self) -> PathBuf {
        self.infolder.join(format!("{}_bigrams.txt", self.corpus_stem))
    }

    pub fn trigrams_file(&self) -> PathBuf {
        self.infolder.join(format!("{}_trigrams.txt", self.corpus_stem))
    }

    pub fn neighbors_stem(&self) -> String {
        format!("{}_nearest_neighbors", self.corpus_name)
    }

    pub fn neighbors_file(&self) -> PathBuf {
        self.outfolder.join(format!("{}.txt", self.neighbors_stem()))
    }

    pub fn neighbor_graph_file(&self) -> PathBuf {
        self.outfolder.join(format!("{}.gexf", self.neighbors_stem()))
    }

    pub fn word_to_contexts_stem(&self) -> String {
        format!("{}_WordToContexts", self.corpus_name)
    }

    pub fn context_to_words_stem(&self) -> String {
        format!("{}_ContextToWords", self.corpus_name)
    }

    pub fn coordinates_stem(&self) -> String {
        format!("{}_coordinates", self.corpus_name)
    }

}
