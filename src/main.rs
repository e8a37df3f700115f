use word_manifold::contexts::Weighting;
use word_manifold::{Config, Overrides, Pipeline};

use std::path::PathBuf;
use std::process;
use std::time::Instant;
use clap::Parser;
use env_logger::Env;
use log::{error, info};

const DEFAULT_CONFIG: &str = "config.json";

/// Computes, for each word type of a corpus, its nearest neighbors in a spectral
/// embedding of shared n-gram contexts.
#[derive(Parser, Debug)]
#[command(name = "word-manifold", version, about)]
struct Cli {
    /// Configuration filename
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Language name
    #[arg(long)]
    language: Option<String>,

    /// Corpus file to use
    #[arg(long)]
    corpus: Option<String>,

    /// Path of the data folder
    #[arg(long)]
    datafolder: Option<PathBuf>,

    /// Number of word types to handle [default: 1000]
    #[arg(long)]
    maxwordtypes: Option<usize>,

    /// Number of neighbors [default: 9]
    #[arg(long = "nNeighbors")]
    n_neighbors: Option<usize>,

    /// Number of eigenvectors, the trivial one included [default: 11]
    #[arg(long = "nEigenvectors")]
    n_eigenvectors: Option<usize>,

    /// Create the WordToContexts dict? [default: true]
    #[arg(long)]
    wordtocontexts: Option<bool>,

    /// Create the ContextToWords dict? [default: false]
    #[arg(long)]
    contexttowords: Option<bool>,

    /// Cell values of the context array: count or binary [default: count]
    #[arg(long, value_parser = parse_weighting)]
    weighting: Option<Weighting>,

    /// Abort when the similarity graph is disconnected
    #[arg(long)]
    abort_on_degenerate: bool,

    /// Also save the embedding coordinates as .npy
    #[arg(long)]
    save_coordinates: bool,
}

fn parse_weighting(s: &str) -> Result<Weighting, String> {
    s.parse::<Weighting>().map_err(|e| e.to_string())
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            language: self.language.clone(),
            corpus: self.corpus.clone(),
            datafolder: self.datafolder.clone(),
            max_word_types: self.maxwordtypes,
            n_neighbors: self.n_neighbors,
            n_eigenvectors: self.n_eigenvectors,
            word_to_contexts: self.wordtocontexts,
            context_to_words: self.contexttowords,
            weighting: self.weighting,
            abort_on_degenerate: self.abort_on_degenerate.then_some(true),
            save_coordinates: self.save_coordinates.then_some(true),
        }
    }
}

fn main() {

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // an explicitly named config file must exist, the default one may be absent
    let required = cli.config != PathBuf::from(DEFAULT_CONFIG);
    let params = match Config::new(&cli.config, required, cli.overrides()) {
        Ok(config) => config.get_params(),
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let timer = Instant::now();
    if let Err(e) = Pipeline::run(&params) {
        error!("{}", e);
        process::exit(1);
    }
    info!("finished, took {} seconds ...", timer.elapsed().as_secs());
}
