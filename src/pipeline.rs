

// imports
use crate::config::{ManifoldParams, OutputLayout};
use crate::contexts::{ContextArray, ContextArrayBuilder, Weighting};
use crate::eigen::{SymmetricEigensolver, DenseEigensolver};
use crate::embedding::{retained_dimensions, spectral_embedding, SpectralReport};
use crate::error::{ManifoldError, Result};
use crate::export::{self, ListHeader};
use crate::files_handling::{input_exists, save_output};
use crate::laplacian::laplacian_from_similarities;
use crate::ngrams::{self, NgramFiles};
use crate::neighbors::{closest_neighbors, pairwise_distances, NeighborTable, WordNeighbors};
use crate::similarity::{normalize, shared_contexts};
use crate::vocab::LoadedInput;

use std::path::PathBuf;
use std::time::Instant;
use ndarray::Array2;
use log::info;


/// Knobs of the spectral stages, independent of where the data came from.
#[derive(Clone, Copy, Debug)]
pub struct SpectralSettings {
    pub n_neighbors: usize,
    pub n_eigenvectors: usize,
    pub abort_on_degenerate: bool,
}

impl SpectralSettings {
    pub fn from_params(params: &ManifoldParams) -> SpectralSettings {
        SpectralSettings {
            n_neighbors: params.n_neighbors,
            n_eigenvectors: params.n_eigenvectors,
            abort_on_degenerate: params.abort_on_degenerate,
        }
    }
}

/// Result of the spectral stages for one vocabulary slice.
#[derive(Clone, Debug)]
pub struct Manifold {
    pub neighbors: WordNeighbors,
    pub table: NeighborTable,
    pub coordinates: Array2<f64>,
    pub report: SpectralReport,
}

/// Runs shared contexts → diameter → Laplacian → eigenvectors → k-NN on a context array
/// whose rows are `words`. Every intermediate matrix is handed over by value and
/// released as soon as the next stage has consumed it.
pub fn spectral_neighbors<E: SymmetricEigensolver>(
    array: ContextArray,
    words: &[String],
    settings: &SpectralSettings,
    solver: &E,
) -> Result<Manifold> {

    let n = array.n_words();
    if n == 0 {
        return Err(ManifoldError::EmptyVocabulary);
    }
    let dims = retained_dimensions(settings.n_eigenvectors, n);

    let timer = Instant::now();
    info!("computing shared contexts...");
    let shared = shared_contexts(array);

    info!("computing diameter...");
    let similarities = normalize(shared);

    info!("computing incidence graph and laplacian...");
    let laplacian = laplacian_from_similarities(similarities)?;

    info!("computing eigenvectors...");
    let embedding = spectral_embedding(laplacian, solver, dims, settings.abort_on_degenerate)?;
    info!("embedding ready, took {} seconds ...", timer.elapsed().as_secs());

    info!("computing distances between words...");
    let distances = pairwise_distances(&embedding.coordinates);

    info!("computing nearest neighbors now...");
    let table = closest_neighbors(distances, settings.n_neighbors);
    let neighbors = WordNeighbors::from_table(words, &table);

    Ok(Manifold { neighbors, table, coordinates: embedding.coordinates, report: embedding.report })
}

/// Convenience entry point: context array straight from in-memory records.
pub fn neighbors_from_records(
    words: &[String],
    bigrams: &[crate::vocab::NgramRecord],
    trigrams: &[crate::vocab::NgramRecord],
    weighting: Weighting,
    settings: &SpectralSettings,
) -> Result<Manifold> {
    let build = ContextArrayBuilder::new(words).with_weighting(weighting).build(bigrams, trigrams);
    spectral_neighbors(build.array, words, settings, &DenseEigensolver::default())
}


pub struct Pipeline {}

impl Pipeline {

    // runs the whole procedure:
    // -> n-gram extraction when the word list is missing
    // -> loading words and n-grams
    // -> context array (and inspection maps)
    // -> spectral neighbors
    // -> neighbor list, graph and json outputs

    pub fn run(params: &ManifoldParams) -> Result<Vec<PathBuf>> {

        info!("{}", params);
        let layout = OutputLayout::new(params);
        let words_file = layout.words_file();
        let bigrams_file = layout.bigrams_file();
        let trigrams_file = layout.trigrams_file();

        if !input_exists(&words_file) {
            info!("no word list at {}, running n-gram extraction", words_file.display());
            let files = NgramFiles { words: words_file.clone(), bigrams: bigrams_file.clone(), trigrams: trigrams_file.clone() };
            ngrams::extract(&OutputLayout::corpus_file(params), &files)?;
        }

        info!("reading word list {}...", words_file.display());
        info!("number of neighbors to find for each word type: {}", params.n_neighbors);
        let LoadedInput { vocabulary, analyzed, bigrams, trigrams } =
            LoadedInput::load(&words_file, &bigrams_file, &trigrams_file, params.max_word_types)?;
        drop(vocabulary);

        info!("computing context array...");
        let mut build = ContextArrayBuilder::new(&analyzed)
            .with_weighting(params.weighting)
            .with_word_to_contexts(params.word_to_contexts)
            .with_context_to_words(params.context_to_words)
            .build(&bigrams, &trigrams);
        drop(bigrams);
        drop(trigrams);

        let mut outputs: Vec<PathBuf> = Vec::new();
        if let Some(map) = build.word_to_contexts.take() {
            outputs.push(export::save_inspection_map(&layout.contexts_folder, &layout.word_to_contexts_stem(), &map)?);
            info!("WordToContexts ready");
        }
        if let Some(map) = build.context_to_words.take() {
            outputs.push(export::save_inspection_map(&layout.contexts_folder, &layout.context_to_words_stem(), &map)?);
            info!("ContextToWords ready");
        }

        let settings = SpectralSettings::from_params(params);
        let manifold = spectral_neighbors(build.array, &analyzed, &settings, &DenseEigensolver::default())?;

        let neighbors_file = layout.neighbors_file();
        let header = ListHeader {
            language: &params.language,
            corpus: &params.corpus,
            word_types: analyzed.len(),
            neighbors: params.n_neighbors,
        };
        export::write_neighbor_list(&neighbors_file, &header, &manifold.neighbors)?;
        outputs.push(neighbors_file);

        let graph_file = layout.neighbor_graph_file();
        export::write_neighbor_graph(&graph_file, &manifold.neighbors)?;
        outputs.push(graph_file);

        outputs.push(export::save_neighbors_json(&layout.outfolder, &layout.neighbors_stem(), &manifold.neighbors)?);

        if params.save_coordinates {
            outputs.push(save_output(&layout.outfolder, &layout.coordinates_stem(), &manifold.coordinates)?);
        }

        info!("output files:");
        for path in &outputs {
            info!("    {}", path.display());
        }
        Ok(outputs)
    }

}
