
pub mod config;
pub mod contexts;
pub mod eigen;
pub mod embedding;
pub mod error;
pub mod export;
pub mod files_handling;
pub mod laplacian;
pub mod neighbors;
pub mod ngrams;
pub mod pipeline;
pub mod similarity;
pub mod vocab;

pub use config::{Config, ManifoldParams, Overrides};
pub use error::{ManifoldError, Result};
pub use neighbors::WordNeighbors;
pub use pipeline::{neighbors_from_records, spectral_neighbors, Pipeline, SpectralSettings};
