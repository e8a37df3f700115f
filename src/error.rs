use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a manifold run.
#[derive(Debug, Error)]
pub enum ManifoldError {
    /// A required input is absent and could not be regenerated.
    #[error("missing input file: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed line {line} in {}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("vocabulary is empty, nothing to analyse")]
    EmptyVocabulary,

    /// The similarity graph produced a spectrum that cannot be embedded safely.
    #[error("degenerate graph: {0}")]
    DegenerateGraph(String),

    #[error("eigensolver did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

}

impl ManifoldError {
    /// Read failures on inputs: a vanished file is reported as missing input.
    pub(crate) fn on_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            ManifoldError::MissingInput { path }
        } else {
            ManifoldError::Io { path, source }
        }
    }

    pub(crate) fn on_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ManifoldError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, ManifoldError>;
