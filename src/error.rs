use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A field had a different JSON shape than the dialect reads it as.
    #[error("unexpected shape at `{at}`: expected {expected}, found {found}")]
    Shape {
        at: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("layer index {index} out of range (framework has {count} layers)")]
    LayerOutOfRange { index: usize, count: usize },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The format is known but no backend for it is built in.
    #[error("no rendering backend available for `{format}` output")]
    BackendUnavailable { format: String },

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("graph has no nodes to render")]
    EmptyGraph,

    #[error("diagram does not fit in {max_width} columns")]
    TooWide { max_width: usize },
}

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("failed to read theme {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse theme: {0}")]
    Parse(#[from] serde_json::Error),
}
