use std::path::PathBuf;

use thiserror::Error;

use crate::activity::ActivityError;

pub type Result<T> = std::result::Result<T, DeckError>;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid deck {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Activity(#[from] ActivityError),
}
