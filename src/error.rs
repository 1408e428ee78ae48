// Error types for artifact loading and prediction
use std::path::PathBuf;

use thiserror::Error;

/// Failure while bringing the model artifacts into memory. Always fatal at startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model config: {0}")]
    Config(String),

    #[error("invalid tokenizer: {0}")]
    Tokenizer(String),

    #[error("failed to fetch {file} from hub: {message}")]
    Hub { file: String, message: String },

    #[error("candle error: {0}")]
    Candle(#[from] candle::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while turning a batch of texts into predictions.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("token id {id} is out of range for a vocabulary of size {vocab_size}")]
    TokenOutOfRange { id: u32, vocab_size: usize },

    #[error("{0}")]
    Candle(#[from] candle::Error),

    #[error("inference task failed: {0}")]
    Blocking(String),
}
