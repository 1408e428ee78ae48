// Model artifacts and the text-to-prediction pipeline
pub mod lstm;
pub mod sequence;
pub mod tokenizer;

use std::path::{Path, PathBuf};

use candle::{Device, Tensor};
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use log::{info, warn};

use crate::error::{LoadError, PredictError};
use lstm::{LstmConfig, LstmModel};
use sequence::pad_sequences;
use tokenizer::TextTokenizer;

pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Locations of the three files that make up a trained model.
#[derive(Debug, Clone)]
pub struct ArtifactFiles {
    pub config: PathBuf,
    pub weights: PathBuf,
    pub tokenizer: PathBuf,
}

impl ArtifactFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join(CONFIG_FILE),
            weights: dir.join(WEIGHTS_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
        }
    }

    /// Downloads (or reuses the cached copy of) the artifacts of a hub repo.
    pub fn from_hub(repo_id: &str, revision: &str, token: Option<String>) -> Result<Self, LoadError> {
        let api = ApiBuilder::new()
            .with_token(token)
            .build()
            .map_err(|e| LoadError::Hub {
                file: repo_id.to_string(),
                message: e.to_string(),
            })?;
        let repo = api.repo(Repo::with_revision(
            repo_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));
        let fetch = |file: &str| {
            repo.get(file).map_err(|e| LoadError::Hub {
                file: file.to_string(),
                message: e.to_string(),
            })
        };
        Ok(Self {
            config: fetch(CONFIG_FILE)?,
            weights: fetch(WEIGHTS_FILE)?,
            tokenizer: fetch(TOKENIZER_FILE)?,
        })
    }
}

/// Tokenizer and network loaded together; read-only once built.
pub struct LstmPredictor {
    model: LstmModel,
    tokenizer: TextTokenizer,
}

impl LstmPredictor {
    pub fn load(files: &ArtifactFiles, device: Device) -> Result<Self, LoadError> {
        let config = LstmConfig::from_file(&files.config)?;
        let model = LstmModel::load(config, &files.weights, device)?;
        info!("Loaded model from {}", files.weights.display());

        let tokenizer = TextTokenizer::from_file(&files.tokenizer)?;
        info!("Loaded tokenizer from {}", files.tokenizer.display());

        Ok(Self::new(model, tokenizer))
    }

    pub fn new(model: LstmModel, tokenizer: TextTokenizer) -> Self {
        let config = model.config();
        info!(
            "Model shape: vocab={} embedding={} lstm={:?} outputs={} maxlen={}",
            config.vocab_size,
            config.embedding_dim,
            config.lstm_units,
            config.output_dim(),
            config.maxlen
        );
        if tokenizer.vocab_size() > config.vocab_size {
            warn!(
                "Tokenizer can emit {} ids but the embedding only holds {}",
                tokenizer.vocab_size(),
                config.vocab_size
            );
        }
        Self { model, tokenizer }
    }

    pub fn config(&self) -> &LstmConfig {
        self.model.config()
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.vocab_size()
    }

    /// Tokenizes, pads to `maxlen` and scores the whole batch in one forward pass.
    /// Returns one output row per input text, in input order.
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<f32>>, PredictError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let config = self.model.config();
        let sequences = self.tokenizer.texts_to_sequences(texts)?;
        let batch = pad_sequences(&sequences, config.maxlen, config.padding, config.truncating);
        if let Some(&id) = batch.iter().find(|&&id| id as usize >= config.vocab_size) {
            return Err(PredictError::TokenOutOfRange {
                id,
                vocab_size: config.vocab_size,
            });
        }

        let ids = Tensor::from_vec(batch, (texts.len(), config.maxlen), self.model.device())?;
        let scores = self.model.forward(&ids)?;
        Ok(scores.to_vec2::<f32>()?)
    }
}
