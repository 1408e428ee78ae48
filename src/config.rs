// Command line and environment configuration
use std::path::PathBuf;

use clap::Parser;

use crate::error::LoadError;
use crate::models::ArtifactFiles;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Serves predictions from a trained LSTM text model")]
pub struct Args {
    #[arg(long, env = "LSTM_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "LSTM_SERVER_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory holding config.json, model.safetensors and tokenizer.json.
    /// A relative path is resolved against the working directory the server
    /// is started from, not the location of the binary.
    #[arg(long, env = "LSTM_SERVER_MODEL_DIR", default_value = "models")]
    pub model_dir: PathBuf,

    /// Fetch the artifacts from this hub repo instead of `model_dir`
    #[arg(long, env = "LSTM_SERVER_HUB_REPO")]
    pub hub_repo: Option<String>,

    #[arg(long, default_value = "main")]
    pub revision: String,

    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    #[arg(long)]
    pub workers: Option<usize>,
}

impl Args {
    pub fn artifact_files(&self) -> Result<ArtifactFiles, LoadError> {
        match &self.hub_repo {
            Some(repo) => ArtifactFiles::from_hub(repo, &self.revision, self.hf_token.clone()),
            None => Ok(ArtifactFiles::in_dir(&self.model_dir)),
        }
    }
}
