// LSTM sequence model
use std::path::Path;

use candle::{DType, Device, Module, Tensor};
use candle_nn::rnn::{LSTMConfig, LSTM, RNN};
use candle_nn::{Embedding, Linear, VarBuilder};
use serde::Deserialize;

use crate::error::LoadError;
use crate::models::sequence::Side;

pub const DEFAULT_MAXLEN: usize = 50;

/// Architecture description read from `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct LstmConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub lstm_units: Vec<usize>,
    pub dense: Vec<DenseConfig>,
    #[serde(default = "default_maxlen")]
    pub maxlen: usize,
    #[serde(default)]
    pub padding: Side,
    #[serde(default)]
    pub truncating: Side,
}

fn default_maxlen() -> usize {
    DEFAULT_MAXLEN
}

#[derive(Debug, Clone, Deserialize)]
pub struct DenseConfig {
    pub units: usize,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    fn apply(self, xs: &Tensor) -> candle::Result<Tensor> {
        match self {
            Self::Linear => Ok(xs.clone()),
            Self::Relu => xs.relu(),
            Self::Sigmoid => candle_nn::ops::sigmoid(xs),
            Self::Tanh => xs.tanh(),
            Self::Softmax => candle_nn::ops::softmax_last_dim(xs),
        }
    }
}

impl LstmConfig {
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let raw = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_slice(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.vocab_size == 0 || self.embedding_dim == 0 {
            return Err(LoadError::Config(
                "vocab_size and embedding_dim must be positive".to_string(),
            ));
        }
        if self.lstm_units.is_empty() || self.lstm_units.contains(&0) {
            return Err(LoadError::Config(
                "lstm_units needs at least one positive layer size".to_string(),
            ));
        }
        if self.dense.is_empty() || self.dense.iter().any(|layer| layer.units == 0) {
            return Err(LoadError::Config(
                "dense needs at least one layer with positive units".to_string(),
            ));
        }
        if self.maxlen == 0 {
            return Err(LoadError::Config("maxlen must be positive".to_string()));
        }
        Ok(())
    }

    pub fn output_dim(&self) -> usize {
        self.dense.last().map_or(0, |layer| layer.units)
    }
}

/// Embedding, stacked LSTM layers and a dense head.
pub struct LstmModel {
    embedding: Embedding,
    lstm_layers: Vec<LSTM>,
    dense_layers: Vec<(Linear, Activation)>,
    config: LstmConfig,
    device: Device,
}

impl LstmModel {
    pub fn load(config: LstmConfig, weights: &Path, device: Device) -> Result<Self, LoadError> {
        if !weights.is_file() {
            return Err(LoadError::Io {
                path: weights.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "weights file not found"),
            });
        }
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device)? };
        Self::new(config, vb, device)
    }

    pub fn new(config: LstmConfig, vb: VarBuilder, device: Device) -> Result<Self, LoadError> {
        config.validate()?;
        let embedding = candle_nn::embedding(config.vocab_size, config.embedding_dim, vb.pp("embedding"))?;

        let mut lstm_layers = Vec::with_capacity(config.lstm_units.len());
        let mut in_dim = config.embedding_dim;
        for (i, &units) in config.lstm_units.iter().enumerate() {
            let layer = candle_nn::lstm(in_dim, units, LSTMConfig::default(), vb.pp(format!("lstm.{i}")))?;
            lstm_layers.push(layer);
            in_dim = units;
        }

        let mut dense_layers = Vec::with_capacity(config.dense.len());
        for (j, layer) in config.dense.iter().enumerate() {
            let linear = candle_nn::linear(in_dim, layer.units, vb.pp(format!("dense.{j}")))?;
            dense_layers.push((linear, layer.activation));
            in_dim = layer.units;
        }

        Ok(Self {
            embedding,
            lstm_layers,
            dense_layers,
            config,
            device,
        })
    }

    pub fn config(&self) -> &LstmConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Runs one forward pass over a `(batch, seq_len)` tensor of u32 ids and
    /// returns `(batch, output_dim)` f32 scores.
    pub fn forward(&self, ids: &Tensor) -> candle::Result<Tensor> {
        let mut xs = self.embedding.forward(ids)?;
        let last = self.lstm_layers.len() - 1;
        for (i, layer) in self.lstm_layers.iter().enumerate() {
            let states = layer.seq(&xs)?;
            xs = if i == last {
                match states.last() {
                    Some(state) => state.h().clone(),
                    None => candle::bail!("cannot run an LSTM over an empty sequence"),
                }
            } else {
                layer.states_to_tensor(&states)?
            };
        }
        for (linear, activation) in &self.dense_layers {
            xs = activation.apply(&linear.forward(&xs)?)?;
        }
        Ok(xs)
    }
}
