// Tiny on-disk artifacts shared by the integration tests
use std::collections::HashMap;
use std::path::Path;

use candle::{Device, Tensor};
use serde_json::json;

pub const VOCAB_SIZE: usize = 8;
pub const OUTPUTS: usize = 2;
const EMBEDDING_DIM: usize = 4;
const LSTM_UNITS: usize = 3;

pub fn write_artifacts(dir: &Path) {
    write_config(dir);
    write_weights(dir);
    write_tokenizer(dir);
}

pub fn write_config(dir: &Path) {
    let config = json!({
        "vocab_size": VOCAB_SIZE,
        "embedding_dim": EMBEDDING_DIM,
        "lstm_units": [LSTM_UNITS],
        "dense": [{ "units": OUTPUTS, "activation": "softmax" }]
    });
    std::fs::write(dir.join("config.json"), config.to_string()).unwrap();
}

pub fn write_weights(dir: &Path) {
    let device = Device::Cpu;
    let mut tensors = HashMap::new();
    let mut add = |name: &str, shape: &[usize]| {
        let n: usize = shape.iter().product();
        let values: Vec<f32> = (0..n).map(|k| ((k * 5 % 11) as f32 - 5.0) / 20.0).collect();
        let tensor = Tensor::from_vec(values, shape, &device).unwrap();
        tensors.insert(name.to_string(), tensor);
    };
    add("embedding.weight", &[VOCAB_SIZE, EMBEDDING_DIM]);
    add("lstm.0.weight_ih_l0", &[4 * LSTM_UNITS, EMBEDDING_DIM]);
    add("lstm.0.weight_hh_l0", &[4 * LSTM_UNITS, LSTM_UNITS]);
    add("lstm.0.bias_ih_l0", &[4 * LSTM_UNITS]);
    add("lstm.0.bias_hh_l0", &[4 * LSTM_UNITS]);
    add("dense.0.weight", &[OUTPUTS, LSTM_UNITS]);
    add("dense.0.bias", &[OUTPUTS]);
    candle::safetensors::save(&tensors, dir.join("model.safetensors")).unwrap();
}

/// Word index export as written at training time; "rare" lies outside the embedding.
pub fn write_tokenizer(dir: &Path) {
    let word_index = json!({
        "<OOV>": 1, "hello": 2, "world": 3, "good": 4, "bad": 5, "movie": 6, "rare": 40
    });
    let export = json!({
        "class_name": "Tokenizer",
        "config": {
            "num_words": null,
            "filters": "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n",
            "lower": true,
            "split": " ",
            "char_level": false,
            "oov_token": "<OOV>",
            "document_count": 3,
            "word_index": word_index.to_string()
        }
    });
    std::fs::write(dir.join("tokenizer.json"), export.to_string()).unwrap();
}
