mod common;

use candle::Device;
use lstm_server::error::LoadError;
use lstm_server::models::{ArtifactFiles, LstmPredictor};

fn load(dir: &std::path::Path) -> Result<LstmPredictor, LoadError> {
    LstmPredictor::load(&ArtifactFiles::in_dir(dir), Device::Cpu)
}

#[test]
fn complete_artifacts_load() {
    let dir = tempfile::tempdir().unwrap();
    common::write_artifacts(dir.path());

    let predictor = load(dir.path()).unwrap();
    assert_eq!(predictor.config().maxlen, 50);
    assert_eq!(predictor.config().vocab_size, common::VOCAB_SIZE);
}

#[test]
fn missing_tokenizer_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    common::write_config(dir.path());
    common::write_weights(dir.path());

    assert!(matches!(load(dir.path()), Err(LoadError::Io { .. })));
}

#[test]
fn missing_weights_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    common::write_config(dir.path());
    common::write_tokenizer(dir.path());

    assert!(matches!(load(dir.path()), Err(LoadError::Io { .. })));
}

#[test]
fn corrupt_weights_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    common::write_artifacts(dir.path());
    std::fs::write(dir.path().join("model.safetensors"), b"definitely not safetensors").unwrap();

    assert!(matches!(load(dir.path()), Err(LoadError::Candle(_))));
}

#[test]
fn corrupt_tokenizer_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    common::write_artifacts(dir.path());
    std::fs::write(dir.path().join("tokenizer.json"), b"\x80\x04\x95 pickled bytes").unwrap();

    assert!(load(dir.path()).is_err());
}

#[test]
fn config_mismatching_the_weights_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    common::write_artifacts(dir.path());
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"vocab_size": 8, "embedding_dim": 16, "lstm_units": [3],
            "dense": [{"units": 2, "activation": "softmax"}]}"#,
    )
    .unwrap();

    assert!(matches!(load(dir.path()), Err(LoadError::Candle(_))));
}
