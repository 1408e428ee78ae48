// Offline scoring of a CSV file with the served model
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle::Device;
use clap::Parser;
use log::info;
use lstm_server::error::PredictError;
use lstm_server::models::{ArtifactFiles, LstmPredictor};
use rayon::prelude::*;

const CHUNK_SIZE: usize = 200;

#[derive(Parser, Debug)]
#[command(about = "Scores every row of a CSV file with the LSTM model")]
struct Args {
    /// CSV file with a header row
    input: PathBuf,

    /// Where to write the text column followed by one column per model output
    output: PathBuf,

    /// Zero-based index of the column holding the text
    #[arg(long, default_value_t = 0)]
    text_column: usize,

    #[arg(long, env = "LSTM_SERVER_MODEL_DIR", default_value = "models")]
    model_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let predictor = LstmPredictor::load(&ArtifactFiles::in_dir(&args.model_dir), Device::Cpu)
        .context("Failed to load model artifacts")?;

    let texts = load_texts_from_csv(&args.input, args.text_column)?;
    info!("Loaded {} rows from {}", texts.len(), args.input.display());

    let predictions = score_in_chunks(&texts, CHUNK_SIZE, |chunk| predictor.predict(chunk))?;
    info!("Scored {} rows", predictions.len());

    write_predictions(&args.output, &texts, &predictions)?;
    info!("Saved predictions to {}", args.output.display());

    Ok(())
}

/// Scores `texts` in parallel chunks and returns the rows in input order.
fn score_in_chunks<F>(texts: &[String], chunk_size: usize, predict: F) -> Result<Vec<Vec<f32>>>
where
    F: Fn(&[String]) -> Result<Vec<Vec<f32>>, PredictError> + Sync,
{
    let chunk_results: Vec<_> = texts.par_chunks(chunk_size).map(&predict).collect();
    let mut predictions = Vec::with_capacity(texts.len());
    for chunk in chunk_results {
        predictions.extend(chunk?);
    }
    Ok(predictions)
}

fn load_texts_from_csv(path: &Path, text_col_index: usize) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut texts = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let text = record
            .get(text_col_index)
            .with_context(|| format!("Row {} has no column {}", line + 1, text_col_index))?;
        texts.push(text.to_string());
    }
    Ok(texts)
}

fn write_predictions(path: &Path, texts: &[String], predictions: &[Vec<f32>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let width = predictions.first().map_or(0, Vec::len);

    let mut header = vec!["text".to_string()];
    header.extend((0..width).map(|i| format!("p{i}")));
    writer.write_record(&header)?;

    for (text, row) in texts.iter().zip(predictions) {
        let mut record = vec![text.clone()];
        record.extend(row.iter().map(f32::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
