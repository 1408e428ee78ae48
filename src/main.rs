// Web server entry point
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use candle::Device;
use clap::Parser;
use log::info;

use lstm_server::api;
use lstm_server::config::Args;
use lstm_server::models::LstmPredictor;
use lstm_server::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Both artifacts must be in memory before the socket is bound.
    let files = args
        .artifact_files()
        .context("Failed to locate model artifacts")?;
    let predictor =
        LstmPredictor::load(&files, Device::Cpu).context("Failed to load model artifacts")?;
    info!("Vocabulary size: {}", predictor.vocab_size());

    let state = web::Data::new(AppState::new(predictor));

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    });
    if let Some(workers) = args.workers {
        server = server.workers(workers);
    }

    info!("Listening on http://{}:{}", args.host, args.port);
    server
        .bind((args.host.as_str(), args.port))
        .with_context(|| format!("Failed to bind {}:{}", args.host, args.port))?
        .run()
        .await?;

    Ok(())
}
