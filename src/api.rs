// API routes and handlers
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, Responder, ResponseError};
use log::error;
use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PredictRequest {
    pub data: Vec<String>,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub predictions: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct StatusResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorDetail {
            detail: format!("Erreur lors de la prédiction : {self}"),
        })
    }
}

/// Request bodies are buffered whole; large batches are expected.
pub const DEFAULT_BODY_LIMIT: usize = 256 * 1024 * 1024;

/// Registers the routes and the request body rules on an app or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config(DEFAULT_BODY_LIMIT))
        .service(root)
        .service(predict);
}

/// Bodies over `limit` bytes get 413. Bodies that do not match
/// `PredictRequest` are rejected with 422 before any handler runs.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let status = match err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    StatusCode::PAYLOAD_TOO_LARGE
                }
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            let response = HttpResponse::build(status).json(ErrorDetail {
                detail: err.to_string(),
            });
            InternalError::from_response(err, response).into()
        })
}

#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        message: "API is running",
    })
}

#[post("/predict")]
pub async fn predict(
    state: web::Data<AppState>,
    payload: web::Json<PredictRequest>,
) -> Result<web::Json<PredictResponse>, PredictError> {
    let texts = payload.into_inner().data;
    let predictor = state.predictor.clone();

    // Inference is CPU bound; keep it off the async workers.
    let result = match web::block(move || predictor.predict(&texts)).await {
        Ok(result) => result,
        Err(e) => Err(PredictError::Blocking(e.to_string())),
    };

    match result {
        Ok(predictions) => Ok(web::Json(PredictResponse { predictions })),
        Err(e) => {
            error!("Prediction failed: {e}");
            Err(e)
        }
    }
}
