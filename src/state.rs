// Shared state handed to every request handler
use std::sync::Arc;

use crate::models::LstmPredictor;

/// Built once before the server binds; never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<LstmPredictor>,
}

impl AppState {
    pub fn new(predictor: LstmPredictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }
}
