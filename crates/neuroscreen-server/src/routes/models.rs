//! Debug route exposing which generative models can serve requests.

use axum::{Json, extract::State};
use neuroscreen_api::ApiError;
use serde_json::{Value, json};

use crate::server::AppState;

/// List the Gemini models supporting content generation.
///
/// # Endpoint
///
/// GET /models
pub async fn available_models(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let models = state.gemini.list_models().await.map_err(ApiError::from)?;
    Ok(Json(json!({ "available_models": models })))
}
