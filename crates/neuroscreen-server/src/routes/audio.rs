//! Voice prediction - audio upload through the MFCC classifier pipeline.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use neuroscreen_analysis::{StandardScaler, extract_features};
use neuroscreen_api::{ApiError, AudioPrediction};
use neuroscreen_core::CoreError;
use tracing::{error, info};

use crate::server::AppState;

/// Voice screening prediction.
///
/// Accepts a WAV recording via multipart/form-data. The "file" field must
/// contain the audio bytes.
///
/// # Endpoint
///
/// POST /predict-audio
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8000/predict-audio -F "file=@recording.wav"
/// ```
pub async fn predict_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AudioPrediction>, AudioError> {
    let mut audio_data: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            audio_data = Some(field.bytes().await?);
            break;
        }
    }

    let data = audio_data.ok_or(AudioError::MissingFile)?;
    if data.is_empty() {
        return Err(AudioError::EmptyFile);
    }
    info!("received audio upload: {} bytes", data.len());

    // Decode and extract before touching the model so malformed uploads are
    // rejected even while the classifier is unavailable.
    let features = tokio::task::spawn_blocking(move || -> Result<Vec<f32>, CoreError> {
        let features = extract_features(&data)?;
        StandardScaler::training().transform(&features)
    })
    .await
    .map_err(|e| AudioError::Task(e.to_string()))??;

    let classifier = state
        .classifier
        .clone()
        .ok_or(AudioError::ModelUnavailable)?;

    let output = tokio::task::spawn_blocking(move || classifier.predict(&features))
        .await
        .map_err(|e| AudioError::Task(e.to_string()))??;

    info!(
        prediction = %output.label,
        confidence = output.confidence,
        "audio prediction served"
    );

    Ok(Json(AudioPrediction::new(output.label, output.confidence)))
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Multipart form error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Audio file not provided in multipart form data")]
    MissingFile,

    #[error("Uploaded audio file is empty")]
    EmptyFile,

    #[error("Classifier model is not loaded")]
    ModelUnavailable,

    #[error(transparent)]
    Analysis(#[from] CoreError),

    #[error("Worker task failed: {0}")]
    Task(String),
}

impl From<AudioError> for ApiError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Multipart(_) | AudioError::MissingFile | AudioError::EmptyFile => {
                ApiError::bad_request(err.to_string())
            }
            AudioError::ModelUnavailable => ApiError::service_unavailable(err.to_string()),
            AudioError::Analysis(core) => ApiError::from(core),
            AudioError::Task(_) => ApiError::internal(err.to_string()),
        }
    }
}

impl IntoResponse for AudioError {
    fn into_response(self) -> Response {
        error!("Audio prediction error: {}", self);
        ApiError::from(self).into_response()
    }
}
