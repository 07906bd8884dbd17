//! Gait analysis - video upload relayed to the generative backend.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use neuroscreen_api::{ApiError, VideoAnalysis};
use tracing::{error, info};

use crate::gemini::GeminiError;
use crate::server::AppState;

/// Gait screening analysis.
///
/// Accepts a gait video via multipart/form-data ("file" field), forwards
/// it to the Gemini API, and relays the structured analysis.
///
/// # Endpoint
///
/// POST /predict-video
pub async fn predict_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VideoAnalysis>, VideoError> {
    let mut video_data: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            video_data = Some(field.bytes().await?);
            break;
        }
    }

    let data = video_data.ok_or(VideoError::MissingFile)?;
    if data.is_empty() {
        return Err(VideoError::EmptyFile);
    }
    info!("received video upload: {} bytes", data.len());

    // The upstream pipeline expects MP4; uploads are tagged as such
    // regardless of the client-declared type, matching the capture app.
    let analysis = state.gemini.analyze_video(data.to_vec(), "video/mp4").await?;

    let value = serde_json::to_value(&analysis).map_err(|e| VideoError::Serialize(e.to_string()))?;

    info!(
        probability = analysis.parkinson_probability,
        "video analysis served"
    );

    Ok(Json(VideoAnalysis::new(value)))
}

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("Multipart form error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Video file not provided in multipart form data")]
    MissingFile,

    #[error("Uploaded video file is empty")]
    EmptyFile,

    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error("Failed to serialize analysis: {0}")]
    Serialize(String),
}

impl From<VideoError> for ApiError {
    fn from(err: VideoError) -> Self {
        match err {
            VideoError::Multipart(_) | VideoError::MissingFile | VideoError::EmptyFile => {
                ApiError::bad_request(err.to_string())
            }
            VideoError::Gemini(gemini) => ApiError::from(gemini),
            VideoError::Serialize(_) => ApiError::internal(err.to_string()),
        }
    }
}

impl IntoResponse for VideoError {
    fn into_response(self) -> Response {
        error!("Video analysis error: {}", self);
        ApiError::from(self).into_response()
    }
}
