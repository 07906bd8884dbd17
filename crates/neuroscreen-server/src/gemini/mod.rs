//! Client for the Gemini generative API.
//!
//! Covers the slice of the API the video route needs: media upload, file
//! state polling, schema-constrained content generation, file deletion,
//! and model listing.

pub mod client;
pub mod types;

pub use client::{GeminiClient, GeminiError};
pub use types::{FileState, GaitAnalysis};

use neuroscreen_api::ApiError;

impl From<GeminiError> for ApiError {
    fn from(err: GeminiError) -> Self {
        match &err {
            GeminiError::NoApiKey | GeminiError::Exhausted => {
                ApiError::service_unavailable(err.to_string())
            }
            _ => ApiError::bad_gateway(err.to_string()),
        }
    }
}
