//! Wire types for the Gemini REST endpoints this service touches.

use serde::{Deserialize, Serialize};

/// Structured gait analysis the model is instructed to return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GaitAnalysis {
    /// 0-100
    pub parkinson_probability: u8,
    pub freezing_percentage: f64,
    /// 0-3
    pub bradykinesia_score: u8,
    /// 0-3
    pub freezing_score: u8,
    /// 0-3
    pub variability_score: u8,
    pub reasoning: String,
    pub clinical_interpretation: String,
    pub recommendation: String,
}

/// Subset of the File resource returned by the files endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Resource name, e.g. "files/abc-123"
    pub name: String,
    /// Download URI passed back into generateContent
    pub uri: String,
    #[serde(default)]
    pub state: FileState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    /// Catch-all, covers STATE_UNSPECIFIED and future states
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub file: FileMetadata,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: CandidateContent,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}
