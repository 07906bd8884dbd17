//! REST client with key rotation and model fallback.
//!
//! Quota responses (429/503) rotate to the next configured API key; once a
//! full key cycle has failed, the next model in the fallback chain is
//! tried. A missing model (404) switches models immediately. Total
//! generation attempts are bounded by configuration.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use serde_json::json;

use super::types::{
    FileMetadata, FileState, GaitAnalysis, GenerateContentResponse, ListModelsResponse,
    UploadResponse,
};
use crate::config::GeminiSettings;

const ANALYSIS_PROMPT: &str = "You are an expert neurologist. Analyze the gait in this video \
for signs of Parkinson's disease. Evaluate arm swing, stride length, and turning hesitation. \
Return JSON with: parkinson_probability (int, 0-100), freezing_percentage (float), \
bradykinesia_score (0-3), freezing_score (0-3), variability_score (0-3), reasoning (string), \
clinical_interpretation (string), recommendation (string).";

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("No Gemini API key configured")]
    NoApiKey,

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Remote video processing failed: {0}")]
    Processing(String),

    #[error("Content generation failed: {0}")]
    Generation(String),

    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),

    #[error("All API keys and models exhausted")]
    Exhausted,
}

/// Gemini API client shared across requests.
///
/// Rotation indices live behind atomics so concurrent requests observe the
/// same key/model progression without locking.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_keys: Vec<String>,
    models: Vec<String>,
    key_index: AtomicUsize,
    model_index: AtomicUsize,
    poll_interval: Duration,
    max_attempts: u32,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiSettings) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_keys: cfg.api_keys.clone(),
            models: cfg.models.clone(),
            key_index: AtomicUsize::new(0),
            model_index: AtomicUsize::new(0),
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
            max_attempts: cfg.max_attempts,
        }
    }

    fn current_key(&self) -> Result<&str, GeminiError> {
        if self.api_keys.is_empty() {
            return Err(GeminiError::NoApiKey);
        }
        let idx = self.key_index.load(Ordering::Relaxed) % self.api_keys.len();
        Ok(&self.api_keys[idx])
    }

    /// Advance to the next key; returns the new raw index.
    fn rotate_key(&self) -> usize {
        let next = self.key_index.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::warn!(
            key_slot = next % self.api_keys.len().max(1),
            "quota hit, rotating Gemini API key"
        );
        next
    }

    fn current_model(&self) -> &str {
        let idx = self.model_index.load(Ordering::Relaxed) % self.models.len();
        &self.models[idx]
    }

    fn rotate_model(&self) {
        self.model_index.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(model = self.current_model(), "switching Gemini model");
    }

    /// Full video path: upload, wait for remote processing, request the
    /// structured analysis, then drop the remote copy.
    pub async fn analyze_video(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<GaitAnalysis, GeminiError> {
        let file = self.upload_file(bytes, mime_type).await?;
        let file = self.await_processing(file).await?;

        let analysis = self.generate_analysis(&file).await;

        // The remote copy is unneeded either way; deletion failure is not fatal.
        if let Err(e) = self.delete_file(&file.name).await {
            tracing::warn!(file = %file.name, error = %e, "failed to delete uploaded video");
        }

        analysis
    }

    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<FileMetadata, GeminiError> {
        let key = self.current_key()?;
        let url = format!("{}/upload/v1beta/files", self.base_url);
        let size = bytes.len();

        let resp = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .header(header::CONTENT_TYPE, mime_type)
            .header("X-Goog-Upload-Protocol", "raw")
            .body(bytes)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Upload(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let upload: UploadResponse = resp
            .json()
            .await
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;

        tracing::debug!(file = %upload.file.name, bytes = size, "video uploaded to Gemini");
        Ok(upload.file)
    }

    async fn await_processing(&self, mut file: FileMetadata) -> Result<FileMetadata, GeminiError> {
        while file.state == FileState::Processing {
            tokio::time::sleep(self.poll_interval).await;
            file = self.get_file(&file.name).await?;
        }
        if file.state == FileState::Failed {
            return Err(GeminiError::Processing(format!(
                "file {} failed remote processing",
                file.name
            )));
        }
        Ok(file)
    }

    async fn get_file(&self, name: &str) -> Result<FileMetadata, GeminiError> {
        let key = self.current_key()?;
        let url = format!("{}/v1beta/{}", self.base_url, name);

        let resp = self.http.get(&url).query(&[("key", key)]).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GeminiError::Processing(format!(
                "file lookup returned HTTP {}",
                status.as_u16()
            )));
        }
        resp.json::<FileMetadata>()
            .await
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))
    }

    async fn generate_analysis(&self, file: &FileMetadata) -> Result<GaitAnalysis, GeminiError> {
        for attempt in 0..self.max_attempts {
            let key = self.current_key()?.to_string();
            let model = self.current_model().to_string();
            tracing::debug!(attempt = attempt + 1, model = %model, "requesting gait analysis");

            let url = format!("{}/v1beta/{}:generateContent", self.base_url, model);
            let body = json!({
                "contents": [{
                    "parts": [
                        { "file_data": { "file_uri": file.uri, "mime_type": "video/mp4" } },
                        { "text": ANALYSIS_PROMPT },
                    ]
                }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": analysis_schema(),
                    "temperature": 0.0,
                }
            });

            let resp = self
                .http
                .post(&url)
                .query(&[("key", key.as_str())])
                .json(&body)
                .send()
                .await?;

            let status = resp.status();
            if status.is_success() {
                let parsed: GenerateContentResponse = resp
                    .json()
                    .await
                    .map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;
                let text = parsed
                    .candidates
                    .into_iter()
                    .next()
                    .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
                    .ok_or_else(|| {
                        GeminiError::InvalidResponse("no candidate text in response".into())
                    })?;
                return serde_json::from_str(&text).map_err(|e| {
                    GeminiError::InvalidResponse(format!("candidate is not a gait analysis: {e}"))
                });
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
                    // After a full cycle through the keys, try the next model.
                    let rotated = self.rotate_key();
                    if rotated % self.api_keys.len().max(1) == 0 {
                        self.rotate_model();
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                StatusCode::NOT_FOUND => {
                    self.rotate_model();
                }
                _ => {
                    let body = resp.text().await.unwrap_or_default();
                    return Err(GeminiError::Generation(format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        body
                    )));
                }
            }
        }

        Err(GeminiError::Exhausted)
    }

    async fn delete_file(&self, name: &str) -> Result<(), GeminiError> {
        let key = self.current_key()?;
        let url = format!("{}/v1beta/{}", self.base_url, name);

        let resp = self.http.delete(&url).query(&[("key", key)]).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GeminiError::InvalidResponse(format!(
                "delete returned HTTP {}",
                status.as_u16()
            )));
        }
        Ok(())
    }

    /// List models that can serve generation requests.
    pub async fn list_models(&self) -> Result<Vec<String>, GeminiError> {
        let key = self.current_key()?;
        let url = format!("{}/v1beta/models", self.base_url);

        let resp = self.http.get(&url).query(&[("key", key)]).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Generation(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: ListModelsResponse = resp
            .json()
            .await
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .map(|m| m.name)
            .collect())
    }
}

/// Response schema pinning the generated JSON to [`GaitAnalysis`].
fn analysis_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "parkinson_probability": { "type": "INTEGER" },
            "freezing_percentage": { "type": "NUMBER" },
            "bradykinesia_score": { "type": "INTEGER" },
            "freezing_score": { "type": "INTEGER" },
            "variability_score": { "type": "INTEGER" },
            "reasoning": { "type": "STRING" },
            "clinical_interpretation": { "type": "STRING" },
            "recommendation": { "type": "STRING" }
        },
        "required": [
            "parkinson_probability",
            "freezing_percentage",
            "bradykinesia_score",
            "freezing_score",
            "variability_score",
            "reasoning",
            "clinical_interpretation",
            "recommendation"
        ]
    })
}
