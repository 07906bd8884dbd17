use thiserror::Error;

/// Core error types for NeuroScreen operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid audio upload: {0}")]
    InvalidAudio(String),

    #[error("Audio too short: need at least {needed} samples, got {got}")]
    AudioTooShort { needed: usize, got: usize },

    #[error("Feature extraction failed: {0}")]
    FeatureExtraction(String),

    #[error("Feature vector length mismatch: expected {expected}, got {got}")]
    FeatureLength { expected: usize, got: usize },

    #[error("Classifier model is not loaded")]
    ModelNotLoaded,

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a new InvalidAudio error
    pub fn invalid_audio(message: impl Into<String>) -> Self {
        Self::InvalidAudio(message.into())
    }

    /// Create a new AudioTooShort error
    pub fn audio_too_short(needed: usize, got: usize) -> Self {
        Self::AudioTooShort { needed, got }
    }

    /// Create a new FeatureExtraction error
    pub fn feature_extraction(message: impl Into<String>) -> Self {
        Self::FeatureExtraction(message.into())
    }

    /// Create a new FeatureLength error
    pub fn feature_length(expected: usize, got: usize) -> Self {
        Self::FeatureLength { expected, got }
    }

    /// Create a new ModelLoad error
    pub fn model_load(message: impl Into<String>) -> Self {
        Self::ModelLoad(message.into())
    }

    /// Create a new Inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAudio(_)
                | Self::AudioTooShort { .. }
                | Self::FeatureExtraction(_)
                | Self::JsonError(_)
        )
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAudio(_) | Self::AudioTooShort { .. } | Self::FeatureExtraction(_) => {
                ErrorCategory::Validation
            }
            Self::FeatureLength { .. } => ErrorCategory::System,
            Self::ModelNotLoaded | Self::ModelLoad(_) => ErrorCategory::Model,
            Self::Inference(_) => ErrorCategory::Inference,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::System,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Model,
    Inference,
    Serialization,
    System,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Model => write!(f, "model"),
            Self::Inference => write!(f, "inference"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
