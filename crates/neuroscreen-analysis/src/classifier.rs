//! ONNX classifier session wrapping the trained voice model.
//!
//! The model is an externally trained binary-classification head over the
//! standardized 40-dim MFCC vector, exported to ONNX. It is loaded once at
//! process start; `Session::run` needs `&mut Session`, so the session sits
//! behind a mutex and the classifier is shared via `Arc`.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array2;
use neuroscreen_core::{CoreError, Result};
use ort::session::Session;
use ort::value::Tensor;

use crate::mfcc::N_MFCC;

/// Input tensor name the exported model carries.
const INPUT_NAME: &str = "features";

/// Decision threshold separating the two labels.
const THRESHOLD: f32 = 0.5;

pub const LABEL_POSITIVE: &str = "Parkinson's";
pub const LABEL_NEGATIVE: &str = "Healthy";

/// Labelled prediction with its raw model probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierOutput {
    pub label: String,
    /// Always within [0, 1]
    pub confidence: f32,
}

/// Pre-loaded ONNX session for voice predictions.
#[derive(Debug)]
pub struct VoiceClassifier {
    session: Mutex<Session>,
}

impl VoiceClassifier {
    /// Load the model artifact from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::model_load(format!(
                "model not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| CoreError::model_load(e.to_string()))?;

        tracing::info!(path = %path.display(), "classifier model loaded");

        Ok(Self {
            session: Mutex::new(session),
        })
    }

    /// Run the model on a standardized feature vector.
    ///
    /// Input shape is `[1, 40]`; the first output value is taken as the
    /// sigmoid probability of the positive class.
    pub fn predict(&self, features: &[f32]) -> Result<ClassifierOutput> {
        if features.len() != N_MFCC {
            return Err(CoreError::feature_length(N_MFCC, features.len()));
        }

        let input = Array2::from_shape_vec((1, N_MFCC), features.to_vec())
            .map_err(|e| CoreError::inference(e.to_string()))?;
        let input_tensor =
            Tensor::from_array(input).map_err(|e| CoreError::inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| CoreError::inference("classifier session poisoned"))?;

        let outputs = session
            .run(ort::inputs![INPUT_NAME => input_tensor])
            .map_err(|e| CoreError::inference(e.to_string()))?;

        let (_, value) = outputs
            .iter()
            .next()
            .ok_or_else(|| CoreError::inference("model produced no output"))?;

        let (_shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| CoreError::inference(e.to_string()))?;

        let probability = data
            .first()
            .copied()
            .ok_or_else(|| CoreError::inference("model output tensor is empty"))?;

        Ok(classify(probability))
    }
}

/// Map a raw sigmoid probability to the labelled output.
fn classify(probability: f32) -> ClassifierOutput {
    let confidence = if probability.is_finite() {
        probability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let label = if confidence > THRESHOLD {
        LABEL_POSITIVE
    } else {
        LABEL_NEGATIVE
    };
    ClassifierOutput {
        label: label.to_string(),
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_above_threshold_is_positive() {
        let out = classify(0.87);
        assert_eq!(out.label, LABEL_POSITIVE);
        assert!((out.confidence - 0.87).abs() < 1e-6);
    }

    #[test]
    fn classify_below_threshold_is_negative() {
        let out = classify(0.12);
        assert_eq!(out.label, LABEL_NEGATIVE);
    }

    #[test]
    fn classify_at_threshold_is_negative() {
        // p > 0.5 flips the label, exactly 0.5 does not
        assert_eq!(classify(0.5).label, LABEL_NEGATIVE);
    }

    #[test]
    fn classify_clamps_out_of_range_values() {
        assert_eq!(classify(1.7).confidence, 1.0);
        assert_eq!(classify(-0.3).confidence, 0.0);
        assert_eq!(classify(f32::NAN).confidence, 0.0);
    }

    #[test]
    fn load_missing_model_is_server_error() {
        let err = VoiceClassifier::load(Path::new("/nonexistent/model.onnx")).unwrap_err();
        assert!(err.is_server_error());
        assert!(err.to_string().contains("model not found"));
    }
}
