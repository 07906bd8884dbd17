pub mod classifier;
pub mod mfcc;
pub mod scaler;
pub mod wav;

pub use classifier::{ClassifierOutput, VoiceClassifier};
pub use mfcc::extract_mfcc_means;
pub use scaler::StandardScaler;
pub use wav::{DecodedAudio, decode_wav};

use neuroscreen_core::Result;

/// Full feature path: WAV bytes -> windowed mono 22.05 kHz -> 40 MFCC means.
pub fn extract_features(wav_bytes: &[u8]) -> Result<Vec<f32>> {
    let audio = wav::decode_wav(wav_bytes)?;
    let samples = wav::prepare_samples(&audio);
    mfcc::extract_mfcc_means(&samples)
}
