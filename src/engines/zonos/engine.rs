use std::path::{Path, PathBuf};

use ndarray::Array3;

use crate::{
    AudioArtifact, BoxError, ConditioningRequest, SpeakerEmbedder, SpeakerProfile,
    SynthesisEngine,
};

use super::model::{ZonosError, ZonosModel};
use super::phonemizer::{phonemize, EspeakConfig};

/// Parameters for configuring Zonos model loading.
#[derive(Debug, Clone, Default)]
pub struct ZonosModelParams {
    /// Number of CPU threads to use for inference.
    /// `None` uses the ORT default (typically all available cores).
    pub num_threads: Option<usize>,
    /// Directory for caching the Level3-optimized ONNX graphs, one file per
    /// session. Must be writable.
    pub optimized_model_cache_dir: Option<PathBuf>,
}

/// Zonos voice-cloning text-to-speech engine.
///
/// Runs an ONNX export of Zonos: a speaker encoder, an autoregressive
/// generator producing audio codes, and the autoencoder decoder. Requires
/// espeak-ng for phonemization.
///
/// ```rust,no_run
/// use voiceline_render::{SynthesisEngine, SpeakerEmbedder, ConditioningRequest};
/// use voiceline_render::engines::zonos::ZonosEngine;
/// use std::path::PathBuf;
///
/// let mut engine = ZonosEngine::new();
/// engine.load_model(&PathBuf::from("models/zonos"))?;
/// let speaker = engine.make_speaker_embedding(&[0.0; 16000], 16000)?;
/// let request = ConditioningRequest::new("Hello, world!", speaker, "en-us");
/// let audio = engine.synthesize(&request)?;
/// # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
/// ```
pub struct ZonosEngine {
    model: Option<ZonosModel>,
    model_path: Option<PathBuf>,
    espeak: EspeakConfig,
}

impl Default for ZonosEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ZonosEngine {
    /// Create a new engine that uses `espeak-ng` from PATH.
    pub fn new() -> Self {
        Self::with_espeak(None, None)
    }

    /// Create a new engine with explicit espeak-ng binary and data paths.
    pub fn with_espeak(bin_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Self {
        Self {
            model: None,
            model_path: None,
            espeak: EspeakConfig {
                bin_path,
                data_path,
            },
        }
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    /// Languages the loaded model accepts (empty if no model is loaded).
    pub fn languages(&self) -> &[String] {
        self.model
            .as_ref()
            .map(|m| m.config().languages.as_slice())
            .unwrap_or_default()
    }

    fn model_mut(&mut self) -> Result<&mut ZonosModel, ZonosError> {
        self.model.as_mut().ok_or(ZonosError::ModelNotLoaded)
    }
}

impl Drop for ZonosEngine {
    fn drop(&mut self) {
        self.unload_model();
    }
}

impl SpeakerEmbedder for ZonosEngine {
    fn make_speaker_embedding(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<SpeakerProfile, BoxError> {
        let embedding = self.model_mut()?.embed_speaker(samples, sample_rate)?;
        Ok(SpeakerProfile::new(embedding))
    }
}

impl SynthesisEngine for ZonosEngine {
    type Codes = Array3<i64>;
    type ModelParams = ZonosModelParams;

    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), BoxError> {
        let model = ZonosModel::load(
            model_path,
            params.num_threads,
            params.optimized_model_cache_dir.as_deref(),
        )?;
        self.model = Some(model);
        self.model_path = Some(model_path.to_path_buf());
        Ok(())
    }

    fn unload_model(&mut self) {
        self.model = None;
        self.model_path = None;
    }

    fn generate(&mut self, request: &ConditioningRequest) -> Result<Self::Codes, BoxError> {
        let espeak = self.espeak.clone();
        let model = self.model_mut()?;

        let language_id = model.config().language_id(&request.language)?;
        let ids = phonemize(
            &request.text,
            &request.language,
            &model.config().symbols,
            &espeak,
        )?;
        if ids.is_empty() {
            return Err(ZonosError::NoPhonemes(request.text.clone()).into());
        }
        log::debug!("{} phoneme tokens for {:?}", ids.len(), request.text);

        Ok(model.generate(&ids, request.speaker.embedding(), language_id)?)
    }

    fn decode(&mut self, codes: Self::Codes) -> Result<AudioArtifact, BoxError> {
        let model = self.model_mut()?;
        let samples = model.decode(&codes)?;
        Ok(AudioArtifact {
            samples,
            sample_rate: model.config().sampling_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_requires_loaded_model() {
        let mut engine = ZonosEngine::new();
        let speaker = SpeakerProfile::new(vec![0.0; 128]);
        let request = ConditioningRequest::new("Hello", speaker, "en-us");
        let err = engine.synthesize(&request).unwrap_err();
        assert!(err.to_string().contains("Model not loaded"));
        assert!(engine.languages().is_empty());
    }

    #[test]
    fn embedding_requires_loaded_model() {
        let mut engine = ZonosEngine::new();
        assert!(engine.make_speaker_embedding(&[0.0; 160], 16000).is_err());
    }

    #[test]
    fn loading_from_empty_directory_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut engine = ZonosEngine::new();
        assert!(engine.load_model(dir.path()).is_err());
        assert!(engine.model_path().is_none());
    }
}
