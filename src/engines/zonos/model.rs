use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3, Ix3};
use ort::execution_providers::CPUExecutionProvider;
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use super::config::ZonosConfig;
use super::speaker::resample;

pub const SPEAKER_MODEL_FILE: &str = "speaker_embedding.onnx";
pub const GENERATOR_MODEL_FILE: &str = "generator.onnx";
pub const DECODER_MODEL_FILE: &str = "autoencoder_decoder.onnx";
pub const CONFIG_FILE: &str = "config.json";

#[derive(thiserror::Error, Debug)]
pub enum ZonosError {
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("Phonemization failed: {0}")]
    PhonemizerFailed(String),
    #[error("No phoneme tokens produced for {0:?}")]
    NoPhonemes(String),
    #[error("Language '{0}' is not supported by this model")]
    UnsupportedLanguage(String),
    #[error("Model not loaded. Call load_model() first.")]
    ModelNotLoaded,
    #[error("Invalid config.json: {0}")]
    Config(String),
    #[error("Resampling failed: {0}")]
    Resample(String),
    #[error("Unexpected model output: {0}")]
    Output(String),
}

/// The three ONNX graphs of an exported Zonos model plus its config.
pub struct ZonosModel {
    speaker_encoder: Session,
    generator: Session,
    decoder: Session,
    config: ZonosConfig,
}

impl ZonosModel {
    /// Load a Zonos export from a directory.
    ///
    /// The directory must contain `speaker_embedding.onnx`, `generator.onnx`,
    /// `autoencoder_decoder.onnx` and `config.json`.
    pub fn load(
        model_dir: &Path,
        num_threads: Option<usize>,
        optimized_cache_dir: Option<&Path>,
    ) -> Result<Self, ZonosError> {
        log::info!("Loading Zonos model from {}", model_dir.display());

        let config = ZonosConfig::load(&model_dir.join(CONFIG_FILE))?;
        log::info!(
            "Config: {} symbols, {} languages, output {}Hz, speaker encoder {}Hz",
            config.symbols.len(),
            config.languages.len(),
            config.sampling_rate,
            config.speaker_sampling_rate
        );

        let open = |file: &str| -> Result<Session, ZonosError> {
            let onnx_path = require_file(model_dir, file)?;
            let cache = optimized_cache_dir.map(|dir| optimized_path(dir, file));
            init_session(&onnx_path, num_threads, cache.as_deref())
        };

        Ok(Self {
            speaker_encoder: open(SPEAKER_MODEL_FILE)?,
            generator: open(GENERATOR_MODEL_FILE)?,
            decoder: open(DECODER_MODEL_FILE)?,
            config,
        })
    }

    pub fn config(&self) -> &ZonosConfig {
        &self.config
    }

    /// Run the speaker encoder on a mono recording.
    pub fn embed_speaker(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<f32>, ZonosError> {
        let wav = resample(samples, sample_rate, self.config.speaker_sampling_rate)?;
        let wav_arr = Array2::from_shape_vec((1, wav.len()), wav)?;

        let output = self.speaker_encoder.run(inputs![
            "wav" => TensorRef::from_array_view(wav_arr.view())?,
        ])?;

        let first_output = output
            .iter()
            .next()
            .ok_or_else(|| ZonosError::Output("speaker encoder produced no output".into()))?;
        let embedding = first_output.1.try_extract_array::<f32>()?;

        Ok(embedding.iter().copied().collect())
    }

    /// Run the generator and return codes shaped `[1, codebooks, frames]`.
    pub fn generate(
        &mut self,
        phoneme_ids: &[i64],
        speaker: &[f32],
        language_id: i64,
    ) -> Result<Array3<i64>, ZonosError> {
        let ids_arr = Array2::from_shape_vec((1, phoneme_ids.len()), phoneme_ids.to_vec())?;
        let speaker_view = ndarray::ArrayView2::from_shape((1, speaker.len()), speaker)?;
        let language_arr = ndarray::arr1(&[language_id]);

        let output = self.generator.run(inputs![
            "phoneme_ids" => TensorRef::from_array_view(ids_arr.view())?,
            "speaker" => TensorRef::from_array_view(speaker_view)?,
            "language_id" => TensorRef::from_array_view(language_arr.view())?,
        ])?;

        let first_output = output
            .iter()
            .next()
            .ok_or_else(|| ZonosError::Output("generator produced no output".into()))?;
        let codes = first_output.1.try_extract_array::<i64>()?;
        if codes.ndim() != 3 {
            return Err(ZonosError::Output(format!(
                "expected codes of rank 3, got shape {:?}",
                codes.shape()
            )));
        }

        Ok(codes.to_owned().into_dimensionality::<Ix3>()?)
    }

    /// Decode generator codes into mono samples at the output rate.
    pub fn decode(&mut self, codes: &Array3<i64>) -> Result<Vec<f32>, ZonosError> {
        let output = self.decoder.run(inputs![
            "codes" => TensorRef::from_array_view(codes.view())?,
        ])?;

        let first_output = output
            .iter()
            .next()
            .ok_or_else(|| ZonosError::Output("decoder produced no output".into()))?;
        let waveform = first_output.1.try_extract_array::<f32>()?;

        Ok(waveform.iter().copied().collect())
    }
}

fn require_file(model_dir: &Path, file: &str) -> Result<PathBuf, ZonosError> {
    let path = model_dir.join(file);
    if !path.exists() {
        return Err(ZonosError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{file} not found in {}", model_dir.display()),
        )));
    }
    Ok(path)
}

/// Cache location of the pre-optimized graph for `file`.
fn optimized_path(cache_dir: &Path, file: &str) -> PathBuf {
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file);
    cache_dir.join(format!("{stem}.optimized.onnx"))
}

/// Initialize an ONNX session with optional on-disk graph caching.
///
/// The first load runs Level3 graph optimization and serialises the result to
/// `optimized_cache_path`; later loads read that file at `Disable`.
fn init_session(
    onnx_path: &Path,
    num_threads: Option<usize>,
    optimized_cache_path: Option<&Path>,
) -> Result<Session, ZonosError> {
    let providers = vec![CPUExecutionProvider::default().build()];

    let (load_path, opt_level, write_cache) = match optimized_cache_path {
        Some(cache) if cache.exists() => {
            log::info!("Loading pre-optimized graph from {}", cache.display());
            (cache, GraphOptimizationLevel::Disable, None)
        }
        Some(cache) => {
            log::info!(
                "First load of {}: optimizing, graph cached at {}",
                onnx_path.display(),
                cache.display()
            );
            (onnx_path, GraphOptimizationLevel::Level3, Some(cache))
        }
        None => (onnx_path, GraphOptimizationLevel::Level3, None),
    };

    let mut builder = Session::builder()?
        .with_optimization_level(opt_level)?
        .with_execution_providers(providers)?;

    if let Some(cache) = write_cache {
        if let Some(parent) = cache.parent() {
            std::fs::create_dir_all(parent)?;
        }
        builder = builder.with_optimized_model_path(cache)?;
    }

    if let Some(threads) = num_threads {
        builder = builder
            .with_intra_threads(threads)?
            .with_inter_threads(threads)?;
    }

    Ok(builder.commit_from_file(load_path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimized_graphs_are_cached_per_session() {
        let dir = Path::new("/tmp/zonos-cache");
        assert_eq!(
            optimized_path(dir, GENERATOR_MODEL_FILE),
            dir.join("generator.optimized.onnx")
        );
        assert_ne!(
            optimized_path(dir, SPEAKER_MODEL_FILE),
            optimized_path(dir, DECODER_MODEL_FILE)
        );
    }

    #[test]
    fn missing_model_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = require_file(dir.path(), GENERATOR_MODEL_FILE).unwrap_err();
        assert!(err.to_string().contains("generator.onnx"));
    }
}
