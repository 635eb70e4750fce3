//! # voiceline-render
//!
//! Pre-renders a fixed catalog of game voice lines with a voice-cloning
//! text-to-speech model.
//!
//! ## Features
//!
//! - **Voice cloning**: one speaker reference recording conditions every line
//! - **Explicit catalog**: voice lines grouped and switched on or off in JSON
//! - **Failure policy**: halt on the first failed line, or log and continue
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! voiceline-render = { version = "2026.10", features = ["zonos"] }
//! ```
//!
//! ```ignore
//! use std::path::Path;
//! use voiceline_render::{
//!     batch::{BatchConfig, BatchDriver, RenderContext},
//!     catalog::Catalog,
//!     engines::zonos::ZonosEngine,
//!     SynthesisEngine,
//! };
//!
//! let mut engine = ZonosEngine::new();
//! engine.load_model(Path::new("models/zonos"))?;
//!
//! let context = RenderContext::initialize(engine, Path::new("assets/me.wav"))?;
//! let mut driver = BatchDriver::new(context, BatchConfig::default());
//! driver.run(&Catalog::builtin()?, &mut std::io::stdout())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audio;
pub mod batch;
pub mod catalog;
pub mod conditioning;
pub mod engines;
pub mod error;

use std::path::Path;

pub use conditioning::{ConditioningRequest, SpeakerProfile};
pub use error::{RenderError, Result};

/// Error type returned across the model boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A decoded waveform produced by a synthesis engine.
///
/// Contains raw f32 mono samples and the sample rate of the output audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    /// Sample rate of the audio (44100 for Zonos)
    pub sample_rate: u32,
}

impl AudioArtifact {
    /// Write the audio to a 32-bit float WAV file, creating parent directories.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        audio::write_artifact(self, path)
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Extracts a speaker identity from a reference recording.
pub trait SpeakerEmbedder {
    /// Build a speaker profile from mono samples at `sample_rate`.
    fn make_speaker_embedding(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
    ) -> std::result::Result<SpeakerProfile, BoxError>;
}

/// Common interface for conditioned text-to-speech synthesis engines.
///
/// Synthesis happens in two stages: `generate` turns a conditioning request
/// into the model's intermediate codes, `decode` turns those codes into a
/// waveform.
pub trait SynthesisEngine {
    /// Intermediate encoded representation produced by `generate`.
    type Codes;
    /// Parameters for configuring model loading (threads, etc.)
    type ModelParams: Default;

    /// Load a model from the specified path using default parameters.
    fn load_model(&mut self, model_path: &Path) -> std::result::Result<(), BoxError> {
        self.load_model_with_params(model_path, Self::ModelParams::default())
    }

    /// Load a model from the specified path with custom parameters.
    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> std::result::Result<(), BoxError>;

    /// Unload the currently loaded model and free associated resources.
    fn unload_model(&mut self);

    /// Run the generator for one conditioning request.
    fn generate(
        &mut self,
        request: &ConditioningRequest,
    ) -> std::result::Result<Self::Codes, BoxError>;

    /// Decode generated codes into a waveform.
    fn decode(&mut self, codes: Self::Codes) -> std::result::Result<AudioArtifact, BoxError>;

    /// Generate and decode in one call.
    fn synthesize(
        &mut self,
        request: &ConditioningRequest,
    ) -> std::result::Result<AudioArtifact, BoxError> {
        let codes = self.generate(request)?;
        self.decode(codes)
    }
}
