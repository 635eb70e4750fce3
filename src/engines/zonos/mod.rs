//! Zonos voice-cloning text-to-speech engine.
//!
//! Runs an ONNX export of Zonos v0.1. Speech is conditioned on a speaker
//! embedding taken from a short reference recording, so one engine instance
//! can render any number of lines in the same voice.
//!
//! # System Requirements
//!
//! **espeak-ng** must be installed on your system:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>
//!
//! # Model Directory Layout
//!
//! ```text
//! models/zonos/
//! ├── speaker_embedding.onnx    # "wav" [1, N] f32 -> embedding [1, D]
//! ├── generator.onnx            # "phoneme_ids", "speaker", "language_id" -> codes [1, Q, F]
//! ├── autoencoder_decoder.onnx  # "codes" [1, Q, F] -> waveform
//! └── config.json               # symbols, languages, sampling rates
//! ```
//!
//! `config.json`:
//!
//! ```json
//! {
//!   "symbols": { " ": 0, "a": 1, "ə": 2 },
//!   "languages": ["en-gb", "en-us", "fr-fr"],
//!   "sampling_rate": 44100,
//!   "speaker_sampling_rate": 16000
//! }
//! ```
//!
//! A language's id is its position in `languages`; the same tag is passed
//! to espeak-ng as the voice.

pub mod config;
pub mod engine;
pub mod model;
pub mod phonemizer;
pub mod speaker;

pub use config::ZonosConfig;
pub use engine::{ZonosEngine, ZonosModelParams};
pub use model::ZonosError;
pub use phonemizer::EspeakConfig;
