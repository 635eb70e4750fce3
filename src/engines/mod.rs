//! Speech synthesis engines.
//!
//! This module contains implementations of the model boundary
//! ([`SpeakerEmbedder`](crate::SpeakerEmbedder) and
//! [`SynthesisEngine`](crate::SynthesisEngine)).
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `zonos` - Zonos voice-cloning TTS (ONNX export, espeak-ng required)

#[cfg(feature = "zonos")]
pub mod zonos;
