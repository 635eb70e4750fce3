use std::sync::Arc;

use derive_builder::Builder;

/// Language tag used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Fixed-size speaker identity extracted from a reference recording.
///
/// Cloning is cheap; every request of a run shares the same embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerProfile {
    embedding: Arc<[f32]>,
}

impl SpeakerProfile {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding: embedding.into(),
        }
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn dim(&self) -> usize {
        self.embedding.len()
    }
}

/// Everything the synthesis engine needs to render one line.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into))]
pub struct ConditioningRequest {
    pub text: String,
    pub speaker: SpeakerProfile,
    #[builder(default = "DEFAULT_LANGUAGE.to_string()")]
    pub language: String,
}

impl ConditioningRequest {
    pub fn new(text: impl Into<String>, speaker: SpeakerProfile, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker,
            language: language.into(),
        }
    }

    pub fn builder() -> ConditioningRequestBuilder {
        ConditioningRequestBuilder::default()
    }
}
