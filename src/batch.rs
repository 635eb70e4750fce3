//! Batch rendering of a voice-line catalog.
//!
//! [`RenderContext`] is the explicit initialization step: it loads the
//! speaker reference once and owns the engine for the run.
//! [`BatchDriver`] then walks the catalog in order and renders every enabled
//! line, one at a time.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use derive_builder::Builder;

use crate::audio;
use crate::catalog::Catalog;
use crate::conditioning::{ConditioningRequest, SpeakerProfile, DEFAULT_LANGUAGE};
use crate::error::{RenderError, Result};
use crate::{SpeakerEmbedder, SynthesisEngine};

/// Line printed once every enabled entry has been processed.
pub const COMPLETION_MESSAGE: &str = "All audio files have been generated!";

/// What the driver does when the model fails on a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the batch and return the error.
    #[default]
    Halt,
    /// Log the failure, record it in the report and move on to the next line.
    Continue,
}

/// Parameters for a batch run.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default)]
pub struct BatchConfig {
    /// Language tag attached to every conditioning request.
    #[builder(setter(into))]
    pub language: String,
    /// Applies to synthesis failures only; write failures always halt.
    pub failure_policy: FailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            failure_policy: FailurePolicy::Halt,
        }
    }
}

impl BatchConfig {
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }
}

/// Engine plus the speaker profile shared by every line of a run.
pub struct RenderContext<E> {
    engine: E,
    speaker: SpeakerProfile,
}

impl<E: SpeakerEmbedder> RenderContext<E> {
    /// Load the reference recording and extract the speaker profile.
    ///
    /// Fails with `MissingInput` before anything is written if the reference
    /// cannot be read.
    pub fn initialize(mut engine: E, reference_path: &Path) -> Result<Self> {
        let reference = audio::load_reference(reference_path)?;

        let start = Instant::now();
        let speaker = engine
            .make_speaker_embedding(&reference.samples, reference.sample_rate)
            .map_err(RenderError::SpeakerEmbedding)?;
        log::info!(
            "Speaker embedding ({} dims) extracted in {:.2?}",
            speaker.dim(),
            start.elapsed()
        );

        Ok(Self { engine, speaker })
    }
}

impl<E> RenderContext<E> {
    pub fn speaker(&self) -> &SpeakerProfile {
        &self.speaker
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

/// A line the model could not render under [`FailurePolicy::Continue`].
#[derive(Debug, Clone, PartialEq)]
pub struct FailedLine {
    pub text: String,
    pub output_path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Files written, in generation order.
    pub generated: Vec<PathBuf>,
    /// Disabled entries that were not attempted.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<FailedLine>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders catalog entries sequentially through one engine.
pub struct BatchDriver<E> {
    context: RenderContext<E>,
    config: BatchConfig,
}

impl<E: SynthesisEngine> BatchDriver<E> {
    pub fn new(context: RenderContext<E>, config: BatchConfig) -> Self {
        Self { context, config }
    }

    pub fn context(&self) -> &RenderContext<E> {
        &self.context
    }

    pub fn into_context(self) -> RenderContext<E> {
        self.context
    }

    /// Render every enabled entry of `catalog`, in order.
    ///
    /// A progress line is written to `console` after each file and a
    /// completion line at the end.
    pub fn run<W: Write>(&mut self, catalog: &Catalog, console: &mut W) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        log::info!(
            "Rendering {} of {} voice line(s)",
            catalog.enabled_count(),
            catalog.entries().count()
        );

        for entry in catalog.entries() {
            let line = entry.line;
            if !entry.enabled {
                log::debug!(
                    "Skipping disabled line in group '{}': {}",
                    entry.group,
                    line.output_path.display()
                );
                report.skipped.push(line.output_path.clone());
                continue;
            }

            let request = ConditioningRequest::new(
                line.text.as_str(),
                self.context.speaker.clone(),
                self.config.language.as_str(),
            );

            let start = Instant::now();
            let artifact = match self.context.engine.synthesize(&request) {
                Ok(artifact) => artifact,
                Err(source) => match self.config.failure_policy {
                    FailurePolicy::Halt => {
                        return Err(RenderError::Synthesis {
                            text: line.text.clone(),
                            source,
                        })
                    }
                    FailurePolicy::Continue => {
                        log::warn!(
                            "Synthesis failed for {}, continuing: {source}",
                            line.output_path.display()
                        );
                        report.failed.push(FailedLine {
                            text: line.text.clone(),
                            output_path: line.output_path.clone(),
                            reason: source.to_string(),
                        });
                        continue;
                    }
                },
            };
            log::debug!(
                "Synthesized {:.2}s of audio in {:.2?}",
                artifact.duration_secs(),
                start.elapsed()
            );

            artifact.write_wav(&line.output_path)?;
            writeln!(console, "Generated: {}", line.output_path.display())?;
            report.generated.push(line.output_path.clone());
        }

        if !report.failed.is_empty() {
            log::warn!("{} voice line(s) failed to render", report.failed.len());
        }
        writeln!(console, "{COMPLETION_MESSAGE}")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_overrides_defaults() {
        let config = BatchConfig::builder()
            .failure_policy(FailurePolicy::Continue)
            .build()
            .unwrap();
        assert_eq!(config.language, "en-us");
        assert_eq!(config.failure_policy, FailurePolicy::Continue);

        let config = BatchConfig::builder().language("fr-fr").build().unwrap();
        assert_eq!(config.language, "fr-fr");
        assert_eq!(config.failure_policy, FailurePolicy::Halt);
    }

    #[test]
    fn report_with_failures_is_incomplete() {
        let mut report = BatchReport::default();
        assert!(report.is_complete());
        report.failed.push(FailedLine {
            text: "x".to_string(),
            output_path: PathBuf::from("x.wav"),
            reason: "boom".to_string(),
        });
        assert!(!report.is_complete());
    }
}
