//! WAV input and output.
//!
//! The reference loader decodes the speaker recording into mono samples; the
//! output writer serializes synthesized waveforms to disk.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{RenderError, Result};
use crate::AudioArtifact;

/// A decoded reference recording.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceAudio {
    /// Mono samples in [-1, 1]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Load a reference recording from a WAV file.
///
/// Integer and float encodings are accepted; multichannel audio is averaged
/// down to mono. A missing, undecodable or empty file is a `MissingInput`.
pub fn load_reference(path: &Path) -> Result<ReferenceAudio> {
    let missing = |reason: String| RenderError::MissingInput {
        path: path.to_path_buf(),
        reason,
    };

    let reader = WavReader::open(path).map_err(|e| missing(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| missing(e.to_string()))?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| missing(e.to_string()))?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples: Vec<f32> = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    if samples.is_empty() {
        return Err(missing("recording contains no samples".to_string()));
    }

    log::info!(
        "Loaded reference {} ({} samples @ {}Hz, {} channel(s))",
        path.display(),
        samples.len(),
        spec.sample_rate,
        channels
    );

    Ok(ReferenceAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Write an artifact as a mono 32-bit float WAV file.
///
/// Missing parent directories are created; an existing file is overwritten.
pub fn write_artifact(artifact: &AudioArtifact, path: &Path) -> Result<()> {
    let write_err = |source: hound::Error| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_err(hound::Error::IoError(e)))?;
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: artifact.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).map_err(write_err)?;
    for &sample in &artifact.samples {
        writer.write_sample(sample).map_err(write_err)?;
    }
    writer.finalize().map_err(write_err)?;

    log::debug!(
        "Wrote {} ({:.2}s of audio)",
        path.display(),
        artifact.duration_secs()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pcm16(path: &Path, channels: u16, frames: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn loads_int_reference_as_normalized_floats() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("me.wav");
        write_pcm16(&path, 1, &[0, 16384, -32768]);

        let reference = load_reference(&path).unwrap();
        assert_eq!(reference.sample_rate, 16000);
        assert_eq!(reference.samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn averages_stereo_reference_to_mono() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.wav");
        write_pcm16(&path, 2, &[16384, 0, -16384, -16384]);

        let reference = load_reference(&path).unwrap();
        assert_eq!(reference.samples, vec![0.25, -0.5]);
    }

    #[test]
    fn missing_reference_is_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = load_reference(&dir.path().join("absent.wav")).unwrap_err();
        assert!(matches!(err, RenderError::MissingInput { .. }));
    }

    #[test]
    fn corrupt_reference_is_missing_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.wav");
        fs::write(&path, b"not a wav file").unwrap();
        let err = load_reference(&path).unwrap_err();
        assert!(matches!(err, RenderError::MissingInput { .. }));
    }

    #[test]
    fn empty_reference_is_missing_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.wav");
        write_pcm16(&path, 1, &[]);
        let err = load_reference(&path).unwrap_err();
        assert!(matches!(err, RenderError::MissingInput { .. }));
    }

    #[test]
    fn writer_creates_parent_directories_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AI_GEN").join("insult").join("1.wav");

        let first = AudioArtifact {
            samples: vec![0.1; 100],
            sample_rate: 44100,
        };
        write_artifact(&first, &path).unwrap();

        let second = AudioArtifact {
            samples: vec![-0.2; 10],
            sample_rate: 22050,
        };
        write_artifact(&second, &path).unwrap();

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.spec().sample_format, SampleFormat::Float);
        let samples: Vec<f32> = reader.into_samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![-0.2; 10]);
    }

    #[test]
    fn writer_reports_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").unwrap();

        let artifact = AudioArtifact {
            samples: vec![0.0; 4],
            sample_rate: 44100,
        };
        let err = write_artifact(&artifact, &blocker.join("out.wav")).unwrap_err();
        assert!(matches!(err, RenderError::Write { .. }));
    }
}
