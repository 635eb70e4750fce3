use rubato::{FftFixedIn, Resampler};

use super::model::ZonosError;

const RESAMPLE_CHUNK: usize = 1024;

/// Resample mono audio from `source_sr` to `target_sr`.
///
/// The resampler's delay is dropped and the output is exactly
/// `len * target_sr / source_sr` samples long, so neither the delay nor the
/// zero padding of the last chunk reaches the speaker encoder.
pub fn resample(samples: &[f32], source_sr: u32, target_sr: u32) -> Result<Vec<f32>, ZonosError> {
    if source_sr == target_sr || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_sr as usize,
        target_sr as usize,
        RESAMPLE_CHUNK,
        2,
        1,
    )
    .map_err(|e| ZonosError::Resample(e.to_string()))?;

    // The resampler may round the chunk size up to a multiple of its FFT size.
    let chunk = resampler.input_frames_next();
    let delay = resampler.output_delay();
    let target_len = expected_len(samples.len(), source_sr, target_sr);

    let mut output = Vec::with_capacity(target_len + delay);
    let mut input_buffer = vec![vec![0.0f32; chunk]];
    let mut output_buffer = resampler.output_buffer_allocate(true);

    // Past the end of the input, zero chunks flush the resampler's delay line.
    let mut pos = 0;
    while output.len() < target_len + delay {
        let start = pos.min(samples.len());
        let end = (pos + chunk).min(samples.len());
        let actual_len = end - start;

        input_buffer[0][..actual_len].copy_from_slice(&samples[start..end]);
        input_buffer[0][actual_len..].fill(0.0);

        let (_, out_len) = resampler
            .process_into_buffer(&input_buffer, &mut output_buffer, None)
            .map_err(|e| ZonosError::Resample(e.to_string()))?;

        output.extend_from_slice(&output_buffer[0][..out_len]);
        pos += chunk;
    }

    output.drain(..delay);
    output.truncate(target_len);
    log::debug!(
        "Resampled reference {}Hz -> {}Hz ({} -> {} samples)",
        source_sr,
        target_sr,
        samples.len(),
        output.len()
    );
    Ok(output)
}

fn expected_len(len: usize, source_sr: u32, target_sr: u32) -> usize {
    (len as u64 * target_sr as u64 / source_sr as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 16_000, 16_000).unwrap(), samples);
    }

    #[test]
    fn downsampling_yields_expected_length() {
        let samples = vec![0.0f32; 3 * 44_100];
        assert_eq!(resample(&samples, 44_100, 16_000).unwrap().len(), 48_000);

        let samples = vec![0.0f32; 30_720];
        assert_eq!(resample(&samples, 48_000, 16_000).unwrap().len(), 10_240);
    }

    #[test]
    fn constant_signal_keeps_its_level() {
        let samples = vec![0.5f32; 16_000];
        let out = resample(&samples, 32_000, 16_000).unwrap();
        assert_eq!(out.len(), 8_000);
        let middle = out[4_000];
        assert!((middle - 0.5).abs() < 0.05, "got {middle}");
    }
}
