use std::path::{Path, PathBuf};

use crate::error::{Result, VidsumError};

/// One fixed-length slice of the source audio, written as an independent
/// WAV file. `index` equals temporal order; filenames are zero-padded so
/// that a sorted directory listing reconstructs that order.
#[derive(Debug, Clone)]
pub struct SegmentFile {
    pub index: usize,
    pub path: PathBuf,
}

pub fn segment_file_name(index: usize) -> String {
    format!("chunk_{:04}.wav", index)
}

/// Split a mono WAV into fixed-length segments of `segment_length_secs`
/// seconds, indexed 0..N-1. Segments cover the recording fully without
/// overlap; the last one is clipped to the remaining samples. A recording
/// whose duration is an exact multiple of the segment length produces
/// exactly `duration / length` segments, with no empty trailing file.
pub fn split(
    audio_path: &Path,
    chunks_dir: &Path,
    segment_length_secs: u32,
) -> Result<Vec<SegmentFile>> {
    if segment_length_secs == 0 {
        return Err(VidsumError::Input {
            reason: "segment length must be positive".to_string(),
        });
    }

    let mut reader = hound::WavReader::open(audio_path).map_err(|e| VidsumError::Input {
        reason: format!("cannot read audio file {}: {}", audio_path.display(), e),
    })?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(VidsumError::Input {
            reason: format!("expected mono audio, got {} channels", spec.channels),
        });
    }

    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<i16>, _>>()
        .map_err(|e| VidsumError::Input {
            reason: format!("cannot decode audio file {}: {}", audio_path.display(), e),
        })?;
    if samples.is_empty() {
        return Err(VidsumError::Input {
            reason: format!("audio file {} is empty", audio_path.display()),
        });
    }

    std::fs::create_dir_all(chunks_dir)?;

    let samples_per_segment = spec.sample_rate as usize * segment_length_secs as usize;
    let segment_count = samples.len().div_ceil(samples_per_segment);

    let mut segments = Vec::with_capacity(segment_count);
    for index in 0..segment_count {
        let start = index * samples_per_segment;
        let end = (start + samples_per_segment).min(samples.len());
        let path = chunks_dir.join(segment_file_name(index));

        let mut writer = hound::WavWriter::create(&path, spec)?;
        for sample in &samples[start..end] {
            writer.write_sample(*sample)?;
        }
        writer.finalize()?;

        segments.push(SegmentFile { index, path });
    }

    Ok(segments)
}
