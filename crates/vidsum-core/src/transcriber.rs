use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::error::{Result, VidsumError};
use crate::format::single_line;
use crate::segmenter::SegmentFile;

/// Speech-to-text capability over one segment file. An empty or silent
/// segment yields an empty transcript, not an error.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, segment: &Path) -> Result<String>;
}

/// Transcribe every segment strictly in index order, producing one
/// transcript per segment. Each transcript is appended to
/// `transcripts_path` (one per line, in order) as soon as it completes, so
/// a failure partway through still leaves all earlier transcripts on disk.
/// A failing segment aborts the run with the transcription error.
pub async fn transcribe_all(
    stt: &dyn SpeechToText,
    segments: &[SegmentFile],
    transcripts_path: &Path,
) -> Result<Vec<String>> {
    let mut file = fs::File::create(transcripts_path).await?;
    let mut transcripts = Vec::with_capacity(segments.len());

    for segment in segments {
        let text = stt.transcribe(&segment.path).await?;
        let line = single_line(&text);
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        transcripts.push(line);
    }

    Ok(transcripts)
}

/// Local transcription backend built on whisper.cpp. The model context is
/// loaded once per transcriber; each call gets its own inference state.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
}

impl WhisperTranscriber {
    pub fn new(model_path: &Path) -> Result<Self> {
        let model_path_str = model_path.to_str().ok_or_else(|| VidsumError::Input {
            reason: format!("model path {} is not valid UTF-8", model_path.display()),
        })?;
        let ctx = WhisperContext::new_with_params(model_path_str, WhisperContextParameters::default())
            .map_err(|e| VidsumError::Transcription {
                segment: model_path.to_path_buf(),
                reason: format!("failed to load whisper model: {}", e),
            })?;
        Ok(Self { ctx })
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe(&self, segment: &Path) -> Result<String> {
        let mut reader = hound::WavReader::open(segment).map_err(|e| VidsumError::Transcription {
            segment: segment.to_path_buf(),
            reason: format!("cannot read segment: {}", e),
        })?;
        let samples = reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| VidsumError::Transcription {
                segment: segment.to_path_buf(),
                reason: format!("cannot decode segment: {}", e),
            })?;

        // Whisper rejects empty input; silence is a legal segment.
        if samples.is_empty() {
            return Ok(String::new());
        }

        let params = FullParams::new(SamplingStrategy::Greedy { best_of: 5 });
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| VidsumError::Transcription {
                segment: segment.to_path_buf(),
                reason: format!("failed to create whisper state: {}", e),
            })?;
        state
            .full(params, &samples)
            .map_err(|e| VidsumError::Transcription {
                segment: segment.to_path_buf(),
                reason: format!("whisper inference failed: {}", e),
            })?;

        let mut text = String::new();
        for seg in state.as_iter() {
            if let Ok(seg_text) = seg.to_str() {
                text.push_str(seg_text);
            }
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct ScriptedStt {
        // transcript per segment index, or None to fail at that index
        script: Vec<Option<&'static str>>,
        calls: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl SpeechToText for ScriptedStt {
        async fn transcribe(&self, segment: &Path) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(segment.to_path_buf());
            match self.script.get(index) {
                Some(Some(text)) => Ok(text.to_string()),
                _ => Err(VidsumError::Transcription {
                    segment: segment.to_path_buf(),
                    reason: "scripted failure".to_string(),
                }),
            }
        }
    }

    fn segments(n: usize) -> Vec<SegmentFile> {
        (0..n)
            .map(|index| SegmentFile {
                index,
                path: PathBuf::from(crate::segmenter::segment_file_name(index)),
            })
            .collect()
    }

    #[tokio::test]
    async fn transcripts_pair_with_segments_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("transcripts.txt");
        let stt = ScriptedStt {
            script: vec![Some("first"), Some("second"), Some("third")],
            calls: Mutex::new(Vec::new()),
        };

        let transcripts = transcribe_all(&stt, &segments(3), &out).await.unwrap();

        assert_eq!(transcripts, vec!["first", "second", "third"]);
        let calls = stt.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].to_string_lossy().contains("0000"));
        assert!(calls[2].to_string_lossy().contains("0002"));
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "first\nsecond\nthird\n"
        );
    }

    #[tokio::test]
    async fn silent_segment_yields_empty_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("transcripts.txt");
        let stt = ScriptedStt {
            script: vec![Some("speech"), Some(""), Some("more")],
            calls: Mutex::new(Vec::new()),
        };

        let transcripts = transcribe_all(&stt, &segments(3), &out).await.unwrap();

        assert_eq!(transcripts.len(), 3);
        assert_eq!(transcripts[1], "");
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "speech\n\nmore\n");
    }

    #[tokio::test]
    async fn multiline_output_is_flattened_to_one_line_per_segment() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("transcripts.txt");
        let stt = ScriptedStt {
            script: vec![Some("  hello\nworld ")],
            calls: Mutex::new(Vec::new()),
        };

        let transcripts = transcribe_all(&stt, &segments(1), &out).await.unwrap();

        assert_eq!(transcripts, vec!["hello world"]);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello world\n");
    }

    #[tokio::test]
    async fn failure_aborts_but_preserves_completed_transcripts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("transcripts.txt");
        let stt = ScriptedStt {
            script: vec![Some("one"), Some("two"), None],
            calls: Mutex::new(Vec::new()),
        };

        let err = transcribe_all(&stt, &segments(4), &out).await.unwrap_err();

        assert!(matches!(err, VidsumError::Transcription { .. }));
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "one\ntwo\n");
    }
}
