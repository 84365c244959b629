use std::fmt;

use crate::config::PipelineConfig;
use crate::error::{Result, VidsumError};
use crate::generator::TextGenerator;
use crate::segmenter;
use crate::source::AudioSource;
use crate::summarizer::{self, SummaryOutput};
use crate::transcriber::{self, SpeechToText};
use crate::workspace::Workspace;

/// Pipeline stages, in execution order. Any error is the absorbing failure
/// state: the run aborts and the partially populated workspace is left on
/// disk for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Downloading,
    Segmenting,
    Transcribing,
    SummarizingMap,
    SummarizingReduce,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Downloading => "downloading audio",
            Stage::Segmenting => "segmenting audio",
            Stage::Transcribing => "transcribing segments",
            Stage::SummarizingMap => "summarizing chunks",
            Stage::SummarizingReduce => "reducing to digest",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Sequences fetch, segmentation, transcription, and map-reduce
/// summarization over a run-scoped workspace.
///
/// Each stage blocks until the previous one fully completes; there is no
/// pipelining, and no two runs may share one output root concurrently (use
/// a distinct `output_root` per run if invocations can overlap).
pub struct Pipeline {
    source: Box<dyn AudioSource>,
    stt: Box<dyn SpeechToText>,
    generator: Box<dyn TextGenerator>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn AudioSource>,
        stt: Box<dyn SpeechToText>,
        generator: Box<dyn TextGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            stt,
            generator,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.config.output_root)
    }

    /// Execute the full pipeline for one locator and return the two final
    /// artifacts.
    pub async fn run(&self, locator: &str) -> Result<SummaryOutput> {
        self.run_with_progress(locator, |_| {}).await
    }

    /// Like [`run`](Self::run), reporting each stage transition through
    /// `progress` so a front end can display live status.
    pub async fn run_with_progress(
        &self,
        locator: &str,
        mut progress: impl FnMut(Stage),
    ) -> Result<SummaryOutput> {
        if locator.trim().is_empty() {
            return Err(VidsumError::Input {
                reason: "locator must not be empty".to_string(),
            });
        }

        let workspace = self.workspace();
        workspace.reset().await?;

        progress(Stage::Downloading);
        let audio_path = self
            .source
            .fetch(locator, &workspace.raw_audio_dir())
            .await?;

        progress(Stage::Segmenting);
        let segments = segmenter::split(
            &audio_path,
            &workspace.chunks_dir(),
            self.config.segment_length_secs,
        )?;

        progress(Stage::Transcribing);
        let transcripts = transcriber::transcribe_all(
            self.stt.as_ref(),
            &segments,
            &workspace.transcripts_path(),
        )
        .await?;

        progress(Stage::SummarizingMap);
        let per_chunk = summarizer::map_summaries(
            self.generator.as_ref(),
            &transcripts,
            &self.config.generation,
            &workspace.summary_path(),
        )
        .await?;

        progress(Stage::SummarizingReduce);
        let (overall, digest) = summarizer::reduce_digest(
            self.generator.as_ref(),
            &per_chunk,
            &self.config.generation,
            &workspace.digest_path(),
        )
        .await?;

        progress(Stage::Done);
        Ok(SummaryOutput { overall, digest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationOptions;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RATE: u32 = 16_000;

    /// Writes a synthetic mono WAV of the given duration instead of
    /// touching the network.
    struct FakeSource {
        duration_secs: f64,
    }

    #[async_trait]
    impl AudioSource for FakeSource {
        async fn fetch(&self, _locator: &str, raw_audio_dir: &Path) -> Result<PathBuf> {
            let path = raw_audio_dir.join("audio.wav");
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: RATE,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut writer = hound::WavWriter::create(&path, spec).unwrap();
            for i in 0..(self.duration_secs * RATE as f64) as usize {
                writer.write_sample((i % 32) as i16).unwrap();
            }
            writer.finalize().unwrap();
            Ok(path)
        }
    }

    /// Echoes the segment filename so order is observable downstream.
    struct EchoStt;

    #[async_trait]
    impl SpeechToText for EchoStt {
        async fn transcribe(&self, segment: &Path) -> Result<String> {
            Ok(format!(
                "spoken {}",
                segment.file_name().unwrap().to_string_lossy()
            ))
        }
    }

    /// Summarizes by numbering calls; the digest call echoes its input
    /// length so tests can tell the stages apart.
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn complete(
            &self,
            system: &str,
            user: &str,
            _options: &GenerationOptions,
        ) -> Result<Vec<String>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if system == crate::summarizer::REDUCE_PROMPT {
                Ok(vec![format!("digest of {} chars", user.len())])
            } else {
                Ok(vec![format!("- note {} on {}", n, user)])
            }
        }
    }

    fn pipeline(root: PathBuf, duration_secs: f64, segment_length_secs: u32) -> Pipeline {
        Pipeline::new(
            Box::new(FakeSource { duration_secs }),
            Box::new(EchoStt),
            Box::new(CountingGenerator {
                calls: AtomicUsize::new(0),
            }),
            PipelineConfig {
                output_root: root,
                segment_length_secs,
                generation: GenerationOptions::default(),
            },
        )
    }

    #[tokio::test]
    async fn full_run_produces_both_artifacts_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(dir.path().join("outputs"), 5.0, 2);

        let mut stages = Vec::new();
        let output = p
            .run_with_progress("https://example.com/v", |s| stages.push(s))
            .await
            .unwrap();

        assert_eq!(
            stages,
            vec![
                Stage::Downloading,
                Stage::Segmenting,
                Stage::Transcribing,
                Stage::SummarizingMap,
                Stage::SummarizingReduce,
                Stage::Done,
            ]
        );

        // 5s at 2s segments -> 3 chunks -> 3 summary lines
        let lines: Vec<&str> = output.overall.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("chunk_0000.wav"));
        assert!(lines[2].contains("chunk_0002.wav"));
        assert!(output.digest.starts_with("digest of"));

        let ws = p.workspace();
        assert_eq!(
            std::fs::read_to_string(ws.summary_path()).unwrap(),
            format!("{}\n", output.overall)
        );
        assert_eq!(
            std::fs::read_to_string(ws.digest_path()).unwrap(),
            format!("{}\n", output.digest)
        );
        let transcript_lines =
            std::fs::read_to_string(ws.transcripts_path()).unwrap();
        assert_eq!(transcript_lines.lines().count(), 3);
    }

    #[tokio::test]
    async fn stale_output_root_is_fully_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("outputs");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("leftover.txt"), "from a prior run").unwrap();

        let p = pipeline(root.clone(), 3.0, 2);
        p.run("https://example.com/v").await.unwrap();

        let mut entries: Vec<String> = std::fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        assert_eq!(
            entries,
            vec![
                "chunks",
                "digest.txt",
                "raw_audio",
                "summary.txt",
                "transcripts.txt"
            ]
        );
    }

    #[tokio::test]
    async fn rerun_against_same_root_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("outputs");

        let p = pipeline(root.clone(), 3.0, 2);
        p.run("https://example.com/v").await.unwrap();
        let second = pipeline(root, 3.0, 2);
        second.run("https://example.com/v").await.unwrap();
    }

    #[tokio::test]
    async fn empty_locator_is_rejected_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("outputs");
        let p = pipeline(root.clone(), 3.0, 2);

        let err = p.run("   ").await.unwrap_err();
        assert!(matches!(err, VidsumError::Input { .. }));
        assert!(!root.exists());
    }
}
