//! Vidsum Core Library
//!
//! Core functionality for downloading a video's audio track, splitting it
//! into fixed-length segments, transcribing each segment with Whisper, and
//! producing a two-level (per-chunk + digest) summary.

pub mod config;
pub mod error;
pub mod format;
pub mod generator;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod segmenter;
pub mod source;
pub mod summarizer;
pub mod transcriber;
pub mod workspace;

mod retry;

// Re-export commonly used items at crate root
pub use config::{GenerationOptions, PipelineConfig};
pub use error::{Result, VidsumError};
pub use generator::{ChatCompletionsGenerator, TextGenerator};
pub use model::{WhisperModel, ensure_model, model_cache_dir};
pub use pipeline::{Pipeline, Stage};
pub use provider::{Provider, ProviderConfig};
pub use segmenter::{SegmentFile, segment_file_name, split};
pub use source::{AudioSource, YtDlpSource};
pub use summarizer::{SummaryOutput, map_reduce};
pub use transcriber::{SpeechToText, WhisperTranscriber, transcribe_all};
pub use workspace::Workspace;
