use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Result, VidsumError};
use crate::retry;

/// Resolves a video locator to a single local raw-audio file.
///
/// Implementations must return the path of a canonical WAV: 16 kHz, mono,
/// signed 16-bit. Downstream segment boundary arithmetic depends on the
/// rate being uniform across the whole recording.
#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn fetch(&self, locator: &str, raw_audio_dir: &Path) -> Result<PathBuf>;
}

pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;

const FETCH_MAX_RETRIES: u32 = 2;
const FETCH_BACKOFF_MS: u64 = 500;

/// Downloads the audio track with yt-dlp and normalizes it with ffmpeg.
/// The ffmpeg resample to 16 kHz mono is what guarantees uniform segment
/// boundaries regardless of the source container's rate or channel count.
#[derive(Default)]
pub struct YtDlpSource;

impl YtDlpSource {
    pub fn new() -> Self {
        Self
    }

    async fn download(&self, locator: &str, raw_audio_dir: &Path) -> Result<PathBuf> {
        let output_template = raw_audio_dir.join("source.%(ext)s");
        let output = Command::new("yt-dlp")
            .arg(locator)
            .arg("--print")
            .arg("after_move:filepath")
            .arg("--extractor-args")
            .arg("youtube:player_client=android,web")
            .arg("-f")
            .arg("bestaudio/best")
            .arg("-o")
            .arg(&output_template)
            .output()
            .await?;

        if !output.status.success() {
            return Err(VidsumError::Fetch {
                locator: locator.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let stdout_str = String::from_utf8_lossy(output.stdout.as_slice());
        Ok(PathBuf::from(stdout_str.trim()))
    }

    async fn normalize(&self, locator: &str, source_path: &Path, audio_path: &Path) -> Result<()> {
        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(source_path)
            .arg("-vn")
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("-ar")
            .arg(CANONICAL_SAMPLE_RATE.to_string())
            .arg("-ac")
            .arg("1")
            .arg(audio_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(VidsumError::Fetch {
                locator: locator.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl AudioSource for YtDlpSource {
    async fn fetch(&self, locator: &str, raw_audio_dir: &Path) -> Result<PathBuf> {
        if locator.trim().is_empty() {
            return Err(VidsumError::Input {
                reason: "locator must not be empty".to_string(),
            });
        }

        // Downloads fail transiently (network, throttling); normalization
        // of an already-downloaded file does not.
        let source_path = retry::with_backoff(
            FETCH_MAX_RETRIES,
            FETCH_BACKOFF_MS,
            || self.download(locator, raw_audio_dir),
            |e| matches!(e, VidsumError::Fetch { .. }),
        )
        .await?;

        let audio_path = raw_audio_dir.join("audio.wav");
        self.normalize(locator, &source_path, &audio_path).await?;
        Ok(audio_path)
    }
}
