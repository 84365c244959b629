use std::path::PathBuf;

use tokio::{fs, process::Command};

use crate::error::{Result, VidsumError};

/// Whisper model size: the accuracy/speed trade-off knob for the local
/// transcription backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WhisperModel {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
}

impl WhisperModel {
    pub fn file_name(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "ggml-tiny.bin",
            WhisperModel::Base => "ggml-base.bin",
            WhisperModel::Small => "ggml-small.bin",
            WhisperModel::Medium => "ggml-medium-q5_0.bin",
        }
    }
}

pub fn model_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("vidsum")
        .join("models")
}

/// Download the ggml weights into the model cache if not already present,
/// returning the local path.
pub async fn ensure_model(model: WhisperModel) -> Result<PathBuf> {
    let download_url = format!(
        "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/{}",
        model.file_name()
    );
    let model_dir = model_cache_dir();

    if !model_dir.exists() {
        fs::create_dir_all(&model_dir).await?;
    }

    let model_path = model_dir.join(model.file_name());
    if !model_path.exists() {
        let output = Command::new("curl")
            .arg("-L")
            .arg(&download_url)
            .arg("-o")
            .arg(&model_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(VidsumError::ModelDownloadFailed {
                url: download_url,
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
    }

    Ok(model_path)
}
