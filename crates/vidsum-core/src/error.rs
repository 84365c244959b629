use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidsumError {
    #[error("Invalid input: {reason}")]
    Input { reason: String },

    #[error("Fetch failed for {locator}: {reason}")]
    Fetch { locator: String, reason: String },

    #[error("Transcription failed for {segment}: {reason}")]
    Transcription { segment: PathBuf, reason: String },

    #[error("Summarization failed: {reason}")]
    Summarization { reason: String },

    #[error("Model download failed from {url}: {reason}")]
    ModelDownloadFailed { url: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    WavError(#[from] hound::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },
}

pub type Result<T> = std::result::Result<T, VidsumError>;
