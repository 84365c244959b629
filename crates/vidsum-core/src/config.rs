use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::provider::Provider;

/// Pass-through sampling options for the text-generation capability.
///
/// None of these are validated by the core beyond the model identifier
/// being non-empty; the backend is free to reject values it cannot honor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier sent to the generation backend. Must be non-empty.
    pub model: String,
    /// Sampling temperature. Default 0.3.
    pub temperature: f32,
    /// Maximum completion length in tokens. Default 1024.
    pub max_tokens: u32,
    /// Nucleus-sampling threshold. Default 1.0.
    pub top_p: f32,
}

impl GenerationOptions {
    /// Options pre-filled with the provider's default model.
    pub fn for_provider(provider: &Provider) -> Self {
        Self {
            model: provider.config().model.to_string(),
            temperature: 0.3,
            max_tokens: 1024,
            top_p: 1.0,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::for_provider(&Provider::default())
    }
}

/// Configuration for a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run workspace root. Destroyed and recreated on every run; use a
    /// distinct root per run if invocations may overlap.
    pub output_root: PathBuf,
    /// Fixed segment length in seconds. Default 120.
    pub segment_length_secs: u32,
    pub generation: GenerationOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("outputs"),
            segment_length_secs: 120,
            generation: GenerationOptions::default(),
        }
    }
}
