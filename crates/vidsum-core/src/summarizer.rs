use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::config::GenerationOptions;
use crate::error::{Result, VidsumError};
use crate::format::single_line;
use crate::generator::TextGenerator;

pub(crate) static MAP_PROMPT: &str = "You are a helpful assistant that condenses a transcript \
chunk into terse bullet points. Keep every distinct fact or claim as its own bullet. Do not \
add commentary, headers, or information that is not in the text.";

pub(crate) static REDUCE_PROMPT: &str = "You are a helpful assistant that reduces a set of \
bullet-point notes into a digest of one or two sentences. Capture only the most important \
points. Output the sentences and nothing else.";

/// The two final artifacts of a run: the detailed per-chunk summary and the
/// one-or-two-sentence digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// Newline-join of the per-segment summaries, in index order.
    pub overall: String,
    /// Further reduction of `overall` to one or two sentences.
    pub digest: String,
}

/// Summarize each text independently with one generation call per input,
/// preserving order. When the backend returns multiple candidate
/// completions, they are concatenated in returned order with no separator
/// (pass-through policy). An empty candidate list or an all-empty
/// concatenation violates the per-invocation contract and fails.
pub async fn summarize_each(
    generator: &dyn TextGenerator,
    instruction: &str,
    texts: &[String],
    options: &GenerationOptions,
) -> Result<Vec<String>> {
    let mut summaries = Vec::with_capacity(texts.len());
    for text in texts {
        let candidates = generator.complete(instruction, text, options).await?;
        let combined: String = candidates.concat();
        if combined.is_empty() {
            return Err(VidsumError::Summarization {
                reason: "generation returned no text".to_string(),
            });
        }
        summaries.push(combined);
    }
    Ok(summaries)
}

/// Map stage: one bullet-point summary per transcript, flattened to a
/// single line each and persisted to `summary_path` (one per line, in
/// index order).
pub async fn map_summaries(
    generator: &dyn TextGenerator,
    transcripts: &[String],
    options: &GenerationOptions,
    summary_path: &Path,
) -> Result<Vec<String>> {
    if options.model.trim().is_empty() {
        return Err(VidsumError::Input {
            reason: "generation model identifier must not be empty".to_string(),
        });
    }

    let summaries = summarize_each(generator, MAP_PROMPT, transcripts, options).await?;
    let lines: Vec<String> = summaries.iter().map(|s| single_line(s)).collect();
    fs::write(summary_path, format!("{}\n", lines.join("\n"))).await?;
    Ok(lines)
}

/// Reduce stage: join the per-chunk summaries with newlines in index order
/// and run one digest-instruction generation call over the combined text.
/// The digest is persisted to `digest_path`. Returns (overall, digest).
pub async fn reduce_digest(
    generator: &dyn TextGenerator,
    per_chunk: &[String],
    options: &GenerationOptions,
    digest_path: &Path,
) -> Result<(String, String)> {
    let overall = per_chunk.join("\n");
    let combined = vec![overall.clone()];
    let mut reduced = summarize_each(generator, REDUCE_PROMPT, &combined, options).await?;
    let digest = reduced.pop().ok_or_else(|| VidsumError::Summarization {
        reason: "reduce stage produced no output".to_string(),
    })?;
    fs::write(digest_path, format!("{}\n", digest)).await?;
    Ok((overall, digest))
}

/// Full two-level reduction over the ordered transcripts.
pub async fn map_reduce(
    generator: &dyn TextGenerator,
    transcripts: &[String],
    options: &GenerationOptions,
    summary_path: &Path,
    digest_path: &Path,
) -> Result<SummaryOutput> {
    let per_chunk = map_summaries(generator, transcripts, options, summary_path).await?;
    let (overall, digest) = reduce_digest(generator, &per_chunk, options, digest_path).await?;
    Ok(SummaryOutput { overall, digest })
}
