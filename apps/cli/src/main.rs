use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use vidsum_core::{
    ChatCompletionsGenerator, GenerationOptions, Pipeline, PipelineConfig, Provider, Stage,
    WhisperModel, WhisperTranscriber, YtDlpSource, ensure_model,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

/// CLI wrapper for WhisperModel (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliWhisperModel {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
}

impl From<CliWhisperModel> for WhisperModel {
    fn from(cli: CliWhisperModel) -> Self {
        match cli {
            CliWhisperModel::Tiny => WhisperModel::Tiny,
            CliWhisperModel::Base => WhisperModel::Base,
            CliWhisperModel::Small => WhisperModel::Small,
            CliWhisperModel::Medium => WhisperModel::Medium,
        }
    }
}

#[derive(Parser)]
#[command(name = "vidsum")]
#[command(
    about = "Download a video's audio, transcribe it in chunks with Whisper, and produce a two-level summary"
)]
struct Cli {
    /// Video URL
    url: String,

    /// Segment length in seconds
    #[arg(short, long, default_value_t = 120)]
    segment_length: u32,

    /// Output directory. Destroyed and recreated on every run; point
    /// concurrent runs at distinct directories.
    #[arg(short, long, default_value = "outputs")]
    output_dir: PathBuf,

    /// AI provider for summarization
    #[arg(short, long, default_value = "grok")]
    provider: CliProvider,

    /// Whisper model size (accuracy/speed trade-off)
    #[arg(short = 'm', long, default_value = "base")]
    whisper_model: CliWhisperModel,

    /// Generation model identifier. Defaults to the provider's model.
    #[arg(short = 'g', long)]
    gen_model: Option<String>,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

extern "C" fn whisper_log_callback(
    _level: u32,
    _message: *const std::ffi::c_char,
    _user_data: *mut std::ffi::c_void,
) {
    // silent
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let provider: Provider = cli.provider.into();

    unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    }

    // Validate API key early
    if let Err(e) = provider.validate_api_key() {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    println!(
        "\n{}  {}\n",
        style("vidsum").cyan().bold(),
        style("Video Summarizer").dim()
    );

    // Ensure model is downloaded, then load it once for the whole run
    println!("{} Checking model...", style("✓").green().bold());
    let model_path = ensure_model(cli.whisper_model.into()).await?;
    let transcriber = WhisperTranscriber::new(&model_path)?;

    let mut generation = GenerationOptions::for_provider(&provider);
    if let Some(model) = cli.gen_model {
        generation.model = model;
    }
    let config = PipelineConfig {
        output_root: cli.output_dir,
        segment_length_secs: cli.segment_length,
        generation,
    };
    let pipeline = Pipeline::new(
        Box::new(YtDlpSource::new()),
        Box::new(transcriber),
        Box::new(ChatCompletionsGenerator::new(provider)),
        config,
    );

    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();
    let mut current: Option<(Stage, ProgressBar, Instant)> = None;

    let result = pipeline
        .run_with_progress(&cli.url, |stage| {
            if let Some((prev, pb, started)) = current.take() {
                pb.finish_with_message(format!(
                    "{} {} {}",
                    style("✓").green().bold(),
                    prev,
                    style(format!("[{}]", format_duration(started.elapsed()))).dim()
                ));
            }
            if stage != Stage::Done {
                let pb = create_spinner(&format!("{}...", stage));
                current = Some((stage, pb, Instant::now()));
            }
        })
        .await;

    if let Some((_, pb, _)) = current.take() {
        pb.finish_and_clear();
    }

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!(
        "{} {}\n",
        style("Saved:").dim(),
        style(pipeline.workspace().root().display()).cyan()
    );
    println!("{}", style("─".repeat(60)).dim());

    println!("\n{}\n", style("Summary").cyan().bold());
    println!("{}\n", output.overall);
    println!("{}\n", style("TL;DR").cyan().bold());
    println!("{}", output.digest);

    Ok(())
}
