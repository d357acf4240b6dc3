//! CLI for genvid - text-to-video generation.

use clap::{CommandFactory, Parser, ValueEnum};
use genvid::{ArtifactKind, Config, InferenceProvider, PersistedArtifact, VideoGenerator};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

const QUIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

#[derive(Parser)]
#[command(name = "genvid")]
#[command(about = "Generate videos from text prompts via the Hugging Face inference router")]
#[command(version)]
struct Cli {
    /// Text prompt for video generation
    prompt: Option<String>,

    /// Output directory for videos
    #[arg(short, long, default_value = "generated_videos")]
    output_dir: PathBuf,

    /// Model to use for generation
    #[arg(short, long, default_value = genvid::DEFAULT_MODEL)]
    model: String,

    /// Interactive mode - enter multiple prompts
    #[arg(short, long)]
    interactive: bool,

    /// Inference provider behind the router
    #[arg(long, value_enum, default_value = "fal-ai")]
    provider: ProviderArg,

    /// Maximum seconds to wait for a queued generation
    #[arg(long, default_value_t = 600)]
    timeout: u64,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    #[value(name = "fal-ai")]
    FalAi,
    #[value(name = "hf-inference")]
    HfInference,
}

impl From<ProviderArg> for InferenceProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::FalAi => InferenceProvider::FalAi,
            ProviderArg::HfInference => InferenceProvider::HfInference,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if !cli.interactive && cli.prompt.is_none() {
        eprintln!("Error: Please provide a prompt or use --interactive mode");
        Cli::command().print_help()?;
        std::process::exit(1);
    }

    let _ = dotenvy::dotenv();
    let config = Config::from_env()?
        .with_model(cli.model.clone())
        .with_provider(cli.provider.into())
        .with_output_dir(cli.output_dir.clone())
        .with_timeout(Duration::from_secs(cli.timeout));
    tracing::info!(token = %config.token_hint(), "loaded {}", genvid::TOKEN_ENV_VAR);

    let generator = VideoGenerator::from_config(&config)?;

    if cli.interactive {
        let stdin = BufReader::new(tokio::io::stdin());
        run_interactive(&generator, stdin, &mut std::io::stdout(), cli.json).await
    } else {
        let prompt = cli.prompt.unwrap_or_default();
        run_once(&generator, &prompt, cli.json).await
    }
}

async fn run_once(generator: &VideoGenerator, prompt: &str, json_output: bool) -> anyhow::Result<()> {
    let mut out = std::io::stdout();
    if !json_output {
        println!("Generating video with prompt: '{prompt}'");
        println!("This may take a while...");
    }

    match generator.generate_and_save(prompt).await {
        Ok(artifact) => {
            report(&mut out, &artifact, json_output)?;
            if artifact.kind == ArtifactKind::Video && !json_output {
                println!("You can play it with: open {}", artifact.path.display());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = ?e, "video generation failed");
            if json_output {
                print_json_failure(&mut out, &e)?;
            }
            Err(e.into())
        }
    }
}

/// Reads one line, replacing invalid UTF-8. `None` at end of input.
async fn read_prompt<R>(input: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).trim().to_string()))
}

/// Prompt loop. In JSON mode only result objects are written to `out`.
async fn run_interactive<R, W>(
    generator: &VideoGenerator,
    mut input: R,
    out: &mut W,
    json_output: bool,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let separator = "-".repeat(50);
    if !json_output {
        writeln!(out, "Interactive video generation")?;
        writeln!(out, "Enter prompts to generate videos (type 'quit' to exit)")?;
        writeln!(out, "{separator}")?;
    }

    loop {
        if !json_output {
            write!(out, "\nEnter prompt: ")?;
            out.flush()?;
        }

        let Some(prompt) = read_prompt(&mut input).await? else {
            if !json_output {
                writeln!(out)?;
            }
            break;
        };

        if QUIT_WORDS.contains(&prompt.to_lowercase().as_str()) {
            if !json_output {
                writeln!(out, "Goodbye!")?;
            }
            break;
        }
        if prompt.is_empty() {
            if !json_output {
                writeln!(out, "Please enter a valid prompt.")?;
            }
            continue;
        }

        if !json_output {
            writeln!(out, "Generating video with prompt: '{prompt}'")?;
        }
        match generator.generate_and_save(&prompt).await {
            Ok(artifact) => report(out, &artifact, json_output)?,
            Err(e) => {
                tracing::error!(error = ?e, "video generation failed");
                if json_output {
                    print_json_failure(out, &e)?;
                } else {
                    writeln!(out, "Error occurred: {e}")?;
                }
            }
        }
        if !json_output {
            writeln!(out, "{separator}")?;
        }
    }

    Ok(())
}

fn report<W: Write>(out: &mut W, artifact: &PersistedArtifact, json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let result = serde_json::json!({
            "success": artifact.kind == ArtifactKind::Video,
            "kind": artifact.kind,
            "output": artifact.path.display().to_string(),
            "size_bytes": artifact.size_bytes,
        });
        writeln!(out, "{}", serde_json::to_string(&result)?)?;
        return Ok(());
    }

    match artifact.kind {
        ArtifactKind::Video => writeln!(
            out,
            "Video ready: {} ({} bytes)",
            artifact.path.display(),
            artifact.size_bytes
        )?,
        ArtifactKind::Metadata => writeln!(
            out,
            "Warning: unexpected video format, metadata saved to: {}",
            artifact.path.display()
        )?,
    }
    Ok(())
}

fn print_json_failure<W: Write>(out: &mut W, error: &genvid::GenVidError) -> anyhow::Result<()> {
    let result = serde_json::json!({
        "success": false,
        "error": error.to_string(),
    });
    writeln!(out, "{}", serde_json::to_string(&result)?)?;
    Ok(())
}
