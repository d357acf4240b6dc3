//! Writing videos and diagnostics to the output directory.

use crate::error::Result;
use crate::video::fetch::{Fetcher, DEFAULT_FETCH_TIMEOUT};
use crate::video::normalize::{materialize, Materialized};
use crate::video::types::{ArtifactKind, GenerationResult, PersistedArtifact, Unrecognized};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "generated_videos";

/// Number of prompt characters considered for the file name.
const PREFIX_SOURCE_CHARS: usize = 30;

/// Formats a timestamp as `YYYYmmdd_HHMMSS`.
pub fn timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Derives a file-name-safe prefix from a prompt.
///
/// Only alphanumerics, whitespace and `_` among the first 30 characters are
/// kept, and each whitespace run becomes a single `_`.
pub fn sanitize_prefix(prompt: &str) -> String {
    let mut prefix = String::new();
    let mut in_space = false;

    for c in prompt.chars().take(PREFIX_SOURCE_CHARS) {
        if c.is_whitespace() {
            if !in_space {
                prefix.push('_');
            }
            in_space = true;
        } else if c.is_alphanumeric() || c == '_' {
            prefix.push(c);
            in_space = false;
        }
    }

    prefix
}

/// Builds the video file name for a prompt at a point in time.
pub fn video_file_name(prompt: Option<&str>, at: &DateTime<Local>) -> String {
    let ts = timestamp(at);
    match prompt.map(sanitize_prefix) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}_{ts}.mp4"),
        _ => format!("video_{ts}.mp4"),
    }
}

/// Builds the diagnostic file name for a point in time.
pub fn metadata_file_name(at: &DateTime<Local>) -> String {
    format!("metadata_{}.txt", timestamp(at))
}

/// Renders the diagnostic file body.
fn render_metadata(info: &Unrecognized) -> String {
    let mut body = format!(
        "Video type: {}\nVideo content: {}\n",
        info.type_name, info.content
    );
    if let Some(attributes) = &info.attributes {
        body.push_str(&format!("Video attributes: {attributes}\n"));
    }
    body
}

/// Persists classified results into an output directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    fetcher: Fetcher,
}

impl ArtifactWriter {
    /// Creates a writer with the default download timeout.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_fetcher(
            output_dir,
            Fetcher::new(DEFAULT_FETCH_TIMEOUT)?,
        ))
    }

    /// Creates a writer that downloads URLs with `fetcher`.
    pub fn with_fetcher(output_dir: impl Into<PathBuf>, fetcher: Fetcher) -> Self {
        Self {
            output_dir: output_dir.into(),
            fetcher,
        }
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates the output directory and its parents if missing.
    pub async fn ensure_output_dir(&self) -> Result<()> {
        if !tokio::fs::try_exists(&self.output_dir).await? {
            tracing::info!(dir = %self.output_dir.display(), "creating output directory");
        }
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// Writes the result for `prompt` and returns what was written.
    ///
    /// URL results are downloaded completely before any file is created, so
    /// a failed download leaves nothing behind.
    pub async fn persist(
        &self,
        result: GenerationResult,
        prompt: Option<&str>,
    ) -> Result<PersistedArtifact> {
        self.ensure_output_dir().await?;
        let now = Local::now();
        let shape = result.shape();

        match materialize(result, &self.fetcher).await? {
            Materialized::Video(data) => {
                let path = self.output_dir.join(video_file_name(prompt, &now));
                tokio::fs::write(&path, &data).await?;
                tracing::debug!(path = %path.display(), shape, size = data.len(), "video saved");
                Ok(PersistedArtifact {
                    path,
                    kind: ArtifactKind::Video,
                    size_bytes: data.len() as u64,
                })
            }
            Materialized::Diagnostic(info) => {
                let path = self.output_dir.join(metadata_file_name(&now));
                let body = render_metadata(&info);
                tokio::fs::write(&path, &body).await?;
                tracing::warn!(
                    type_name = %info.type_name,
                    path = %path.display(),
                    "unexpected video format, saved metadata instead"
                );
                Ok(PersistedArtifact {
                    path,
                    kind: ArtifactKind::Metadata,
                    size_bytes: body.len() as u64,
                })
            }
        }
    }
}
