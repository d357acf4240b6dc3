//! Core types for video generation.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Model used when none is given.
pub const DEFAULT_MODEL: &str = "Wan-AI/Wan2.2-T2V-A14B";

/// A request to generate a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// Hub model identifier (e.g., `Wan-AI/Wan2.2-T2V-A14B`).
    pub model: String,
}

impl GenerationRequest {
    /// Creates a new request for the default model.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// A byte source that can be read to completion.
#[async_trait]
pub trait ByteStream: Send {
    /// Reads every remaining byte.
    async fn drain(self: Box<Self>) -> Result<Vec<u8>>;
}

#[async_trait]
impl ByteStream for reqwest::Response {
    async fn drain(self: Box<Self>) -> Result<Vec<u8>> {
        let mut response = *self;
        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }
}

/// Adapts any [`AsyncRead`] into a [`ByteStream`].
#[derive(Debug)]
pub struct ReaderStream<R>(pub R);

#[async_trait]
impl<R> ByteStream for ReaderStream<R>
where
    R: AsyncRead + Send + Unpin,
{
    async fn drain(self: Box<Self>) -> Result<Vec<u8>> {
        let mut reader = self.0;
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        Ok(data)
    }
}

/// What the gateway handed back, before classification.
pub enum GatewayPayload {
    /// A plain text body.
    Text(String),
    /// A fully buffered binary body.
    Bytes(Vec<u8>),
    /// A body that still has to be read.
    Stream(Box<dyn ByteStream>),
    /// Any other structured value.
    Value(serde_json::Value),
}

impl fmt::Debug for GatewayPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(data) => write!(f, "Bytes({} bytes)", data.len()),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Diagnostic description of a response we could not turn into video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unrecognized {
    /// Runtime type of the value.
    pub type_name: String,
    /// String rendering of the value.
    pub content: String,
    /// Rendering of the value's fields, when it has any.
    pub attributes: Option<String>,
}

impl Unrecognized {
    /// Describes an arbitrary Rust value by its type and `Debug` output.
    pub fn of<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self {
            type_name: std::any::type_name::<T>().to_string(),
            content: format!("{value:?}"),
            attributes: None,
        }
    }

    /// Describes a plain text body; the text is kept verbatim.
    pub fn from_text(text: &str) -> Self {
        Self {
            type_name: "text".to_string(),
            content: text.to_string(),
            attributes: None,
        }
    }

    /// Describes a JSON value; objects also get their fields listed.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        let type_name = match value {
            Value::Null => "json null",
            Value::Bool(_) => "json boolean",
            Value::Number(_) => "json number",
            Value::String(_) => "json string",
            Value::Array(_) => "json array",
            Value::Object(_) => "json object",
        };
        let content = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let attributes = value.as_object().map(|fields| {
            fields
                .iter()
                .map(|(key, field)| format!("{key}={field}"))
                .collect::<Vec<_>>()
                .join(", ")
        });

        Self {
            type_name: type_name.to_string(),
            content,
            attributes,
        }
    }
}

/// A classified gateway result.
pub enum GenerationResult {
    /// The video lives at this URL and must be downloaded.
    RemoteUrl(String),
    /// The video bytes themselves.
    RawBytes(Vec<u8>),
    /// A stream to drain into video bytes.
    StreamHandle(Box<dyn ByteStream>),
    /// Not a video shape we know.
    Unrecognized(Unrecognized),
}

impl GenerationResult {
    /// Short name of the variant, used in logs.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::RemoteUrl(_) => "url",
            Self::RawBytes(_) => "bytes",
            Self::StreamHandle(_) => "stream",
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}

impl fmt::Debug for GenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteUrl(url) => f.debug_tuple("RemoteUrl").field(url).finish(),
            Self::RawBytes(data) => write!(f, "RawBytes({} bytes)", data.len()),
            Self::StreamHandle(_) => f.write_str("StreamHandle(..)"),
            Self::Unrecognized(info) => f.debug_tuple("Unrecognized").field(info).finish(),
        }
    }
}

/// Kind of file written for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// An `.mp4` video.
    Video,
    /// A diagnostic `metadata_*.txt` file.
    Metadata,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Metadata => write!(f, "metadata"),
        }
    }
}

/// A file written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedArtifact {
    /// Where the file was written.
    pub path: PathBuf,
    /// Whether it holds a video or diagnostics.
    pub kind: ArtifactKind,
    /// Number of bytes written.
    pub size_bytes: u64,
}

impl PersistedArtifact {
    /// Returns true if a video was saved.
    pub fn is_video(&self) -> bool {
        self.kind == ArtifactKind::Video
    }
}
