#![warn(missing_docs)]
//! genvid - text-to-video through the Hugging Face inference router.
//!
//! A prompt goes to a hosted text-to-video model; whatever comes back is
//! classified (URL, bytes, stream, or something else) and saved into an
//! output directory, either as an `.mp4` or, when the response is not a
//! video shape we know, as a `metadata_<timestamp>.txt` diagnostic file.
//!
//! # Quick Start
//!
//! ```no_run
//! use genvid::{Config, VideoGenerator};
//!
//! #[tokio::main]
//! async fn main() -> genvid::Result<()> {
//!     let config = Config::from_env()?.with_output_dir("generated_videos");
//!     let generator = VideoGenerator::from_config(&config)?;
//!     let artifact = generator.generate_and_save("A young man walking on the street").await?;
//!     println!("saved {} ({})", artifact.path.display(), artifact.kind);
//!     Ok(())
//! }
//! ```
//!
//! # Saving a result yourself
//!
//! ```no_run
//! use genvid::{classify, ArtifactWriter, GatewayPayload};
//!
//! # async fn run() -> genvid::Result<()> {
//! let writer = ArtifactWriter::new("generated_videos")?;
//! let result = classify(GatewayPayload::Text("https://example.com/v.mp4".into()));
//! let artifact = writer.persist(result, Some("ocean waves")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `genvid` binary.

mod config;
mod error;
pub mod video;

pub use config::{Config, TOKEN_ENV_VAR};
pub use error::{GenVidError, Result};

pub use video::{
    classify, materialize, ArtifactKind, ArtifactWriter, ByteStream, Fetcher, GatewayPayload,
    GenerationRequest, GenerationResult, HfInferenceGateway, HfInferenceGatewayBuilder,
    InferenceGateway, InferenceProvider, Materialized, PersistedArtifact, ReaderStream,
    Unrecognized, VideoGenerator, DEFAULT_MODEL,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{GenVidError, Result};
    pub use crate::video::{
        ArtifactKind, ArtifactWriter, GatewayPayload, GenerationRequest, GenerationResult,
        InferenceGateway, PersistedArtifact, VideoGenerator,
    };
}
