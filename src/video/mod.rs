//! Video generation module.

pub mod fetch;
pub mod gateway;
pub mod normalize;
pub mod persist;
mod pipeline;
mod types;

pub use fetch::Fetcher;
pub use gateway::{
    HfInferenceGateway, HfInferenceGatewayBuilder, InferenceGateway, InferenceProvider,
};
pub use normalize::{classify, materialize, Materialized};
pub use persist::ArtifactWriter;
pub use pipeline::VideoGenerator;
pub use types::{
    ArtifactKind, ByteStream, GatewayPayload, GenerationRequest, GenerationResult,
    PersistedArtifact, ReaderStream, Unrecognized, DEFAULT_MODEL,
};
