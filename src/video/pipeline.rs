//! One prompt in, one artifact out.

use crate::config::Config;
use crate::error::Result;
use crate::video::fetch::Fetcher;
use crate::video::gateway::{HfInferenceGateway, InferenceGateway};
use crate::video::normalize::classify;
use crate::video::persist::ArtifactWriter;
use crate::video::types::{GenerationRequest, PersistedArtifact};
use std::time::Instant;

/// Generates a video for a prompt and saves it.
pub struct VideoGenerator {
    gateway: Box<dyn InferenceGateway>,
    writer: ArtifactWriter,
    model: String,
}

impl VideoGenerator {
    /// Assembles a generator from its parts.
    pub fn new(
        gateway: Box<dyn InferenceGateway>,
        writer: ArtifactWriter,
        model: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            writer,
            model: model.into(),
        }
    }

    /// Builds the Hugging Face gateway and writer described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway = HfInferenceGateway::builder()
            .token(config.token.clone())
            .provider(config.provider)
            .router_url(config.router_url.clone())
            .hub_url(config.hub_url.clone())
            .poll_interval(config.poll_interval)
            .timeout(config.timeout)
            .build()?;
        let writer = ArtifactWriter::with_fetcher(
            config.output_dir.clone(),
            Fetcher::new(config.fetch_timeout)?,
        );
        Ok(Self::new(Box::new(gateway), writer, config.model.clone()))
    }

    /// Returns the model used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the writer.
    pub fn writer(&self) -> &ArtifactWriter {
        &self.writer
    }

    /// Runs the gateway for `prompt` and persists whatever comes back.
    pub async fn generate_and_save(&self, prompt: &str) -> Result<PersistedArtifact> {
        let request = GenerationRequest::new(prompt).with_model(self.model.as_str());
        let start = Instant::now();

        tracing::info!(
            model = %request.model,
            provider = %self.gateway.provider(),
            "generating video"
        );
        let payload = self.gateway.generate(&request).await?;
        let result = classify(payload);
        tracing::debug!(shape = result.shape(), "classified gateway response");

        let artifact = self.writer.persist(result, Some(&request.prompt)).await?;
        tracing::info!(
            path = %artifact.path.display(),
            kind = %artifact.kind,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "artifact written"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenVidError;
    use crate::video::gateway::InferenceProvider;
    use crate::video::types::{ArtifactKind, GatewayPayload};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Hands out canned payloads and records requests.
    struct CannedGateway {
        payloads: Mutex<Vec<Result<GatewayPayload>>>,
        seen: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    impl CannedGateway {
        fn new(payloads: Vec<Result<GatewayPayload>>) -> Self {
            Self {
                payloads: Mutex::new(payloads),
                seen: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl InferenceGateway for CannedGateway {
        async fn generate(&self, request: &GenerationRequest) -> Result<GatewayPayload> {
            self.seen.lock().unwrap().push(request.clone());
            self.payloads.lock().unwrap().remove(0)
        }

        fn provider(&self) -> InferenceProvider {
            InferenceProvider::FalAi
        }
    }

    fn generator(dir: &std::path::Path, payloads: Vec<Result<GatewayPayload>>) -> VideoGenerator {
        let writer = ArtifactWriter::with_fetcher(dir, Fetcher::with_client(reqwest::Client::new()));
        VideoGenerator::new(Box::new(CannedGateway::new(payloads)), writer, "test/model")
    }

    #[tokio::test]
    async fn test_bytes_become_named_video() {
        let tmp = tempfile::tempdir().unwrap();
        let gen = generator(tmp.path(), vec![Ok(GatewayPayload::Bytes(b"mp4".to_vec()))]);

        let artifact = gen.generate_and_save("A dog surfing").await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Video);
        let name = artifact.path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("A_dog_surfing_"), "{name}");
        assert!(name.ends_with(".mp4"));
    }

    #[tokio::test]
    async fn test_unknown_value_becomes_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let gen = generator(
            tmp.path(),
            vec![Ok(GatewayPayload::Value(serde_json::json!({"status": "odd"})))],
        );

        let artifact = gen.generate_and_save("A dog").await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Metadata);
        let body = std::fs::read_to_string(&artifact.path).unwrap();
        assert!(body.contains("Video type: json object"));
        assert!(body.contains("Video attributes: status=\"odd\""));
    }

    #[tokio::test]
    async fn test_gateway_error_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let gen = generator(
            &out,
            vec![Err(GenVidError::Api {
                status: 402,
                message: "quota exceeded".into(),
            })],
        );

        let err = gen.generate_and_save("A dog").await.unwrap_err();
        assert!(err.is_gateway_error());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_request_carries_model() {
        let tmp = tempfile::tempdir().unwrap();
        let gateway = CannedGateway::new(vec![Ok(GatewayPayload::Bytes(vec![0]))]);
        let seen = Arc::clone(&gateway.seen);
        let writer =
            ArtifactWriter::with_fetcher(tmp.path(), Fetcher::with_client(reqwest::Client::new()));
        let gen = VideoGenerator::new(Box::new(gateway), writer, "org/model");

        gen.generate_and_save("waves").await.unwrap();
        assert_eq!(gen.model(), "org/model");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], GenerationRequest::new("waves").with_model("org/model"));
    }

    #[test]
    fn test_from_config() {
        let config = Config::new("hf_abc").with_output_dir("out_dir");
        let gen = VideoGenerator::from_config(&config).unwrap();
        assert_eq!(gen.model(), "Wan-AI/Wan2.2-T2V-A14B");
        assert_eq!(gen.writer().output_dir(), std::path::Path::new("out_dir"));
    }
}
