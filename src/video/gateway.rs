//! Hugging Face inference router client.

use crate::error::{GenVidError, Result};
use crate::video::normalize::is_remote_url;
use crate::video::types::{GatewayPayload, GenerationRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default inference router.
pub const DEFAULT_ROUTER_URL: &str = "https://router.huggingface.co";
/// Default Hub API host, used for provider model lookups.
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Trait for the service that turns a prompt into a video payload.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Runs one generation and returns the raw payload.
    async fn generate(&self, request: &GenerationRequest) -> Result<GatewayPayload>;

    /// Returns the provider this gateway routes to.
    fn provider(&self) -> InferenceProvider;
}

/// Inference provider behind the router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferenceProvider {
    /// fal.ai queue API (default).
    #[default]
    FalAi,
    /// Hugging Face serverless inference.
    HfInference,
}

impl InferenceProvider {
    /// Returns the router path segment / mapping key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FalAi => "fal-ai",
            Self::HfInference => "hf-inference",
        }
    }
}

impl std::fmt::Display for InferenceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for [`HfInferenceGateway`].
#[derive(Debug, Clone)]
pub struct HfInferenceGatewayBuilder {
    token: Option<String>,
    provider: InferenceProvider,
    router_url: String,
    hub_url: String,
    poll_interval: Duration,
    timeout: Duration,
    request_timeout: Duration,
}

impl Default for HfInferenceGatewayBuilder {
    fn default() -> Self {
        Self {
            token: None,
            provider: InferenceProvider::default(),
            router_url: DEFAULT_ROUTER_URL.to_string(),
            hub_url: DEFAULT_HUB_URL.to_string(),
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(600), // 10 minutes for video
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl HfInferenceGatewayBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the inference provider.
    pub fn provider(mut self, provider: InferenceProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Overrides the router base URL.
    pub fn router_url(mut self, url: impl Into<String>) -> Self {
        self.router_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the Hub API base URL.
    pub fn hub_url(mut self, url: impl Into<String>) -> Self {
        self.hub_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the queue polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum time to wait for a queued generation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the limit for each individual HTTP request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the gateway. A token is required.
    pub fn build(self) -> Result<HfInferenceGateway> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GenVidError::Config("no Hugging Face token provided".into()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(self.request_timeout)
            .build()?;

        Ok(HfInferenceGateway {
            client,
            token,
            provider: self.provider,
            router_url: self.router_url,
            hub_url: self.hub_url,
            poll_interval: self.poll_interval,
            timeout: self.timeout,
            request_timeout: self.request_timeout,
        })
    }
}

/// Text-to-video through the Hugging Face inference router.
///
/// With [`InferenceProvider::FalAi`] the request goes through fal.ai's queue:
/// submit, poll status, then fetch the result. With
/// [`InferenceProvider::HfInference`] the response body is the payload.
pub struct HfInferenceGateway {
    client: reqwest::Client,
    token: String,
    provider: InferenceProvider,
    router_url: String,
    hub_url: String,
    poll_interval: Duration,
    timeout: Duration,
    request_timeout: Duration,
}

impl std::fmt::Debug for HfInferenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfInferenceGateway")
            .field("provider", &self.provider)
            .field("router_url", &self.router_url)
            .field("hub_url", &self.hub_url)
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl HfInferenceGateway {
    /// Creates a new [`HfInferenceGatewayBuilder`].
    pub fn builder() -> HfInferenceGatewayBuilder {
        HfInferenceGatewayBuilder::new()
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(GenVidError::from_status(status.as_u16(), &text))
    }

    /// Maps a Hub model id to the fal.ai model id serving it.
    async fn resolve_fal_model(&self, model: &str) -> Result<String> {
        if model.starts_with("fal-ai/") {
            return Ok(model.to_string());
        }

        let url = format!("{}/api/models/{}", self.hub_url, model);
        let response = self
            .client
            .get(&url)
            .query(&[("expand[]", "inferenceProviderMapping")])
            .bearer_auth(&self.token)
            .send()
            .await?;
        let info: HubModelInfo = Self::check(response).await?.json().await?;

        let provider_id = info
            .inference_provider_mapping
            .provider_id(InferenceProvider::FalAi.as_str())
            .ok_or_else(|| {
                GenVidError::UnexpectedResponse(format!(
                    "model {model} is not served by {}",
                    InferenceProvider::FalAi
                ))
            })?;

        tracing::debug!(model = %model, provider_id = %provider_id, "resolved fal.ai model");
        Ok(provider_id)
    }

    async fn submit_fal(&self, provider_model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/fal-ai/{}", self.router_url, provider_model);
        let response = self
            .client
            .post(&url)
            .query(&[("_subdomain", "queue")])
            .bearer_auth(&self.token)
            .json(&FalVideoRequest { prompt })
            .send()
            .await?;
        let submit: FalSubmitResponse = Self::check(response).await?.json().await?;
        Ok(submit.request_id)
    }

    async fn poll_fal(&self, app: &str, request_id: &str) -> Result<()> {
        let url = format!(
            "{}/fal-ai/{}/requests/{}/status",
            self.router_url, app, request_id
        );
        let start = Instant::now();

        loop {
            if start.elapsed() > self.timeout {
                return Err(GenVidError::Timeout(self.timeout));
            }

            let response = self
                .client
                .get(&url)
                .query(&[("_subdomain", "queue")])
                .bearer_auth(&self.token)
                .send()
                .await?;
            let status: FalStatusResponse = Self::check(response).await?.json().await?;

            match status.status.as_str() {
                "COMPLETED" => return Ok(()),
                "IN_QUEUE" | "IN_PROGRESS" => {
                    tracing::debug!(
                        request_id = %request_id,
                        status = %status.status,
                        elapsed_secs = start.elapsed().as_secs(),
                        "polling fal.ai video generation"
                    );
                    tokio::time::sleep(self.poll_interval).await;
                }
                "FAILED" | "ERROR" => {
                    return Err(GenVidError::Generation(
                        status
                            .error
                            .unwrap_or_else(|| "fal.ai video generation failed".into()),
                    ));
                }
                other => {
                    return Err(GenVidError::UnexpectedResponse(format!(
                        "fal.ai returned unexpected status: {other}"
                    )));
                }
            }
        }
    }

    async fn fetch_fal_result(&self, app: &str, request_id: &str) -> Result<serde_json::Value> {
        let url = format!("{}/fal-ai/{}/requests/{}", self.router_url, app, request_id);
        let response = self
            .client
            .get(&url)
            .query(&[("_subdomain", "queue")])
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn generate_fal(&self, request: &GenerationRequest) -> Result<GatewayPayload> {
        let provider_model = self.resolve_fal_model(&request.model).await?;
        let app = fal_app_id(&provider_model);

        let request_id = self.submit_fal(&provider_model, &request.prompt).await?;
        tracing::debug!(request_id = %request_id, model = %provider_model, "submitted to fal.ai queue");

        self.poll_fal(&app, &request_id).await?;
        let result = self.fetch_fal_result(&app, &request_id).await?;
        decode_fal_result(result)
    }

    async fn generate_hf_inference(&self, request: &GenerationRequest) -> Result<GatewayPayload> {
        let url = format!("{}/hf-inference/models/{}", self.router_url, request.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&HfInferenceRequest {
                inputs: &request.prompt,
            })
            .send()
            .await?;
        let response = Self::check(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let payload = match BodyKind::from_content_type(&content_type) {
            BodyKind::Binary => GatewayPayload::Stream(Box::new(response)),
            BodyKind::Json => GatewayPayload::Value(response.json().await?),
            BodyKind::Text => GatewayPayload::Text(response.text().await?),
        };
        Ok(payload)
    }
}

#[async_trait]
impl InferenceGateway for HfInferenceGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<GatewayPayload> {
        let start = Instant::now();
        let payload = match self.provider {
            InferenceProvider::FalAi => self.generate_fal(request).await?,
            InferenceProvider::HfInference => self.generate_hf_inference(request).await?,
        };
        tracing::debug!(
            provider = %self.provider,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "inference call finished"
        );
        Ok(payload)
    }

    fn provider(&self) -> InferenceProvider {
        self.provider
    }
}

/// Owner/app part of a fal.ai model id, which the queue endpoints use.
///
/// `fal-ai/wan/v2.2-a14b/text-to-video` → `fal-ai/wan`.
fn fal_app_id(provider_model: &str) -> String {
    provider_model
        .split('/')
        .filter(|s| !s.is_empty())
        .take(2)
        .collect::<Vec<_>>()
        .join("/")
}

/// Pulls the video out of a completed fal.ai result.
///
/// An http(s) `video.url` becomes text, a `data:` URL is decoded into bytes,
/// and any other shape is passed through untouched.
fn decode_fal_result(result: serde_json::Value) -> Result<GatewayPayload> {
    let Some(url) = result.pointer("/video/url").and_then(|u| u.as_str()) else {
        return Ok(GatewayPayload::Value(result));
    };

    if is_remote_url(url) {
        return Ok(GatewayPayload::Text(url.to_string()));
    }

    if let Some(rest) = url.strip_prefix("data:") {
        let (_, encoded) = rest
            .split_once(";base64,")
            .ok_or_else(|| GenVidError::Decode("data URL is not base64 encoded".into()))?;
        use base64::Engine;
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| GenVidError::Decode(format!("inline video data: {e}")))?;
        return Ok(GatewayPayload::Bytes(data));
    }

    Ok(GatewayPayload::Value(result))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Binary,
    Json,
    Text,
}

impl BodyKind {
    fn from_content_type(content_type: &str) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if mime.starts_with("video/") || mime == "application/octet-stream" {
            Self::Binary
        } else if mime == "application/json" || mime.ends_with("+json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

// Request/response types

#[derive(Debug, Serialize)]
struct FalVideoRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct HfInferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct FalSubmitResponse {
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct FalStatusResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HubModelInfo {
    #[serde(rename = "inferenceProviderMapping", default)]
    inference_provider_mapping: ProviderMappings,
}

/// The Hub has served this field both as a map keyed by provider and as a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProviderMappings {
    Map(HashMap<String, ProviderMapping>),
    List(Vec<ProviderMapping>),
}

impl Default for ProviderMappings {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl ProviderMappings {
    fn provider_id(&self, provider: &str) -> Option<String> {
        let mapping = match self {
            Self::Map(map) => map.get(provider),
            Self::List(list) => list
                .iter()
                .find(|m| m.provider.as_deref() == Some(provider)),
        }?;
        Some(mapping.provider_id.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderMapping {
    #[serde(default)]
    provider: Option<String>,
    #[serde(rename = "providerId")]
    provider_id: String,
}
