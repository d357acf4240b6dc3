//! Response normalization: gateway payload → classified result → bytes.

use crate::error::Result;
use crate::video::fetch::Fetcher;
use crate::video::types::{GatewayPayload, GenerationResult, Unrecognized};

/// Returns true if `text` starts with exactly `http://` or `https://`.
pub fn is_remote_url(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

/// Classifies a gateway payload. First match wins:
/// URL text, raw bytes, stream, then everything else.
pub fn classify(payload: GatewayPayload) -> GenerationResult {
    match payload {
        GatewayPayload::Text(text) if is_remote_url(&text) => GenerationResult::RemoteUrl(text),
        GatewayPayload::Value(serde_json::Value::String(text)) if is_remote_url(&text) => {
            GenerationResult::RemoteUrl(text)
        }
        GatewayPayload::Bytes(data) => GenerationResult::RawBytes(data),
        GatewayPayload::Stream(stream) => GenerationResult::StreamHandle(stream),
        GatewayPayload::Text(text) => {
            GenerationResult::Unrecognized(Unrecognized::from_text(&text))
        }
        GatewayPayload::Value(value) => {
            GenerationResult::Unrecognized(Unrecognized::from_json(&value))
        }
    }
}

/// A result ready to be written.
#[derive(Debug)]
pub enum Materialized {
    /// Video bytes.
    Video(Vec<u8>),
    /// Diagnostics for an unrecognized result.
    Diagnostic(Unrecognized),
}

/// Turns a classified result into bytes, downloading or draining as needed.
pub async fn materialize(result: GenerationResult, fetcher: &Fetcher) -> Result<Materialized> {
    let materialized = match result {
        GenerationResult::RemoteUrl(url) => Materialized::Video(fetcher.fetch(&url).await?),
        GenerationResult::RawBytes(data) => Materialized::Video(data),
        GenerationResult::StreamHandle(stream) => Materialized::Video(stream.drain().await?),
        GenerationResult::Unrecognized(info) => Materialized::Diagnostic(info),
    };
    Ok(materialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::types::ReaderStream;
    use serde_json::json;

    fn shape(payload: GatewayPayload) -> &'static str {
        classify(payload).shape()
    }

    #[test]
    fn test_url_prefixes_are_exact() {
        assert_eq!(shape(GatewayPayload::Text("http://x".into())), "url");
        assert_eq!(shape(GatewayPayload::Text("https://x".into())), "url");
        assert_eq!(
            shape(GatewayPayload::Text("httpx://x".into())),
            "unrecognized"
        );
        assert_eq!(shape(GatewayPayload::Text(String::new())), "unrecognized");
        assert_eq!(
            shape(GatewayPayload::Text("  http://x".into())),
            "unrecognized"
        );
        assert_eq!(
            shape(GatewayPayload::Text("HTTPS://x".into())),
            "unrecognized"
        );
    }

    #[test]
    fn test_json_string_url_is_remote() {
        match classify(GatewayPayload::Value(json!("https://cdn.fal.media/v.mp4"))) {
            GenerationResult::RemoteUrl(url) => assert_eq!(url, "https://cdn.fal.media/v.mp4"),
            other => panic!("expected url, got {other:?}"),
        }
    }

    #[test]
    fn test_bytes_and_stream() {
        assert_eq!(shape(GatewayPayload::Bytes(vec![0, 1, 2])), "bytes");
        // Bytes that happen to spell a URL are still bytes.
        assert_eq!(shape(GatewayPayload::Bytes(b"https://x".to_vec())), "bytes");
        let stream = Box::new(ReaderStream(std::io::Cursor::new(Vec::<u8>::new())));
        assert_eq!(shape(GatewayPayload::Stream(stream)), "stream");
    }

    #[test]
    fn test_other_values_capture_diagnostics() {
        match classify(GatewayPayload::Value(json!(42))) {
            GenerationResult::Unrecognized(info) => {
                assert_eq!(info.type_name, "json number");
                assert_eq!(info.content, "42");
            }
            other => panic!("expected unrecognized, got {other:?}"),
        }

        match classify(GatewayPayload::Text("status: \"queued\"".into())) {
            GenerationResult::Unrecognized(info) => {
                assert_eq!(info.type_name, "text");
                assert_eq!(info.content, "status: \"queued\"");
            }
            other => panic!("expected unrecognized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_materialize_local_shapes() {
        let fetcher = Fetcher::with_client(reqwest::Client::new());

        let bytes = materialize(GenerationResult::RawBytes(b"abc".to_vec()), &fetcher)
            .await
            .unwrap();
        assert!(matches!(bytes, Materialized::Video(ref d) if d == b"abc"));

        let stream = Box::new(ReaderStream(std::io::Cursor::new(b"drained".to_vec())));
        let drained = materialize(GenerationResult::StreamHandle(stream), &fetcher)
            .await
            .unwrap();
        assert!(matches!(drained, Materialized::Video(ref d) if d == b"drained"));

        let diag = materialize(
            GenerationResult::Unrecognized(Unrecognized::of(&42u8)),
            &fetcher,
        )
        .await
        .unwrap();
        assert!(matches!(diag, Materialized::Diagnostic(ref i) if i.content == "42"));
    }
}
