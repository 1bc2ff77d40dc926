use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use chunkscribe_domain::{
    mime_for_extension, url_extension, AudioAsset, Chunk, ChunkFetcher, ChunkSplitter, DomainError,
    FetchedChunk,
};

#[derive(Debug, Deserialize)]
struct SplitEnvelope {
    data: SplitData,
}

#[derive(Debug, Deserialize)]
struct SplitData {
    #[serde(default)]
    media_urls: Vec<String>,
}

/// Delegates splitting to the remote split-by-size service. The returned
/// URL list order is kept as the chunk order for downstream transcription.
pub struct RemoteSplitClient {
    client: reqwest::Client,
    base_url: String,
    target_size_mb: u32,
}

impl RemoteSplitClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, target_size_mb: u32) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            target_size_mb,
        }
    }
}

#[async_trait]
impl ChunkSplitter for RemoteSplitClient {
    async fn split(&self, asset: &AudioAsset) -> Result<Vec<Chunk>, DomainError> {
        if asset.bytes.is_empty() {
            return Err(DomainError::InvalidInput("audio asset is empty".to_string()));
        }

        let url = format!("{}/media/split-by-size", self.base_url);
        let file_part = multipart::Part::bytes(asset.bytes.clone())
            .file_name(asset.name.clone())
            .mime_str(&asset.mime_type)
            .map_err(|e| DomainError::SplitService(format!("mime: {e}")))?;
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("size", self.target_size_mb.to_string());

        tracing::debug!(
            file_bytes = asset.size_bytes(),
            target_size_mb = self.target_size_mb,
            "requesting remote split"
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::SplitService(format!("request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(DomainError::SplitService(format!("status {status}: {body}")));
        }

        let envelope: SplitEnvelope = response
            .json()
            .await
            .map_err(|e| DomainError::SplitService(format!("body: {e}")))?;

        tracing::debug!(
            chunk_count = envelope.data.media_urls.len(),
            "remote split completed"
        );

        Ok(envelope
            .data
            .media_urls
            .into_iter()
            .map(Chunk::remote)
            .collect())
    }
}

/// Downloads remote chunk bytes and reconstructs a MIME type from the URL
/// extension.
pub struct HttpChunkFetcher {
    client: reqwest::Client,
}

impl HttpChunkFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChunkFetcher for HttpChunkFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedChunk, DomainError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::ChunkFetch(format!("request: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::ChunkFetch(format!(
                "status {} for {url}",
                response.status()
            )));
        }

        let mime_type = mime_for_extension(url_extension(url));
        let name = url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("chunk.bin")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::ChunkFetch(format!("body: {e}")))?
            .to_vec();

        tracing::debug!(%url, bytes = bytes.len(), mime = %mime_type, "fetched remote chunk");

        Ok(FetchedChunk {
            name,
            mime_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock server runs");
        });
        addr
    }

    fn asset() -> AudioAsset {
        AudioAsset::new("meeting.mp3", "audio/mp3", vec![9u8; 32])
    }

    #[tokio::test]
    async fn split_unwraps_envelope_and_preserves_url_order() {
        async fn split_handler(mut multipart: Multipart) -> Result<Json<serde_json::Value>, StatusCode> {
            let mut size = None;
            let mut file_len = None;
            while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
                match field.name() {
                    Some("size") => size = field.text().await.ok(),
                    Some("file") => {
                        file_len = field.bytes().await.ok().map(|b| b.len());
                    }
                    _ => {}
                }
            }
            if size.as_deref() != Some("25") || file_len != Some(32) {
                return Err(StatusCode::BAD_REQUEST);
            }
            Ok(Json(json!({
                "data": { "media_urls": ["https://cdn.example/a.mp3", "https://cdn.example/b.mp3"] }
            })))
        }

        let addr = serve(Router::new().route("/media/split-by-size", post(split_handler))).await;
        let client = RemoteSplitClient::new(reqwest::Client::new(), format!("http://{addr}"), 25);

        let chunks = client.split(&asset()).await.expect("split succeeds");
        assert_eq!(
            chunks,
            vec![
                Chunk::remote("https://cdn.example/a.mp3"),
                Chunk::remote("https://cdn.example/b.mp3"),
            ]
        );
    }

    #[tokio::test]
    async fn split_non_2xx_is_fatal_split_service_error() {
        let addr = serve(Router::new().route(
            "/media/split-by-size",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        ))
        .await;
        let client = RemoteSplitClient::new(reqwest::Client::new(), format!("http://{addr}"), 25);

        let error = client.split(&asset()).await.expect_err("503 should fail");
        assert!(error.is_fatal());
        match error {
            DomainError::SplitService(message) => {
                assert!(message.contains("503"));
                assert!(message.contains("maintenance"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_infers_mime_from_extension() {
        let addr = serve(Router::new().route("/chunks/a.mp3", get(|| async { vec![1u8, 2, 3] }))).await;
        let fetcher = HttpChunkFetcher::new(reqwest::Client::new());

        let fetched = fetcher
            .fetch(&format!("http://{addr}/chunks/a.mp3"))
            .await
            .expect("fetch succeeds");
        assert_eq!(fetched.name, "a.mp3");
        assert_eq!(fetched.mime_type, "audio/mp3");
        assert_eq!(fetched.bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn fetch_defaults_mime_without_extension() {
        let addr = serve(Router::new().route("/chunks/raw", get(|| async { vec![7u8] }))).await;
        let fetcher = HttpChunkFetcher::new(reqwest::Client::new());

        let fetched = fetcher
            .fetch(&format!("http://{addr}/chunks/raw"))
            .await
            .expect("fetch succeeds");
        assert_eq!(fetched.mime_type, "audio/mpeg");
        assert_eq!(fetched.name, "raw");
    }

    #[tokio::test]
    async fn fetch_non_2xx_is_recoverable_chunk_error() {
        let addr = serve(Router::new()).await;
        let fetcher = HttpChunkFetcher::new(reqwest::Client::new());

        let error = fetcher
            .fetch(&format!("http://{addr}/chunks/missing.mp3"))
            .await
            .expect_err("404 should fail");
        assert!(!error.is_fatal());
        assert!(matches!(error, DomainError::ChunkFetch(_)));
    }
}
