use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use chunkscribe_domain::{DomainError, FetchedChunk, TranscriptionOptions, TranscriptionPort};

#[derive(Debug, Deserialize)]
struct TranscriptionBody {
    #[serde(default)]
    text: String,
}

/// Speech-to-text API adapter: authenticated multipart POST per chunk.
pub struct RestTranscriptionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    request_timeout: Duration,
}

impl RestTranscriptionClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            request_timeout,
        }
    }
}

#[async_trait]
impl TranscriptionPort for RestTranscriptionClient {
    async fn transcribe_chunk(
        &self,
        chunk: &FetchedChunk,
        options: &TranscriptionOptions,
    ) -> Result<String, DomainError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(chunk.bytes.clone())
            .file_name(chunk.name.clone())
            .mime_str(&chunk.mime_type)
            .map_err(|e| DomainError::TranscriptionApi(format!("mime: {e}")))?;

        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("model", options.model.clone())
            .text("response_format", "json");
        if let Some(language) = &options.language {
            form = form.text("language", language.clone());
        }
        if let Some(prompt) = &options.prompt {
            form = form.text("prompt", prompt.clone());
        }

        tracing::debug!(
            chunk_name = %chunk.name,
            chunk_bytes = chunk.bytes.len(),
            model = %options.model,
            "submitting chunk to transcription api"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::TranscriptionApi(format!("request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(DomainError::TranscriptionApi(format!(
                "status {status}: {body}"
            )));
        }

        let body: TranscriptionBody = response
            .json()
            .await
            .map_err(|e| DomainError::TranscriptionApi(format!("body: {e}")))?;

        tracing::debug!(chars = body.text.len(), "chunk transcription completed");

        Ok(body.text)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::extract::Multipart;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
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

    fn client(addr: SocketAddr) -> RestTranscriptionClient {
        RestTranscriptionClient::new(
            reqwest::Client::new(),
            format!("http://{addr}/api/openai/v1"),
            "test-key",
            Duration::from_secs(5),
        )
    }

    fn options() -> TranscriptionOptions {
        TranscriptionOptions {
            model: "whisper-1".to_string(),
            language: Some("ja".to_string()),
            prompt: Some("meeting notes".to_string()),
        }
    }

    fn chunk() -> FetchedChunk {
        FetchedChunk {
            name: "chunk_0.wav".to_string(),
            mime_type: "audio/wav".to_string(),
            bytes: vec![1, 2, 3, 4],
        }
    }

    async fn echo_fields(headers: HeaderMap, mut multipart: Multipart) -> Json<serde_json::Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let mut fields = vec![format!("auth={auth}")];
        while let Some(field) = multipart.next_field().await.expect("field") {
            let name = field.name().unwrap_or("").to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await.expect("bytes");
                fields.push(format!("file={file_name}:{}", bytes.len()));
            } else {
                let value = field.text().await.expect("text");
                fields.push(format!("{name}={value}"));
            }
        }
        fields.sort();
        Json(json!({ "text": fields.join(";") }))
    }

    #[tokio::test]
    async fn submits_multipart_form_with_bearer_auth() {
        let addr = serve(Router::new().route(
            "/api/openai/v1/audio/transcriptions",
            post(echo_fields),
        ))
        .await;

        let text = client(addr)
            .transcribe_chunk(&chunk(), &options())
            .await
            .expect("transcription succeeds");

        assert_eq!(
            text,
            "auth=Bearer test-key;file=chunk_0.wav:4;language=ja;\
             model=whisper-1;prompt=meeting notes;response_format=json"
        );
    }

    #[tokio::test]
    async fn optional_fields_are_omitted_when_unset() {
        let addr = serve(Router::new().route(
            "/api/openai/v1/audio/transcriptions",
            post(echo_fields),
        ))
        .await;

        let bare = TranscriptionOptions {
            model: "whisper-1".to_string(),
            language: None,
            prompt: None,
        };
        let text = client(addr)
            .transcribe_chunk(&chunk(), &bare)
            .await
            .expect("transcription succeeds");

        assert!(!text.contains("language="));
        assert!(!text.contains("prompt="));
    }

    #[tokio::test]
    async fn non_2xx_carries_status_and_body() {
        let addr = serve(Router::new().route(
            "/api/openai/v1/audio/transcriptions",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model overloaded") }),
        ))
        .await;

        let error = client(addr)
            .transcribe_chunk(&chunk(), &options())
            .await
            .expect_err("500 should fail");

        match error {
            DomainError::TranscriptionApi(message) => {
                assert!(message.contains("500"));
                assert!(message.contains("model overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_text_field_defaults_to_empty() {
        let addr = serve(Router::new().route(
            "/api/openai/v1/audio/transcriptions",
            post(|| async { Json(json!({ "language": "ja" })) }),
        ))
        .await;

        let text = client(addr)
            .transcribe_chunk(&chunk(), &options())
            .await
            .expect("transcription succeeds");
        assert_eq!(text, "");
    }
}
