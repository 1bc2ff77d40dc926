use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use tokio_util::sync::CancellationToken;

use chunkscribe_application::{
    TranscribeRequest, TranscribeResponse, TranscribeUseCase, TranscribeUseCaseImpl,
};
use chunkscribe_configuration::{AppConfig, SplitStrategy};
use chunkscribe_domain::{ChunkFetcher, ChunkSplitter, ProgressEvent, ProgressSink};
use chunkscribe_infra_asr_rest::RestTranscriptionClient;
use chunkscribe_infra_split_rest::{HttpChunkFetcher, RemoteSplitClient};
use chunkscribe_infra_splitter::{ByteRangeSplitter, SampleAccurateSplitter};

pub struct Application {
    pub config: AppConfig,
    pub usecase: Arc<dyn TranscribeUseCase>,
}

impl Application {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        tracing::info!(
            strategy = ?config.splitter.strategy,
            max_chunk_size_bytes = config.splitter.max_chunk_size_bytes,
            model = %config.transcription.model,
            "initializing transcription application"
        );

        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| anyhow::anyhow!("http client construction failed: {err}"))?;

        let splitter: Arc<dyn ChunkSplitter> = match config.splitter.strategy {
            SplitStrategy::SampleAccurate => Arc::new(SampleAccurateSplitter::new(
                config.splitter.max_chunk_size_bytes,
                config.splitter.max_chunk_duration_secs,
            )),
            SplitStrategy::ByteRange => {
                Arc::new(ByteRangeSplitter::new(config.splitter.max_chunk_size_bytes))
            }
            SplitStrategy::Remote => Arc::new(RemoteSplitClient::new(
                client.clone(),
                config.remote_split.base_url.clone(),
                config.remote_split.target_size_mb,
            )),
        };

        let fetcher: Arc<dyn ChunkFetcher> = Arc::new(HttpChunkFetcher::new(client.clone()));
        let transcriber = Arc::new(RestTranscriptionClient::new(
            client,
            config.transcription.base_url.clone(),
            config.transcription.api_key.clone(),
            Duration::from_millis(config.transcription.request_timeout_ms),
        ));

        let usecase: Arc<dyn TranscribeUseCase> = Arc::new(TranscribeUseCaseImpl::new(
            splitter,
            fetcher,
            transcriber,
            config.transcription.model.clone(),
            config.transcription.language.clone(),
            config.transcription.max_attempts,
        ));

        Ok(Self { config, usecase })
    }

    pub async fn transcribe(
        &self,
        request: TranscribeRequest,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<TranscribeResponse, Error> {
        self.usecase
            .transcribe(request, progress, cancel)
            .await
            .map_err(Error::from)
    }
}

/// Progress sink that forwards pipeline events to the log stream.
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn publish(&self, event: ProgressEvent) {
        tracing::info!(
            current_chunk = event.current_chunk,
            total_chunks = event.total_chunks,
            message = %event.message,
            "progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(strategy: SplitStrategy) -> AppConfig {
        let mut config = AppConfig::default();
        config.splitter.strategy = strategy;
        config
    }

    #[test]
    fn builds_with_every_strategy() {
        for strategy in [
            SplitStrategy::SampleAccurate,
            SplitStrategy::ByteRange,
            SplitStrategy::Remote,
        ] {
            let app = Application::new(config_with(strategy)).expect("wiring succeeds");
            assert_eq!(app.config.splitter.strategy, strategy);
        }
    }
}
