use std::path::Path;

use tokio_util::sync::CancellationToken;

use chunkscribe_application::TranscribeRequest;
use chunkscribe_configuration::{init_logging, load_config};
use chunkscribe_domain::mime_for_extension;
use chunkscribe_setup::{Application, TracingProgressSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_logging(&config.logging);

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: chunkscribe <audio-file>")?;
    let bytes = tokio::fs::read(&path).await?;

    let path = Path::new(&path);
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("audio.bin")
        .to_string();
    let extension = path.extension().and_then(|ext| ext.to_str());
    let mime_type = mime_for_extension(extension);

    let app = Application::new(config)?;
    let cancel = CancellationToken::new();
    let response = app
        .transcribe(
            TranscribeRequest {
                file_name,
                mime_type,
                bytes,
                model: None,
                language: None,
                prompt: None,
            },
            &TracingProgressSink,
            &cancel,
        )
        .await?;

    tracing::info!(
        total_chunks = response.total_chunks,
        failed_chunks = response.failed_chunks,
        elapsed_ms = response.result.elapsed_ms,
        "transcription finished"
    );
    println!("{}", response.result.text);
    Ok(())
}
