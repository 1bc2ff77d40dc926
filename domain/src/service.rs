/// Joins per-chunk transcripts with a single space. Empty segments from
/// failed chunks are kept so the separator count always equals
/// `segments - 1` and gaps stay visible at their original positions.
pub fn join_transcripts(parts: &[String]) -> String {
    parts.join(" ")
}

/// Reconstructs an audio MIME type from a URL or file extension.
/// Any present extension maps to `audio/{ext}`; a missing extension falls
/// back to a generic audio MIME.
pub fn mime_for_extension(extension: Option<&str>) -> String {
    match extension {
        Some(ext) if !ext.is_empty() => format!("audio/{}", ext.to_ascii_lowercase()),
        _ => "audio/mpeg".to_string(),
    }
}

/// Extension after the last dot of a URL's final path segment.
pub fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_keeps_empty_segments() {
        let parts = vec!["hello".to_string(), String::new(), "world".to_string()];
        assert_eq!(join_transcripts(&parts), "hello  world");
    }

    #[test]
    fn mime_uses_extension_when_present() {
        assert_eq!(mime_for_extension(Some("mp3")), "audio/mp3");
        assert_eq!(mime_for_extension(Some("WAV")), "audio/wav");
        assert_eq!(mime_for_extension(None), "audio/mpeg");
        assert_eq!(mime_for_extension(Some("")), "audio/mpeg");
    }

    #[test]
    fn url_extension_ignores_query_and_directories() {
        assert_eq!(url_extension("https://cdn.example/x/a.mp3"), Some("mp3"));
        assert_eq!(url_extension("https://cdn.example/a.mp3?sig=1"), Some("mp3"));
        assert_eq!(url_extension("https://cdn.example/v2.1/chunk"), None);
        assert_eq!(url_extension("chunk"), None);
    }
}
