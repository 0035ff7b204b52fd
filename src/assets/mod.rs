//! Asset naming and fire-and-forget download scheduling.
//!
//! Conversion rewrites remote images to deterministic local names and hands
//! the `(source URL, destination)` pair to a `DownloadQueue`. The queue owns
//! the side effect entirely: textual conversion never waits on asset bytes,
//! and a failed download leaves the text output untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

use crate::net::HttpClient;

/// Derive the vault-relative name for a remote asset:
/// `<document-url>/<remote-filename>`.
///
/// Returns `None` when the remote URL has no usable filename segment; the
/// image node is then left unmodified.
#[must_use]
pub fn asset_relative_name(document_url: &str, remote: &Url) -> Option<String> {
    let filename = remote
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())?;
    Some(format!("{document_url}/{filename}"))
}

/// Absolute destination for a downloaded asset:
/// `<output>/<namespace>/<assets-dir>/<relative-name>`.
#[must_use]
pub fn asset_destination(
    output_dir: &Path,
    namespace: &str,
    assets_dir: &str,
    relative_name: &str,
) -> PathBuf {
    output_dir.join(namespace).join(assets_dir).join(relative_name)
}

/// Sink for detached asset downloads.
///
/// `enqueue` must return immediately; completion is deliberately not
/// observable from the conversion side.
pub trait DownloadQueue: Send + Sync {
    fn enqueue(&self, source_url: String, dest: PathBuf);
}

/// `DownloadQueue` backed by detached tokio tasks.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Arc<HttpClient>,
}

impl HttpDownloader {
    #[must_use]
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

impl DownloadQueue for HttpDownloader {
    fn enqueue(&self, source_url: String, dest: PathBuf) {
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            if let Err(e) = client.download(&source_url, &dest).await {
                log::warn!("asset download failed for {source_url}: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_relative_name() {
        let remote = Url::parse("https://wiki.example.com/attachments/pic.png").unwrap();
        assert_eq!(
            asset_relative_name("doc1", &remote),
            Some("doc1/pic.png".to_string())
        );
    }

    #[test]
    fn test_asset_relative_name_without_filename() {
        let remote = Url::parse("https://wiki.example.com/").unwrap();
        assert_eq!(asset_relative_name("doc1", &remote), None);
    }

    #[test]
    fn test_asset_destination_layout() {
        let dest = asset_destination(Path::new("/vault"), "ns", "assets", "doc1/pic.png");
        assert_eq!(dest, PathBuf::from("/vault/ns/assets/doc1/pic.png"));
    }
}
