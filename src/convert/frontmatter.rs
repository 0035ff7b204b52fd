//! Frontmatter header emitted ahead of every converted document.

use crate::config::ExportConfig;
use crate::document::DocumentLocation;

/// Build the structured metadata header for one document.
///
/// Currently a single key: the fully-qualified canonical source address. The
/// delimiter contract stays fixed when more keys are added.
#[must_use]
pub fn build(config: &ExportConfig, doc: &DocumentLocation) -> String {
    format!(
        "---\nurl: {scheme}://{host}/{namespace}/{url}\n---\n\n",
        scheme = config.scheme(),
        host = config.host(),
        namespace = doc.namespace,
        url = doc.url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentRecord;

    #[test]
    fn test_frontmatter_wraps_canonical_url() {
        let config = ExportConfig::builder()
            .output_dir("/vault")
            .host("wiki.example.com")
            .build()
            .unwrap();
        let doc = DocumentRecord::new("ns", "doc1", "", "").location();

        assert_eq!(
            build(&config, &doc),
            "---\nurl: https://wiki.example.com/ns/doc1\n---\n\n"
        );
    }
}
