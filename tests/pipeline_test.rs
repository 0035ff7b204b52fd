//! End-to-end pipeline tests with stubbed network collaborators.

use std::path::PathBuf;
use std::sync::Arc;

use wikivault::convert::{ConvertContext, ConvertError, convert_document};
use wikivault::{DocumentMapping, DocumentRecord, ExportConfig};

mod common;
use common::{RecordingQueue, StaticRedirects};

fn test_config() -> ExportConfig {
    ExportConfig::builder()
        .output_dir("/vault")
        .host("wiki.example.com")
        .build()
        .unwrap()
}

fn context_for(
    records: &[DocumentRecord],
    redirects: StaticRedirects,
    queue: Arc<RecordingQueue>,
) -> ConvertContext {
    ConvertContext {
        config: Arc::new(test_config()),
        mapping: Arc::new(DocumentMapping::build(records)),
        redirects: Arc::new(redirects),
        downloads: queue,
    }
}

#[tokio::test]
async fn test_full_document_conversion() {
    let body = "\
# Title

[Target](https://wiki.example.com/ns/target-doc)

[Elsewhere](https://other.example.com/page)

![](https://wiki.example.com/attachments/pic.png)

![](https://wiki.example.com/x/__latex/f.svg#card=math&code=E%3Dmc%5E2&)

:::tip
Mind the gap.
:::
";
    let mut record = DocumentRecord::new("ns", "current", "Current", body);
    let records = vec![record.clone(), DocumentRecord::new("ns", "target-doc", "", "")];
    let queue = Arc::new(RecordingQueue::default());
    let ctx = context_for(&records, StaticRedirects::default(), Arc::clone(&queue));

    convert_document(&mut record, &ctx).await.unwrap();
    let content = &record.content;

    // Frontmatter wraps the canonical source address.
    assert!(
        content.starts_with("---\nurl: https://wiki.example.com/ns/current\n---\n\n"),
        "got: {content}"
    );
    // Mapped link rewritten relative to the current document's file.
    assert!(content.contains("[Target](target-doc.md)"), "got: {content}");
    // Foreign link untouched.
    assert!(
        content.contains("[Elsewhere](https://other.example.com/page)"),
        "got: {content}"
    );
    // Remote image became an embed link and a scheduled download.
    assert!(content.contains("![[current/pic.png]]"), "got: {content}");
    // Math image became a fenced expression.
    assert!(content.contains("$$\nE=mc^2\n$$"), "got: {content}");
    // Callout fence translated.
    assert!(content.contains("```ad-tip\nMind the gap.\n```"), "got: {content}");
    // No sentinel leaks into the final text.
    assert!(!content.contains("pending"), "got: {content}");

    let scheduled = queue.scheduled.lock().unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].0, "https://wiki.example.com/attachments/pic.png");
    assert_eq!(scheduled[0].1, PathBuf::from("/vault/ns/assets/current/pic.png"));
}

#[tokio::test]
async fn test_unmapped_link_survives_unchanged() {
    let body = "[Missing](https://wiki.example.com/ns/missing-doc)\n";
    let mut record = DocumentRecord::new("ns", "current", "", body);
    let records = vec![record.clone()];
    let queue = Arc::new(RecordingQueue::default());
    let ctx = context_for(&records, StaticRedirects::default(), Arc::clone(&queue));

    convert_document(&mut record, &ctx).await.unwrap();

    assert!(
        record
            .content
            .contains("[Missing](https://wiki.example.com/ns/missing-doc)"),
        "got: {}",
        record.content
    );
}

#[tokio::test]
async fn test_share_link_follows_redirect() {
    let body = "[Shared](https://wiki.example.com/docs/share/abc123)\n";
    let mut record = DocumentRecord::new("ns", "current", "", body);
    let records = vec![record.clone(), DocumentRecord::new("ns", "target-doc", "", "")];
    let queue = Arc::new(RecordingQueue::default());
    let redirects = StaticRedirects::default().with(
        "https://wiki.example.com/docs/share/abc123",
        "https://wiki.example.com/ns/target-doc",
    );
    let ctx = context_for(&records, redirects, Arc::clone(&queue));

    convert_document(&mut record, &ctx).await.unwrap();

    assert!(
        record.content.contains("[Shared](target-doc.md)"),
        "got: {}",
        record.content
    );
}

#[tokio::test]
async fn test_failed_share_link_lookup_aborts_document() {
    let body = "[Shared](https://wiki.example.com/docs/share/broken)\n";
    let mut record = DocumentRecord::new("ns", "current", "", body);
    let records = vec![record.clone()];
    let queue = Arc::new(RecordingQueue::default());
    let ctx = context_for(&records, StaticRedirects::default(), Arc::clone(&queue));

    let err = convert_document(&mut record, &ctx).await.unwrap_err();

    assert!(matches!(err, ConvertError::ShareLink { .. }), "got: {err}");
    // No partial output.
    assert!(record.content.is_empty());
}

#[tokio::test]
async fn test_table_content_is_preserved() {
    let body = "\
| Name | Value |
| --- | --- |
| alpha | 1 |
| beta | 2 |
";
    let mut record = DocumentRecord::new("ns", "current", "", body);
    let records = vec![record.clone()];
    let queue = Arc::new(RecordingQueue::default());
    let ctx = context_for(&records, StaticRedirects::default(), Arc::clone(&queue));

    convert_document(&mut record, &ctx).await.unwrap();

    assert!(record.content.contains("| alpha | 1 |"), "got: {}", record.content);
    assert!(record.content.contains("| beta | 2 |"), "got: {}", record.content);
}
