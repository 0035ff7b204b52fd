//! Batch export tests: file layout and non-fatal per-document failures.

use std::sync::Arc;

use wikivault::{DocumentRecord, ExportConfig, export_with};

mod common;
use common::{RecordingQueue, StaticRedirects};

#[tokio::test]
async fn test_export_writes_vault_layout() {
    let vault = tempfile::tempdir().unwrap();
    let config = Arc::new(
        ExportConfig::builder()
            .output_dir(vault.path())
            .host("wiki.example.com")
            .build()
            .unwrap(),
    );

    let records = vec![
        DocumentRecord::new(
            "ns",
            "doc1",
            "One",
            "[Two](https://wiki.example.com/ns/doc2)\n",
        ),
        DocumentRecord::new("ns", "doc2", "Two", "plain text\n"),
    ];

    let report = export_with(
        config,
        Arc::new(StaticRedirects::default()),
        Arc::new(RecordingQueue::default()),
        records,
    )
    .await
    .unwrap();

    assert_eq!(report.converted, 2);
    assert!(report.failed.is_empty());

    let doc1 = std::fs::read_to_string(vault.path().join("ns/doc1.md")).unwrap();
    assert!(doc1.contains("[Two](doc2.md)"), "got: {doc1}");
    assert!(doc1.starts_with("---\nurl: https://wiki.example.com/ns/doc1\n---\n\n"));

    let doc2 = std::fs::read_to_string(vault.path().join("ns/doc2.md")).unwrap();
    assert!(doc2.contains("plain text"), "got: {doc2}");
}

#[tokio::test]
async fn test_failed_document_does_not_abort_batch() {
    let vault = tempfile::tempdir().unwrap();
    let config = Arc::new(
        ExportConfig::builder()
            .output_dir(vault.path())
            .host("wiki.example.com")
            .build()
            .unwrap(),
    );

    let records = vec![
        // Share link with no stubbed redirect target: fatal for this document.
        DocumentRecord::new(
            "ns",
            "broken",
            "",
            "[s](https://wiki.example.com/docs/share/x)\n",
        ),
        DocumentRecord::new("ns", "fine", "", "still here\n"),
    ];

    let report = export_with(
        config,
        Arc::new(StaticRedirects::default()),
        Arc::new(RecordingQueue::default()),
        records,
    )
    .await
    .unwrap();

    assert_eq!(report.converted, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "ns/broken");

    assert!(!vault.path().join("ns/broken.md").exists());
    assert!(vault.path().join("ns/fine.md").exists());
}
