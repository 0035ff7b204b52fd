//! Batch export orchestration.
//!
//! Builds the corpus mapping once, converts documents concurrently under a
//! semaphore bound, and writes the results into the vault. Per-document
//! failures are collected into the report instead of aborting the batch;
//! retry or skip policy belongs to whoever drives the exporter.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::assets::{DownloadQueue, HttpDownloader};
use crate::config::ExportConfig;
use crate::convert::{ConvertContext, convert_document};
use crate::document::{DocumentMapping, DocumentRecord};
use crate::net::{HttpClient, RedirectLookup};

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Number of documents converted and written
    pub converted: usize,
    /// `(mapping key, error)` for every document that failed
    pub failed: Vec<(String, String)>,
}

/// Convert and write every record using live network collaborators.
pub async fn export_all(config: ExportConfig, records: Vec<DocumentRecord>) -> Result<ExportReport> {
    let client = Arc::new(HttpClient::new(config.user_agent()).context("failed to set up HTTP client")?);
    let downloads: Arc<dyn DownloadQueue> = Arc::new(HttpDownloader::new(Arc::clone(&client)));
    let redirects: Arc<dyn RedirectLookup> = client;

    export_with(Arc::new(config), redirects, downloads, records).await
}

/// Convert and write every record using the given collaborators.
///
/// Split from [`export_all`] so tests can substitute deterministic redirect
/// and download stubs.
pub async fn export_with(
    config: Arc<ExportConfig>,
    redirects: Arc<dyn RedirectLookup>,
    downloads: Arc<dyn DownloadQueue>,
    records: Vec<DocumentRecord>,
) -> Result<ExportReport> {
    let mapping = Arc::new(DocumentMapping::build(&records));
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_docs()));
    log::debug!(
        "exporting {} document(s) with concurrency {}",
        records.len(),
        config.max_concurrent_docs()
    );

    let conversions: Vec<_> = records
        .into_iter()
        .map(|mut record| {
            let ctx = ConvertContext {
                config: Arc::clone(&config),
                mapping: Arc::clone(&mapping),
                redirects: Arc::clone(&redirects),
                downloads: Arc::clone(&downloads),
            };
            let semaphore = Arc::clone(&semaphore);
            let output_dir = config.output_dir().to_path_buf();

            async move {
                let key = record.mapping_key();
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| (key.clone(), e.to_string()))?;
                convert_document(&mut record, &ctx)
                    .await
                    .map_err(|e| (key.clone(), e.to_string()))?;
                write_document(&record, &output_dir)
                    .await
                    .map_err(|e| (key.clone(), e.to_string()))?;
                Ok::<(), (String, String)>(())
            }
        })
        .collect();

    let mut report = ExportReport::default();
    for result in join_all(conversions).await {
        match result {
            Ok(()) => report.converted += 1,
            Err((key, error)) => {
                log::warn!("conversion failed for {key}: {error}");
                report.failed.push((key, error));
            }
        }
    }

    Ok(report)
}

/// Write one converted document into the vault.
async fn write_document(record: &DocumentRecord, output_dir: &Path) -> Result<()> {
    let path = output_dir.join(&record.file_path);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&path, &record.content)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
