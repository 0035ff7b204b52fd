//! Document records and the corpus-wide pathname lookup.
//!
//! A `DocumentRecord` is one exported wiki document; the `DocumentMapping` is
//! the immutable `pathname -> location` table built once per run and shared
//! read-only across all concurrent conversions.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::utils::MARKDOWN_EXTENSION;

/// One document as exported by the source platform.
///
/// `body` holds the raw source-dialect markdown. `content` stays empty until
/// the conversion pipeline writes the final text into it, exactly once; a
/// record never carries partial output.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub namespace: String,
    pub url: String,
    pub title: String,
    /// Relative output location inside the vault, `<namespace>/<url>.md`.
    pub file_path: PathBuf,
    pub body: String,
    pub content: String,
}

/// Location metadata for one document, as stored in the mapping.
///
/// Deliberately detached from the record so the mapping can be shared
/// read-only while records are being mutated by their own conversions.
#[derive(Debug, Clone)]
pub struct DocumentLocation {
    pub namespace: String,
    pub url: String,
    pub file_path: PathBuf,
}

impl DocumentRecord {
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        let url = url.into();
        let file_path = PathBuf::from(&namespace).join(format!("{url}.{MARKDOWN_EXTENSION}"));
        Self {
            namespace,
            url,
            title: title.into(),
            file_path,
            body: body.into(),
            content: String::new(),
        }
    }

    /// Key under which this document appears in the mapping: the source
    /// pathname with the leading separator stripped.
    #[must_use]
    pub fn mapping_key(&self) -> String {
        format!("{}/{}", self.namespace, self.url)
    }

    #[must_use]
    pub fn location(&self) -> DocumentLocation {
        DocumentLocation {
            namespace: self.namespace.clone(),
            url: self.url.clone(),
            file_path: self.file_path.clone(),
        }
    }
}

/// Immutable `pathname -> DocumentLocation` lookup.
///
/// Built once before any conversion starts; all later access is read-only,
/// so it can be shared across tasks without locking.
#[derive(Debug, Default)]
pub struct DocumentMapping {
    entries: HashMap<String, DocumentLocation>,
}

impl DocumentMapping {
    #[must_use]
    pub fn build(records: &[DocumentRecord]) -> Self {
        let mut entries = HashMap::with_capacity(records.len());
        for record in records {
            entries.insert(record.mapping_key(), record.location());
        }
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, pathname: &str) -> Option<&DocumentLocation> {
        self.entries.get(pathname)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wire shape of one exported record on disk.
#[derive(Debug, Deserialize)]
struct RawRecord {
    namespace: String,
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
}

/// Load every `*.json` export record from `dir`.
///
/// Records are sorted by mapping key so conversion order (and with it, log
/// output) is deterministic across runs.
pub async fn load_records(dir: &Path) -> Result<Vec<DocumentRecord>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read record directory {}", dir.display()))?;

    let mut records = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("failed to enumerate {}", dir.display()))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw: RawRecord = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse record {}", path.display()))?;
        records.push(DocumentRecord::new(raw.namespace, raw.url, raw.title, raw.body));
    }

    records.sort_by_key(DocumentRecord::mapping_key);
    log::debug!("loaded {} record(s) from {}", records.len(), dir.display());

    Ok(records)
}
