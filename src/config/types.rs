//! Core configuration types for vault export
//!
//! This module contains the main `ExportConfig` struct describing one export
//! run: where the vault is written, which platform host is being converted,
//! and the URL conventions the transformation pipeline keys on.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for one export run.
///
/// Threaded explicitly into every pipeline component; there is no ambient
/// global state, which keeps conversions deterministic under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Vault output directory. Converted documents and downloaded assets are
    /// written below this root.
    pub(crate) output_dir: PathBuf,

    /// Host of the source platform, e.g. `wiki.example.com`.
    ///
    /// Hyperlinks pointing anywhere else are left untouched.
    pub(crate) host: String,

    /// Scheme used for canonical source addresses in frontmatter.
    pub(crate) scheme: String,

    /// User agent sent on redirect lookups and asset downloads.
    pub(crate) user_agent: String,

    /// Name of the per-namespace asset directory.
    pub(crate) assets_dir: String,

    /// Path prefix of legacy share links that must be resolved via redirect.
    pub(crate) share_link_prefix: String,

    /// Path prefix of the platform's attachment namespace.
    pub(crate) attachments_prefix: String,

    /// Path marker identifying formula-rendering image URLs.
    pub(crate) math_path_marker: String,

    /// Query pair stripped from links before mapping lookup.
    pub(crate) embed_view_query: String,

    /// Maximum number of documents converted concurrently.
    pub(crate) max_concurrent_docs: usize,
}

impl ExportConfig {
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn assets_dir(&self) -> &str {
        &self.assets_dir
    }

    #[must_use]
    pub fn share_link_prefix(&self) -> &str {
        &self.share_link_prefix
    }

    #[must_use]
    pub fn attachments_prefix(&self) -> &str {
        &self.attachments_prefix
    }

    #[must_use]
    pub fn math_path_marker(&self) -> &str {
        &self.math_path_marker
    }

    #[must_use]
    pub fn embed_view_query(&self) -> &str {
        &self.embed_view_query
    }

    #[must_use]
    pub fn max_concurrent_docs(&self) -> usize {
        self.max_concurrent_docs
    }
}
