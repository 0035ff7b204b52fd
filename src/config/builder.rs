//! Type-safe builder for `ExportConfig` using the typestate pattern
//!
//! This module provides a fluent builder interface with compile-time
//! validation ensuring that required fields are set before building an
//! `ExportConfig`.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::ExportConfig;
use crate::utils::{
    ASSETS_DIR_NAME, ATTACHMENTS_PREFIX, DEFAULT_MAX_CONCURRENT_DOCS, DEFAULT_SCHEME,
    DEFAULT_USER_AGENT, EMBED_VIEW_QUERY, MATH_PATH_MARKER, SHARE_LINK_PREFIX,
};

// Type states for the builder
pub struct WithOutputDir;
pub struct WithHost;

pub struct ExportConfigBuilder<State = ()> {
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) host: Option<String>,
    pub(crate) scheme: String,
    pub(crate) user_agent: String,
    pub(crate) assets_dir: String,
    pub(crate) share_link_prefix: String,
    pub(crate) attachments_prefix: String,
    pub(crate) math_path_marker: String,
    pub(crate) embed_view_query: String,
    pub(crate) max_concurrent_docs: usize,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ExportConfigBuilder<()> {
    fn default() -> Self {
        Self {
            output_dir: None,
            host: None,
            scheme: DEFAULT_SCHEME.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            assets_dir: ASSETS_DIR_NAME.to_string(),
            share_link_prefix: SHARE_LINK_PREFIX.to_string(),
            attachments_prefix: ATTACHMENTS_PREFIX.to_string(),
            math_path_marker: MATH_PATH_MARKER.to_string(),
            embed_view_query: EMBED_VIEW_QUERY.to_string(),
            max_concurrent_docs: DEFAULT_MAX_CONCURRENT_DOCS,
            _phantom: PhantomData,
        }
    }
}

impl ExportConfig {
    /// Create a builder for configuring an `ExportConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ExportConfigBuilder<()> {
        ExportConfigBuilder::default()
    }
}

impl ExportConfigBuilder<()> {
    pub fn output_dir(self, dir: impl Into<PathBuf>) -> ExportConfigBuilder<WithOutputDir> {
        ExportConfigBuilder {
            output_dir: Some(dir.into()),
            host: self.host,
            scheme: self.scheme,
            user_agent: self.user_agent,
            assets_dir: self.assets_dir,
            share_link_prefix: self.share_link_prefix,
            attachments_prefix: self.attachments_prefix,
            math_path_marker: self.math_path_marker,
            embed_view_query: self.embed_view_query,
            max_concurrent_docs: self.max_concurrent_docs,
            _phantom: PhantomData,
        }
    }
}

impl ExportConfigBuilder<WithOutputDir> {
    pub fn host(self, host: impl Into<String>) -> ExportConfigBuilder<WithHost> {
        let host_string = host.into();

        // Accept a full origin and reduce it to the bare host
        let normalized = host_string
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();

        ExportConfigBuilder {
            output_dir: self.output_dir,
            host: Some(normalized),
            scheme: self.scheme,
            user_agent: self.user_agent,
            assets_dir: self.assets_dir,
            share_link_prefix: self.share_link_prefix,
            attachments_prefix: self.attachments_prefix,
            math_path_marker: self.math_path_marker,
            embed_view_query: self.embed_view_query,
            max_concurrent_docs: self.max_concurrent_docs,
            _phantom: PhantomData,
        }
    }
}

// Optional fields can be set in any state
impl<State> ExportConfigBuilder<State> {
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn assets_dir(mut self, assets_dir: impl Into<String>) -> Self {
        self.assets_dir = assets_dir.into();
        self
    }

    #[must_use]
    pub fn max_concurrent_docs(mut self, max: usize) -> Self {
        self.max_concurrent_docs = max;
        self
    }
}

// Build method only available when all required fields are set
impl ExportConfigBuilder<WithHost> {
    pub fn build(self) -> Result<ExportConfig> {
        let output_dir = self
            .output_dir
            .ok_or_else(|| anyhow!("output_dir is required"))?;
        let host = self.host.ok_or_else(|| anyhow!("host is required"))?;

        if host.is_empty() {
            return Err(anyhow!("host must not be empty"));
        }
        if host.contains('/') {
            return Err(anyhow!("host must be a bare hostname, got '{host}'"));
        }
        if self.max_concurrent_docs == 0 {
            return Err(anyhow!("max_concurrent_docs must be at least 1"));
        }

        Ok(ExportConfig {
            output_dir,
            host,
            scheme: self.scheme,
            user_agent: self.user_agent,
            assets_dir: self.assets_dir,
            share_link_prefix: self.share_link_prefix,
            attachments_prefix: self.attachments_prefix,
            math_path_marker: self.math_path_marker,
            embed_view_query: self.embed_view_query,
            max_concurrent_docs: self.max_concurrent_docs,
        })
    }
}
