//! Cross-document hyperlink rewriting.
//!
//! Rewrites links that point at the source platform so they reference the
//! target document's local file, relative to the current document's own
//! output location. Links whose target is missing from the mapping are left
//! as-is with a warning: a dangling external link beats losing the reference.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, parse_document};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

use crate::config::ExportConfig;
use crate::document::{DocumentLocation, DocumentMapping};

/// Rewrites hyperlink nodes against the corpus mapping.
pub struct LinkResolver<'a> {
    config: &'a ExportConfig,
    mapping: &'a DocumentMapping,
    doc: &'a DocumentLocation,
    /// Share link -> canonical URL, resolved in the async pre-pass.
    share_redirects: &'a HashMap<String, String>,
}

impl<'a> LinkResolver<'a> {
    #[must_use]
    pub fn new(
        config: &'a ExportConfig,
        mapping: &'a DocumentMapping,
        doc: &'a DocumentLocation,
        share_redirects: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            config,
            mapping,
            doc,
            share_redirects,
        }
    }

    /// Rewrite every resolvable hyperlink in the tree.
    pub fn apply<'t>(&self, root: &'t AstNode<'t>) {
        for node in root.descendants() {
            let mut ast = node.data.borrow_mut();
            if let NodeValue::Link(link) = &mut ast.value {
                if let Some(resolved) = self.resolve(&link.url) {
                    link.url = resolved;
                }
            }
        }
    }

    /// Resolve one link target to a relative local path, or `None` to leave
    /// the link untouched.
    fn resolve(&self, raw: &str) -> Option<String> {
        let parsed = Url::parse(raw).ok()?;

        if parsed.host_str() != Some(self.config.host()) {
            return None;
        }
        // Attachment links are binary downloads, owned by the image pass.
        if parsed.path().starts_with(self.config.attachments_prefix()) {
            return None;
        }

        let parsed = if parsed.path().starts_with(self.config.share_link_prefix()) {
            match self.share_redirects.get(raw) {
                Some(target) => Url::parse(target).ok()?,
                None => {
                    log::warn!("share link {raw} was not resolved in the redirect pre-pass");
                    return None;
                }
            }
        } else {
            parsed
        };

        let parsed = strip_embed_view(parsed, self.config.embed_view_query());
        let pathname = parsed.path().trim_start_matches('/').to_string();

        match self.mapping.get(&pathname) {
            Some(target) => relative_link(self.doc, target),
            None => {
                log::warn!(
                    "no local document for {pathname}, leaving link {raw} unresolved"
                );
                None
            }
        }
    }
}

/// Collect every share link in `body`, deduplicated, for redirect pre-resolution.
#[must_use]
pub fn collect_share_links(body: &str, config: &ExportConfig) -> Vec<String> {
    let arena = Arena::new();
    let root = parse_document(&arena, body, &Options::default());

    let mut found: Vec<String> = Vec::new();
    for node in root.descendants() {
        if let NodeValue::Link(link) = &node.data.borrow().value {
            if is_share_link(&link.url, config) && !found.contains(&link.url) {
                found.push(link.url.clone());
            }
        }
    }
    found
}

fn is_share_link(raw: &str, config: &ExportConfig) -> bool {
    match Url::parse(raw) {
        Ok(parsed) => {
            parsed.host_str() == Some(config.host())
                && parsed.path().starts_with(config.share_link_prefix())
        }
        Err(_) => false,
    }
}

/// Drop the embed-view query pair, keeping any other query parameters.
fn strip_embed_view(mut url: Url, marker: &str) -> Url {
    let Some(query) = url.query().map(str::to_owned) else {
        return url;
    };
    if !query.split('&').any(|pair| pair == marker) {
        return url;
    }

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| *pair != marker && !pair.is_empty())
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&kept.join("&")));
    }
    url
}

/// Path of the target's output file relative to the current document's
/// output directory.
fn relative_link(current: &DocumentLocation, target: &DocumentLocation) -> Option<String> {
    let current_dir = current.file_path.parent().unwrap_or_else(|| Path::new(""));
    pathdiff::diff_paths(&target.file_path, current_dir)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
}
