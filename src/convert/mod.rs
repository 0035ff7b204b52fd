//! The per-document transformation pipeline.
//!
//! # Architecture
//!
//! Conversion runs two full parse/transform/serialize rounds plus one
//! text-level pass:
//!
//! 1. **Round 1** rewrites hyperlinks and images on the syntax tree. It needs
//!    external context: the corpus mapping, the owning document, the redirect
//!    lookup and the download queue.
//! 2. **Round 2** reparses the serialized output and runs the pure structural
//!    cleanup (table protection, raw-markup removal, bold-run tagging).
//! 3. **Post-processing** applies an ordered list of text substitutions for
//!    target-dialect syntax the tree grammar cannot represent (math fences,
//!    embed links, callouts).
//!
//! The rounds stay separate so each can be tested against fixed input/output
//! text without constructing the cross-document mapping. The regex pass runs
//! last because its inputs (math/image placeholders) only exist once the
//! rewritten tree has been serialized.

pub mod frontmatter;
pub mod image_extractor;
pub mod link_resolver;
pub mod postprocess;
pub mod structural;

use comrak::nodes::{Ast, AstNode, LineColumn, NodeValue};
use comrak::{Arena, Options, format_commonmark, parse_document};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::DownloadQueue;
use crate::config::ExportConfig;
use crate::document::{DocumentLocation, DocumentMapping, DocumentRecord};
use crate::net::{NetError, RedirectLookup};

pub use image_extractor::ImageExtractor;
pub use link_resolver::LinkResolver;

/// Fatal per-document conversion errors.
///
/// Everything else the pipeline encounters is either a warn-and-continue
/// diagnostic (mapping miss, failed download) or a passthrough.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Share-link redirect lookup failed; no retry
    #[error("share link lookup failed for {url}")]
    ShareLink {
        url: String,
        #[source]
        source: NetError,
    },

    /// Formula image carried no extractable code parameter
    #[error("formula image {url} has no code parameter")]
    MathCode { url: String },

    /// Formula expression was not valid percent-encoding
    #[error("formula expression {expr:?} is not valid percent-encoding")]
    MathDecode {
        expr: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Markdown serialization failed
    #[error("markdown serialization failed")]
    Serialize(#[from] std::io::Error),

    /// Serialized markdown was not UTF-8
    #[error("serialized markdown is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Shared collaborators threaded into every conversion.
///
/// The mapping is immutable once built, so cloning the context across
/// concurrent conversions is cheap and lock-free.
#[derive(Clone)]
pub struct ConvertContext {
    pub config: Arc<ExportConfig>,
    pub mapping: Arc<DocumentMapping>,
    pub redirects: Arc<dyn RedirectLookup>,
    pub downloads: Arc<dyn DownloadQueue>,
}

/// Convert one document's body and write the result into `record.content`.
///
/// The content write happens exactly once, at the very end; a failing
/// conversion leaves the record untouched.
pub async fn convert_document(
    record: &mut DocumentRecord,
    ctx: &ConvertContext,
) -> Result<(), ConvertError> {
    let location = record.location();

    // Share links need a network round-trip, and the arena tree cannot be
    // held across an await point. Resolve them up front, then hand the tree
    // rewrite a plain map.
    let share_links = link_resolver::collect_share_links(&record.body, &ctx.config);
    let mut share_redirects = HashMap::new();
    for link in share_links {
        let target =
            ctx.redirects
                .resolve(&link)
                .await
                .map_err(|source| ConvertError::ShareLink {
                    url: link.clone(),
                    source,
                })?;
        log::debug!("share link {link} resolved to {target}");
        share_redirects.insert(link, target);
    }

    let rewritten = round_one(
        &record.body,
        &location,
        &ctx.config,
        &ctx.mapping,
        ctx.downloads.as_ref(),
        &share_redirects,
    )?;
    let cleaned = structural::normalize(&rewritten)?;
    let text = postprocess::apply(&cleaned)?;
    let header = frontmatter::build(&ctx.config, &location);

    record.content = format!("{header}{text}");
    Ok(())
}

/// Round 1: parse, rewrite links and images, serialize.
pub fn round_one(
    body: &str,
    doc: &DocumentLocation,
    config: &ExportConfig,
    mapping: &DocumentMapping,
    downloads: &dyn DownloadQueue,
    share_redirects: &HashMap<String, String>,
) -> Result<String, ConvertError> {
    let arena = Arena::new();
    // Extensions stay off in round 1: tables are carried through as plain
    // text until the structural round, which is what keeps their bytes
    // stable.
    let options = Options::default();
    let root = parse_document(&arena, body, &options);

    LinkResolver::new(config, mapping, doc, share_redirects).apply(root);
    ImageExtractor::new(config, doc, downloads).apply(&arena, root)?;

    serialize(root, &options)
}

pub(crate) fn serialize<'a>(
    root: &'a AstNode<'a>,
    options: &Options,
) -> Result<String, ConvertError> {
    let mut buffer = Vec::new();
    format_commonmark(root, options, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub(crate) fn text_node<'a>(arena: &'a Arena<AstNode<'a>>, text: String) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(
        NodeValue::Text(text),
        LineColumn { line: 0, column: 0 },
    ))))
}
