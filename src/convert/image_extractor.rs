//! Remote image classification and rewriting.
//!
//! Every secure remote image is either an encoded math expression (the
//! platform renders formulas through a dedicated image endpoint) or a
//! downloadable asset. Both become placeholder nodes carrying a sentinel alt
//! text; the text-level post-processing pass turns the placeholders into
//! target-dialect syntax once the tree has been serialized.

use comrak::nodes::{AstNode, NodeValue};
use comrak::Arena;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use super::ConvertError;
use crate::assets::{DownloadQueue, asset_destination, asset_relative_name};
use crate::config::ExportConfig;
use crate::document::DocumentLocation;
use crate::utils::{ASSET_PENDING_ALT, FORMULA_PENDING_ALT};

// Fixed extraction pattern for the formula endpoint's fragment, which looks
// like `card=math&code=<percent-encoded expression>&`. No match means the
// encoding is malformed and the document conversion must fail.
static MATH_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"code=(.*?)&").expect("MATH_CODE_RE: hardcoded regex is valid")
});

/// One planned node rewrite.
struct Rewrite {
    url: String,
    alt: &'static str,
}

/// Classifies and rewrites remote image nodes, scheduling asset downloads.
pub struct ImageExtractor<'a> {
    config: &'a ExportConfig,
    doc: &'a DocumentLocation,
    downloads: &'a dyn DownloadQueue,
}

impl<'a> ImageExtractor<'a> {
    #[must_use]
    pub fn new(
        config: &'a ExportConfig,
        doc: &'a DocumentLocation,
        downloads: &'a dyn DownloadQueue,
    ) -> Self {
        Self {
            config,
            doc,
            downloads,
        }
    }

    /// Rewrite every remote image in the tree.
    pub fn apply<'t>(
        &self,
        arena: &'t Arena<AstNode<'t>>,
        root: &'t AstNode<'t>,
    ) -> Result<(), ConvertError> {
        // Collect up front: rewriting replaces alt-text children, and the
        // descendant iterator must not observe that surgery.
        let nodes: Vec<&AstNode> = root.descendants().collect();

        for node in nodes {
            let rewrite = {
                let ast = node.data.borrow();
                match &ast.value {
                    NodeValue::Image(link) => self.classify(&link.url)?,
                    _ => None,
                }
            };
            let Some(rewrite) = rewrite else { continue };

            for child in node.children().collect::<Vec<_>>() {
                child.detach();
            }
            node.append(super::text_node(arena, rewrite.alt.to_string()));

            let mut ast = node.data.borrow_mut();
            if let NodeValue::Image(link) = &mut ast.value {
                link.url = rewrite.url;
                link.title = String::new();
            }
        }
        Ok(())
    }

    /// Decide what happens to one image URL. `None` leaves the node alone.
    fn classify(&self, raw: &str) -> Result<Option<Rewrite>, ConvertError> {
        let parsed = match Url::parse(raw) {
            Ok(parsed) => parsed,
            Err(_) => return Ok(None),
        };
        if parsed.scheme() != "https" {
            return Ok(None);
        }

        if parsed.path().contains(self.config.math_path_marker()) {
            // The expression stays percent-encoded until post-processing.
            let fragment = parsed.fragment().unwrap_or("");
            let code = MATH_CODE_RE
                .captures(fragment)
                .and_then(|caps| caps.get(1))
                .ok_or_else(|| ConvertError::MathCode {
                    url: raw.to_string(),
                })?;
            return Ok(Some(Rewrite {
                url: code.as_str().to_string(),
                alt: FORMULA_PENDING_ALT,
            }));
        }

        let Some(relative) = asset_relative_name(&self.doc.url, &parsed) else {
            return Ok(None);
        };
        let dest = asset_destination(
            self.config.output_dir(),
            &self.doc.namespace,
            self.config.assets_dir(),
            &relative,
        );
        self.downloads.enqueue(raw.to_string(), dest);

        Ok(Some(Rewrite {
            url: relative,
            alt: ASSET_PENDING_ALT,
        }))
    }
}
