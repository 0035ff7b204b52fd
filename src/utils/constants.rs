//! Shared configuration constants for wikivault
//!
//! Default values for the source platform's URL conventions and for the
//! target vault layout. Everything here can be overridden through
//! `ExportConfig`; the constants keep the defaults in one place.

/// File extension of converted documents in the target vault.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Directory under each namespace that receives downloaded assets.
///
/// A document `ns/doc1` referencing `pic.png` ends up with the asset at
/// `ns/assets/doc1/pic.png`.
pub const ASSETS_DIR_NAME: &str = "assets";

/// URL scheme used when reconstructing a document's canonical source address.
pub const DEFAULT_SCHEME: &str = "https";

/// User agent sent on redirect lookups and asset downloads.
pub const DEFAULT_USER_AGENT: &str = concat!("wikivault/", env!("CARGO_PKG_VERSION"));

/// Default number of documents converted concurrently by the exporter.
pub const DEFAULT_MAX_CONCURRENT_DOCS: usize = 8;

/// Path prefix of the platform's legacy share links.
///
/// Share links carry an opaque token instead of a document pathname; the
/// platform answers them with a redirect chain ending at the canonical
/// document URL.
pub const SHARE_LINK_PREFIX: &str = "/docs/share/";

/// Path prefix of the platform's uploaded-attachment namespace.
///
/// Hyperlinks into this namespace are binary downloads, not documents, and
/// are left to the image/asset handling.
pub const ATTACHMENTS_PREFIX: &str = "/attachments/";

/// Path marker identifying the platform's formula-rendering endpoint.
///
/// Image URLs containing this segment are rendered math expressions; the
/// expression itself travels percent-encoded in the URL fragment.
pub const MATH_PATH_MARKER: &str = "__latex";

/// Query pair the platform appends to links rendered inside embed views.
///
/// Left in place it suppresses navigation chrome when the platform itself
/// renders the target, so it is stripped before mapping lookup.
pub const EMBED_VIEW_QUERY: &str = "view=doc_embed";

/// Sentinel alt text marking an image node as a pending math expression.
///
/// Internal to the pipeline: written during tree rewriting, consumed by the
/// text-level post-processing pass, never shown to end users.
pub const FORMULA_PENDING_ALT: &str = "formula-pending";

/// Sentinel alt text marking an image node as a pending local asset.
pub const ASSET_PENDING_ALT: &str = "asset-pending";

/// Zero-width joiner appended to bold runs.
///
/// Works around a font-rendering quirk in the target viewer where bold runs
/// ending at full-width punctuation are misrendered.
pub const ZERO_WIDTH_JOINER: char = '\u{200D}';
