//! Ordered text-level substitutions applied after the second serialization.
//!
//! These cover target-dialect constructs the minimal tree grammar cannot
//! produce: math fences, embed links, callout fences, and a handful of
//! serializer artifacts. Rule order is load-bearing: the math rules must run
//! before the image and heading rules because their placeholders are still
//! link-shaped text at that point, and every pattern is anchored against
//! already-produced output so no rule re-matches text a prior rule emitted.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use super::ConvertError;
use crate::utils::{ASSET_PENDING_ALT, FORMULA_PENDING_ALT, ZERO_WIDTH_JOINER};

// Rule 1: math placeholder alone on its line. Captures an optional leading
// line prefix (block-quote markers) and an optional trailing separator
// punctuation mark, both of which survive the fence expansion.
static BLOCK_MATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^((?:>[ \t]?)*[ \t]*)!\[{FORMULA_PENDING_ALT}\]\(([^)\n]+)\)[ \t]*([，。；、,.;]?)[ \t]*$"
    ))
    .expect("BLOCK_MATH_RE: hardcoded regex is valid")
});

// Rule 2: any math placeholder still inline after rule 1.
static INLINE_MATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"!\[{FORMULA_PENDING_ALT}\]\(([^)\n]+)\)"))
        .expect("INLINE_MATH_RE: hardcoded regex is valid")
});

// Rule 3: asset placeholder with its captured relative path.
static EMBED_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"!\[{ASSET_PENDING_ALT}\]\(([^)\n]+)\)"))
        .expect("EMBED_IMAGE_RE: hardcoded regex is valid")
});

// Rule 4: collapse blank-line runs before a heading to exactly one blank.
static HEADING_GAP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}(#{1,6} )").expect("HEADING_GAP_RE: hardcoded regex is valid")
});

// Rule 5: triple-colon fences, optionally typed.
static CALLOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^:::[ \t]*([a-z]*)[ \t]*$").expect("CALLOUT_RE: hardcoded regex is valid")
});

// Rule 6: bold marker right after a full-width closing parenthesis. The
// structural pass misses this case when the parenthesis and the marker sit in
// different nodes.
static FULLWIDTH_BOLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"）\*\*").expect("FULLWIDTH_BOLD_RE: hardcoded regex is valid")
});

// Rule 7: escaped checkbox markers produced by the serializer.
static ESCAPED_CHECKBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)[-*] \\\[").expect("ESCAPED_CHECKBOX_RE: hardcoded regex is valid")
});

// Rule 8: numeric non-breaking-space references, including the raw character
// the serializer re-emits for a parsed entity.
static NBSP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#160;|&#[xX][aA]0;|\x{A0}").expect("NBSP_RE: hardcoded regex is valid")
});

// Rule 9: the serializer defensively escapes literal asterisks; the target
// dialect wants them bare. This also unescapes asterisks that were escaped in
// the source on purpose; kept as-is.
static ESCAPED_ASTERISK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\\*").expect("ESCAPED_ASTERISK_RE: hardcoded regex is valid")
});

/// Apply every rule in order.
pub fn apply(text: &str) -> Result<String, ConvertError> {
    let text = expand_block_math(text)?;
    let text = expand_inline_math(&text)?;
    let text = EMBED_IMAGE_RE.replace_all(&text, "![[${1}]]");
    let text = HEADING_GAP_RE.replace_all(&text, "\n\n$1");
    let text = CALLOUT_RE.replace_all(&text, |caps: &Captures| {
        let kind = &caps[1];
        if kind.is_empty() {
            "```".to_string()
        } else {
            format!("```ad-{kind}")
        }
    });
    let text = FULLWIDTH_BOLD_RE.replace_all(&text, format!("）{ZERO_WIDTH_JOINER}**"));
    let text = ESCAPED_CHECKBOX_RE.replace_all(&text, "$1- [");
    let text = NBSP_RE.replace_all(&text, " ");
    let text = ESCAPED_ASTERISK_RE.replace_all(&text, "*");
    Ok(text.into_owned())
}

/// Rule 1: `![sentinel](expr)` alone on a line becomes a `$$` fence.
fn expand_block_math(text: &str) -> Result<String, ConvertError> {
    let mut out = String::with_capacity(text.len());
    let mut last_match_end = 0;

    for caps in BLOCK_MATH_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        let prefix = &caps[1];
        let expr = decode_expression(&caps[2])?;
        let punctuation = &caps[3];

        out.push_str(&text[last_match_end..m.start()]);
        // Re-apply the line prefix so block quotes survive the expansion.
        write!(out, "{prefix}$$\n{prefix}{expr}\n{prefix}$${punctuation}").unwrap();
        last_match_end = m.end();
    }

    out.push_str(&text[last_match_end..]);
    Ok(out)
}

/// Rule 2: remaining placeholders become inline `$...$` spans.
fn expand_inline_math(text: &str) -> Result<String, ConvertError> {
    let mut out = String::with_capacity(text.len());
    let mut last_match_end = 0;

    for caps in INLINE_MATH_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        let expr = decode_expression(&caps[1])?.replace(['\r', '\n'], "");

        out.push_str(&text[last_match_end..m.start()]);
        write!(out, " ${expr}$ ").unwrap();
        last_match_end = m.end();
    }

    out.push_str(&text[last_match_end..]);
    Ok(out)
}

fn decode_expression(raw: &str) -> Result<String, ConvertError> {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .map_err(|source| ConvertError::MathDecode {
            expr: raw.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_math_is_decoded_and_fenced() {
        let out = apply("before\n\n![formula-pending](E%3Dmc%5E2)\n\nafter\n").unwrap();
        assert!(out.contains("$$\nE=mc^2\n$$"), "got: {out}");
        assert!(!out.contains("formula-pending"));
    }

    #[test]
    fn test_block_math_keeps_quote_prefix_and_punctuation() {
        let out = apply("> ![formula-pending](a%2Bb)。\n").unwrap();
        assert!(out.contains("> $$\n> a+b\n> $$。"), "got: {out}");
    }

    #[test]
    fn test_inline_math_strips_line_breaks() {
        let out = apply("left ![formula-pending](a%0A%2B%0Ab) right\n").unwrap();
        assert!(out.contains("left  $a+b$  right"), "got: {out}");
    }

    #[test]
    fn test_math_decode_failure_is_fatal() {
        let err = apply("![formula-pending](%E0%A4%A)\n").unwrap_err();
        assert!(matches!(err, ConvertError::MathDecode { .. }), "got: {err}");
    }

    #[test]
    fn test_asset_placeholder_becomes_embed_link() {
        let out = apply("![asset-pending](doc1/pic.png)\n").unwrap();
        assert!(out.contains("![[doc1/pic.png]]"), "got: {out}");
    }

    #[test]
    fn test_blank_run_before_heading_collapses() {
        let out = apply("text\n\n\n\n## Heading\n").unwrap();
        assert!(out.contains("text\n\n## Heading"), "got: {out}");
    }

    #[test]
    fn test_single_blank_before_heading_is_kept() {
        let input = "text\n\n## Heading\n";
        assert_eq!(apply(input).unwrap(), input);
    }

    #[test]
    fn test_typed_callout_fence() {
        let out = apply(":::tip\nBe careful.\n:::\n").unwrap();
        assert!(out.contains("```ad-tip\nBe careful.\n```"), "got: {out}");
    }

    #[test]
    fn test_bare_fence_stays_plain() {
        let out = apply(":::\ncontent\n:::\n").unwrap();
        assert!(out.contains("```\ncontent\n```"), "got: {out}");
    }

    #[test]
    fn test_joiner_inserted_after_fullwidth_paren() {
        let out = apply("（注）**bold**\n").unwrap();
        assert!(
            out.contains(&format!("（注）{ZERO_WIDTH_JOINER}**bold**")),
            "got: {out}"
        );
        // Already-fixed text does not match again.
        assert_eq!(apply(&out).unwrap(), out);
    }

    #[test]
    fn test_escaped_checkbox_is_canonicalized() {
        let out = apply("- \\[ ] task one\n  * \\[x] task two\n").unwrap();
        assert!(out.contains("- [ ] task one"), "got: {out}");
        assert!(out.contains("  - [x] task two"), "got: {out}");
    }

    #[test]
    fn test_nbsp_reference_becomes_space() {
        let out = apply("a&#160;b and c\u{A0}d\n").unwrap();
        assert_eq!(out, "a b and c d\n");
    }

    #[test]
    fn test_escaped_asterisks_are_unescaped() {
        let out = apply("5 \\* 3 equals 15\n").unwrap();
        assert_eq!(out, "5 * 3 equals 15\n");
    }

    #[test]
    fn test_math_runs_before_image_and_heading_rules() {
        // The math expression decodes to text that looks like an image
        // placeholder line followed by a heading gap; rule order keeps the
        // later rules away from it until it is already fenced math.
        let input = "![formula-pending](x%5E2)\n\n\n\n# H\n\n![asset-pending](d/p.png)\n";
        let out = apply(input).unwrap();
        assert!(out.contains("$$\nx^2\n$$"), "got: {out}");
        assert!(out.contains("\n\n# H"), "got: {out}");
        assert!(out.contains("![[d/p.png]]"), "got: {out}");
    }
}
