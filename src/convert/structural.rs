//! Structural cleanup pass over the reparsed tree.
//!
//! Pure `text -> text`: no mapping, no document identity, no network. Kept
//! separate from round 1 so it can be tested against fixed input/output text.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, parse_document};

use super::ConvertError;
use crate::utils::ZERO_WIDTH_JOINER;

/// Traversal verdict for one node.
enum Descent {
    Continue,
    SkipSubtree,
}

/// What to do with the node under the cursor.
enum Action {
    Keep,
    SkipSubtree,
    Detach,
    Replace(NodeValue),
    AppendJoiner,
}

/// Run the structural pass: parse with table support, rewrite, serialize.
pub fn normalize(input: &str) -> Result<String, ConvertError> {
    let arena = Arena::new();
    let mut options = Options::default();
    options.extension.table = true;
    let root = parse_document(&arena, input, &options);
    walk(root, false);
    super::serialize(root, &options)
}

fn walk<'a>(node: &'a AstNode<'a>, parent_is_strong: bool) {
    match visit(node, parent_is_strong) {
        Descent::SkipSubtree => {}
        Descent::Continue => {
            let is_strong = matches!(node.data.borrow().value, NodeValue::Strong);
            // Collect first: anchor removal may detach children mid-walk.
            for child in node.children().collect::<Vec<_>>() {
                walk(child, is_strong);
            }
        }
    }
}

fn visit<'a>(node: &'a AstNode<'a>, parent_is_strong: bool) -> Descent {
    let action = {
        let ast = node.data.borrow();
        match &ast.value {
            // Table content is already serialized correctly by the table
            // extension; structural rewriting risks corrupting cell
            // alignment markers.
            NodeValue::Table(..) => Action::SkipSubtree,

            NodeValue::HtmlInline(raw) => classify_inline_markup(raw),

            NodeValue::HtmlBlock(block) if is_anchor_markup(block.literal.trim()) => {
                Action::Detach
            }

            NodeValue::Text(text) if parent_is_strong && !text.ends_with(ZERO_WIDTH_JOINER) => {
                Action::AppendJoiner
            }

            _ => Action::Keep,
        }
    };

    match action {
        Action::Keep => Descent::Continue,
        Action::SkipSubtree => Descent::SkipSubtree,
        Action::Detach => {
            node.detach();
            Descent::SkipSubtree
        }
        Action::Replace(value) => {
            node.data.borrow_mut().value = value;
            Descent::Continue
        }
        Action::AppendJoiner => {
            if let NodeValue::Text(text) = &mut node.data.borrow_mut().value {
                text.push(ZERO_WIDTH_JOINER);
            }
            Descent::Continue
        }
    }
}

fn classify_inline_markup(raw: &str) -> Action {
    let trimmed = raw.trim();
    if is_line_break_markup(trimmed) {
        // Keep the break, lose the markup.
        return Action::Replace(NodeValue::SoftBreak);
    }
    if is_anchor_markup(trimmed) {
        // Anchor names are navigation aids meaningless in the target dialect.
        return Action::Replace(NodeValue::Text(String::new()));
    }
    Action::Keep
}

fn is_line_break_markup(fragment: &str) -> bool {
    matches!(fragment, "<br/>" | "<br />" | "<br>")
}

fn is_anchor_markup(fragment: &str) -> bool {
    fragment.starts_with("<a name=") || fragment == "</a>"
}
