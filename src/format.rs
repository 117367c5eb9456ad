//! Bot reply formatting
//!
//! Turns raw reply text into structured render nodes: paragraphs with
//! hard line breaks, bullet lists, bold spans and bare links. Formatting
//! is total; malformed markup degrades to plain text.


use regex::Regex;
use std::sync::LazyLock;

/// Two or more consecutive newlines separate blocks
static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid block separator regex"));

/// Bold spans win over links when both start at the same offset
static INLINE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\*\*[^*]+\*\*)|(https?://\S+)").expect("valid inline token regex")
});

/// A block-level render node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    Paragraph(Vec<InlineNode>),
    BulletList(Vec<Vec<InlineNode>>),
}

/// An inline render node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    PlainText(String),
    Bold(String),
    Link(String),
    /// Hard break between two lines of the same paragraph
    LineBreak,
}

/// Format raw reply text into render nodes.
pub fn format(raw: &str) -> Vec<RenderNode> {
    let normalized = raw.replace("\r\n", "\n");

    BLOCK_SEPARATOR
        .split(&normalized)
        .filter(|block| !block.trim().is_empty())
        .map(format_block)
        .collect()
}

fn format_block(block: &str) -> RenderNode {
    match bullet_items(block) {
        Some(items) => RenderNode::BulletList(items.into_iter().map(parse_inline).collect()),
        None => {
            let mut children = Vec::new();
            for (idx, line) in block.trim_matches('\n').split('\n').enumerate() {
                if idx > 0 {
                    children.push(InlineNode::LineBreak);
                }
                children.extend(parse_inline(line));
            }
            RenderNode::Paragraph(children)
        }
    }
}

/// Items of a bullet block, or `None` when any non-empty line is not a bullet.
///
/// Classification is all-or-nothing per block.
fn bullet_items(block: &str) -> Option<Vec<&str>> {
    block
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(bullet_item)
        .collect()
}

/// Strip exactly one bullet marker and the whitespace after it.
///
/// `***bold** rest` is a bullet whose item starts with a bold span;
/// `**bold** rest` is not a bullet at all.
fn bullet_item(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('*')?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else if rest.starts_with("**") {
        Some(rest)
    } else {
        None
    }
}

/// Parse bold spans and bare links out of a single line.
pub fn parse_inline(line: &str) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    let mut cursor = 0;

    for caps in INLINE_TOKEN.captures_iter(line) {
        let Some(token) = caps.get(0) else { continue };
        push_plain(&mut nodes, line.get(cursor..token.start()).unwrap_or_default());

        if caps.get(1).is_some() {
            let inner = token
                .as_str()
                .strip_prefix("**")
                .and_then(|s| s.strip_suffix("**"))
                .unwrap_or_default();
            nodes.push(InlineNode::Bold(inner.to_string()));
        } else {
            nodes.push(InlineNode::Link(token.as_str().to_string()));
        }
        cursor = token.end();
    }

    push_plain(&mut nodes, line.get(cursor..).unwrap_or_default());
    nodes
}

fn push_plain(nodes: &mut Vec<InlineNode>, text: &str) {
    if !text.is_empty() {
        nodes.push(InlineNode::PlainText(text.to_string()));
    }
}
